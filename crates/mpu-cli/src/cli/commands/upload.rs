//! `mpu upload <file>` – run one upload to completion, printing progress.
//! Listens on the control socket so `mpu pause|resume|abort` can steer it.

use anyhow::{Context, Result};
use mpu_core::config::MpuConfig;
use mpu_core::control::default_control_socket_path;
use mpu_core::progress::format_bytes;
use mpu_core::{
    CurlTransport, HttpSessionApi, Orchestrator, ProgressEvent, SelectedFile, UploadControl,
    UploadError, UploadOutcome, UploadSettings,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::cli::control_socket::{self, ControlCommand};

const PROGRESS_INTERVAL_MS: u64 = 500;

#[derive(Debug)]
pub struct UploadArgs {
    pub file: PathBuf,
    pub destination: String,
    pub content_type: Option<String>,
    pub bucket: Option<String>,
    pub concurrency: Option<usize>,
}

pub(crate) fn settings_for(cfg: &MpuConfig, args: &UploadArgs) -> UploadSettings {
    let mut settings = UploadSettings::from(cfg);
    if let Some(bucket) = &args.bucket {
        settings.bucket = bucket.clone();
    }
    if let Some(n) = args.concurrency {
        settings.max_concurrent_parts = Some(n.max(1));
    }
    settings
}

pub(crate) fn progress_line(ev: &ProgressEvent, total: u64) -> String {
    format!(
        "  {} / {} ({:.1}%)  {}/s  ETA {}  parts {}/{}",
        format_bytes(ev.uploaded_size as f64),
        format_bytes(total as f64),
        ev.percent_complete,
        ev.speed,
        ev.time_remaining,
        ev.completed_parts,
        ev.total_parts
    )
}

pub async fn run_upload(cfg: &MpuConfig, args: UploadArgs) -> Result<()> {
    let file = SelectedFile::open(&args.file, args.content_type.as_deref())?;
    let total = file.size();
    let name = file.name.clone();

    let api = HttpSessionApi::new(&cfg.api_base_url, cfg.auth_token.clone(), cfg.curl_options())?;
    let transport = CurlTransport::new(cfg.curl_options());

    let (progress_tx, mut progress_rx) = mpsc::channel::<ProgressEvent>(16);
    let mut orch = Orchestrator::new(Arc::new(api), Arc::new(transport), settings_for(cfg, &args))
        .with_progress(progress_tx);
    orch.select_file(file)?;

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<ControlCommand>(8);
    let socket_path = default_control_socket_path()?;
    let listener = match control_socket::spawn_control_listener(orch.control(), cmd_tx, &socket_path) {
        Ok(h) => {
            tracing::debug!(path = %socket_path.display(), "control socket listening");
            Some(h)
        }
        Err(e) => {
            tracing::warn!(path = %socket_path.display(), "control socket unavailable: {}", e);
            None
        }
    };

    let progress_handle = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        while let Some(ev) = progress_rx.recv().await {
            let now = Instant::now();
            let due = last_print
                .map(|t| now.duration_since(t).as_millis() as u64 >= PROGRESS_INTERVAL_MS)
                .unwrap_or(true);
            if due || ev.uploaded_size >= total {
                println!("{}", progress_line(&ev, total));
                last_print = Some(now);
            }
        }
    });

    println!("Uploading {} ({})", name, format_bytes(total as f64));
    let result = drive(&mut orch, &args.destination, &mut cmd_rx).await;

    drop(orch);
    let _ = progress_handle.await;
    if let Some(h) = listener {
        h.abort();
        let _ = std::fs::remove_file(&socket_path);
    }

    let file_url = result.with_context(|| format!("uploading {}", args.file.display()))?;
    println!("Uploaded {} -> {}", name, file_url);
    Ok(())
}

/// Run the upload, parking on the control channel whenever it pauses.
async fn drive(
    orch: &mut Orchestrator,
    destination: &str,
    commands: &mut mpsc::Receiver<ControlCommand>,
) -> Result<String, UploadError> {
    let control = orch.control();
    let mut outcome = orch.start_upload(destination).await?;
    loop {
        match outcome {
            UploadOutcome::Completed { file_url } => return Ok(file_url),
            UploadOutcome::Aborted => return Err(UploadError::Cancelled),
            UploadOutcome::Paused => {
                println!("Paused. Run `mpu resume` to continue or `mpu abort` to cancel.");
                if wait_for_resume(&control, commands).await {
                    println!("Resuming");
                    outcome = orch.resume().await?;
                } else {
                    orch.abort().await;
                    return Err(UploadError::Cancelled);
                }
            }
        }
    }
}

/// True on resume, false on abort or when the control channel is gone.
///
/// Queued commands were already applied to `control` by the listener, so after
/// draining them the pause flag tells whether a resume is still owed.
pub(crate) async fn wait_for_resume(
    control: &UploadControl,
    commands: &mut mpsc::Receiver<ControlCommand>,
) -> bool {
    while let Ok(cmd) = commands.try_recv() {
        if cmd == ControlCommand::Abort {
            return false;
        }
    }
    if control.is_aborted() {
        return false;
    }
    if !control.is_paused() {
        return true;
    }
    loop {
        match commands.recv().await {
            Some(ControlCommand::Resume) => return true,
            Some(ControlCommand::Abort) | None => return false,
            Some(ControlCommand::Pause) => {}
        }
    }
}
