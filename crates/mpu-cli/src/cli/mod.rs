//! CLI for the MPU chunked multipart uploader.

mod commands;
mod control_socket;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mpu_core::config;
use std::path::PathBuf;

use commands::{run_config, run_signal, run_upload, UploadArgs};
use control_socket::ControlCommand;

/// Top-level CLI for the MPU uploader.
#[derive(Debug, Parser)]
#[command(name = "mpu")]
#[command(about = "MPU: chunked multipart uploader with presigned part URLs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Upload a file. Runs until the upload completes or is aborted.
    Upload {
        /// Local file to upload.
        file: PathBuf,
        /// Destination folder inside the bucket.
        #[arg(long, default_value = "")]
        path: String,
        /// MIME type sent with the initiate request.
        #[arg(long, value_name = "TYPE")]
        content_type: Option<String>,
        /// Override the configured bucket.
        #[arg(long)]
        bucket: Option<String>,
        /// Upload at most N parts at once within a wave.
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
    },

    /// Pause the running upload after its current wave.
    Pause,

    /// Resume a paused upload.
    Resume,

    /// Abort the running upload and discard the remote session.
    Abort,

    /// Print the effective configuration and where it lives.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Upload {
                file,
                path,
                content_type,
                bucket,
                concurrency,
            } => {
                let args = UploadArgs {
                    file,
                    destination: path,
                    content_type,
                    bucket,
                    concurrency,
                };
                run_upload(&cfg, args).await?
            }
            CliCommand::Pause => run_signal(ControlCommand::Pause).await?,
            CliCommand::Resume => run_signal(ControlCommand::Resume).await?,
            CliCommand::Abort => run_signal(ControlCommand::Abort).await?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
