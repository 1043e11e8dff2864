//! `mpu pause | resume | abort` – steer the running `mpu upload` over its control socket.

use anyhow::Result;
use mpu_core::control::default_control_socket_path;

use crate::cli::control_socket::{self, ControlCommand};

pub async fn run_signal(cmd: ControlCommand) -> Result<()> {
    let path = default_control_socket_path()?;
    control_socket::send_command(&path, cmd).await?;
    println!("Sent {} to the running upload", cmd.as_str());
    Ok(())
}
