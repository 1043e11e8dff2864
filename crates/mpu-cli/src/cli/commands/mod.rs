//! CLI command handlers, one file per command.

mod config;
mod signal;
mod upload;

pub use config::run_config;
pub use signal::run_signal;
pub use upload::{run_upload, UploadArgs};
