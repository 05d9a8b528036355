use std::path::PathBuf;

use clap::Parser;
use greenearth_contact::DEFAULT_BASE_URL;

/// Browse the Green Earth site in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct Args {
    /// Base URL of the backend receiving contact requests.
    #[arg(long, env = "GREENEARTH_BACKEND_URL", default_value = DEFAULT_BASE_URL)]
    pub backend_url: String,

    /// Write logs to this file (filtered by `RUST_LOG`).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path of the page shown on start, e.g. `/facilities/aac`.
    #[arg(long, default_value = "/")]
    pub route: String,
}
