use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gif-viewer", version, about = "Download a GIF and play it in a window (SPACE pauses, ESC quits)")]
pub struct Args {
    /// URL of the GIF to play
    #[arg(env = "GIF_VIEWER_URL")]
    pub url: String,

    /// Config file to read instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip TLS certificate verification (unsafe, for broken hosts only)
    #[arg(long)]
    pub insecure: bool,

    /// Download timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Window title
    #[arg(long)]
    pub title: Option<String>,
}
