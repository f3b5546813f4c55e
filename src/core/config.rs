use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::Args;
use crate::media::{LoaderOptions, DEFAULT_FRAME_DELAY_MS};

/// Viewer settings. Read from `config.json` when present, never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub timeout_secs: u64,
    pub max_redirects: usize,
    /// Opt-in only; disables TLS certificate verification for the download.
    pub accept_invalid_certs: bool,
    pub max_download_mib: u64,
    pub fallback_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub window_title: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_redirects: 10,
            accept_invalid_certs: false,
            max_download_mib: 64,
            fallback_delay_ms: DEFAULT_FRAME_DELAY_MS,
            poll_interval_ms: 30,
            window_title: "GIF Viewer".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Load from `explicit` if given (must exist), otherwise from the default
    /// location, falling back to defaults when that file is absent.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    log::debug!("No config file at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {}: {}", path.display(), e))?;
        let config = serde_json::from_str::<Self>(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file at {}: {}", path.display(), e))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gif-viewer")
            .join("config.json")
    }

    /// Command-line flags win over the file.
    pub fn apply_args(mut self, args: &Args) -> Self {
        if args.insecure {
            self.accept_invalid_certs = true;
        }
        if let Some(timeout) = args.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(title) = &args.title {
            self.window_title = title.clone();
        }
        self
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            max_redirects: self.max_redirects,
            accept_invalid_certs: self.accept_invalid_certs,
            max_bytes: self.max_download_mib.saturating_mul(1024 * 1024),
            fallback_delay: Duration::from_millis(self.fallback_delay_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
