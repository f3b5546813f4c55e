use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::media::{decode_animation, Animation, LoadError, DEFAULT_FRAME_DELAY_MS};

/// Network and decode knobs for [`GifLoader`].
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub timeout: Duration,
    pub max_redirects: usize,
    /// Skips TLS certificate verification. Off unless explicitly requested.
    pub accept_invalid_certs: bool,
    pub max_bytes: u64,
    pub fallback_delay: Duration,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            max_bytes: 64 * 1024 * 1024,
            fallback_delay: Duration::from_millis(DEFAULT_FRAME_DELAY_MS),
        }
    }
}

/// Downloads a GIF once and turns it into a ready-to-play [`Animation`].
pub struct GifLoader {
    client: Client,
    options: LoaderOptions,
}

impl GifLoader {
    pub fn new(options: LoaderOptions) -> Result<Self, LoadError> {
        if options.accept_invalid_certs {
            log::warn!("TLS certificate verification is DISABLED for this download");
        }

        let client = Client::builder()
            .timeout(options.timeout)
            .redirect(Policy::limited(options.max_redirects))
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .user_agent(concat!("gif-viewer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LoadError::network("<client>", e))?;

        Ok(Self { client, options })
    }

    /// Fetch and decode in one step. No partial state survives a failure.
    pub fn load(&self, url: &str) -> Result<Animation, LoadError> {
        let bytes = self.fetch(url)?;
        decode_animation(&bytes, self.options.fallback_delay)
    }

    /// Perform the transfer and return the response body.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        log::info!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| LoadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::network(url, format!("server returned {}", status)));
        }

        if let Some(length) = response.content_length() {
            if length > self.options.max_bytes {
                return Err(LoadError::network(
                    url,
                    format!("payload of {} bytes exceeds limit of {}", length, self.options.max_bytes),
                ));
            }
        }

        let mut body = Vec::new();
        response
            .take(self.options.max_bytes.saturating_add(1))
            .read_to_end(&mut body)
            .map_err(|e| LoadError::network(url, e))?;

        if body.len() as u64 > self.options.max_bytes {
            return Err(LoadError::network(
                url,
                format!("payload exceeds limit of {} bytes", self.options.max_bytes),
            ));
        }

        log::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
