use thiserror::Error;

/// Everything that can go wrong before playback starts.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("download of {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("could not decode GIF payload: {0}")]
    Decode(#[from] image::ImageError),

    #[error("GIF payload decoded to zero frames")]
    Empty,
}

impl LoadError {
    pub fn network(url: &str, reason: impl ToString) -> Self {
        LoadError::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Name of the load stage that failed, used in the user-facing message.
    pub fn stage(&self) -> &'static str {
        match self {
            LoadError::Network { .. } => "download",
            LoadError::Decode(_) => "decode",
            LoadError::Empty => "empty-result",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            LoadError::Network { .. } => 2,
            LoadError::Decode(_) => 3,
            LoadError::Empty => 4,
        }
    }
}
