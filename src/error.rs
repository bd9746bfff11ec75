use thiserror::Error;

pub type Result<T> = std::result::Result<T, PoseError>;

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("pose JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    #[error("invalid preset `{preset}`: {reason}")]
    InvalidPreset { preset: String, reason: String },
}

impl PoseError {
    pub(crate) fn invalid(preset: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPreset {
            preset: preset.to_string(),
            reason: reason.into(),
        }
    }
}
