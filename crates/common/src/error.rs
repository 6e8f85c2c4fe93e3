//! Error types shared across Call Enhancer crates.

use std::path::PathBuf;

/// Top-level error type for Call Enhancer operations.
#[derive(Debug, thiserror::Error)]
pub enum EnhancerError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Detection error: {message}")]
    Detection { message: String },

    #[error("Processing error: {message}")]
    Processing { message: String },

    #[error("Audio error: {message}")]
    Audio { message: String },

    #[error("Presentation error: {message}")]
    Presentation { message: String },

    #[error("Image error: {message}")]
    Image { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using EnhancerError.
pub type EnhancerResult<T> = Result<T, EnhancerError>;

impl EnhancerError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing {
            message: msg.into(),
        }
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio {
            message: msg.into(),
        }
    }

    pub fn presentation(msg: impl Into<String>) -> Self {
        Self::Presentation {
            message: msg.into(),
        }
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_messages() {
        let err = EnhancerError::capture("Cannot access webcam");
        assert_eq!(err.to_string(), "Capture error: Cannot access webcam");

        let err = EnhancerError::FileNotFound {
            path: PathBuf::from("background_music.mp3"),
        };
        assert!(err.to_string().contains("background_music.mp3"));
    }
}
