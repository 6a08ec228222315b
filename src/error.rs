//! Error types for the captioner front end.
//!
//! [`CaptionError`] is what a single describe request can end in. Every
//! variant is recovered by the page handler and shown to the user, so the
//! `Display` text is the user-facing message.

use thiserror::Error;

/// Failure of one upload-to-caption round trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptionError {
    /// Nothing was uploaded, or the upload was empty
    #[error("No image uploaded. Please select an image file.")]
    NoImageProvided,

    /// The captioning service could not be reached or answered with a non-2xx status
    #[error("Error communicating with captioning service: {message}{}", status_suffix(.status))]
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// The service answered 2xx but the body is not the JSON we expect
    #[error("Error processing captioning service response: {message}. Response might be malformed.")]
    MalformedResponse { message: String },

    #[error("An unexpected error occurred: {message}")]
    Unexpected { message: String },
}

impl CaptionError {
    /// Short machine-friendly name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            CaptionError::NoImageProvided => "no_image_provided",
            CaptionError::Transport { .. } => "transport",
            CaptionError::MalformedResponse { .. } => "malformed_response",
            CaptionError::Unexpected { .. } => "unexpected",
        }
    }

    /// HTTP status reported by the captioning service, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            CaptionError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (Status: {code})"),
        None => String::new(),
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to merge or deserialize the configuration sources
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    Validation(String),
}
