//! Upload-to-caption round trip against the remote captioning service.
//!
//! The service takes a multipart form with one `image` part at
//! `POST {base_url}/caption` and answers with a JSON object of captions.

mod result;

pub use result::CaptionResult;

use base64::{engine::general_purpose, Engine as _};
use reqwest::multipart::{Form, Part};

use crate::error::CaptionError;
use crate::upload::UploadedImage;

/// Result of handling one upload. Exactly one of the two is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptionOutcome {
    Success {
        captions: CaptionResult,
        /// Standard base64 of the uploaded bytes, for redisplay
        image_base64: String,
    },
    Failure(CaptionError),
}

impl CaptionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CaptionOutcome::Success { .. })
    }

    /// User-facing message when the outcome is a failure.
    pub fn error_message(&self) -> Option<String> {
        match self {
            CaptionOutcome::Success { .. } => None,
            CaptionOutcome::Failure(err) => Some(err.to_string()),
        }
    }
}

/// Client for the captioning service.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CaptionService {
    client: reqwest::Client,
    base_url: String,
}

impl CaptionService {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn caption_url(&self) -> String {
        format!("{}/caption", self.base_url)
    }

    /// Caption an uploaded image.
    ///
    /// Never fails: every error is folded into [`CaptionOutcome::Failure`]
    /// with a message fit for the page. No network call is made when the
    /// upload is missing or empty.
    pub async fn handle(&self, image: Option<&UploadedImage>) -> CaptionOutcome {
        let image = match image {
            Some(image) if !image.is_empty() => image,
            _ => {
                tracing::warn!("Describe request without an image");
                return CaptionOutcome::Failure(CaptionError::NoImageProvided);
            }
        };

        let image_base64 = general_purpose::STANDARD.encode(&image.bytes);

        match self.request_captions(image).await {
            Ok(captions) => CaptionOutcome::Success {
                captions,
                image_base64,
            },
            Err(err) => {
                tracing::error!(
                    kind = err.kind(),
                    status = ?err.status(),
                    filename = %image.filename,
                    "{err}"
                );
                CaptionOutcome::Failure(err)
            }
        }
    }

    async fn request_captions(&self, image: &UploadedImage) -> Result<CaptionResult, CaptionError> {
        let part = Part::bytes(image.bytes.to_vec())
            .file_name(image.filename.clone())
            .mime_str(&image.content_type)
            .map_err(|e| CaptionError::Unexpected {
                message: error_chain(&e),
            })?;
        let form = Form::new().part("image", part);

        let url = self.caption_url();
        tracing::debug!(%url, size = image.bytes.len(), "Sending image to captioning service");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(transport_error)?;

        let body = response.text().await.map_err(transport_error)?;
        tracing::info!(%url, "Raw JSON response from captioning service: {body}");

        CaptionResult::from_json(&body).map_err(|e| CaptionError::MalformedResponse {
            message: e.to_string(),
        })
    }
}

fn transport_error(err: reqwest::Error) -> CaptionError {
    // A request that could not even be built never reached the service
    if err.is_builder() {
        return CaptionError::Unexpected {
            message: error_chain(&err),
        };
    }
    CaptionError::Transport {
        message: error_chain(&err),
        status: err.status().map(|s| s.as_u16()),
    }
}

/// Render an error with its source chain, e.g. "error sending request: ... Connection refused".
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
