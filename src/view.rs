//! Page model for the upload form.

use askama::Template;

use crate::captioner::CaptionOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLine {
    pub label: String,
    pub text: String,
}

/// Everything the index page shows. A blank page is the bare form.
#[derive(Template, Debug, Clone, Default)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub error_message: Option<String>,
    /// `data:` URI of the uploaded image
    pub image_preview: Option<String>,
    pub captions: Vec<CaptionLine>,
}

impl IndexPage {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Build the page for a finished describe request.
    ///
    /// `preview_mime` must be a safe `type/subtype` token; it is written
    /// into the `data:` URI unescaped.
    pub fn from_outcome(outcome: CaptionOutcome, preview_mime: &str) -> Self {
        let error_message = outcome.error_message();
        match outcome {
            CaptionOutcome::Success {
                captions,
                image_base64,
            } => {
                let mut lines: Vec<CaptionLine> = Vec::new();
                if captions.is_empty() {
                    lines.push(CaptionLine {
                        label: "Caption".to_string(),
                        text: "The captioning service returned no caption for this image.".to_string(),
                    });
                } else {
                    lines.extend(
                        captions
                            .lines()
                            .into_iter()
                            .map(|(label, text)| CaptionLine { label, text }),
                    );
                }
                Self {
                    error_message: None,
                    image_preview: Some(format!("data:{preview_mime};base64,{image_base64}")),
                    captions: lines,
                }
            }
            CaptionOutcome::Failure(_) => Self {
                error_message,
                ..Self::default()
            },
        }
    }
}
