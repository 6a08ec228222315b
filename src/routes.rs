use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::upload::{self, UploadedImage};
use crate::view::IndexPage;
use crate::AppState;

pub async fn index() -> Response {
    render(IndexPage::blank(), StatusCode::OK)
}

/// Handle the upload form. Always answers with the page; failures of the
/// caption round trip are shown as the page's error message.
pub async fn describe(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    // A body that isn't multipart at all carries no file
    let image = match multipart {
        Ok(mut multipart) => match upload::read_image(&mut multipart).await {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(status = %err.status(), "Failed to read upload: {err}");
                return render(
                    IndexPage::with_error(format!("Failed to read upload: {}", err.body_text())),
                    err.status(),
                );
            }
        },
        Err(rejection) => {
            tracing::debug!("Describe request is not multipart: {rejection}");
            None
        }
    };

    let outcome = state.captioner.handle(image.as_ref()).await;
    tracing::info!(success = outcome.is_success(), "Describe request finished");
    let preview_mime = image
        .as_ref()
        .map(UploadedImage::preview_mime)
        .unwrap_or_default();

    render(IndexPage::from_outcome(outcome, &preview_mime), StatusCode::OK)
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html("<h1>Not found</h1>"))
}

fn render(page: IndexPage, status: StatusCode) -> Response {
    match page.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!("Failed to render page: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}
