use crate::AppState;
use crate::api::error::AppError;
use crate::services::renderer::{Bindings, RESULT_TEMPLATE};
use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::Html,
};
use bytes::Bytes;
use utoipa::ToSchema;

/// Multipart body accepted by `/process`
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// PNG or JPG image
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

#[utoipa::path(
    post,
    path = "/process",
    request_body(content = UploadForm, content_type = "multipart/form-data", description = "Image to analyse"),
    responses(
        (status = 200, description = "Result page with the detection message and staged file name"),
        (status = 400, description = "Unsupported file format or malformed upload"),
        (status = 413, description = "Upload too large"),
        (status = 422, description = "Image could not be processed")
    ),
    tag = "process"
)]
pub async fn process_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, data));
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let staged = state.file_service.stage(&filename, &data).await?;

    let message = state.detector.detect(&staged.path).await.map_err(|e| {
        AppError::Processing(format!("Could not process image {}: {:#}", staged.name, e))
    })?;

    tracing::info!("🙂 {} -> {}", staged.name, message);

    let bindings = Bindings::from([("message", message), ("file_name", staged.name)]);
    let html = state.renderer.render(RESULT_TEMPLATE, &bindings)?;
    Ok(Html(html))
}
