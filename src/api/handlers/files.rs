use crate::AppState;
use crate::api::error::AppError;
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

#[utoipa::path(
    get,
    path = "/file/{name}",
    params(
        ("name" = String, Path, description = "Staged file name returned by /process")
    ),
    responses(
        (status = 200, description = "File download stream"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "File not found")
    ),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let stream = state.file_service.retrieve(&name).await?;

    tracing::info!("📤 Streaming staged file {}", name);

    let headers = [
        (
            header::CONTENT_TYPE,
            mime::APPLICATION_OCTET_STREAM.to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        ),
    ];

    Ok((headers, Body::from_stream(stream)).into_response())
}
