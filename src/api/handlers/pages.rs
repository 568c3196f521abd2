use crate::AppState;
use crate::api::error::AppError;
use crate::services::renderer::{Bindings, FORM_TEMPLATE};
use axum::{extract::State, response::Html};

/// Heading shown on the upload form
pub const FORM_MESSAGE: &str = "FACE";

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Upload form; doubles as a liveness check")
    ),
    tag = "api"
)]
pub async fn form_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let bindings = Bindings::from([("message", FORM_MESSAGE.to_string())]);
    let html = state.renderer.render(FORM_TEMPLATE, &bindings)?;
    Ok(Html(html))
}
