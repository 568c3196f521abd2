pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::detector::SmileDetector;
use crate::services::file_service::FileService;
use crate::services::renderer::Renderer;
use crate::services::storage::StorageService;
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::pages::form_page,
        api::handlers::process::process_upload,
        api::handlers::files::download_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::process::UploadForm,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "api", description = "Pages and liveness"),
        (name = "process", description = "Upload and detection"),
        (name = "files", description = "Staged file retrieval")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    pub file_service: Arc<FileService>,
    pub detector: Arc<dyn SmileDetector>,
    pub renderer: Arc<dyn Renderer>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let allow_origin = if state.config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            state
                .config
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::pages::form_page))
        .route("/health", get(api::handlers::health::health_check))
        .route("/process", post(api::handlers::process::process_upload))
        .route("/file/:name", get(api::handlers::files::download_file))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(allow_origin)
                .allow_methods([Method::GET, Method::POST]),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            // Add 1MB buffer for multipart overhead
            state.config.max_file_size.saturating_add(1024 * 1024),
        ))
        .with_state(state)
}
