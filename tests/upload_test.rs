use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use image::{ImageBuffer, ImageOutputFormat, Rgb};
use serde_json::Value;
use smile_stage::config::AppConfig;
use smile_stage::services::detector::{ImageProbeDetector, NOOP_MESSAGE, NoOpDetector, SmileDetector};
use smile_stage::services::file_service::FileService;
use smile_stage::services::renderer::HtmlRenderer;
use smile_stage::services::storage::LocalStorageService;
use smile_stage::{AppState, create_app};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

fn setup_app(upload_dir: &Path, config: AppConfig, detector: Arc<dyn SmileDetector>) -> Router {
    let config = AppConfig {
        upload_dir: upload_dir.to_path_buf(),
        ..config
    };
    let storage = Arc::new(LocalStorageService::new(upload_dir));
    let file_service = Arc::new(FileService::new(storage.clone(), config.clone()));

    create_app(AppState {
        storage,
        file_service,
        detector,
        renderer: Arc::new(HtmlRenderer::new()),
        config,
    })
}

fn png_bytes() -> Vec<u8> {
    let img = ImageBuffer::from_pixel(16, 12, Rgb([255u8, 220, 0]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageOutputFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
        Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn process_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, filename, content)))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Pulls the staged name out of the rendered result page
fn staged_name(html: &str) -> String {
    let start = html.find("data-file-name=\"").expect("file name in page") + 16;
    let end = html[start..].find('"').unwrap();
    html[start..start + end].to_string()
}

fn is_generated_name(name: &str, ext: &str) -> bool {
    match name.split_once('.') {
        Some((stem, e)) => {
            stem.len() == 10 && stem.chars().all(|c| c.is_ascii_alphanumeric()) && e == ext
        }
        None => false,
    }
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_form_page() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), AppConfig::development(), Arc::new(NoOpDetector));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = body_string(response).await;
    assert!(html.contains("FACE"));
    assert!(html.contains("multipart/form-data"));
}

#[tokio::test]
async fn test_process_png_with_image_detector() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), AppConfig::production(), Arc::new(ImageProbeDetector));

    let png = png_bytes();
    let response = app
        .oneshot(process_request("file", "smile.png", &png))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    let name = staged_name(&html);
    assert!(is_generated_name(&name, "png"), "{name}");
    assert!(html.contains("16x12"), "{html}");

    let stored = std::fs::read(dir.path().join(&name)).unwrap();
    assert_eq!(stored, png);
}

#[tokio::test]
async fn test_process_png_named_jpg_under_trust_extension() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), AppConfig::default(), Arc::new(ImageProbeDetector));

    let png = png_bytes();
    let response = app
        .oneshot(process_request("file", "face.jpg", &png))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(is_generated_name(&staged_name(&html), "jpg"));
    assert!(html.contains("16x12"), "{html}");
}

#[tokio::test]
async fn test_process_mixed_case_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), AppConfig::development(), Arc::new(NoOpDetector));

    for (filename, ext) in [("SMILE.PNG", "png"), ("face.Jpg", "jpg"), ("face.jpg", "jpg")] {
        let response = app
            .clone()
            .oneshot(process_request("file", filename, b"image bytes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{filename}");

        let html = body_string(response).await;
        assert!(is_generated_name(&staged_name(&html), ext), "{filename}");
        assert!(html.contains(NOOP_MESSAGE));
    }
    assert_eq!(file_count(dir.path()), 3);
}

#[tokio::test]
async fn test_process_rejects_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), AppConfig::development(), Arc::new(NoOpDetector));

    for filename in ["doc.pdf", "anim.gif", "notes.txt", "noextension"] {
        let response = app
            .clone()
            .oneshot(process_request("file", filename, b"content"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{filename}");

        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .contains("Unsupported file format")
        );
    }
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn test_process_requires_file_field() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), AppConfig::development(), Arc::new(NoOpDetector));

    let response = app
        .oneshot(process_request("avatar", "smile.png", b"content"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn test_process_corrupt_image_is_processing_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), AppConfig::development(), Arc::new(ImageProbeDetector));

    let response = app
        .oneshot(process_request("file", "broken.png", b"not really a png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("Could not process image")
    );
}

#[tokio::test]
async fn test_process_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        max_file_size: 1024,
        ..AppConfig::development()
    };
    let app = setup_app(dir.path(), config, Arc::new(NoOpDetector));

    let response = app
        .oneshot(process_request("file", "big.png", &vec![7u8; 4096]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn test_process_with_unbounded_size_limit() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        max_file_size: usize::MAX,
        ..AppConfig::development()
    };
    let app = setup_app(dir.path(), config, Arc::new(NoOpDetector));

    let response = app
        .oneshot(process_request("file", "smile.png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(file_count(dir.path()), 1);
}

#[tokio::test]
async fn test_health_check() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), AppConfig::development(), Arc::new(NoOpDetector));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["storage"], "ready");
    assert_eq!(json["detector"], "noop");
}

#[tokio::test]
async fn test_openapi_document() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), AppConfig::development(), Arc::new(NoOpDetector));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(json["paths"]["/process"].is_object());
    assert!(json["paths"]["/file/{name}"].is_object());
}
