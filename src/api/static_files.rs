use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use mime_guess::from_path;
use std::path::{Component, Path, PathBuf};

/// Serve the built frontend from `static_dir`
///
/// Paths without an extension fall back to `index.html` so client-side
/// routes resolve.
pub async fn serve_static(uri: Uri, static_dir: PathBuf) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    if !is_safe_relative(path) {
        return not_found();
    }

    let file_path = static_dir.join(path);
    if let Ok(content) = tokio::fs::read(&file_path).await {
        return file_response(&file_path, content);
    }

    if !path.contains('.') {
        let index = static_dir.join("index.html");
        if let Ok(content) = tokio::fs::read(&index).await {
            return file_response(&index, content);
        }
    }

    not_found()
}

fn file_response(path: &Path, content: Vec<u8>) -> Response {
    let mime = from_path(path).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.to_string())], Body::from(content)).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}

fn is_safe_relative(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}
