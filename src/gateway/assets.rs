use axum::body::Body;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

/// The browser UI bundle built by `trunk build --release` in `ui/`.
#[derive(RustEmbed)]
#[folder = "ui/dist/"]
struct UiAssets;

const INDEX: &str = "index.html";

/// Serve a bundled asset, falling back to `index.html` for client-side routes.
pub async fn serve(method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { INDEX } else { path };

    match UiAssets::get(path) {
        Some(file) => asset_response(path, file.data.into_owned()),
        // Unknown paths with an extension are missing files, not routes.
        None if path.rsplit('/').next().is_some_and(|name| name.contains('.')) => {
            StatusCode::NOT_FOUND.into_response()
        }
        None => match UiAssets::get(INDEX) {
            Some(index) => asset_response(INDEX, index.data.into_owned()),
            None => (StatusCode::NOT_FOUND, "UI bundle not built").into_response(),
        },
    }
}

fn asset_response(path: &str, data: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let cache = if path == INDEX {
        "no-cache"
    } else {
        "public, max-age=3600"
    };
    (
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, cache.to_string()),
        ],
        Body::from(data),
    )
        .into_response()
}
