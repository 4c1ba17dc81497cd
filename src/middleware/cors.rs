use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// CORS for the browser client. With no configured origin every origin is
/// allowed.
pub fn cors_layer(client_origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match client_origin.and_then(|origin| HeaderValue::from_str(origin).ok()) {
        Some(origin) => base.allow_origin(origin),
        None => {
            if let Some(origin) = client_origin {
                tracing::warn!(%origin, "ignoring unparseable CLIENT_ORIGIN, allowing any origin");
            }
            base.allow_origin(Any)
        }
    }
}
