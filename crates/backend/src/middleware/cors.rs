use axum::{
    body::Body,
    extract::Request,
    http::{Method, StatusCode, header::{CONTENT_LENGTH, CONTENT_TYPE}},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{Any, CorsLayer};

/// Any origin, GET/POST/OPTIONS, Content-Type.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Answers every OPTIONS request with an empty 204, preflight or not and
/// whether or not a route exists for the path.
/// Runs outside `cors_layer` so the CORS headers are kept.
pub async fn options_no_content(req: Request, next: Next) -> Response {
    let is_options = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;

    if is_options {
        *response.status_mut() = StatusCode::NO_CONTENT;
        *response.body_mut() = Body::empty();
        response.headers_mut().remove(CONTENT_TYPE);
        response.headers_mut().remove(CONTENT_LENGTH);
    }

    response
}
