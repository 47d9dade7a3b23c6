use http::{header::CONTENT_TYPE, Method};
use tower_http::cors::{Any, CorsLayer};

use super::auth::{AUTH_TOKEN, AUTH_USER};

pub fn api_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTH_USER, AUTH_TOKEN])
}
