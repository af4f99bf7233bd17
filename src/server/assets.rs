//! Static files for the companion web page
//!
//! Only `/`, `/static/style.css` and `/static/main.js` are served; every other
//! path falls through to the router's JSON 404.

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeFile;
use crate::server::AppState;
use crate::server::error::ApiError;

/// URL path and file name (relative to the static dir) of each served asset
pub const STATIC_FILES: &[(&str, &str)] = &[
    ("/", "index.html"),
    ("/static/style.css", "style.css"),
    ("/static/main.js", "main.js"),
];

/// ServeFile answers a missing file with an empty 404; give it the JSON body.
async fn json_not_found(response: Response) -> Response {
    if response.status() == StatusCode::NOT_FOUND {
        ApiError::not_found("not found").into_response()
    } else {
        response
    }
}

/// Routes for the fixed asset set, rooted at `static_dir`
pub fn routes(static_dir: &Path) -> Router<Arc<AppState>> {
    let mut router = Router::new();
    for (url, file) in STATIC_FILES {
        router = router.route_service(url, ServeFile::new(static_dir.join(file)));
    }
    router.layer(middleware::map_response(json_not_found))
}
