//! Router assembly

use crate::constants::UPLOAD_PATH;
use crate::handlers::{index, upload};
use crate::setup::health;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::Request,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::util::MapRequestLayer;
use tower::ServiceBuilder;
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutBody};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// `read_timeout` bounds how long a request body may go without delivering
/// data; a stalled body then fails like a dropped connection.
pub fn build_router(state: Arc<AppState>, read_timeout: Duration) -> Router {
    Router::new()
        // Method is checked in the handler so non-POST requests get a text body.
        .route(UPLOAD_PATH, any(upload::upload))
        .route("/healthz", get(health::healthz))
        .route("/", get(index::index))
        .route("/index.html", get(index::index))
        .route("/app.js", get(index::app_js))
        .route("/style.css", get(index::style_css))
        .fallback(index::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyTimeoutLayer::new(read_timeout))
                .layer(MapRequestLayer::new(|req: Request<TimeoutBody<Body>>| {
                    req.map(Body::new)
                })),
        )
        .with_state(state)
}
