//! Embedded upload page and its assets

use crate::constants::SITE_KEY_PLACEHOLDER;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};
use dropgate_core::AppError;
use std::sync::Arc;

const INDEX_TEMPLATE: &str = include_str!("../../public/index.html");
const APP_JS: &str = include_str!("../../public/app.js");
const STYLE_CSS: &str = include_str!("../../public/style.css");

/// Fill the index template with the Turnstile site key.
///
/// The key is validated at startup to contain only `[A-Za-z0-9_-]`, so it is
/// inserted without escaping.
pub fn render_index(site_key: &str) -> String {
    INDEX_TEMPLATE.replace(SITE_KEY_PLACEHOLDER, site_key)
}

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.index_page.clone())
}

pub async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        APP_JS,
    )
}

pub async fn style_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

pub async fn not_found() -> HttpAppError {
    AppError::NotFound("Not found".to_string()).into()
}
