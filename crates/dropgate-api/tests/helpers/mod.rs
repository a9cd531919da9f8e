//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p dropgate-api`.

#![allow(dead_code)]

pub mod doubles;
pub mod multipart;

use axum::Router;
use axum_test::TestServer;
use dropgate_api::captcha::CaptchaVerifier;
use dropgate_api::services::upload::UploadService;
use dropgate_api::setup::routes;
use dropgate_api::state::{AppState, UploadSettings};
use dropgate_storage::Storage;
use std::sync::Arc;
use std::time::Duration;

pub const SITE_KEY: &str = "test-site-key_123";

/// Collaborators and limits for one test application.
pub struct TestAppBuilder {
    storage: Arc<dyn Storage>,
    captcha: Arc<dyn CaptchaVerifier>,
    upload_timeout: Duration,
    read_timeout: Duration,
}

impl TestAppBuilder {
    pub fn new(storage: Arc<dyn Storage>, captcha: Arc<dyn CaptchaVerifier>) -> Self {
        Self {
            storage,
            captcha,
            upload_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
        }
    }

    pub fn upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn router(self) -> Router {
        let state = Arc::new(AppState {
            upload: UploadService::new(self.storage),
            captcha: self.captcha,
            settings: UploadSettings {
                timeout: self.upload_timeout,
                trusted_proxy_count: 0,
            },
            index_page: dropgate_api::handlers::index::render_index(SITE_KEY),
        });
        routes::build_router(state, self.read_timeout)
    }

    pub fn server(self) -> TestServer {
        TestServer::new(self.router()).unwrap()
    }
}

/// Read a response body produced by `tower::ServiceExt::oneshot`.
pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
