//! Collaborator test doubles.

use async_trait::async_trait;
use dropgate_api::captcha::{CaptchaError, CaptchaVerifier};
use dropgate_storage::{ByteStream, Storage, StorageError, StorageResult};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;

/// Keeps every saved file in memory. Keys ending in `/fail.txt` are
/// read fully and then rejected.
#[derive(Default)]
pub struct RecordingStorage {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl RecordingStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        self.files.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn save(&self, key: &str, mut reader: ByteStream) -> StorageResult<()> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        if key.ends_with("/fail.txt") {
            return Err(StorageError::UploadFailed(format!(
                "backend refused {}",
                key
            )));
        }
        self.files.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }
}

/// Fails the test if the handler ever reaches storage.
pub struct PanickingStorage;

#[async_trait]
impl Storage for PanickingStorage {
    async fn save(&self, key: &str, _reader: ByteStream) -> StorageResult<()> {
        panic!("storage must not be called, got save({key})");
    }
}

/// Accepts exactly one token value and counts calls.
pub struct StaticVerifier {
    accepted: String,
    calls: AtomicUsize,
}

impl StaticVerifier {
    pub fn accepting(token: &str) -> Arc<Self> {
        Arc::new(Self {
            accepted: token.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptchaVerifier for StaticVerifier {
    async fn verify(&self, token: &str, _client_address: Option<&str>) -> Result<(), CaptchaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if token.is_empty() {
            return Err(CaptchaError::MissingToken);
        }
        if token == self.accepted {
            Ok(())
        } else {
            Err(CaptchaError::Rejected("invalid-input-response".to_string()))
        }
    }
}

/// Fails the test if the handler ever verifies a token.
pub struct PanickingVerifier;

#[async_trait]
impl CaptchaVerifier for PanickingVerifier {
    async fn verify(&self, _token: &str, _client_address: Option<&str>) -> Result<(), CaptchaError> {
        panic!("CAPTCHA verifier must not be called");
    }
}

/// Never answers, like a verification service that hangs.
pub struct HangingVerifier;

#[async_trait]
impl CaptchaVerifier for HangingVerifier {
    async fn verify(&self, _token: &str, _client_address: Option<&str>) -> Result<(), CaptchaError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}
