// tee_orders/src/proof/memory.rs

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use super::{ProofStore, ProofUpload};
use crate::error::{OrderError, OrderResult};

/// Keeps uploaded proofs in memory under `memory://proofs/<n>.<ext>` URLs.
#[derive(Debug, Default)]
pub struct MemoryProofStore {
  blobs: RwLock<Vec<(String, ProofUpload)>>,
  failing: AtomicBool,
}

impl MemoryProofStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn upload_count(&self) -> usize {
    self.blobs.read().len()
  }

  pub fn get(&self, url: &str) -> Option<ProofUpload> {
    self.blobs.read().iter().find(|(u, _)| u == url).map(|(_, blob)| blob.clone())
  }

  /// Makes every subsequent `put` fail, to exercise upload error paths.
  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }
}

#[async_trait]
impl ProofStore for MemoryProofStore {
  async fn put(&self, upload: &ProofUpload) -> OrderResult<String> {
    if self.failing.load(Ordering::SeqCst) {
      return Err(OrderError::Upload("memory proof store rejected the image".to_string()));
    }
    let mut blobs = self.blobs.write();
    let url = format!("memory://proofs/{}.{}", blobs.len() + 1, upload.extension());
    blobs.push((url.clone(), upload.clone()));
    info!(%url, bytes = upload.bytes.len(), "Proof stored in memory.");
    Ok(url)
  }
}
