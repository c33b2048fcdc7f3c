// tee_orders/src/proof/mod.rs

//! The proof blob store seam: takes a transfer-receipt photo, hands back a durable URL.

pub mod memory;

use async_trait::async_trait;

use crate::error::OrderResult;

pub use memory::MemoryProofStore;

/// An uploaded transfer-receipt photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofUpload {
  pub bytes: Vec<u8>,
  pub content_type: Option<String>,
  pub file_name: Option<String>,
}

impl ProofUpload {
  pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
    Self {
      bytes: bytes.into(),
      content_type: None,
      file_name: None,
    }
  }

  pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
    self.content_type = Some(content_type.into());
    self
  }

  pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
    self.file_name = Some(file_name.into());
    self
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  /// File extension for the stored blob, from the content type first and the
  /// original file name second.
  pub fn extension(&self) -> &str {
    let from_type = match self.content_type.as_deref().map(str::to_ascii_lowercase).as_deref() {
      Some("image/jpeg") | Some("image/jpg") => Some("jpg"),
      Some("image/png") => Some("png"),
      Some("image/webp") => Some("webp"),
      Some("image/gif") => Some("gif"),
      Some("image/heic") => Some("heic"),
      _ => None,
    };
    if let Some(ext) = from_type {
      return ext;
    }
    self
      .file_name
      .as_deref()
      .and_then(|name| name.rsplit_once('.'))
      .map(|(_, ext)| ext)
      .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
      .unwrap_or("bin")
  }
}

#[async_trait]
pub trait ProofStore: Send + Sync {
  /// Stores the image and returns the URL it can be fetched from.
  /// Failures are reported as `OrderError::Upload`.
  async fn put(&self, upload: &ProofUpload) -> OrderResult<String>;
}
