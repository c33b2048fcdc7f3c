// tee_orders_server/src/services/proof_storage.rs

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tee_orders::{OrderError, OrderResult, ProofStore, ProofUpload};
use tokio::fs;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Writes proof images under a local directory and serves them back at `{base_url}/proofs/{file}`.
#[derive(Debug, Clone)]
pub struct LocalProofStore {
  dir: PathBuf,
  base_url: String,
}

impl LocalProofStore {
  pub async fn open_dir(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> std::io::Result<Self> {
    let dir = dir.into();
    fs::create_dir_all(&dir).await?;
    info!(dir = %dir.display(), "Proof directory ready.");
    Ok(Self {
      dir,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Reads a stored proof back. `None` for unknown or malformed names.
  pub async fn read(&self, file_name: &str) -> std::io::Result<Option<(Vec<u8>, &'static str)>> {
    if !is_stored_name(file_name) {
      return Ok(None);
    }
    match fs::read(self.dir.join(file_name)).await {
      Ok(bytes) => Ok(Some((bytes, content_type_for(file_name)))),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }
}

/// Names this store generates: `<uuid-simple>.<ext>`, nothing that can walk out of the directory.
fn is_stored_name(name: &str) -> bool {
  match name.split_once('.') {
    Some((stem, ext)) => {
      Uuid::try_parse(stem).is_ok()
        && !ext.is_empty()
        && ext.len() <= 5
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
    }
    None => false,
  }
}

fn content_type_for(name: &str) -> &'static str {
  match name.rsplit_once('.').map(|(_, ext)| ext) {
    Some("jpg") => "image/jpeg",
    Some("png") => "image/png",
    Some("webp") => "image/webp",
    Some("gif") => "image/gif",
    Some("heic") => "image/heic",
    _ => "application/octet-stream",
  }
}

#[async_trait]
impl ProofStore for LocalProofStore {
  #[instrument(name = "proof_storage::put", skip_all, fields(bytes = upload.bytes.len()), err(Display))]
  async fn put(&self, upload: &ProofUpload) -> OrderResult<String> {
    let file_name = format!("{}.{}", Uuid::new_v4().simple(), upload.extension());
    let path = self.dir.join(&file_name);
    fs::write(&path, &upload.bytes).await.map_err(|e| {
      error!(path = %path.display(), error = %e, "Failed to write proof image.");
      OrderError::Upload(format!("Could not store proof image: {}", e))
    })?;
    let url = format!("{}/proofs/{}", self.base_url, file_name);
    info!(%url, "Stored proof image.");
    Ok(url)
  }
}
