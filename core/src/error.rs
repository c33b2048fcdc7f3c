// tee_orders/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
  /// Malformed or missing caller input. User-correctable.
  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Not found: {0}")]
  NotFound(String),

  /// The proof blob store rejected or failed the image write.
  #[error("Proof upload failed: {0}")]
  Upload(String),

  /// The order store could not be reached.
  #[error("Order store unavailable: {0}")]
  Unavailable(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl OrderError {
  pub fn validation(message: impl Into<String>) -> Self {
    OrderError::Validation(message.into())
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    OrderError::NotFound(message.into())
  }

  /// True for failures caused by the caller's input rather than by a collaborator.
  pub fn is_client_error(&self) -> bool {
    matches!(self, OrderError::Validation(_) | OrderError::NotFound(_))
  }
}

// Collaborators (stores, blob backends) report opaque failures through anyhow.
impl From<AnyhowError> for OrderError {
  fn from(err: AnyhowError) -> Self {
    match err.downcast::<OrderError>() {
      Ok(order_err) => order_err,
      Err(other) => OrderError::Internal(format!("{:#}", other)),
    }
  }
}

pub type OrderResult<T, E = OrderError> = std::result::Result<T, E>;
