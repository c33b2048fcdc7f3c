// tee_orders_server/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use tee_orders::OrderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Proof Upload Error: {0}")]
  Upload(String),

  #[error("Service Unavailable: {0}")]
  Unavailable(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("I/O Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String), // For miscellaneous errors
}

impl From<OrderError> for AppError {
  fn from(err: OrderError) -> Self {
    match err {
      OrderError::Validation(m) => AppError::Validation(m),
      OrderError::NotFound(m) => AppError::NotFound(m),
      OrderError::Upload(m) => AppError::Upload(m),
      OrderError::Unavailable(m) => AppError::Unavailable(m),
      OrderError::Internal(m) => AppError::Internal(m),
    }
  }
}

// Lets handlers use `?` on anyhow-returning helpers.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    let err = match err.downcast::<OrderError>() {
      Ok(order_err) => return order_err.into(),
      Err(other) => other,
    };
    match err.downcast::<sqlx::Error>() {
      Ok(db_err) => AppError::Sqlx(db_err),
      Err(other) => AppError::Internal(format!("{:#}", other)),
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    match self {
      AppError::Validation(m) => {
        tracing::warn!(application_error = %self, "Rejecting request");
        HttpResponse::BadRequest().json(json!({"error": m}))
      }
      AppError::Auth(m) => {
        tracing::warn!(application_error = %self, "Rejecting request");
        HttpResponse::Unauthorized().json(json!({"error": m}))
      }
      AppError::NotFound(m) => {
        tracing::warn!(application_error = %self, "Rejecting request");
        HttpResponse::NotFound().json(json!({"error": m}))
      }
      AppError::Upload(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::BadGateway().json(json!({"error": "Proof upload failed", "detail": m}))
      }
      AppError::Unavailable(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::ServiceUnavailable().json(json!({"error": "Order store unavailable", "detail": m}))
      }
      AppError::Sqlx(_) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::ServiceUnavailable().json(json!({"error": "Database operation failed"}))
      }
      AppError::Config(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Io(_) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "File operation failed"}))
      }
      AppError::Internal(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
