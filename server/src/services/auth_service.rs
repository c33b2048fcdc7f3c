// tee_orders_server/src/services/auth_service.rs

//! Admin passcode hashing and the extractor that guards admin routes.

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use futures_util::future::{ready, Ready};
use rand_core::OsRng;
use tracing::{debug, error, instrument, warn};

/// Header carrying the admin passcode on every admin request.
pub const ADMIN_PASSCODE_HEADER: &str = "X-Admin-Passcode";

/// Hashes a plain-text passcode using Argon2 with a fresh random salt.
#[instrument(name = "auth_service::hash_passcode", skip(passcode), err(Display))]
pub fn hash_passcode(passcode: &str) -> Result<String, AppError> {
  if passcode.is_empty() {
    return Err(AppError::Config("Admin passcode cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(passcode.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 passcode hashing failed.");
      AppError::Internal(format!("Passcode hashing process failed: {}", argon_err))
    })
}

/// Checks that a configured hash parses as a PHC string.
pub fn check_passcode_hash(hash: &str) -> Result<(), AppError> {
  PasswordHash::new(hash)
    .map(|_| ())
    .map_err(|e| AppError::Config(e.to_string()))
}

/// Verifies a provided passcode against the stored Argon2 hash.
///
/// Returns `Ok(false)` on a mismatch; errors only when the stored hash is unusable.
#[instrument(name = "auth_service::verify_passcode", skip_all, err(Display))]
pub fn verify_passcode(stored_hash: &str, provided: &str) -> Result<bool, AppError> {
  if provided.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored passcode hash.");
    AppError::Internal(format!("Invalid stored passcode hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Admin passcode mismatch.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 passcode verification encountered an error.");
      Err(AppError::Internal(format!("Passcode verification process failed: {}", other)))
    }
  }
}

/// Proof that the request carried the admin passcode. Add it as a handler argument to guard a route.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

impl FromRequest for AdminSession {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authorize(req))
  }
}

fn authorize(req: &HttpRequest) -> Result<AdminSession, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;

  let provided = req
    .headers()
    .get(ADMIN_PASSCODE_HEADER)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default();

  if verify_passcode(&state.admin_passcode_hash, provided)? {
    Ok(AdminSession)
  } else {
    warn!(path = %req.path(), "Admin request rejected.");
    Err(AppError::Auth("Invalid admin passcode.".to_string()))
  }
}
