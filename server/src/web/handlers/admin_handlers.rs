// tee_orders_server/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tee_orders::{MemberRef, PaymentStatus};
use tracing::{info, instrument, warn};

use super::payment_handlers::SelectionPayload;
use crate::errors::AppError;
use crate::services::auth_service;
use crate::services::AdminSession;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AdminLoginPayload {
  pub passcode: String,
}

#[instrument(name = "handler::admin_login", skip_all)]
pub async fn admin_login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AdminLoginPayload>,
) -> Result<HttpResponse, AppError> {
  if auth_service::verify_passcode(&app_state.admin_passcode_hash, &req_payload.passcode)? {
    info!("Admin passcode accepted.");
    Ok(HttpResponse::Ok().json(json!({ "message": "Admin passcode accepted." })))
  } else {
    warn!("Admin login rejected.");
    Err(AppError::Auth("Invalid admin passcode.".to_string()))
  }
}

#[instrument(name = "handler::pending_payments", skip(app_state, _admin))]
pub async fn pending_payments_handler(
  app_state: web::Data<AppState>,
  _admin: AdminSession,
) -> Result<HttpResponse, AppError> {
  let pending = app_state.orders.list_members(Some(PaymentStatus::Pending)).await?;
  let groups = app_state.grouper.group(&pending);
  info!(members = pending.len(), groups = groups.len(), "Pending payments grouped.");

  Ok(HttpResponse::Ok().json(json!({
      "message": "Pending payments fetched successfully.",
      "windowMinutes": app_state.grouper.window().num_minutes(),
      "groups": groups
  })))
}

#[instrument(name = "handler::confirm_payment", skip(app_state, _admin, req_payload), fields(target = %req_payload.0))]
pub async fn confirm_payment_handler(
  app_state: web::Data<AppState>,
  _admin: AdminSession,
  req_payload: web::Json<MemberRef>,
) -> Result<HttpResponse, AppError> {
  let report = app_state.confirmations.confirm_member(req_payload.into_inner()).await?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Payment confirmed successfully.",
      "report": report
  })))
}

#[instrument(name = "handler::confirm_payments_bulk", skip(app_state, _admin, req_payload), fields(selections = req_payload.updates.len()))]
pub async fn confirm_payments_bulk_handler(
  app_state: web::Data<AppState>,
  _admin: AdminSession,
  req_payload: web::Json<SelectionPayload>,
) -> Result<HttpResponse, AppError> {
  let report = app_state.confirmations.confirm_batch(req_payload.into_inner().updates).await?;
  if !report.skipped.is_empty() {
    warn!(skipped = report.skipped.len(), "Some selected members could not be confirmed.");
  }

  Ok(HttpResponse::Ok().json(json!({
      "message": "Payments confirmed successfully.",
      "report": report
  })))
}
