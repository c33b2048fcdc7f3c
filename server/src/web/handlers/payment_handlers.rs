// tee_orders_server/src/web/handlers/payment_handlers.rs

use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tee_orders::{MemberRef, ProofUpload};
use tracing::{debug, info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

/// A selection of members, as sent by quote and bulk-confirm requests.
#[derive(Deserialize, Debug)]
pub struct SelectionPayload {
  #[serde(default)]
  pub updates: Vec<MemberRef>,
}

/// The three parts of a bulk payment form.
#[derive(Debug, Default)]
struct BulkPaymentForm {
  paid_by: String,
  updates: Vec<MemberRef>,
  proof: Option<ProofUpload>,
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, AppError> {
  let mut bytes = Vec::new();
  while let Some(chunk) = field.next().await {
    let chunk = chunk.map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?;
    if bytes.len() + chunk.len() > limit {
      return Err(AppError::Validation(format!(
        "Field exceeds the {} byte limit.",
        limit
      )));
    }
    bytes.extend_from_slice(&chunk);
  }
  Ok(bytes)
}

async fn read_bulk_form(mut payload: Multipart, proof_limit: usize) -> Result<BulkPaymentForm, AppError> {
  const TEXT_LIMIT: usize = 256 * 1024;
  let mut form = BulkPaymentForm::default();

  while let Some(field) = payload.next().await {
    let mut field = field.map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?;
    let name = field.name().unwrap_or_default().to_string();
    match name.as_str() {
      "paidBy" => {
        let raw = read_field(&mut field, TEXT_LIMIT).await?;
        form.paid_by = String::from_utf8(raw)
          .map_err(|_| AppError::Validation("paidBy must be UTF-8 text.".to_string()))?;
      }
      "updates" => {
        let raw = read_field(&mut field, TEXT_LIMIT).await?;
        form.updates = serde_json::from_slice(&raw)
          .map_err(|e| AppError::Validation(format!("updates must be a JSON array of member references: {}", e)))?;
      }
      "proofImage" => {
        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());
        let file_name = field
          .content_disposition()
          .and_then(|cd| cd.get_filename())
          .map(str::to_string);
        let mut proof = ProofUpload::new(read_field(&mut field, proof_limit).await?);
        proof.content_type = content_type;
        proof.file_name = file_name;
        form.proof = Some(proof);
      }
      other => {
        debug!(field = other, "Ignoring unknown multipart field.");
        read_field(&mut field, TEXT_LIMIT).await?;
      }
    }
  }
  Ok(form)
}

#[instrument(name = "handler::quote_payment", skip(app_state, req_payload), fields(selections = req_payload.updates.len()))]
pub async fn quote_payment_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SelectionPayload>,
) -> Result<HttpResponse, AppError> {
  let quote = app_state.submissions.quote(req_payload.into_inner().updates).await?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Quote computed successfully.",
      "quote": quote
  })))
}

#[instrument(name = "handler::bulk_payment", skip(app_state, payload))]
pub async fn bulk_payment_handler(
  app_state: web::Data<AppState>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let form = read_bulk_form(payload, app_state.config.proof_max_bytes).await?;
  let proof = form.proof.unwrap_or_else(|| ProofUpload::new(Vec::new()));
  info!(
    paid_by = %form.paid_by,
    selections = form.updates.len(),
    proof_bytes = proof.bytes.len(),
    "Bulk payment submission received."
  );

  let receipt = app_state
    .submissions
    .submit_payment(&form.paid_by, proof, form.updates)
    .await?;
  if !receipt.skipped.is_empty() {
    warn!(skipped = receipt.skipped.len(), "Some selected members were not stamped.");
  }

  Ok(HttpResponse::Ok().json(json!({
      "message": "Payment submitted successfully.",
      "receipt": receipt
  })))
}
