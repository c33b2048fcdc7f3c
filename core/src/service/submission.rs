// tee_orders/src/service/submission.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{dedupe, resolve_in, SkippedMember};
use crate::error::{OrderError, OrderResult};
use crate::model::{MemberRef, MemberView, PaymentStatus, Price, PriceTable};
use crate::proof::{ProofStore, ProofUpload};
use crate::store::{MemberUpdate, OrderStore};

pub const DEFAULT_MAX_PROOF_BYTES: usize = 10 * 1024 * 1024;

/// Result of one payment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
  pub proof_url: String,
  /// The single instant stamped on every member of the batch.
  pub paid_at: DateTime<Utc>,
  pub stamped: Vec<MemberRef>,
  pub skipped: Vec<SkippedMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedMember {
  #[serde(flatten)]
  pub member: MemberView,
  pub price: Price,
}

/// What a selection of members costs, priced from the same table the admin totals use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuote {
  pub members: Vec<QuotedMember>,
  pub total: Price,
}

/// Uploads one transfer proof and stamps a batch of members as pending.
#[derive(Clone)]
pub struct PaymentSubmissionService {
  store: Arc<dyn OrderStore>,
  proofs: Arc<dyn ProofStore>,
  prices: Arc<PriceTable>,
  max_proof_bytes: usize,
}

impl PaymentSubmissionService {
  pub fn new(store: Arc<dyn OrderStore>, proofs: Arc<dyn ProofStore>, prices: Arc<PriceTable>) -> Self {
    Self {
      store,
      proofs,
      prices,
      max_proof_bytes: DEFAULT_MAX_PROOF_BYTES,
    }
  }

  pub fn with_max_proof_bytes(mut self, max_proof_bytes: usize) -> Self {
    self.max_proof_bytes = max_proof_bytes;
    self
  }

  /// Prices a selection of unpaid members before the customer transfers money.
  #[instrument(name = "submission_service::quote", skip_all, fields(selections = selections.len()), err(Display))]
  pub async fn quote(&self, selections: Vec<MemberRef>) -> OrderResult<PaymentQuote> {
    let selections = dedupe(selections);
    if selections.is_empty() {
      return Err(OrderError::validation("Select at least one member to pay for."));
    }

    let orders = self.store.list_orders().await?;
    let mut quoted = Vec::with_capacity(selections.len());
    let mut total: Price = 0;
    for view in resolve_in(&orders, &selections)? {
      if view.member.payment_status != PaymentStatus::Unpaid {
        return Err(OrderError::validation(format!(
          "'{}' is already {}.",
          view.member.name, view.member.payment_status
        )));
      }
      let price = self.prices.require(&view.member.size)?;
      total += price;
      quoted.push(QuotedMember { member: view, price });
    }

    Ok(PaymentQuote { members: quoted, total })
  }

  fn validate(&self, payer_name: &str, proof: &ProofUpload, selections: &[MemberRef]) -> OrderResult<()> {
    if payer_name.trim().is_empty() {
      return Err(OrderError::validation("Payer name is required."));
    }
    if proof.is_empty() {
      return Err(OrderError::validation("A transfer proof image is required."));
    }
    if proof.bytes.len() > self.max_proof_bytes {
      return Err(OrderError::validation(format!(
        "Proof image is {} bytes; the limit is {} bytes.",
        proof.bytes.len(),
        self.max_proof_bytes
      )));
    }
    if let Some(content_type) = proof.content_type.as_deref() {
      if !content_type.to_ascii_lowercase().starts_with("image/") {
        return Err(OrderError::validation(format!(
          "Proof must be an image, got '{}'.",
          content_type
        )));
      }
    }
    if selections.is_empty() {
      return Err(OrderError::validation("Select at least one member to pay for."));
    }
    Ok(())
  }

  /// Uploads `proof` once and marks every selected unpaid member `PENDING`
  /// with the same payer, instant and proof URL.
  ///
  /// Each member is written independently. Missing members and members that
  /// are no longer unpaid are skipped; a store failure stops the batch and
  /// leaves the members already stamped as they are.
  #[instrument(
    name = "submission_service::submit_payment",
    skip_all,
    fields(payer = %payer_name, selections = selections.len(), proof_bytes = proof.bytes.len()),
    err(Display)
  )]
  pub async fn submit_payment(
    &self,
    payer_name: &str,
    proof: ProofUpload,
    selections: Vec<MemberRef>,
  ) -> OrderResult<SubmissionReceipt> {
    let selections = dedupe(selections);
    self.validate(payer_name, &proof, &selections)?;
    let payer_name = payer_name.trim();

    let proof_url = self.proofs.put(&proof).await.map_err(|e| match e {
      OrderError::Upload(_) => e,
      other => OrderError::Upload(other.to_string()),
    })?;
    info!(%proof_url, "Transfer proof uploaded.");

    let paid_at = Utc::now();
    let update = MemberUpdate::submission(payer_name, paid_at, proof_url.clone());
    let mut stamped = Vec::with_capacity(selections.len());
    let mut skipped = Vec::new();

    for target in selections {
      let outcome = match self.store.update_member(target, &update).await {
        Ok(outcome) => outcome,
        Err(e) => {
          error!(member = %target, stamped = stamped.len(), error = %e, "Payment submission interrupted; earlier members stay pending.");
          return Err(e);
        }
      };
      match SkippedMember::from_outcome(target, outcome) {
        None => stamped.push(target),
        Some(skip) => {
          warn!(member = %target, reason = ?skip.reason, "Member not stamped by payment submission.");
          skipped.push(skip);
        }
      }
    }

    info!(stamped = stamped.len(), skipped = skipped.len(), "Payment submission recorded.");
    Ok(SubmissionReceipt {
      proof_url,
      paid_at,
      stamped,
      skipped,
    })
  }
}
