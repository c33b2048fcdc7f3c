// tee_orders/src/service/confirmation.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{dedupe, SkippedMember};
use crate::error::{OrderError, OrderResult};
use crate::model::MemberRef;
use crate::store::{MemberUpdate, OrderStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationReport {
  /// Selections processed, whether or not their state changed.
  pub processed: usize,
  pub confirmed_at: DateTime<Utc>,
  pub skipped: Vec<SkippedMember>,
}

/// Admin-side transition of members to `PAID`.
#[derive(Clone)]
pub struct PaymentConfirmationService {
  store: Arc<dyn OrderStore>,
}

impl PaymentConfirmationService {
  pub fn new(store: Arc<dyn OrderStore>) -> Self {
    Self { store }
  }

  /// Sets every selected member to `PAID` with one shared confirmation instant.
  ///
  /// Confirmation does not look at the current status, so confirming a paid
  /// member again is harmless. Members that no longer exist are skipped. A
  /// store failure stops the batch; members confirmed before it stay paid.
  #[instrument(name = "confirmation_service::confirm_batch", skip_all, fields(selections = selections.len()), err(Display))]
  pub async fn confirm_batch(&self, selections: Vec<MemberRef>) -> OrderResult<ConfirmationReport> {
    if selections.is_empty() {
      return Err(OrderError::validation("Nothing selected to confirm."));
    }
    let processed = selections.len();
    let confirmed_at = Utc::now();
    let update = MemberUpdate::confirmation(confirmed_at);
    let mut skipped = Vec::new();

    for (done, target) in dedupe(selections).into_iter().enumerate() {
      let outcome = self.store.update_member(target, &update).await.map_err(|e| {
        error!(member = %target, confirmed = done, error = %e, "Confirmation batch interrupted.");
        e
      })?;
      if let Some(skip) = SkippedMember::from_outcome(target, outcome) {
        warn!(member = %target, reason = ?skip.reason, "Member could not be confirmed.");
        skipped.push(skip);
      }
    }

    info!(processed, skipped = skipped.len(), "Payments confirmed.");
    Ok(ConfirmationReport {
      processed,
      confirmed_at,
      skipped,
    })
  }

  pub async fn confirm_member(&self, target: MemberRef) -> OrderResult<ConfirmationReport> {
    self.confirm_batch(vec![target]).await
  }
}
