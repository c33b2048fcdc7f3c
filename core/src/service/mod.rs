// tee_orders/src/service/mod.rs

//! Order, payment-submission and payment-confirmation services.
//!
//! Batch operations here are best effort: each selected member is updated
//! with its own store call, nothing is rolled back, and members that cannot
//! be updated are reported back as skipped.

pub mod confirmation;
pub mod orders;
pub mod submission;

use serde::Serialize;
use std::collections::HashSet;

use crate::error::{OrderError, OrderResult};
use crate::model::{MemberRef, MemberView, Order, PaymentStatus};
use crate::store::UpdateOutcome;

pub use confirmation::{ConfirmationReport, PaymentConfirmationService};
pub use orders::OrderService;
pub use submission::{PaymentQuote, PaymentSubmissionService, QuotedMember, SubmissionReceipt, DEFAULT_MAX_PROOF_BYTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
  OrderMissing,
  MemberMissing,
  /// The member was not in the status the operation moves from.
  WrongStatus(PaymentStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedMember {
  #[serde(flatten)]
  pub target: MemberRef,
  pub reason: SkipReason,
}

impl SkippedMember {
  fn from_outcome(target: MemberRef, outcome: UpdateOutcome) -> Option<Self> {
    let reason = match outcome {
      UpdateOutcome::Applied => return None,
      UpdateOutcome::OrderMissing => SkipReason::OrderMissing,
      UpdateOutcome::MemberMissing => SkipReason::MemberMissing,
      UpdateOutcome::StatusMismatch(status) => SkipReason::WrongStatus(status),
    };
    Some(Self { target, reason })
  }
}

/// Drops repeated references, keeping the first occurrence.
fn dedupe(selections: Vec<MemberRef>) -> Vec<MemberRef> {
  let mut seen = HashSet::with_capacity(selections.len());
  selections.into_iter().filter(|s| seen.insert(*s)).collect()
}

fn resolve_in(orders: &[Order], targets: &[MemberRef]) -> OrderResult<Vec<MemberView>> {
  targets
    .iter()
    .map(|target| {
      orders
        .iter()
        .find(|o| o.id == target.order_id)
        .and_then(|o| o.member_views().nth(target.member_index))
        .ok_or_else(|| OrderError::not_found(format!("Member {} does not exist.", target)))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::OrderId;

  #[test]
  fn dedupe_keeps_first_occurrence_order() {
    let a = MemberRef::new(OrderId::new(), 0);
    let b = MemberRef::new(OrderId::new(), 1);
    assert_eq!(dedupe(vec![b, a, b, a]), vec![b, a]);
  }
}
