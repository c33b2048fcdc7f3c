// tee_orders/src/grouping.rs

//! Reconstructs payment submissions from pending members.
//!
//! A submission stamps every selected member with the same payer name, instant
//! and proof image, but members are stored independently and carry no
//! submission id. Grouping recovers the batches by keying on
//! `(payer name, time bucket)`, where buckets are fixed windows aligned to the
//! Unix epoch. Two submissions straddling a bucket edge therefore land in
//! different groups even when made seconds apart, and two payers with the same
//! name inside one window merge.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::error::{OrderError, OrderResult};
use crate::model::{MemberRef, MemberView, PaymentStatus, Price, PriceTable};

pub const DEFAULT_WINDOW_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentGroupKey {
  pub paid_by: String,
  pub bucket: i64,
}

impl fmt::Display for PaymentGroupKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.paid_by, self.bucket)
  }
}

/// One reconstructed transfer submission. Derived on every call, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentGroup {
  pub key: String,
  pub paid_by: String,
  pub bucket: i64,
  /// Taken from the first member seen for this key.
  pub paid_at: DateTime<Utc>,
  pub proof_image: Option<String>,
  pub members: Vec<MemberView>,
  pub total: Price,
  /// Sizes in this group the price table does not know. They count as 0 in `total`.
  pub unpriced_sizes: Vec<String>,
}

impl PaymentGroup {
  pub fn references(&self) -> Vec<MemberRef> {
    self.members.iter().map(MemberView::reference).collect()
  }
}

#[derive(Debug, Clone)]
pub struct PaymentGrouper {
  prices: Arc<PriceTable>,
  window_ms: i64,
}

impl PaymentGrouper {
  pub fn new(prices: Arc<PriceTable>) -> Self {
    Self {
      prices,
      window_ms: Duration::minutes(DEFAULT_WINDOW_MINUTES).num_milliseconds(),
    }
  }

  pub fn with_window(mut self, window: Duration) -> OrderResult<Self> {
    let window_ms = window.num_milliseconds();
    if window_ms <= 0 {
      return Err(OrderError::validation("Payment grouping window must be positive."));
    }
    self.window_ms = window_ms;
    Ok(self)
  }

  pub fn window(&self) -> Duration {
    Duration::milliseconds(self.window_ms)
  }

  /// Epoch-aligned bucket index. Floors toward negative infinity for pre-epoch instants.
  pub fn bucket_of(&self, at: DateTime<Utc>) -> i64 {
    at.timestamp_millis().div_euclid(self.window_ms)
  }

  /// Groups the pending members among `members`, in first-seen key order.
  ///
  /// Members that are not `PENDING`, or lack a payer or payment instant, are
  /// not actionable and are left out.
  pub fn group<'a, I>(&self, members: I) -> Vec<PaymentGroup>
  where
    I: IntoIterator<Item = &'a MemberView>,
  {
    let mut slots: HashMap<PaymentGroupKey, usize> = HashMap::new();
    let mut groups: Vec<PaymentGroup> = Vec::new();

    for view in members {
      let member = &view.member;
      if member.payment_status != PaymentStatus::Pending {
        continue;
      }
      let (Some(paid_by), Some(paid_at)) = (member.paid_by.as_ref(), member.paid_at) else {
        continue;
      };

      let key = PaymentGroupKey {
        paid_by: paid_by.clone(),
        bucket: self.bucket_of(paid_at),
      };
      let slot = *slots.entry(key.clone()).or_insert_with(|| {
        groups.push(PaymentGroup {
          key: key.to_string(),
          paid_by: key.paid_by.clone(),
          bucket: key.bucket,
          paid_at,
          proof_image: member.proof_image.clone(),
          members: Vec::new(),
          total: 0,
          unpriced_sizes: Vec::new(),
        });
        groups.len() - 1
      });

      let group = &mut groups[slot];
      match self.prices.price_of(&member.size) {
        Some(price) => group.total += price,
        None => {
          warn!(
            member = %view.reference(),
            size = %member.size,
            group = %group.key,
            "Pending member has a size with no price; counted as 0."
          );
          group.unpriced_sizes.push(member.size.clone());
        }
      }
      group.members.push(view.clone());
    }

    groups
  }
}
