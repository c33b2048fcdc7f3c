// tee_orders/src/model/member.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::order::OrderId;

/// Payment state of a single member. Moves strictly `Unpaid -> Pending -> Paid`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
  #[default]
  Unpaid,
  Pending,
  Paid,
}

impl PaymentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentStatus::Unpaid => "UNPAID",
      PaymentStatus::Pending => "PENDING",
      PaymentStatus::Paid => "PAID",
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One person's entry within an order. Stored inline in the order document and
/// addressed by its position, see [`MemberRef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
  pub name: String,
  pub size: String,
  // Documents written before payments existed carry no status.
  #[serde(default)]
  pub payment_status: PaymentStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub paid_by: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub paid_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub proof_image: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub confirmed_at: Option<DateTime<Utc>>,
}

impl Member {
  pub fn unpaid(name: impl Into<String>, size: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      size: size.into(),
      payment_status: PaymentStatus::Unpaid,
      paid_by: None,
      paid_at: None,
      proof_image: None,
      confirmed_at: None,
    }
  }
}

/// Caller input for a member on order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
  pub name: String,
  pub size: String,
}

impl NewMember {
  pub fn new(name: impl Into<String>, size: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      size: size.into(),
    }
  }
}

/// Positional address of a member: `(order id, index in that order's member list)`.
///
/// Indices shift when an earlier member of the same order is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
  pub order_id: OrderId,
  pub member_index: usize,
}

impl MemberRef {
  pub fn new(order_id: OrderId, member_index: usize) -> Self {
    Self { order_id, member_index }
  }
}

impl fmt::Display for MemberRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}#{}", self.order_id, self.member_index)
  }
}

/// A member flattened out of its order, carrying its address and order metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
  pub order_id: OrderId,
  pub member_index: usize,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order_reference: Option<String>,
  pub order_created_at: DateTime<Utc>,
  #[serde(flatten)]
  pub member: Member,
}

impl MemberView {
  pub fn reference(&self) -> MemberRef {
    MemberRef::new(self.order_id, self.member_index)
  }
}
