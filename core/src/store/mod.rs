// tee_orders/src/store/mod.rs

//! The order document store seam.
//!
//! Stores hold one document per order with its members inline. Every method is
//! atomic for a single order document and nothing more: callers that touch
//! several members issue one call per member and get no cross-document
//! guarantees.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::OrderResult;
use crate::model::{Member, MemberRef, NewOrder, Order, OrderId, PaymentStatus};

pub use memory::MemoryOrderStore;

/// `$set`-style patch for one inline member. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberUpdate {
  pub name: Option<String>,
  pub size: Option<String>,
  pub payment_status: Option<PaymentStatus>,
  pub paid_by: Option<String>,
  pub paid_at: Option<DateTime<Utc>>,
  pub proof_image: Option<String>,
  pub confirmed_at: Option<DateTime<Utc>>,
  /// Guard: apply only while the member still has this status.
  pub only_if_status: Option<PaymentStatus>,
}

/// What a store did with a [`MemberUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
  Applied,
  OrderMissing,
  MemberMissing,
  StatusMismatch(PaymentStatus),
}

impl MemberUpdate {
  pub fn details(name: impl Into<String>, size: impl Into<String>) -> Self {
    Self {
      name: Some(name.into()),
      size: Some(size.into()),
      ..Default::default()
    }
  }

  /// Stamps a member as part of a payment submission. Only an unpaid member moves.
  pub fn submission(paid_by: impl Into<String>, paid_at: DateTime<Utc>, proof_image: impl Into<String>) -> Self {
    Self {
      payment_status: Some(PaymentStatus::Pending),
      paid_by: Some(paid_by.into()),
      paid_at: Some(paid_at),
      proof_image: Some(proof_image.into()),
      only_if_status: Some(PaymentStatus::Unpaid),
      ..Default::default()
    }
  }

  /// Marks a member paid regardless of its current status.
  pub fn confirmation(confirmed_at: DateTime<Utc>) -> Self {
    Self {
      payment_status: Some(PaymentStatus::Paid),
      confirmed_at: Some(confirmed_at),
      ..Default::default()
    }
  }

  /// Applies the patch in place. Store implementations call this under their
  /// per-document lock or transaction.
  pub fn apply_to(&self, member: &mut Member) -> UpdateOutcome {
    if let Some(required) = self.only_if_status {
      if member.payment_status != required {
        return UpdateOutcome::StatusMismatch(member.payment_status);
      }
    }
    if let Some(name) = &self.name {
      member.name = name.clone();
    }
    if let Some(size) = &self.size {
      member.size = size.clone();
    }
    if let Some(status) = self.payment_status {
      member.payment_status = status;
    }
    if let Some(paid_by) = &self.paid_by {
      member.paid_by = Some(paid_by.clone());
    }
    if let Some(paid_at) = self.paid_at {
      member.paid_at = Some(paid_at);
    }
    if let Some(proof_image) = &self.proof_image {
      member.proof_image = Some(proof_image.clone());
    }
    if let Some(confirmed_at) = self.confirmed_at {
      member.confirmed_at = Some(confirmed_at);
    }
    UpdateOutcome::Applied
  }
}

/// Removes the first member whole-value equal to `target`. Returns whether one was removed.
pub fn remove_first_match(members: &mut Vec<Member>, target: &Member) -> bool {
  match members.iter().position(|m| m == target) {
    Some(pos) => {
      members.remove(pos);
      true
    }
    None => false,
  }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Persists a new order and returns it with its assigned id.
  async fn insert_order(&self, order: NewOrder) -> OrderResult<Order>;

  /// All orders, newest `created_at` first.
  async fn list_orders(&self) -> OrderResult<Vec<Order>>;

  async fn find_order(&self, id: OrderId) -> OrderResult<Option<Order>>;

  async fn update_member(&self, target: MemberRef, update: &MemberUpdate) -> OrderResult<UpdateOutcome>;

  /// Removes the first member of the order equal to `member` by value.
  /// `Ok(false)` when the order is gone or no member matches.
  async fn remove_member(&self, order_id: OrderId, member: &Member) -> OrderResult<bool>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn submission_patch_skips_members_that_already_moved() {
    let mut member = Member::unpaid("An", "M");
    member.payment_status = PaymentStatus::Paid;
    let update = MemberUpdate::submission("Mom", Utc::now(), "https://proofs/1.jpg");
    assert_eq!(update.apply_to(&mut member), UpdateOutcome::StatusMismatch(PaymentStatus::Paid));
    assert!(member.paid_by.is_none());
  }

  #[test]
  fn confirmation_patch_is_unconditional() {
    let mut member = Member::unpaid("An", "M");
    let at = Utc::now();
    assert_eq!(MemberUpdate::confirmation(at).apply_to(&mut member), UpdateOutcome::Applied);
    assert_eq!(member.payment_status, PaymentStatus::Paid);
    assert_eq!(member.confirmed_at, Some(at));
    assert_eq!(member.name, "An");
  }

  #[test]
  fn remove_first_match_leaves_duplicates_after_it() {
    let twin = Member::unpaid("Twin", "S");
    let mut members = vec![twin.clone(), Member::unpaid("Other", "M"), twin.clone()];
    assert!(remove_first_match(&mut members, &twin));
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].name, "Other");
    assert_eq!(members[1], twin);
  }
}
