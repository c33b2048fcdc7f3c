// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tee_orders::{
  Member, MemberRef, MemberView, MemoryOrderStore, MemoryProofStore, NewMember, Order, OrderId, OrderService,
  PaymentConfirmationService, PaymentStatus, PaymentSubmissionService, PriceTable, ProofUpload,
};
use tracing::Level;

// --- Service wiring over the in-memory collaborators ---
pub struct Harness {
  pub store: Arc<MemoryOrderStore>,
  pub proofs: Arc<MemoryProofStore>,
  pub prices: Arc<PriceTable>,
  pub orders: OrderService,
  pub submissions: PaymentSubmissionService,
  pub confirmations: PaymentConfirmationService,
}

impl Harness {
  pub fn new() -> Self {
    let store = Arc::new(MemoryOrderStore::new());
    let proofs = Arc::new(MemoryProofStore::new());
    let prices = Arc::new(PriceTable::default());
    Self {
      orders: OrderService::new(store.clone(), prices.clone()),
      submissions: PaymentSubmissionService::new(store.clone(), proofs.clone(), prices.clone()),
      confirmations: PaymentConfirmationService::new(store.clone()),
      store,
      proofs,
      prices,
    }
  }

  /// Creates an order from `(name, size)` pairs.
  pub async fn order(&self, members: &[(&str, &str)]) -> Order {
    let members = members.iter().map(|(name, size)| NewMember::new(*name, *size)).collect();
    self
      .orders
      .create_order(Some("https://shop.example/tee.png".to_string()), members)
      .await
      .expect("fixture order should be valid")
  }

  pub async fn member(&self, target: MemberRef) -> Member {
    let order = self
      .orders
      .list_orders()
      .await
      .unwrap()
      .into_iter()
      .find(|o| o.id == target.order_id)
      .expect("order should exist");
    order.members[target.member_index].clone()
  }

  pub async fn status_of(&self, target: MemberRef) -> PaymentStatus {
    self.member(target).await.payment_status
  }
}

pub fn png_proof() -> ProofUpload {
  ProofUpload::new(vec![0x89, b'P', b'N', b'G', 1, 2, 3]).with_content_type("image/png")
}

pub fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 14, h, m, s).unwrap()
}

/// A flattened pending member as the grouping engine sees it.
pub fn pending(order_id: OrderId, index: usize, name: &str, size: &str, paid_by: &str, paid_at: DateTime<Utc>) -> MemberView {
  let mut member = Member::unpaid(name, size);
  member.payment_status = PaymentStatus::Pending;
  member.paid_by = Some(paid_by.to_string());
  member.paid_at = Some(paid_at);
  member.proof_image = Some(format!("memory://proofs/{}-{}.png", paid_by, paid_at.timestamp()));
  MemberView {
    order_id,
    member_index: index,
    order_reference: None,
    order_created_at: at(9, 0, 0),
    member,
  }
}

// --- Helper for Tracing Setup ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
