// tee_orders/src/store/memory.rs

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, instrument};

use super::{remove_first_match, MemberUpdate, OrderStore, UpdateOutcome};
use crate::error::{OrderError, OrderResult};
use crate::model::{Member, MemberRef, NewOrder, Order, OrderId};

/// Process-local order store. Backs tests and the `memory` server backend.
///
/// Each call takes the lock once, which gives the same single-document
/// atomicity a real document store offers.
#[derive(Debug)]
pub struct MemoryOrderStore {
  orders: RwLock<Vec<Order>>,
  writes: AtomicUsize,
  write_budget: AtomicUsize,
  unavailable: AtomicBool,
}

impl Default for MemoryOrderStore {
  fn default() -> Self {
    Self {
      orders: RwLock::new(Vec::new()),
      writes: AtomicUsize::new(0),
      write_budget: AtomicUsize::new(usize::MAX),
      unavailable: AtomicBool::new(false),
    }
  }
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of mutating calls that reached the store (successful or not).
  pub fn write_count(&self) -> usize {
    self.writes.load(Ordering::SeqCst)
  }

  /// Simulates an outage: every call fails with `Unavailable` while set.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.unavailable.store(unavailable, Ordering::SeqCst);
  }

  /// Lets `budget` more writes through, then fails every write with `Unavailable`.
  pub fn fail_writes_after(&self, budget: usize) {
    let already = self.writes.load(Ordering::SeqCst);
    self.write_budget.store(already.saturating_add(budget), Ordering::SeqCst);
  }

  fn check_available(&self) -> OrderResult<()> {
    if self.unavailable.load(Ordering::SeqCst) {
      return Err(OrderError::Unavailable("in-memory store is switched off".to_string()));
    }
    Ok(())
  }

  fn begin_write(&self) -> OrderResult<()> {
    self.check_available()?;
    let attempt = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
    if attempt > self.write_budget.load(Ordering::SeqCst) {
      return Err(OrderError::Unavailable("in-memory store refused the write".to_string()));
    }
    Ok(())
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  #[instrument(name = "memory_store::insert_order", skip_all, fields(members = order.members.len()))]
  async fn insert_order(&self, order: NewOrder) -> OrderResult<Order> {
    self.begin_write()?;
    let order = order.into_order(OrderId::new());
    self.orders.write().push(order.clone());
    debug!(order_id = %order.id, "Order inserted.");
    Ok(order)
  }

  async fn list_orders(&self) -> OrderResult<Vec<Order>> {
    self.check_available()?;
    // Newest insert first among equal timestamps, then a stable sort on created_at.
    let mut orders: Vec<Order> = self.orders.read().iter().rev().cloned().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }

  async fn find_order(&self, id: OrderId) -> OrderResult<Option<Order>> {
    self.check_available()?;
    Ok(self.orders.read().iter().find(|o| o.id == id).cloned())
  }

  #[instrument(name = "memory_store::update_member", skip_all, fields(target = %target))]
  async fn update_member(&self, target: MemberRef, update: &MemberUpdate) -> OrderResult<UpdateOutcome> {
    self.begin_write()?;
    let mut orders = self.orders.write();
    let Some(order) = orders.iter_mut().find(|o| o.id == target.order_id) else {
      return Ok(UpdateOutcome::OrderMissing);
    };
    let Some(member) = order.members.get_mut(target.member_index) else {
      return Ok(UpdateOutcome::MemberMissing);
    };
    Ok(update.apply_to(member))
  }

  #[instrument(name = "memory_store::remove_member", skip_all, fields(order_id = %order_id))]
  async fn remove_member(&self, order_id: OrderId, member: &Member) -> OrderResult<bool> {
    self.begin_write()?;
    let mut orders = self.orders.write();
    match orders.iter_mut().find(|o| o.id == order_id) {
      Some(order) => Ok(remove_first_match(&mut order.members, member)),
      None => Ok(false),
    }
  }
}
