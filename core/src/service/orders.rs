// tee_orders/src/service/orders.rs

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{OrderError, OrderResult};
use crate::model::{Member, MemberRef, MemberView, NewMember, NewOrder, Order, OrderId, PaymentStatus, PriceTable};
use crate::store::{MemberUpdate, OrderStore, UpdateOutcome};

/// Creates orders and edits their members.
#[derive(Clone)]
pub struct OrderService {
  store: Arc<dyn OrderStore>,
  prices: Arc<PriceTable>,
}

fn trimmed_name(name: &str, position: usize) -> OrderResult<String> {
  let name = name.trim();
  if name.is_empty() {
    return Err(OrderError::validation(format!("Member {} has no name.", position + 1)));
  }
  Ok(name.to_string())
}

impl OrderService {
  pub fn new(store: Arc<dyn OrderStore>, prices: Arc<PriceTable>) -> Self {
    Self { store, prices }
  }

  pub fn prices(&self) -> &PriceTable {
    &self.prices
  }

  #[instrument(name = "order_service::create_order", skip(self, reference, members), fields(members = members.len()), err(Display))]
  pub async fn create_order(&self, reference: Option<String>, members: Vec<NewMember>) -> OrderResult<Order> {
    if members.is_empty() {
      return Err(OrderError::validation("Add at least one member to the order."));
    }

    let mut accepted = Vec::with_capacity(members.len());
    for (position, member) in members.into_iter().enumerate() {
      let name = trimmed_name(&member.name, position)?;
      let size = member.size.trim();
      self.prices.require(size)?;
      accepted.push(Member::unpaid(name, size));
    }

    let reference = reference.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
    let order = self
      .store
      .insert_order(NewOrder {
        reference,
        created_at: Utc::now(),
        members: accepted,
      })
      .await?;

    info!(order_id = %order.id, members = order.members.len(), "Order created.");
    Ok(order)
  }

  /// All orders, newest first.
  pub async fn list_orders(&self) -> OrderResult<Vec<Order>> {
    self.store.list_orders().await
  }

  /// Every member of every order, orders newest first and members in index order.
  pub async fn list_members(&self, status: Option<PaymentStatus>) -> OrderResult<Vec<MemberView>> {
    let orders = self.store.list_orders().await?;
    Ok(
      orders
        .iter()
        .flat_map(Order::member_views)
        .filter(|view| status.map_or(true, |s| view.member.payment_status == s))
        .collect(),
    )
  }

  #[instrument(name = "order_service::update_member", skip(self, name, size), err(Display))]
  pub async fn update_member(&self, order_id: OrderId, index: usize, name: &str, size: &str) -> OrderResult<()> {
    let name = trimmed_name(name, index)?;
    let size = size.trim();
    if size.is_empty() {
      return Err(OrderError::validation("Size is required."));
    }
    self.prices.require(size)?;

    let target = MemberRef::new(order_id, index);
    match self.store.update_member(target, &MemberUpdate::details(name, size)).await? {
      UpdateOutcome::Applied => {
        info!(member = %target, "Member updated.");
        Ok(())
      }
      UpdateOutcome::OrderMissing => Err(OrderError::not_found(format!("Order {} does not exist.", order_id))),
      UpdateOutcome::MemberMissing => Err(OrderError::not_found(format!("Member {} does not exist.", target))),
      // Details updates carry no status guard.
      UpdateOutcome::StatusMismatch(status) => Err(OrderError::Internal(format!(
        "Unexpected status guard on member {} ({})",
        target, status
      ))),
    }
  }

  /// Removes the member currently at `index`, matching it by value so a
  /// concurrent removal of an earlier member cannot make us delete its neighbour.
  #[instrument(name = "order_service::delete_member", skip(self), err(Display))]
  pub async fn delete_member(&self, order_id: OrderId, index: usize) -> OrderResult<()> {
    let order = self
      .store
      .find_order(order_id)
      .await?
      .ok_or_else(|| OrderError::not_found(format!("Order {} does not exist.", order_id)))?;
    let snapshot = order
      .member(index)
      .cloned()
      .ok_or_else(|| OrderError::not_found(format!("Member {} does not exist.", MemberRef::new(order_id, index))))?;

    if !self.store.remove_member(order_id, &snapshot).await? {
      warn!(%order_id, index, "Member changed or vanished before it could be removed.");
      return Err(OrderError::not_found(format!(
        "Member '{}' is no longer part of order {}.",
        snapshot.name, order_id
      )));
    }
    info!(%order_id, index, name = %snapshot.name, "Member removed.");
    Ok(())
  }
}
