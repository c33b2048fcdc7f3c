// tests/confirmation_tests.rs
mod common;
use common::*;

use serial_test::serial;
use tee_orders::{MemberRef, OrderError, OrderId, PaymentGrouper, PaymentStatus, SkipReason};

#[tokio::test]
#[serial]
async fn a_missing_order_does_not_roll_back_the_rest_of_the_batch() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M"), ("B", "L")]).await;
  let first = MemberRef::new(order.id, 0);
  let second = MemberRef::new(order.id, 1);
  h.submissions.submit_payment("Lan", png_proof(), vec![first, second]).await.unwrap();
  let ghost = MemberRef::new(OrderId::new(), 0);

  let report = h.confirmations.confirm_batch(vec![first, ghost, second]).await.unwrap();

  assert_eq!(report.processed, 3);
  assert_eq!(report.skipped.len(), 1);
  assert_eq!(report.skipped[0].target, ghost);
  assert_eq!(report.skipped[0].reason, SkipReason::OrderMissing);
  for target in [first, second] {
    let member = h.member(target).await;
    assert_eq!(member.payment_status, PaymentStatus::Paid);
    assert_eq!(member.confirmed_at, Some(report.confirmed_at));
    // Submission metadata survives confirmation.
    assert_eq!(member.paid_by.as_deref(), Some("Lan"));
  }
}

#[tokio::test]
#[serial]
async fn empty_batch_is_a_validation_error() {
  setup_tracing();
  let h = Harness::new();
  let err = h.confirmations.confirm_batch(vec![]).await.unwrap_err();
  assert!(matches!(err, OrderError::Validation(_)));
  assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
#[serial]
async fn reconfirming_a_paid_member_is_not_an_error() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M")]).await;
  let target = MemberRef::new(order.id, 0);
  h.submissions.submit_payment("Lan", png_proof(), vec![target]).await.unwrap();

  h.confirmations.confirm_member(target).await.unwrap();
  let again = h.confirmations.confirm_batch(vec![target]).await.unwrap();

  assert_eq!(again.processed, 1);
  assert!(again.skipped.is_empty());
  assert_eq!(h.status_of(target).await, PaymentStatus::Paid);
}

#[tokio::test]
#[serial]
async fn processed_counts_selections_not_state_changes() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M")]).await;
  let target = MemberRef::new(order.id, 0);
  let report = h.confirmations.confirm_batch(vec![target, target, MemberRef::new(order.id, 4)]).await.unwrap();
  assert_eq!(report.processed, 3);
  assert_eq!(report.skipped.len(), 1);
  assert_eq!(report.skipped[0].reason, SkipReason::MemberMissing);
}

#[tokio::test]
#[serial]
async fn store_failure_mid_batch_leaves_earlier_confirmations_in_place() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M"), ("B", "L")]).await;
  let refs: Vec<MemberRef> = (0..2).map(|i| MemberRef::new(order.id, i)).collect();
  h.submissions.submit_payment("Lan", png_proof(), refs.clone()).await.unwrap();
  h.store.fail_writes_after(1);

  let err = h.confirmations.confirm_batch(refs.clone()).await.unwrap_err();

  assert!(matches!(err, OrderError::Unavailable(_)));
  assert_eq!(h.status_of(refs[0]).await, PaymentStatus::Paid);
  assert_eq!(h.status_of(refs[1]).await, PaymentStatus::Pending);
}

#[tokio::test]
#[serial]
async fn confirming_a_group_clears_it_from_the_pending_view() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M"), ("B", "L"), ("C", "XL")]).await;
  h.submissions
    .submit_payment("Lan", png_proof(), vec![MemberRef::new(order.id, 0), MemberRef::new(order.id, 1)])
    .await
    .unwrap();
  h.submissions
    .submit_payment("Minh", png_proof(), vec![MemberRef::new(order.id, 2)])
    .await
    .unwrap();

  let grouper = PaymentGrouper::new(h.prices.clone());
  let pending = h.orders.list_members(Some(PaymentStatus::Pending)).await.unwrap();
  let groups = grouper.group(&pending);
  assert_eq!(groups.len(), 2);
  let lan = groups.iter().find(|g| g.paid_by == "Lan").unwrap();

  h.confirmations.confirm_batch(lan.references()).await.unwrap();

  let pending = h.orders.list_members(Some(PaymentStatus::Pending)).await.unwrap();
  let remaining = grouper.group(&pending);
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].paid_by, "Minh");
  assert_eq!(remaining[0].total, 80_000);
}
