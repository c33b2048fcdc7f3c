// tests/submission_tests.rs
mod common;
use common::*;

use serial_test::serial;
use tee_orders::{MemberRef, OrderError, OrderId, PaymentGrouper, PaymentStatus, ProofUpload, SkipReason};

#[tokio::test]
#[serial]
async fn submission_stamps_every_selected_member_with_shared_metadata() {
  setup_tracing();
  let h = Harness::new();
  let first = h.order(&[("A", "M"), ("B", "L")]).await;
  let second = h.order(&[("C", "XL")]).await;
  let selection = vec![MemberRef::new(first.id, 1), MemberRef::new(second.id, 0)];

  let receipt = h.submissions.submit_payment("  Lan  ", png_proof(), selection.clone()).await.unwrap();

  assert_eq!(h.proofs.upload_count(), 1);
  assert_eq!(receipt.stamped, selection);
  assert!(receipt.skipped.is_empty());
  assert!(h.proofs.get(&receipt.proof_url).is_some());
  for target in &selection {
    let member = h.member(*target).await;
    assert_eq!(member.payment_status, PaymentStatus::Pending);
    assert_eq!(member.paid_by.as_deref(), Some("Lan"));
    assert_eq!(member.paid_at, Some(receipt.paid_at));
    assert_eq!(member.proof_image.as_deref(), Some(receipt.proof_url.as_str()));
  }
  assert_eq!(h.status_of(MemberRef::new(first.id, 0)).await, PaymentStatus::Unpaid);
}

#[tokio::test]
#[serial]
async fn one_submission_groups_back_into_one_priced_group() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M"), ("B", "L"), ("C", "XL")]).await;
  let receipt = h
    .submissions
    .submit_payment("Lan", png_proof(), vec![MemberRef::new(order.id, 0), MemberRef::new(order.id, 1)])
    .await
    .unwrap();

  let pending = h.orders.list_members(Some(PaymentStatus::Pending)).await.unwrap();
  let groups = PaymentGrouper::new(h.prices.clone()).group(&pending);
  assert_eq!(groups.len(), 1);
  assert_eq!(groups[0].total, 160_000);
  assert_eq!(groups[0].proof_image.as_deref(), Some(receipt.proof_url.as_str()));
}

#[tokio::test]
#[serial]
async fn empty_selection_fails_without_upload_or_writes() {
  setup_tracing();
  let h = Harness::new();
  h.order(&[("A", "M")]).await;
  let writes_before = h.store.write_count();

  let err = h.submissions.submit_payment("Lan", png_proof(), vec![]).await.unwrap_err();

  assert!(matches!(err, OrderError::Validation(_)));
  assert_eq!(h.proofs.upload_count(), 0);
  assert_eq!(h.store.write_count(), writes_before);
}

#[tokio::test]
#[serial]
async fn blank_payer_missing_or_non_image_proof_are_rejected() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M")]).await;
  let target = vec![MemberRef::new(order.id, 0)];

  let blank = h.submissions.submit_payment(" ", png_proof(), target.clone()).await.unwrap_err();
  assert!(matches!(blank, OrderError::Validation(_)));
  let empty = h.submissions.submit_payment("Lan", ProofUpload::new(Vec::new()), target.clone()).await.unwrap_err();
  assert!(matches!(empty, OrderError::Validation(_)));
  let pdf = ProofUpload::new(vec![1, 2, 3]).with_content_type("application/pdf");
  let not_image = h.submissions.submit_payment("Lan", pdf, target.clone()).await.unwrap_err();
  assert!(matches!(not_image, OrderError::Validation(_)));

  let strict = h.submissions.clone().with_max_proof_bytes(4);
  let too_big = strict.submit_payment("Lan", png_proof(), target).await.unwrap_err();
  assert!(matches!(too_big, OrderError::Validation(_)));
  assert_eq!(h.proofs.upload_count(), 0);
}

#[tokio::test]
#[serial]
async fn upload_failure_writes_nothing() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M")]).await;
  h.proofs.set_failing(true);

  let err = h
    .submissions
    .submit_payment("Lan", png_proof(), vec![MemberRef::new(order.id, 0)])
    .await
    .unwrap_err();
  assert!(matches!(err, OrderError::Upload(_)));
  assert_eq!(h.status_of(MemberRef::new(order.id, 0)).await, PaymentStatus::Unpaid);
}

#[tokio::test]
#[serial]
async fn missing_and_already_moved_members_are_skipped_not_fatal() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M"), ("B", "L")]).await;
  h.confirmations.confirm_member(MemberRef::new(order.id, 1)).await.unwrap();
  let ghost = MemberRef::new(OrderId::new(), 0);

  let receipt = h
    .submissions
    .submit_payment(
      "Lan",
      png_proof(),
      vec![ghost, MemberRef::new(order.id, 1), MemberRef::new(order.id, 7), MemberRef::new(order.id, 0)],
    )
    .await
    .unwrap();

  assert_eq!(receipt.stamped, vec![MemberRef::new(order.id, 0)]);
  let reasons: Vec<SkipReason> = receipt.skipped.iter().map(|s| s.reason).collect();
  assert_eq!(
    reasons,
    vec![
      SkipReason::OrderMissing,
      SkipReason::WrongStatus(PaymentStatus::Paid),
      SkipReason::MemberMissing
    ]
  );
  // A paid member never goes back to pending.
  assert_eq!(h.status_of(MemberRef::new(order.id, 1)).await, PaymentStatus::Paid);
}

#[tokio::test]
#[serial]
async fn store_failure_mid_batch_keeps_earlier_members_pending() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M"), ("B", "L"), ("C", "XL")]).await;
  h.store.fail_writes_after(1);

  let err = h
    .submissions
    .submit_payment(
      "Lan",
      png_proof(),
      (0..3).map(|i| MemberRef::new(order.id, i)).collect(),
    )
    .await
    .unwrap_err();

  assert!(matches!(err, OrderError::Unavailable(_)));
  assert_eq!(h.status_of(MemberRef::new(order.id, 0)).await, PaymentStatus::Pending);
  assert_eq!(h.status_of(MemberRef::new(order.id, 1)).await, PaymentStatus::Unpaid);
  assert_eq!(h.status_of(MemberRef::new(order.id, 2)).await, PaymentStatus::Unpaid);
}

#[tokio::test]
#[serial]
async fn duplicate_selections_are_stamped_once() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("A", "M")]).await;
  let target = MemberRef::new(order.id, 0);
  let receipt = h.submissions.submit_payment("Lan", png_proof(), vec![target, target]).await.unwrap();
  assert_eq!(receipt.stamped, vec![target]);
  assert!(receipt.skipped.is_empty());
}

#[tokio::test]
#[serial]
async fn quote_prices_a_selection_of_unpaid_members() {
  setup_tracing();
  let h = Harness::new();
  let order = h.order(&[("Be", "5[20-25kg]"), ("Mom", "L")]).await;
  let quote = h
    .submissions
    .quote(vec![MemberRef::new(order.id, 0), MemberRef::new(order.id, 1)])
    .await
    .unwrap();
  assert_eq!(quote.total, 150_000);
  assert_eq!(quote.members.iter().map(|q| q.price).collect::<Vec<_>>(), vec![70_000, 80_000]);

  h.submissions
    .submit_payment("Lan", png_proof(), vec![MemberRef::new(order.id, 0)])
    .await
    .unwrap();
  let stale = h.submissions.quote(vec![MemberRef::new(order.id, 0)]).await.unwrap_err();
  assert!(matches!(stale, OrderError::Validation(_)));
  let missing = h.submissions.quote(vec![MemberRef::new(order.id, 9)]).await.unwrap_err();
  assert!(matches!(missing, OrderError::NotFound(_)));
}
