// tee_orders/src/lib.rs

//! Order book and payment workflow for a small group t-shirt sale.
//!
//! Customers register members (a name and a shirt size) in orders, pay by bank
//! transfer and upload one photo of the receipt for several members at once.
//! An admin then reviews pending payments, grouped back into the submissions
//! they came from, and confirms them.
//!
//!  - [`OrderService`] creates orders and edits or removes individual members.
//!  - [`PaymentSubmissionService`] uploads one proof and stamps a batch of members `PENDING`.
//!  - [`PaymentGrouper`] rebuilds submissions from pending members by payer and time bucket.
//!  - [`PaymentConfirmationService`] moves members to `PAID`.
//!
//! Persistence and image storage sit behind the [`OrderStore`] and
//! [`ProofStore`] traits; in-memory implementations of both ship with the crate.

pub mod error;
pub mod grouping;
pub mod model;
pub mod proof;
pub mod service;
pub mod store;

pub use crate::error::{OrderError, OrderResult};
pub use crate::grouping::{PaymentGroup, PaymentGroupKey, PaymentGrouper, DEFAULT_WINDOW_MINUTES};
pub use crate::model::{
  Member, MemberRef, MemberView, NewMember, NewOrder, Order, OrderId, PaymentStatus, Price, PriceTable, SizePrice,
};
pub use crate::proof::{MemoryProofStore, ProofStore, ProofUpload};
pub use crate::service::{
  ConfirmationReport, OrderService, PaymentConfirmationService, PaymentQuote, PaymentSubmissionService,
  SkipReason, SkippedMember, SubmissionReceipt,
};
pub use crate::store::{MemberUpdate, MemoryOrderStore, OrderStore, UpdateOutcome};
