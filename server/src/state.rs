// tee_orders_server/src/state.rs
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::services::LocalProofStore;
use chrono::Duration;
use std::sync::Arc;
use tee_orders::{
  OrderService, OrderStore, PaymentConfirmationService, PaymentGrouper, PaymentSubmissionService, PriceTable,
};

#[derive(Clone)]
pub struct AppState {
  pub orders: OrderService,
  pub submissions: PaymentSubmissionService,
  pub confirmations: PaymentConfirmationService,
  pub grouper: PaymentGrouper,
  pub prices: Arc<PriceTable>,
  pub proof_files: Arc<LocalProofStore>,
  pub admin_passcode_hash: String,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Wires the services over one order store and the local proof directory.
  pub fn build(config: Arc<AppConfig>, store: Arc<dyn OrderStore>, proof_files: Arc<LocalProofStore>) -> Result<Self> {
    let prices = Arc::new(PriceTable::default());
    let grouper = PaymentGrouper::new(prices.clone())
      .with_window(Duration::minutes(config.payment_group_window_minutes))
      .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(Self {
      orders: OrderService::new(store.clone(), prices.clone()),
      submissions: PaymentSubmissionService::new(store.clone(), proof_files.clone(), prices.clone())
        .with_max_proof_bytes(config.proof_max_bytes),
      confirmations: PaymentConfirmationService::new(store),
      grouper,
      prices,
      proof_files,
      admin_passcode_hash: config.admin_passcode_hash.clone(),
      config,
    })
  }
}
