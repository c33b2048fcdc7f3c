// tee_orders_server/src/services/mod.rs

pub mod auth_service;
pub mod proof_storage;

pub use auth_service::AdminSession;
pub use proof_storage::LocalProofStore;
