// tee_orders_server/src/models/mod.rs

//! Database row shapes.

pub mod order_record;

pub use order_record::OrderRecord;
