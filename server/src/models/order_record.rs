// tee_orders_server/src/models/order_record.rs

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use tee_orders::{Member, Order, OrderId};
use uuid::Uuid;

/// One row of `tee_orders`. Members live inline as a JSONB array so a member
/// is addressed by its position, the same way clients address it.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRecord {
  pub id: Uuid,
  pub reference: Option<String>,
  pub created_at: DateTime<Utc>,
  pub members: Json<Vec<Member>>,
}

impl From<OrderRecord> for Order {
  fn from(record: OrderRecord) -> Self {
    Order {
      id: OrderId::from_uuid(record.id),
      reference: record.reference,
      created_at: record.created_at,
      members: record.members.0,
    }
  }
}
