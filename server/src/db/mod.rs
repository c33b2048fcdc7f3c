// tee_orders_server/src/db/mod.rs

//! Postgres-backed order store.

use crate::models::OrderRecord;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tee_orders::store::remove_first_match;
use tee_orders::{
  Member, MemberRef, MemberUpdate, NewOrder, Order, OrderError, OrderId, OrderResult, OrderStore, UpdateOutcome,
};
use tracing::{debug, error, info, instrument};

const CREATE_ORDERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS tee_orders (
  id UUID PRIMARY KEY,
  reference TEXT,
  created_at TIMESTAMPTZ NOT NULL,
  members JSONB NOT NULL DEFAULT '[]'::jsonb
)";

const CREATE_CREATED_AT_INDEX: &str =
  "CREATE INDEX IF NOT EXISTS tee_orders_created_at_idx ON tee_orders (created_at DESC)";

/// Creates the orders table and its index when missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
  sqlx::query(CREATE_ORDERS_TABLE).execute(pool).await?;
  sqlx::query(CREATE_CREATED_AT_INDEX).execute(pool).await?;
  info!("Database schema is in place.");
  Ok(())
}

/// Connection-level failures mean the store is down; everything else is a bug or bad data.
fn store_error(err: sqlx::Error) -> OrderError {
  error!(error = %err, "Order store query failed.");
  match err {
    sqlx::Error::PoolTimedOut
    | sqlx::Error::PoolClosed
    | sqlx::Error::Io(_)
    | sqlx::Error::Tls(_)
    | sqlx::Error::WorkerCrashed => OrderError::Unavailable(err.to_string()),
    other => OrderError::Internal(other.to_string()),
  }
}

#[derive(Debug, Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Locks the order row for the rest of the transaction.
  async fn lock_members(
    tx: &mut Transaction<'static, Postgres>,
    id: OrderId,
  ) -> Result<Option<Vec<Member>>, sqlx::Error> {
    let members = sqlx::query_scalar::<_, Json<Vec<Member>>>("SELECT members FROM tee_orders WHERE id = $1 FOR UPDATE")
      .bind(id.as_uuid())
      .fetch_optional(&mut **tx)
      .await?;
    Ok(members.map(|json| json.0))
  }

  async fn write_members(
    tx: &mut Transaction<'static, Postgres>,
    id: OrderId,
    members: &[Member],
  ) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE tee_orders SET members = $2 WHERE id = $1")
      .bind(id.as_uuid())
      .bind(Json(members))
      .execute(&mut **tx)
      .await?;
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "pg_store::insert_order", skip_all, fields(members = order.members.len()), err(Display))]
  async fn insert_order(&self, order: NewOrder) -> OrderResult<Order> {
    let order = order.into_order(OrderId::new());
    sqlx::query("INSERT INTO tee_orders (id, reference, created_at, members) VALUES ($1, $2, $3, $4)")
      .bind(order.id.as_uuid())
      .bind(&order.reference)
      .bind(order.created_at)
      .bind(Json(&order.members))
      .execute(&self.pool)
      .await
      .map_err(store_error)?;
    debug!(order_id = %order.id, "Order inserted.");
    Ok(order)
  }

  #[instrument(name = "pg_store::list_orders", skip_all, err(Display))]
  async fn list_orders(&self) -> OrderResult<Vec<Order>> {
    let records = sqlx::query_as::<_, OrderRecord>(
      "SELECT id, reference, created_at, members FROM tee_orders ORDER BY created_at DESC, id",
    )
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    Ok(records.into_iter().map(Order::from).collect())
  }

  #[instrument(name = "pg_store::find_order", skip(self), err(Display))]
  async fn find_order(&self, id: OrderId) -> OrderResult<Option<Order>> {
    let record =
      sqlx::query_as::<_, OrderRecord>("SELECT id, reference, created_at, members FROM tee_orders WHERE id = $1")
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
    Ok(record.map(Order::from))
  }

  #[instrument(name = "pg_store::update_member", skip(self, update), err(Display))]
  async fn update_member(&self, target: MemberRef, update: &MemberUpdate) -> OrderResult<UpdateOutcome> {
    let mut tx = self.pool.begin().await.map_err(store_error)?;
    let Some(mut members) = Self::lock_members(&mut tx, target.order_id).await.map_err(store_error)? else {
      return Ok(UpdateOutcome::OrderMissing);
    };
    let outcome = match members.get_mut(target.member_index) {
      Some(member) => update.apply_to(member),
      None => UpdateOutcome::MemberMissing,
    };
    if outcome == UpdateOutcome::Applied {
      Self::write_members(&mut tx, target.order_id, &members).await.map_err(store_error)?;
      tx.commit().await.map_err(store_error)?;
    }
    // Dropping an uncommitted transaction rolls it back and releases the row lock.
    Ok(outcome)
  }

  #[instrument(name = "pg_store::remove_member", skip(self, member), err(Display))]
  async fn remove_member(&self, order_id: OrderId, member: &Member) -> OrderResult<bool> {
    let mut tx = self.pool.begin().await.map_err(store_error)?;
    let Some(mut members) = Self::lock_members(&mut tx, order_id).await.map_err(store_error)? else {
      return Ok(false);
    };
    if !remove_first_match(&mut members, member) {
      return Ok(false);
    }
    Self::write_members(&mut tx, order_id, &members).await.map_err(store_error)?;
    tx.commit().await.map_err(store_error)?;
    Ok(true)
  }
}
