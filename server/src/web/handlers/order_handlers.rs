// tee_orders_server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tee_orders::{NewMember, OrderId, PaymentStatus};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  #[serde(default)]
  pub reference: Option<String>,
  #[serde(default)]
  pub members: Vec<NewMember>,
}

#[derive(Deserialize, Debug)]
pub struct ListMembersQuery {
  pub status: Option<PaymentStatus>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberPayload {
  pub order_id: OrderId,
  pub member_index: usize,
  pub name: String,
  pub size: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMemberPayload {
  pub order_id: OrderId,
  pub member_index: usize,
}

#[instrument(name = "handler::list_sizes", skip(app_state))]
pub async fn list_sizes_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(json!({ "sizes": app_state.prices.sizes() })))
}

#[instrument(name = "handler::create_order", skip(app_state, req_payload), fields(members = req_payload.members.len()))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let CreateOrderPayload { reference, members } = req_payload.into_inner();
  let order = app_state.orders.create_order(reference, members).await?;
  info!(order_id = %order.id, "Order created.");

  Ok(HttpResponse::Created().json(json!({
      "message": "Order created successfully.",
      "order": order
  })))
}

#[instrument(name = "handler::list_orders", skip(app_state))]
pub async fn list_orders_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let orders = app_state.orders.list_orders().await?;
  info!("Fetched {} orders.", orders.len());

  Ok(HttpResponse::Ok().json(json!({
      "message": "Orders fetched successfully.",
      "orders": orders
  })))
}

#[instrument(name = "handler::list_members", skip(app_state, query_params), fields(status = ?query_params.status))]
pub async fn list_members_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListMembersQuery>,
) -> Result<HttpResponse, AppError> {
  let members = app_state.orders.list_members(query_params.status).await?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Members fetched successfully.",
      "members": members
  })))
}

#[instrument(
    name = "handler::update_member",
    skip(app_state, req_payload),
    fields(order_id = %req_payload.order_id, member_index = req_payload.member_index)
)]
pub async fn update_member_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<UpdateMemberPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  app_state
    .orders
    .update_member(payload.order_id, payload.member_index, &payload.name, &payload.size)
    .await?;

  Ok(HttpResponse::Ok().json(json!({ "message": "Member updated successfully." })))
}

#[instrument(
    name = "handler::delete_member",
    skip(app_state, req_payload),
    fields(order_id = %req_payload.order_id, member_index = req_payload.member_index)
)]
pub async fn delete_member_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<DeleteMemberPayload>,
) -> Result<HttpResponse, AppError> {
  app_state
    .orders
    .delete_member(req_payload.order_id, req_payload.member_index)
    .await?;

  Ok(HttpResponse::Ok().json(json!({ "message": "Member deleted successfully." })))
}
