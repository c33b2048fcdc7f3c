// tee_orders_server/src/web/routes.rs

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::AppError;
use crate::web::handlers::{admin_handlers, order_handlers, payment_handlers, proof_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Malformed JSON bodies get the same `{"error": ...}` shape as every other failure.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid JSON body: {}", err)).into()
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .service(
      web::scope("/api/v1") // Base path for API version 1
        .route("/health", web::get().to(health_check_handler))
        .route("/sizes", web::get().to(order_handlers::list_sizes_handler))
        .service(
          web::scope("/orders")
            .route("", web::get().to(order_handlers::list_orders_handler))
            .route("", web::post().to(order_handlers::create_order_handler))
            .route("/members", web::get().to(order_handlers::list_members_handler))
            .route("/members", web::put().to(order_handlers::update_member_handler))
            .route("/members", web::delete().to(order_handlers::delete_member_handler)),
        )
        .service(
          web::scope("/payments")
            .route("/quote", web::post().to(payment_handlers::quote_payment_handler))
            .route("/bulk", web::put().to(payment_handlers::bulk_payment_handler)),
        )
        .service(
          web::scope("/admin")
            .route("/login", web::post().to(admin_handlers::admin_login_handler))
            .route("/payments/pending", web::get().to(admin_handlers::pending_payments_handler))
            .route("/payments/confirm", web::put().to(admin_handlers::confirm_payment_handler))
            .route(
              "/payments/confirm/bulk",
              web::put().to(admin_handlers::confirm_payments_bulk_handler),
            ),
        ),
    )
    .route("/proofs/{file}", web::get().to(proof_handlers::get_proof_handler));
}
