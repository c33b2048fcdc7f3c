// tee_orders_server/src/web/handlers/proof_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::get_proof", skip(app_state, path), fields(file = %path.as_ref()))]
pub async fn get_proof_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let file_name = path.into_inner();
  match app_state.proof_files.read(&file_name).await? {
    Some((bytes, content_type)) => Ok(HttpResponse::Ok().content_type(content_type).body(bytes)),
    None => {
      warn!("Proof image {} not found.", file_name);
      Err(AppError::NotFound(format!("Proof image {} not found.", file_name)))
    }
  }
}
