// tee_orders_server/src/main.rs

mod config;
mod db;
mod errors;
mod models;
mod services;
mod state;
mod web;

use crate::config::{AppConfig, LogFormat, StoreBackend};
use crate::errors::{AppError, Result as AppResult};
use crate::services::LocalProofStore;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tee_orders::{MemoryOrderStore, OrderStore};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

fn init_tracing(format: LogFormat) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")); // RUST_LOG override
  let builder = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

async fn connect_store(app_config: &AppConfig) -> AppResult<Arc<dyn OrderStore>> {
  match (app_config.store_backend, app_config.database_url.as_deref()) {
    (StoreBackend::Postgres, Some(database_url)) => {
      let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
      tracing::info!("Successfully connected to the database.");
      if app_config.run_migrations {
        db::ensure_schema(&pool).await?;
      }
      Ok(Arc::new(db::PgOrderStore::new(pool)))
    }
    (StoreBackend::Postgres, None) => Err(AppError::Config("DATABASE_URL is not set.".to_string())),
    (StoreBackend::Memory, _) => {
      tracing::warn!("Using the in-memory order store; orders are lost on restart.");
      Ok(Arc::new(MemoryOrderStore::new()))
    }
  }
}

async fn build_state(app_config: Arc<AppConfig>) -> AppResult<AppState> {
  let store = connect_store(&app_config).await?;
  let proof_files = Arc::new(LocalProofStore::open_dir(&app_config.proof_dir, &app_config.app_base_url).await?);
  AppState::build(app_config, store, proof_files)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  init_tracing(LogFormat::from_env());

  tracing::info!("Starting t-shirt order server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };
  tracing::debug!(config = ?app_config, "Configuration in effect.");

  let app_state = match build_state(app_config.clone()).await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise application state.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  tracing::info!(proof_dir = %app_state.proof_files.dir().display(), "Serving proof images.");

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
