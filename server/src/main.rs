// src/main.rs

mod config;
mod errors;
mod state;
mod store;
mod web;

use crate::config::{AppConfig, StoreBackend};
use crate::state::AppState;
use crate::store::PgEntityStore;

use actix_web::{web as actix_data, App, HttpServer};
use artisan_approval::{ApprovalEngine, EntityStore, MemoryStore};
use sqlx::PgPool;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

async fn build_store(config: &AppConfig) -> io::Result<Arc<dyn EntityStore>> {
  match config.store_backend {
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on restart.");
      Ok(Arc::new(MemoryStore::new()))
    }
    StoreBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| io::Error::other("DATABASE_URL is not set"))?;
      let pool = PgPool::connect(url).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to connect to the database.");
        io::Error::other(e)
      })?;
      tracing::info!("Successfully connected to the database.");

      let store = PgEntityStore::new(pool);
      store.ensure_schema().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to apply the database schema.");
        io::Error::other(e)
      })?;
      Ok(Arc::new(store))
    }
  }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting artisan approval server...");

  let app_config = AppConfig::from_env().map_err(|e| {
    tracing::error!(error = %e, "Failed to load application configuration.");
    io::Error::other(e.to_string())
  })?;

  let store = build_store(&app_config).await?;
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(ApprovalEngine::new(store), app_config);
  tracing::info!("Approval flows registered.");

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
