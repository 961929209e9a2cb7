// src/config.rs

use crate::errors::{AppError, Result};
use artisan_approval::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Where entities are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "postgres" | "pg" => Ok(StoreBackend::Postgres),
      "memory" | "mem" => Ok(StoreBackend::Memory),
      other => Err(AppError::Config(format!("Unknown STORE_BACKEND '{}'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  /// Required for the Postgres backend only.
  pub database_url: Option<String>,
  pub default_page_size: u32,
  pub max_page_size: u32,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      store_backend: StoreBackend::Memory,
      database_url: None,
      default_page_size: DEFAULT_PAGE_SIZE,
      max_page_size: MAX_PAGE_SIZE,
    }
  }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T>
where
  T::Err: std::fmt::Display,
{
  match env::var(name) {
    Ok(raw) => raw
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
    Err(_) => Ok(default),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_var("SERVER_PORT", 8080u16)?;
    let store_backend = match env::var("STORE_BACKEND") {
      Ok(raw) => raw.parse::<StoreBackend>()?,
      Err(_) => StoreBackend::Postgres,
    };
    let database_url = env::var("DATABASE_URL").ok();
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required when STORE_BACKEND=postgres)".to_string(),
      ));
    }

    let max_page_size = parse_var("MAX_PAGE_SIZE", MAX_PAGE_SIZE)?;
    let default_page_size = parse_var("DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
    if max_page_size == 0 || default_page_size == 0 || default_page_size > max_page_size {
      return Err(AppError::Config(format!(
        "Page sizes must satisfy 0 < DEFAULT_PAGE_SIZE ({}) <= MAX_PAGE_SIZE ({})",
        default_page_size, max_page_size
      )));
    }

    tracing::info!(?store_backend, "Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      default_page_size,
      max_page_size,
    })
  }
}
