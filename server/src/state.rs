// src/state.rs
use crate::config::AppConfig;
use artisan_approval::ApprovalEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub engine: Arc<ApprovalEngine>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  pub fn new(engine: ApprovalEngine, config: AppConfig) -> Self {
    let engine = engine.with_max_page_size(config.max_page_size);
    Self {
      engine: Arc::new(engine),
      config: Arc::new(config),
    }
  }
}
