// src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use artisan_approval::ApprovalError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error(transparent)]
  Workflow(#[from] ApprovalError),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Workflow(e) => match e {
        ApprovalError::NotFound { .. } => StatusCode::NOT_FOUND,
        ApprovalError::AlreadyProcessed { .. }
        | ApprovalError::MissingReason
        | ApprovalError::DuplicateApplication
        | ApprovalError::NoChangesToClear
        | ApprovalError::Validation(_) => StatusCode::BAD_REQUEST,
        ApprovalError::Store(_) | ApprovalError::Flow(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let message = if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
      // Backend details stay in the logs.
      "An internal error occurred".to_string()
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with client error");
      match self {
        AppError::Workflow(e) => e.to_string(),
        other => other.to_string(),
      }
    };
    HttpResponse::build(status).json(json!({ "success": false, "message": message }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
