// src/web/extractors.rs

//! Caller identity. Authentication is done upstream; these extractors only read the
//! identity the gateway forwards in a header.

use crate::errors::AppError;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

pub const SELLER_HEADER: &str = "X-User-ID";
pub const ADMIN_HEADER: &str = "X-Admin-ID";

fn header_uuid(req: &HttpRequest, header: &str) -> Option<Uuid> {
  req
    .headers()
    .get(header)
    .and_then(|value| value.to_str().ok())
    .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
}

/// A signed-in user acting on their own seller account.
#[derive(Debug, Clone, Copy)]
pub struct SellerUser {
  pub user_id: Uuid,
}

impl FromRequest for SellerUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    match header_uuid(req, SELLER_HEADER) {
      Some(user_id) => ready(Ok(SellerUser { user_id })),
      None => {
        warn!("SellerUser extractor: missing or invalid {} header.", SELLER_HEADER);
        ready(Err(AppError::Auth(format!(
          "Seller authentication required: missing or invalid {} header",
          SELLER_HEADER
        ))))
      }
    }
  }
}

/// A moderator. The id is recorded as `approvedBy` on every decision they make.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser {
  pub admin_id: Uuid,
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    match header_uuid(req, ADMIN_HEADER) {
      Some(admin_id) => ready(Ok(AdminUser { admin_id })),
      None => {
        warn!("AdminUser extractor: missing or invalid {} header.", ADMIN_HEADER);
        ready(Err(AppError::Auth(format!(
          "Admin authentication required: missing or invalid {} header",
          ADMIN_HEADER
        ))))
      }
    }
  }
}
