// src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod seller_handlers;

use artisan_approval::{ApprovalStatus, ListQuery, Page, SortOrder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;

/// Query string shared by the moderation listings.
#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
  pub status: Option<ApprovalStatus>,
  pub page: Option<u32>,
  pub limit: Option<u32>,
  pub sort: Option<SortOrder>,
}

impl ListParams {
  /// Missing values fall back to `default_status` and `default_limit`. Clamping is
  /// left to the engine.
  pub fn into_query(self, default_status: Option<ApprovalStatus>, default_limit: u32) -> ListQuery {
    ListQuery {
      status: self.status.or(default_status),
      pending_changes_only: false,
      sort: self.sort.unwrap_or_default(),
      page: self.page.unwrap_or(1),
      limit: self.limit.unwrap_or(default_limit),
    }
  }
}

/// `{ success, total, page, pages, items }`.
pub(crate) fn page_json<T: Serialize>(page: Page<T>) -> Value {
  json!({
    "success": true,
    "total": page.total,
    "page": page.page,
    "pages": page.pages,
    "items": page.items,
  })
}

/// Parses a JSON body that may be left out entirely. A blank body yields `T::default()`;
/// anything else that does not parse is a validation error.
pub(crate) fn optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, AppError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(T::default());
  }
  serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}
