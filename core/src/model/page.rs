// core/src/model/page.rs

use super::review::ApprovalStatus;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
  #[default]
  NewestFirst,
  OldestFirst,
}

/// Filter and paging for the moderation listings. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
  pub status: Option<ApprovalStatus>,
  pub pending_changes_only: bool,
  pub sort: SortOrder,
  pub page: u32,
  pub limit: u32,
}

impl Default for ListQuery {
  fn default() -> Self {
    Self {
      status: None,
      pending_changes_only: false,
      sort: SortOrder::NewestFirst,
      page: 1,
      limit: DEFAULT_PAGE_SIZE,
    }
  }
}

impl ListQuery {
  pub fn with_status(status: ApprovalStatus) -> Self {
    Self {
      status: Some(status),
      ..Default::default()
    }
  }

  /// Page forced to at least 1 and limit into `1..=max_limit`.
  pub fn normalized(mut self, max_limit: u32) -> Self {
    self.page = self.page.max(1);
    self.limit = self.limit.clamp(1, max_limit.max(1));
    self
  }

  pub fn offset(&self) -> usize {
    (self.page.max(1) as usize - 1) * self.limit as usize
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub total: u64,
  pub page: u32,
  pub pages: u32,
  pub items: Vec<T>,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, total: u64, query: &ListQuery) -> Self {
    let limit = u64::from(query.limit.max(1));
    let pages = total.div_ceil(limit) as u32;
    Self {
      total,
      page: query.page,
      pages,
      items,
    }
  }
}
