// core/src/model/blog.rs

use super::review::{ApprovalStatus, Review};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
  #[default]
  Draft,
  Published,
}

impl PublicationStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PublicationStatus::Draft => "draft",
      PublicationStatus::Published => "published",
    }
  }
}

impl fmt::Display for PublicationStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PublicationStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "draft" => Ok(PublicationStatus::Draft),
      "published" => Ok(PublicationStatus::Published),
      other => Err(format!("Invalid publication status: {}", other)),
    }
  }
}

/// Publication state that travels with a blog review change.
///
/// `Published` carries its timestamp, so a published post always has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogEffect {
  Publish { at: DateTime<Utc> },
  Unpublish,
}

impl BlogEffect {
  pub fn status(&self) -> PublicationStatus {
    match self {
      BlogEffect::Publish { .. } => PublicationStatus::Published,
      BlogEffect::Unpublish => PublicationStatus::Draft,
    }
  }

  pub fn published_at(&self) -> Option<DateTime<Utc>> {
    match self {
      BlogEffect::Publish { at } => Some(*at),
      BlogEffect::Unpublish => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
  pub id: Uuid,
  pub artisan_id: Uuid,
  pub title: String,
  pub content: String,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(flatten)]
  pub review: Review,
  pub status: PublicationStatus,
  pub published_at: Option<DateTime<Utc>>,
  pub version: u64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl BlogPost {
  pub fn approval_status(&self) -> ApprovalStatus {
    self.review.status()
  }

  pub fn apply_effect(&mut self, effect: BlogEffect) {
    self.status = effect.status();
    self.published_at = effect.published_at();
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlogPost {
  pub title: String,
  #[serde(default)]
  pub content: String,
  #[serde(default)]
  pub tags: Vec<String>,
}

impl NewBlogPost {
  pub fn into_post(self, artisan_id: Uuid, now: DateTime<Utc>) -> BlogPost {
    BlogPost {
      id: Uuid::new_v4(),
      artisan_id,
      title: self.title,
      content: self.content,
      tags: self.tags,
      review: Review::Pending,
      status: PublicationStatus::Draft,
      published_at: None,
      version: 1,
      created_at: now,
      updated_at: now,
    }
  }
}
