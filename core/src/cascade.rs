// core/src/cascade.rs

//! Decides which products and blog posts follow an artisan decision.
//!
//! Planning is pure; the plan is applied through the store's bulk transition port,
//! one batch per collection.

use crate::model::{
  ApprovalStatus, Artisan, BlogEffect, BlogPost, Product, ProductEffect, Review,
};
use crate::store::{BlogTransition, EntityStore, ProductTransition, StoreError, Transition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{event, Level};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadePlan {
  pub products: Vec<ProductTransition>,
  pub blogs: Vec<BlogTransition>,
}

impl CascadePlan {
  pub fn is_empty(&self) -> bool {
    self.products.is_empty() && self.blogs.is_empty()
  }
}

/// How many dependents a cascade actually moved. Reporting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
  pub products_affected: u64,
  pub blogs_affected: u64,
}

/// Plans the dependent transitions for an artisan that just received `review`.
///
/// Approval pulls every not-yet-approved dependent up to approved. Rejection only
/// touches pending dependents; approved content stays approved.
pub fn resolve(
  artisan: &Artisan,
  review: &Review,
  products: &[Product],
  blogs: &[BlogPost],
  now: DateTime<Utc>,
) -> CascadePlan {
  match review {
    Review::Pending => CascadePlan::default(),
    Review::Approved {
      reviewed_by,
      reviewed_at,
      ..
    } => {
      let dependent_review = Review::Approved {
        notes: format!("Auto-approved with artisan \"{}\"", artisan.display_name()),
        reviewed_by: *reviewed_by,
        reviewed_at: *reviewed_at,
      };
      CascadePlan {
        products: products
          .iter()
          .filter(|p| p.status() != ApprovalStatus::Approved)
          .map(|p| Transition {
            id: p.id,
            from: p.status(),
            review: dependent_review.clone(),
            effect: ProductEffect { is_active: true },
            at: now,
          })
          .collect(),
        blogs: blogs
          .iter()
          .filter(|b| b.approval_status() != ApprovalStatus::Approved)
          .map(|b| Transition {
            id: b.id,
            from: b.approval_status(),
            review: dependent_review.clone(),
            effect: BlogEffect::Publish { at: now },
            at: now,
          })
          .collect(),
      }
    }
    Review::Rejected {
      reason,
      reviewed_by,
      reviewed_at,
    } => {
      let dependent_review = Review::Rejected {
        reason: format!(
          "{} (auto-rejected along with artisan \"{}\")",
          reason,
          artisan.display_name()
        ),
        reviewed_by: *reviewed_by,
        reviewed_at: *reviewed_at,
      };
      CascadePlan {
        products: products
          .iter()
          .filter(|p| p.status() == ApprovalStatus::Pending)
          .map(|p| Transition {
            id: p.id,
            from: ApprovalStatus::Pending,
            review: dependent_review.clone(),
            effect: ProductEffect { is_active: false },
            at: now,
          })
          .collect(),
        blogs: blogs
          .iter()
          .filter(|b| b.approval_status() == ApprovalStatus::Pending)
          .map(|b| Transition {
            id: b.id,
            from: ApprovalStatus::Pending,
            review: dependent_review.clone(),
            effect: BlogEffect::Unpublish,
            at: now,
          })
          .collect(),
      }
    }
  }
}

/// Applies both batches. Each batch is attempted even if the other failed; the
/// first failure is returned after both ran.
pub async fn apply(store: &dyn EntityStore, plan: &CascadePlan) -> Result<CascadeReport, StoreError> {
  let products = if plan.products.is_empty() {
    Ok(0)
  } else {
    store.transition_products(&plan.products).await
  };
  let blogs = if plan.blogs.is_empty() {
    Ok(0)
  } else {
    store.transition_blog_posts(&plan.blogs).await
  };

  match (products, blogs) {
    (Ok(products_affected), Ok(blogs_affected)) => Ok(CascadeReport {
      products_affected,
      blogs_affected,
    }),
    (Err(e), Err(other)) => {
      event!(Level::ERROR, error = %other, "Blog post cascade batch failed.");
      Err(e)
    }
    (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
  }
}
