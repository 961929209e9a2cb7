// tests/common/mod.rs
#![allow(dead_code)]

use artisan_approval::flow::{FlowContext, FlowControl, FlowError, Handler};
use artisan_approval::{
  ApprovalEngine, ApprovalStatus, Artisan, ArtisanProfile, BlogPost, BusinessInfo, EntityStore, MemoryStore,
  NewBlogPost, NewProduct, Product, Review,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

// --- Flow engine fixtures ---

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub halt_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Flow error: {0}")]
  Flow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(format!("{:?}", e))
  }
}

pub fn create_simple_handler(step_name: &'static str, message_to_append: &'static str) -> Handler<TestContext, TestError> {
  Box::new(move |ctx: FlowContext<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, counter = guard.counter, "executed");
      if guard.halt_at.as_deref() == Some(step_name) {
        return Ok(FlowControl::Halt);
      }
      Ok(FlowControl::Continue)
    })
  })
}

pub fn create_failing_handler(step_name: &'static str, error_message: &'static str) -> Handler<TestContext, TestError> {
  Box::new(move |ctx: FlowContext<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      tracing::warn!(target: "test_handlers", step = step_name, "failing with: '{}'", error_message);
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

// --- Tracing ---

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Workflow fixtures ---

pub fn engine() -> (ApprovalEngine, Arc<MemoryStore>) {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = ApprovalEngine::new(store.clone());
  (engine, store)
}

pub fn profile(name: &str) -> ArtisanProfile {
  ArtisanProfile {
    name: name.to_string(),
    bio: format!("{} makes things by hand.", name),
    specialties: vec!["ceramics".to_string()],
    craft_description: "Wheel-thrown stoneware".to_string(),
    business_info: BusinessInfo {
      business_name: format!("{} Studio", name),
      business_type: "sole_proprietor".to_string(),
      ..Default::default()
    },
    ..Default::default()
  }
}

pub fn new_product(name: &str) -> NewProduct {
  NewProduct {
    name: name.to_string(),
    description: format!("A handmade {}", name),
    price_cents: 4200,
    stock_quantity: 3,
    category: Some("home".to_string()),
  }
}

pub fn new_post(title: &str) -> NewBlogPost {
  NewBlogPost {
    title: title.to_string(),
    content: "From the workshop".to_string(),
    tags: vec!["process".to_string()],
  }
}

pub fn settled_review(status: ApprovalStatus) -> Review {
  match status {
    ApprovalStatus::Pending => Review::Pending,
    ApprovalStatus::Approved => Review::Approved {
      notes: "looks great".to_string(),
      reviewed_by: Uuid::new_v4(),
      reviewed_at: Utc::now(),
    },
    ApprovalStatus::Rejected => Review::Rejected {
      reason: "blurry photos".to_string(),
      reviewed_by: Uuid::new_v4(),
      reviewed_at: Utc::now(),
    },
  }
}

/// Onboards a fresh user and returns the pending artisan.
pub async fn onboard(engine: &ApprovalEngine, name: &str) -> Artisan {
  engine
    .submit_onboarding(Uuid::new_v4(), profile(name))
    .await
    .expect("onboarding should succeed")
}

/// Inserts a product owned by `artisan_id` directly in the given state.
pub async fn seed_product(store: &MemoryStore, artisan_id: Uuid, status: ApprovalStatus) -> Product {
  let mut product = new_product(&format!("{} item", status)).into_product(artisan_id, Utc::now());
  product.review = settled_review(status);
  product.is_active = status == ApprovalStatus::Approved;
  store.insert_product(&product).await.expect("insert product");
  product
}

pub async fn seed_post(store: &MemoryStore, artisan_id: Uuid, status: ApprovalStatus) -> BlogPost {
  let mut post = new_post(&format!("{} post", status)).into_post(artisan_id, Utc::now());
  post.review = settled_review(status);
  if status == ApprovalStatus::Approved {
    post.status = artisan_approval::PublicationStatus::Published;
    post.published_at = Some(Utc::now());
  }
  store.insert_blog_post(&post).await.expect("insert blog post");
  post
}

pub async fn product_status(store: &MemoryStore, id: Uuid) -> ApprovalStatus {
  store.find_product(id).await.unwrap().unwrap().status()
}
