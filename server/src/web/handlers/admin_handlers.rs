// src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use artisan_approval::{ApprovalStatus, Decision};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{optional_body, page_json, ListParams};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePayload {
  pub approval_notes: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RejectPayload {
  #[serde(default)]
  pub rejection_reason: String,
}

// An empty approve body means no notes. Anything else must parse.
fn approval(admin: AdminUser, body: &[u8]) -> Result<Decision, AppError> {
  let payload: ApprovePayload = optional_body(body)?;
  Ok(Decision::approve(admin.admin_id, payload.approval_notes))
}

// An empty reject body yields an empty reason, which the engine refuses as MissingReason.
fn rejection(admin: AdminUser, body: &[u8]) -> Result<Decision, AppError> {
  let payload: RejectPayload = optional_body(body)?;
  Ok(Decision::reject(admin.admin_id, payload.rejection_reason))
}

// --- Artisans ---

#[instrument(name = "handler::pending_artisans", skip(app_state, params, _admin))]
pub async fn pending_artisans_handler(
  app_state: web::Data<AppState>,
  params: web::Query<ListParams>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let query = params
    .into_inner()
    .into_query(Some(ApprovalStatus::Pending), app_state.config.default_page_size);
  let page = app_state.engine.list_artisans(query).await?;
  Ok(HttpResponse::Ok().json(page_json(page)))
}

#[instrument(name = "handler::artisans_with_changes", skip(app_state, params, _admin))]
pub async fn artisans_with_changes_handler(
  app_state: web::Data<AppState>,
  params: web::Query<ListParams>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let mut query = params.into_inner().into_query(None, app_state.config.default_page_size);
  query.pending_changes_only = true;
  let page = app_state.engine.list_artisans(query).await?;
  Ok(HttpResponse::Ok().json(page_json(page)))
}

#[instrument(
  name = "handler::approve_artisan",
  skip(app_state, path, body, admin),
  fields(artisan_id = %path.as_ref(), admin_id = %admin.admin_id)
)]
pub async fn approve_artisan_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  body: web::Bytes,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let outcome = app_state
    .engine
    .decide_artisan(path.into_inner(), approval(admin, &body)?)
    .await?;
  info!(
    products = outcome.cascade.products_affected,
    blogs = outcome.cascade.blogs_affected,
    "Artisan approved."
  );

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Artisan approved successfully.",
    "artisan": outcome.artisan,
    "cascade": outcome.cascade,
  })))
}

#[instrument(
  name = "handler::reject_artisan",
  skip(app_state, path, body, admin),
  fields(artisan_id = %path.as_ref(), admin_id = %admin.admin_id)
)]
pub async fn reject_artisan_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  body: web::Bytes,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let outcome = app_state
    .engine
    .decide_artisan(path.into_inner(), rejection(admin, &body)?)
    .await?;
  info!(
    products = outcome.cascade.products_affected,
    blogs = outcome.cascade.blogs_affected,
    "Artisan rejected."
  );

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Artisan rejected.",
    "artisan": outcome.artisan,
    "cascade": outcome.cascade,
  })))
}

#[instrument(
  name = "handler::clear_artisan_changes",
  skip(app_state, path, admin),
  fields(artisan_id = %path.as_ref(), admin_id = %admin.admin_id)
)]
pub async fn clear_artisan_changes_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let artisan = app_state
    .engine
    .clear_change_notification(path.into_inner(), admin.admin_id)
    .await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Change notification cleared.",
    "artisan": artisan,
  })))
}

// --- Products ---

#[instrument(name = "handler::pending_products", skip(app_state, params, _admin))]
pub async fn pending_products_handler(
  app_state: web::Data<AppState>,
  params: web::Query<ListParams>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let query = params
    .into_inner()
    .into_query(Some(ApprovalStatus::Pending), app_state.config.default_page_size);
  let page = app_state.engine.list_products(query).await?;
  Ok(HttpResponse::Ok().json(page_json(page)))
}

#[instrument(
  name = "handler::approve_product",
  skip(app_state, path, body, admin),
  fields(product_id = %path.as_ref(), admin_id = %admin.admin_id)
)]
pub async fn approve_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  body: web::Bytes,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .engine
    .decide_product(path.into_inner(), approval(admin, &body)?)
    .await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Product approved successfully.",
    "product": product,
  })))
}

#[instrument(
  name = "handler::reject_product",
  skip(app_state, path, body, admin),
  fields(product_id = %path.as_ref(), admin_id = %admin.admin_id)
)]
pub async fn reject_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  body: web::Bytes,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .engine
    .decide_product(path.into_inner(), rejection(admin, &body)?)
    .await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Product rejected.",
    "product": product,
  })))
}

// --- Blog posts ---

#[instrument(name = "handler::pending_blogs", skip(app_state, params, _admin))]
pub async fn pending_blogs_handler(
  app_state: web::Data<AppState>,
  params: web::Query<ListParams>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let query = params
    .into_inner()
    .into_query(Some(ApprovalStatus::Pending), app_state.config.default_page_size);
  let page = app_state.engine.list_blog_posts(query).await?;
  Ok(HttpResponse::Ok().json(page_json(page)))
}

#[instrument(
  name = "handler::approve_blog",
  skip(app_state, path, body, admin),
  fields(blog_id = %path.as_ref(), admin_id = %admin.admin_id)
)]
pub async fn approve_blog_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  body: web::Bytes,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let post = app_state
    .engine
    .decide_blog_post(path.into_inner(), approval(admin, &body)?)
    .await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Blog post approved and published.",
    "blogPost": post,
  })))
}

#[instrument(
  name = "handler::reject_blog",
  skip(app_state, path, body, admin),
  fields(blog_id = %path.as_ref(), admin_id = %admin.admin_id)
)]
pub async fn reject_blog_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  body: web::Bytes,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let post = app_state
    .engine
    .decide_blog_post(path.into_inner(), rejection(admin, &body)?)
    .await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Blog post rejected.",
    "blogPost": post,
  })))
}
