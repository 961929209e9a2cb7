// src/web/handlers/seller_handlers.rs

use actix_web::{web, HttpResponse};
use artisan_approval::{ArtisanProfile, NewBlogPost, NewProduct, ProfileUpdate};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SellerUser;

#[instrument(
  name = "handler::submit_onboarding",
  skip(app_state, payload, seller),
  fields(user_id = %seller.user_id)
)]
pub async fn submit_onboarding_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ArtisanProfile>,
  seller: SellerUser,
) -> Result<HttpResponse, AppError> {
  let artisan = app_state
    .engine
    .submit_onboarding(seller.user_id, payload.into_inner())
    .await?;
  info!(artisan_id = %artisan.id, "Onboarding application received.");

  Ok(HttpResponse::Created().json(json!({
    "success": true,
    "message": "Application submitted. An admin will review it shortly.",
    "artisan": artisan,
  })))
}

#[instrument(name = "handler::onboarding_status", skip(app_state, seller), fields(user_id = %seller.user_id))]
pub async fn onboarding_status_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
) -> Result<HttpResponse, AppError> {
  let status = app_state.engine.onboarding_status(seller.user_id).await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "onboardingStatus": status.onboarding_status,
    "artisan": status.artisan,
  })))
}

#[instrument(name = "handler::update_profile", skip(app_state, payload, seller), fields(user_id = %seller.user_id))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ProfileUpdate>,
  seller: SellerUser,
) -> Result<HttpResponse, AppError> {
  let artisan = app_state.engine.artisan_for_user(seller.user_id).await?;
  let artisan = app_state
    .engine
    .update_artisan_profile(artisan.id, payload.into_inner())
    .await?;
  info!(
    artisan_id = %artisan.id,
    flagged = artisan.pending_changes.has_changes,
    "Profile updated."
  );

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Profile updated successfully.",
    "artisan": artisan,
  })))
}

#[instrument(name = "handler::submit_product", skip(app_state, payload, seller), fields(user_id = %seller.user_id))]
pub async fn submit_product_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<NewProduct>,
  seller: SellerUser,
) -> Result<HttpResponse, AppError> {
  let product = app_state.engine.submit_product(seller.user_id, payload.into_inner()).await?;

  Ok(HttpResponse::Created().json(json!({
    "success": true,
    "message": "Product submitted for review.",
    "product": product,
  })))
}

#[instrument(name = "handler::submit_blog", skip(app_state, payload, seller), fields(user_id = %seller.user_id))]
pub async fn submit_blog_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<NewBlogPost>,
  seller: SellerUser,
) -> Result<HttpResponse, AppError> {
  let post = app_state.engine.submit_blog_post(seller.user_id, payload.into_inner()).await?;

  Ok(HttpResponse::Created().json(json!({
    "success": true,
    "message": "Blog post submitted for review.",
    "blogPost": post,
  })))
}
