// src/web/routes.rs

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{admin_handlers as admin, seller_handlers as seller};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Extractor failures use the same `{ success, message }` body as every other error.
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid query string: {}", err)).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid path parameter: {}", err)).into()
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .app_data(web::JsonConfig::default().error_handler(json_error))
      .app_data(web::QueryConfig::default().error_handler(query_error))
      .app_data(web::PathConfig::default().error_handler(path_error))
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/seller")
          .route("/onboarding", web::post().to(seller::submit_onboarding_handler))
          .route("/onboarding/status", web::get().to(seller::onboarding_status_handler))
          .route("/profile", web::put().to(seller::update_profile_handler))
          .route("/products", web::post().to(seller::submit_product_handler))
          .route("/blogs", web::post().to(seller::submit_blog_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/pending-artisans", web::get().to(admin::pending_artisans_handler))
          .route("/artisans-with-changes", web::get().to(admin::artisans_with_changes_handler))
          .route("/approve-artisan/{id}", web::patch().to(admin::approve_artisan_handler))
          .route("/reject-artisan/{id}", web::patch().to(admin::reject_artisan_handler))
          .route(
            "/clear-artisan-changes/{id}",
            web::patch().to(admin::clear_artisan_changes_handler),
          )
          .route("/pending-products", web::get().to(admin::pending_products_handler))
          .route("/approve-product/{id}", web::patch().to(admin::approve_product_handler))
          .route("/reject-product/{id}", web::patch().to(admin::reject_product_handler))
          .route("/pending-blogs", web::get().to(admin::pending_blogs_handler))
          .route("/approve-blog/{id}", web::patch().to(admin::approve_blog_handler))
          .route("/reject-blog/{id}", web::patch().to(admin::reject_blog_handler)),
      ),
  );
}
