use actix_web::{error, get, web, HttpResponse, Responder};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::{budget, category, transaction, user};

/// Liveness payload
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

/// GET /health - Liveness check (does not touch the database)
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Register routes and the extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(format!(
            "Invalid request body: {err}"
        )))
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(format!("Invalid path: {err}")))
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(format!("Invalid query: {err}")))
    }))
    .service(health_check)
    .service(
        web::scope("/api")
            // Category endpoints (order matters: specific routes before generic {id} routes)
            .service(category::list_categories)
            .service(category::get_category_summary)
            .service(category::get_category)
            .service(category::create_category)
            .service(category::update_category)
            .service(category::delete_category)
            // Budget endpoints
            .service(budget::get_budget_summary)
            .service(budget::get_budget_categories)
            .service(budget::get_budget)
            .service(budget::create_budget)
            .service(budget::update_budget)
            .service(budget::delete_budget)
            // Transaction endpoints
            .service(transaction::list_transactions)
            .service(transaction::get_transaction)
            .service(transaction::create_transaction)
            .service(transaction::update_transaction)
            .service(transaction::delete_transaction)
            // User endpoints
            .service(user::me),
    );
}
