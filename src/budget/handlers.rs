use actix_web::{delete, get, post, put, web, HttpResponse};
use sqlx::PgPool;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::ActingUser;
use crate::models::DeleteResponse;

use super::models::{
    BudgetCategoryResponse, BudgetIdPath, BudgetResponse, BudgetSummary, CreateBudgetDto,
    UpdateBudgetDto,
};
use super::service::BudgetService;

/// GET /api/budgets - Totals across all budgets
#[utoipa::path(
    get,
    path = "/api/budgets",
    tag = "Budgets",
    responses(
        (status = 200, description = "Budget summary", body = BudgetSummary),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[get("/budgets")]
pub async fn get_budget_summary(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let summary = BudgetService::get_summary(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// GET /api/budgets/categories - Per-category budget progress
#[utoipa::path(
    get,
    path = "/api/budgets/categories",
    tag = "Budgets",
    responses(
        (status = 200, description = "Category rollups", body = Vec<BudgetCategoryResponse>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[get("/budgets/categories")]
pub async fn get_budget_categories(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let categories = BudgetService::get_budget_categories(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(categories))
}

/// GET /api/budgets/{id} - Get a specific budget by ID
#[utoipa::path(
    get,
    path = "/api/budgets/{id}",
    tag = "Budgets",
    params(BudgetIdPath),
    responses(
        (status = 200, description = "Budget details", body = BudgetResponse),
        (status = 401, description = "No acting user", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse)
    )
)]
#[get("/budgets/{id}")]
pub async fn get_budget(
    pool: web::Data<PgPool>,
    auth: ActingUser,
    path: web::Path<BudgetIdPath>,
) -> Result<HttpResponse, AppError> {
    let budget = BudgetService::get_budget_by_id(pool.get_ref(), path.id, auth.user_id).await?;

    Ok(HttpResponse::Ok().json(BudgetResponse::from(budget)))
}

/// POST /api/budgets - Create a budget, replacing the category's current one
#[utoipa::path(
    post,
    path = "/api/budgets",
    tag = "Budgets",
    request_body = CreateBudgetDto,
    responses(
        (status = 201, description = "Budget created", body = BudgetResponse),
        (status = 400, description = "Missing category ID or unknown category", body = ErrorResponse),
        (status = 409, description = "Concurrent replacement", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[post("/budgets")]
pub async fn create_budget(
    pool: web::Data<PgPool>,
    auth: ActingUser,
    body: web::Json<CreateBudgetDto>,
) -> Result<HttpResponse, AppError> {
    body.validate_fields()?;

    // an unknown category is a problem with the request body here
    let budget = BudgetService::create_budget(pool.get_ref(), auth.user_id, &body)
        .await
        .map_err(|e| match e {
            AppError::NotFound(msg) => AppError::ValidationError(msg),
            other => other,
        })?;

    Ok(HttpResponse::Created().json(BudgetResponse::from(budget)))
}

/// PUT /api/budgets/{id} - Update a budget
#[utoipa::path(
    put,
    path = "/api/budgets/{id}",
    tag = "Budgets",
    params(BudgetIdPath),
    request_body = UpdateBudgetDto,
    responses(
        (status = 200, description = "Budget updated", body = BudgetResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Budget owned by another user", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse)
    )
)]
#[put("/budgets/{id}")]
pub async fn update_budget(
    pool: web::Data<PgPool>,
    auth: ActingUser,
    path: web::Path<BudgetIdPath>,
    body: web::Json<UpdateBudgetDto>,
) -> Result<HttpResponse, AppError> {
    body.validate_fields()?;

    let budget = BudgetService::update_budget(pool.get_ref(), path.id, auth.user_id, &body).await?;

    Ok(HttpResponse::Ok().json(BudgetResponse::from(budget)))
}

/// DELETE /api/budgets/{id} - Delete a budget
#[utoipa::path(
    delete,
    path = "/api/budgets/{id}",
    tag = "Budgets",
    params(BudgetIdPath),
    responses(
        (status = 200, description = "Budget deleted", body = DeleteResponse),
        (status = 403, description = "Budget owned by another user", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse)
    )
)]
#[delete("/budgets/{id}")]
pub async fn delete_budget(
    pool: web::Data<PgPool>,
    auth: ActingUser,
    path: web::Path<BudgetIdPath>,
) -> Result<HttpResponse, AppError> {
    BudgetService::delete_budget(pool.get_ref(), path.id, auth.user_id).await?;

    Ok(HttpResponse::Ok().json(DeleteResponse::new("Budget deleted successfully", path.id)))
}
