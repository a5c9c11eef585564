use actix_web::{delete, get, post, put, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::ActingUser;
use crate::models::DeleteResponse;

use super::models::{CategoryIdPath, CategoryResponse, CreateCategoryDto, UpdateCategoryDto};
use super::service::CategoryService;

/// GET /api/categories - List all active categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "List of categories", body = Vec<CategoryResponse>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[get("/categories")]
pub async fn list_categories(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let categories = CategoryService::list(pool.get_ref()).await?;

    let response: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/categories/summary - Category overview (same rows as the list)
#[utoipa::path(
    get,
    path = "/api/categories/summary",
    tag = "Categories",
    responses(
        (status = 200, description = "List of categories", body = Vec<CategoryResponse>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[get("/categories/summary")]
pub async fn get_category_summary(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let categories = CategoryService::list(pool.get_ref()).await?;

    let response: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/categories/{id} - Get a specific category
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(CategoryIdPath),
    responses(
        (status = 200, description = "Category details", body = CategoryResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
#[get("/categories/{id}")]
pub async fn get_category(
    pool: web::Data<PgPool>,
    path: web::Path<CategoryIdPath>,
) -> Result<HttpResponse, AppError> {
    let category = CategoryService::get_by_id(pool.get_ref(), path.id).await?;

    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// POST /api/categories - Create a new category
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[post("/categories")]
pub async fn create_category(
    pool: web::Data<PgPool>,
    auth: ActingUser,
    body: web::Json<CreateCategoryDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    body.validate_fields()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let category = CategoryService::create(pool.get_ref(), &body, auth.user_id).await?;

    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

/// PUT /api/categories/{id} - Update a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(CategoryIdPath),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
#[put("/categories/{id}")]
pub async fn update_category(
    pool: web::Data<PgPool>,
    path: web::Path<CategoryIdPath>,
    body: web::Json<UpdateCategoryDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    body.validate_fields()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let category = CategoryService::update(pool.get_ref(), path.id, &body).await?;

    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// DELETE /api/categories/{id} - Soft-delete a category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(CategoryIdPath),
    responses(
        (status = 200, description = "Category deleted", body = DeleteResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    pool: web::Data<PgPool>,
    path: web::Path<CategoryIdPath>,
) -> Result<HttpResponse, AppError> {
    CategoryService::delete(pool.get_ref(), path.id).await?;

    Ok(HttpResponse::Ok().json(DeleteResponse::new(
        "Category deleted successfully",
        path.id,
    )))
}
