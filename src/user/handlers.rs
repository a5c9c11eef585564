use actix_web::{get, web, HttpResponse};
use sqlx::PgPool;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::ActingUser;

use super::models::UserResponse;
use super::service::UserService;

/// GET /api/users/me - Profile of the acting user
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Acting user", body = UserResponse),
        (status = 401, description = "No acting user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[get("/users/me")]
pub async fn me(pool: web::Data<PgPool>, auth: ActingUser) -> Result<HttpResponse, AppError> {
    let user = UserService::get_by_id(pool.get_ref(), auth.user_id).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
