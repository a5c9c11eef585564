use sqlx::PgPool;
use tracing::info;

use super::models::User;
use crate::errors::AppError;

const USER_COLUMNS: &str = "id, email, password_hash, name, created_at, updated_at";

pub struct UserService;

impl UserService {
    /// Insert the user with this exact id unless that id already exists.
    /// An email held by a different id is a Conflict.
    pub async fn ensure_user(
        pool: &PgPool,
        user_id: i64,
        email: &str,
        name: &str,
    ) -> Result<User, AppError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, email, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("Email {email} belongs to another user"))
            }
            other => AppError::InternalError(other.to_string()),
        })?
        .rows_affected();

        if inserted > 0 {
            // explicit ids bypass the sequence; move it past them
            sqlx::query(
                "SELECT setval(pg_get_serial_sequence('users', 'id'), (SELECT MAX(id) FROM users))",
            )
            .execute(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

            info!(user_id, email, "acting user seeded");
        }

        Self::get_by_id(pool, user_id).await
    }

    /// Get an active user by ID
    pub async fn get_by_id(pool: &PgPool, user_id: i64) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
