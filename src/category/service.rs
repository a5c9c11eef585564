use sqlx::PgPool;
use tracing::info;

use super::models::{Category, CreateCategoryDto, UpdateCategoryDto};
use crate::errors::AppError;

const CATEGORY_COLUMNS: &str = "id, user_id, name, amount, spent, remaining, is_fixed, \
     is_flexible, min_amount, max_amount, color, icon, created_at, updated_at";

/// Service layer for category business logic.
pub struct CategoryService;

impl CategoryService {
    /// All active categories in insertion order
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE deleted_at IS NULL ORDER BY id ASC"
        ))
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Get an active category by ID
    pub async fn get_by_id(pool: &PgPool, category_id: i64) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(category_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    /// Create a new category owned by `user_id`. Remaining starts at the full amount.
    pub async fn create(
        pool: &PgPool,
        dto: &CreateCategoryDto,
        user_id: i64,
    ) -> Result<Category, AppError> {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories
                (user_id, name, amount, spent, remaining, is_fixed, is_flexible,
                 min_amount, max_amount, color, icon)
            VALUES ($1, $2, $3, 0, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&name)
        .bind(dto.amount)
        .bind(dto.is_fixed)
        .bind(dto.is_flexible)
        .bind(dto.min_amount)
        .bind(dto.max_amount)
        .bind(&dto.color)
        .bind(&dto.icon)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(category_id = category.id, name = %category.name, "category created");

        Ok(category)
    }

    /// Overwrite the provided fields of an existing category.
    /// The row stays locked from read to write so a concurrent posting is not lost.
    pub async fn update(
        pool: &PgPool,
        category_id: i64,
        dto: &UpdateCategoryDto,
    ) -> Result<Category, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let existing = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM categories
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#
        ))
        .bind(category_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

        let new_name = match &dto.name {
            Some(n) => {
                let trimmed = n.trim().to_string();
                if trimmed.is_empty() {
                    return Err(AppError::ValidationError(
                        "Name cannot be empty".to_string(),
                    ));
                }
                trimmed
            }
            None => existing.name,
        };

        let min_amount = dto.min_amount.unwrap_or(existing.min_amount);
        let max_amount = dto.max_amount.unwrap_or(existing.max_amount);
        if max_amount > 0.0 && min_amount > max_amount {
            return Err(AppError::ValidationError(
                "minAmount must not exceed maxAmount".to_string(),
            ));
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET name = $2, amount = $3, spent = $4, remaining = $5, is_fixed = $6,
                is_flexible = $7, min_amount = $8, max_amount = $9, color = $10, icon = $11,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(category_id)
        .bind(&new_name)
        .bind(dto.amount.unwrap_or(existing.amount))
        .bind(dto.spent.unwrap_or(existing.spent))
        .bind(dto.remaining.unwrap_or(existing.remaining))
        .bind(dto.is_fixed.unwrap_or(existing.is_fixed))
        .bind(dto.is_flexible.unwrap_or(existing.is_flexible))
        .bind(min_amount)
        .bind(max_amount)
        .bind(dto.color.clone().or(existing.color))
        .bind(dto.icon.clone().or(existing.icon))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(category)
    }

    /// Soft-delete a category together with its live budget
    pub async fn delete(pool: &PgPool, category_id: i64) -> Result<(), AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(category_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        let retired = sqlx::query(
            r#"
            UPDATE budgets
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE category_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(category_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(category_id, retired_budgets = retired, "category deleted");

        Ok(())
    }
}
