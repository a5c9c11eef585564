use sqlx::PgPool;
use tracing::info;

use super::models::{
    Budget, BudgetCategoryResponse, BudgetSummary, BudgetTotalsRow, CategoryBudgetRow,
    CreateBudgetDto, UpdateBudgetDto,
};
use crate::errors::AppError;

const BUDGET_COLUMNS: &str = "id, user_id, category_id, amount, spent, remaining, is_fixed, \
     is_flexible, min_amount, max_amount, created_at, updated_at";

/// Service layer for budget business logic.
pub struct BudgetService;

impl BudgetService {
    /// Replace the live budget of a category.
    /// Locking the category row, retiring the old budget and inserting the new one
    /// happen in one database transaction, so a category never has two live budgets.
    pub async fn create_budget(
        pool: &PgPool,
        user_id: i64,
        dto: &CreateBudgetDto,
    ) -> Result<Budget, AppError> {
        let category_id = dto.category_id()?;
        let amount = dto.amount()?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let category_exists = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM categories WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(category_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .is_some();

        if !category_exists {
            return Err(AppError::NotFound(
                "Category not found. Please create the category first.".to_string(),
            ));
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

        let budget = sqlx::query_as::<_, Budget>(&format!(
            r#"
            INSERT INTO budgets
                (user_id, category_id, amount, spent, remaining, is_fixed, is_flexible,
                 min_amount, max_amount)
            VALUES ($1, $2, $3, 0, $3, $4, $5, $6, $7)
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(category_id)
        .bind(amount)
        .bind(dto.is_fixed)
        .bind(dto.is_flexible)
        .bind(dto.min_amount)
        .bind(dto.max_amount)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            budget_id = budget.id,
            category_id,
            replaced = retired,
            "budget created"
        );

        Ok(budget)
    }

    /// Get a live budget by ID, scoped to the acting user.
    pub async fn get_budget_by_id(
        pool: &PgPool,
        budget_id: i64,
        user_id: i64,
    ) -> Result<Budget, AppError> {
        sqlx::query_as::<_, Budget>(&format!(
            r#"
            SELECT {BUDGET_COLUMNS}
            FROM budgets
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#
        ))
        .bind(budget_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Budget not found".to_string()))
    }

    /// Fetch a live budget regardless of owner
    async fn find_live(pool: &PgPool, budget_id: i64) -> Result<Budget, AppError> {
        sqlx::query_as::<_, Budget>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(budget_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Budget not found".to_string()))
    }

    /// Update a budget (partial update). Missing → NotFound, foreign → Forbidden.
    /// Locks the category then the budget, the same order postings use, so the
    /// figures written back are never older than a concurrent posting.
    pub async fn update_budget(
        pool: &PgPool,
        budget_id: i64,
        user_id: i64,
        dto: &UpdateBudgetDto,
    ) -> Result<Budget, AppError> {
        let category_id = Self::find_live(pool, budget_id).await?.category_id;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        sqlx::query("SELECT 1 FROM categories WHERE id = $1 FOR UPDATE")
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // re-read under the lock; the budget may have been replaced meanwhile
        let current = sqlx::query_as::<_, Budget>(&format!(
            r#"
            SELECT {BUDGET_COLUMNS}
            FROM budgets
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#
        ))
        .bind(budget_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Budget not found".to_string()))?;
        current.ensure_owned_by(user_id, "update")?;

        let min_amount = dto.min_amount.unwrap_or(current.min_amount);
        let max_amount = dto.max_amount.unwrap_or(current.max_amount);
        if max_amount > 0.0 && min_amount > max_amount {
            return Err(AppError::ValidationError(
                "minAmount must not exceed maxAmount".to_string(),
            ));
        }

        let budget = sqlx::query_as::<_, Budget>(&format!(
            r#"
            UPDATE budgets
            SET amount = $2, spent = $3, remaining = $4, is_fixed = $5, is_flexible = $6,
                min_amount = $7, max_amount = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(budget_id)
        .bind(dto.amount.unwrap_or(current.amount))
        .bind(dto.spent.unwrap_or(current.spent))
        .bind(dto.remaining.unwrap_or(current.remaining))
        .bind(dto.is_fixed.unwrap_or(current.is_fixed))
        .bind(dto.is_flexible.unwrap_or(current.is_flexible))
        .bind(min_amount)
        .bind(max_amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(budget)
    }

    /// Soft-delete a budget. Missing → NotFound, foreign → Forbidden.
    pub async fn delete_budget(
        pool: &PgPool,
        budget_id: i64,
        user_id: i64,
    ) -> Result<(), AppError> {
        let current = Self::find_live(pool, budget_id).await?;
        current.ensure_owned_by(user_id, "delete")?;

        let result = sqlx::query(
            r#"
            UPDATE budgets
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(budget_id)
        .execute(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Budget not found".to_string()));
        }

        info!(budget_id, "budget deleted");

        Ok(())
    }

    /// Totals across every live budget (not scoped to a user).
    pub async fn get_summary(pool: &PgPool) -> Result<BudgetSummary, AppError> {
        let rows = sqlx::query_as::<_, BudgetTotalsRow>(
            r#"
            SELECT amount, remaining, is_fixed, is_flexible
            FROM budgets
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(BudgetSummary::from_rows(&rows))
    }

    /// Every active category with the figures of its live budget, zeros when it has none.
    pub async fn get_budget_categories(
        pool: &PgPool,
    ) -> Result<Vec<BudgetCategoryResponse>, AppError> {
        let rows = sqlx::query_as::<_, CategoryBudgetRow>(
            r#"
            SELECT
                c.id,
                c.name,
                COALESCE(b.amount, 0) AS budgeted,
                COALESCE(b.remaining, 0) AS remaining,
                COALESCE(b.is_fixed, FALSE) AS is_fixed,
                COALESCE(b.is_flexible, FALSE) AS is_flexible
            FROM categories c
            LEFT JOIN budgets b ON b.category_id = c.id AND b.deleted_at IS NULL
            WHERE c.deleted_at IS NULL
            ORDER BY c.id ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
