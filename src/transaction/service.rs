use sqlx::{PgPool, Postgres};
use tracing::info;

use super::models::{
    BalanceEffect, BalanceOperation, CreateTransactionDto, Transaction, TransactionFilters,
    TransactionType, UpdateTransactionDto,
};
use crate::errors::AppError;

const TRANSACTION_COLUMNS: &str = "id, user_id, category_id, budget_id, amount, \
     transaction_date, description, transaction_type, payee, note, is_recurring, created_at, updated_at";

/// Service layer for transaction business logic.
/// Every posting moves the `spent`/`remaining` of its category and the category's
/// live budget inside the same database transaction as the row change. The budget
/// that was charged is stored on the row so a reversal never touches a budget
/// created after the posting.
pub struct TransactionService;

impl TransactionService {
    /// Record a transaction and apply its effect.
    pub async fn create_transaction(
        pool: &PgPool,
        user_id: i64,
        dto: &CreateTransactionDto,
    ) -> Result<Transaction, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Self::lock_category(&mut tx, dto.category_id).await?;

        let budget_id =
            Self::apply(&mut tx, dto.category_id, dto.amount, dto.transaction_type).await?;

        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            INSERT INTO transactions
                (user_id, category_id, budget_id, amount, transaction_date, description,
                 transaction_type, payee, note, is_recurring)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6, $7, $8, $9, $10)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(dto.category_id)
        .bind(budget_id)
        .bind(dto.amount)
        .bind(dto.transaction_date)
        .bind(dto.description.trim())
        .bind(dto.transaction_type.as_str())
        .bind(&dto.payee)
        .bind(&dto.note)
        .bind(dto.is_recurring)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(
            transaction_id = transaction.id,
            category_id = transaction.category_id,
            budget_id = transaction.budget_id,
            amount = transaction.amount,
            kind = dto.transaction_type.as_str(),
            "transaction posted"
        );

        Ok(transaction)
    }

    /// Get a single live transaction of the acting user
    pub async fn get_transaction(
        pool: &PgPool,
        user_id: i64,
        transaction_id: i64,
    ) -> Result<Transaction, AppError> {
        sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#
        ))
        .bind(transaction_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))
    }

    /// List transactions with filters, newest first
    pub async fn list_transactions(
        pool: &PgPool,
        user_id: i64,
        filters: &TransactionFilters,
    ) -> Result<(Vec<Transaction>, i64), AppError> {
        let limit = filters.limit.clamp(1, 100);
        let offset = filters.offset.max(0);
        let kind = filters.transaction_type.map(|t| t.as_str());

        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE user_id = $1
              AND deleted_at IS NULL
              AND ($2::bigint IS NULL OR category_id = $2)
              AND ($3::text IS NULL OR transaction_type = $3)
            ORDER BY transaction_date DESC, id DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(user_id)
        .bind(filters.category_id)
        .bind(kind)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM transactions
            WHERE user_id = $1
              AND deleted_at IS NULL
              AND ($2::bigint IS NULL OR category_id = $2)
              AND ($3::text IS NULL OR transaction_type = $3)
            "#,
        )
        .bind(user_id)
        .bind(filters.category_id)
        .bind(kind)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok((transactions, total))
    }

    /// Update a transaction: reverse the old posting, apply the new one.
    pub async fn update_transaction(
        pool: &PgPool,
        user_id: i64,
        transaction_id: i64,
        dto: &UpdateTransactionDto,
    ) -> Result<Transaction, AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let old = Self::lock_transaction(&mut tx, user_id, transaction_id).await?;

        let new_category_id = dto.category_id.unwrap_or(old.category_id);
        let new_amount = dto.amount.unwrap_or(old.amount);
        let new_type = dto.transaction_type.unwrap_or(old.get_type());

        // lock in id order so two updates moving between the same pair cannot deadlock
        let mut category_ids = vec![old.category_id, new_category_id];
        category_ids.sort_unstable();
        category_ids.dedup();
        for category_id in category_ids {
            if category_id == new_category_id && new_category_id != old.category_id {
                Self::lock_category(&mut tx, category_id).await?;
            } else {
                Self::lock_any_category(&mut tx, category_id).await?;
            }
        }

        Self::reverse(&mut tx, &old).await?;
        let new_budget_id = Self::apply(&mut tx, new_category_id, new_amount, new_type).await?;

        let updated = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            UPDATE transactions SET
                category_id = $2,
                budget_id = $3,
                amount = $4,
                transaction_date = $5,
                description = $6,
                transaction_type = $7,
                payee = $8,
                note = $9,
                is_recurring = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(transaction_id)
        .bind(new_category_id)
        .bind(new_budget_id)
        .bind(new_amount)
        .bind(dto.transaction_date.unwrap_or(old.transaction_date))
        .bind(
            dto.description
                .as_deref()
                .map(str::trim)
                .unwrap_or(&old.description),
        )
        .bind(new_type.as_str())
        .bind(dto.payee.clone().or(old.payee))
        .bind(dto.note.clone().or(old.note))
        .bind(dto.is_recurring.unwrap_or(old.is_recurring))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(transaction_id, "transaction updated");

        Ok(updated)
    }

    /// Reverse a transaction's effect and tombstone it.
    pub async fn delete_transaction(
        pool: &PgPool,
        user_id: i64,
        transaction_id: i64,
    ) -> Result<(), AppError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let transaction = Self::lock_transaction(&mut tx, user_id, transaction_id).await?;

        // the category may already be deleted; its figures are still restored
        Self::lock_any_category(&mut tx, transaction.category_id).await?;
        Self::reverse(&mut tx, &transaction).await?;

        sqlx::query(
            "UPDATE transactions SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(transaction_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(transaction_id, "transaction deleted");

        Ok(())
    }

    /// Lock an active category row; NotFound when it is missing or deleted.
    async fn lock_category(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        category_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM categories WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(category_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    async fn lock_any_category(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        category_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query("SELECT 1 FROM categories WHERE id = $1 FOR UPDATE")
            .bind(category_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        Ok(())
    }

    async fn lock_transaction(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        user_id: i64,
        transaction_id: i64,
    ) -> Result<Transaction, AppError> {
        sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            FOR UPDATE
            "#
        ))
        .bind(transaction_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))
    }

    /// Charge a posting to the category and its live budget.
    /// Returns the id of the budget that was charged, if any.
    async fn apply(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        category_id: i64,
        amount: f64,
        transaction_type: TransactionType,
    ) -> Result<Option<i64>, AppError> {
        let effect = BalanceEffect::of(amount, transaction_type, BalanceOperation::Apply);

        Self::move_category(tx, category_id, effect).await?;

        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE budgets
            SET spent = spent + $1, remaining = remaining + $2, updated_at = NOW()
            WHERE category_id = $3 AND deleted_at IS NULL
            RETURNING id
            "#,
        )
        .bind(effect.spent)
        .bind(effect.remaining)
        .bind(category_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Undo a stored posting. Only the budget it was charged to is touched, and
    /// only while that budget is still live.
    async fn reverse(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        transaction: &Transaction,
    ) -> Result<(), AppError> {
        let effect = BalanceEffect::of(
            transaction.amount,
            transaction.get_type(),
            BalanceOperation::Reverse,
        );

        Self::move_category(tx, transaction.category_id, effect).await?;

        if let Some(budget_id) = transaction.budget_id {
            sqlx::query(
                r#"
                UPDATE budgets
                SET spent = spent + $1, remaining = remaining + $2, updated_at = NOW()
                WHERE id = $3 AND deleted_at IS NULL
                "#,
            )
            .bind(effect.spent)
            .bind(effect.remaining)
            .bind(budget_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        Ok(())
    }

    async fn move_category(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        category_id: i64,
        effect: BalanceEffect,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE categories
            SET spent = spent + $1, remaining = remaining + $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(effect.spent)
        .bind(effect.remaining)
        .bind(category_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(())
    }
}
