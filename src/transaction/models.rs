use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::{invalid, validate_positive};

/// Transaction type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money spent (consumes the category's budget)
    #[default]
    Expense,
    /// Money received (gives budget back to the category)
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "expense" => Some(TransactionType::Expense),
            "income" => Some(TransactionType::Income),
            _ => None,
        }
    }
}

/// Indicates whether to apply or reverse a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceOperation {
    Apply,
    Reverse,
}

/// Change to a category's (and its live budget's) `spent` / `remaining`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceEffect {
    pub spent: f64,
    pub remaining: f64,
}

impl BalanceEffect {
    pub fn of(amount: f64, transaction_type: TransactionType, operation: BalanceOperation) -> Self {
        let signed = match transaction_type {
            TransactionType::Expense => amount,
            TransactionType::Income => -amount,
        };
        let signed = match operation {
            BalanceOperation::Apply => signed,
            BalanceOperation::Reverse => -signed,
        };

        Self {
            spent: signed,
            remaining: -signed,
        }
    }
}

/// Database model for transactions
#[derive(Debug, Clone, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    /// Budget the posting was charged to, if the category had one at the time
    pub budget_id: Option<i64>,
    pub amount: f64,
    pub transaction_date: DateTime<Utc>,
    pub description: String,
    pub transaction_type: String,
    pub payee: Option<String>,
    pub note: Option<String>,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn get_type(&self) -> TransactionType {
        TransactionType::parse(&self.transaction_type).unwrap_or_default()
    }
}

/// Transaction information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[schema(example = 1)]
    pub id: i64,
    pub user_id: i64,
    #[schema(example = 3)]
    pub category_id: i64,
    #[schema(example = 7)]
    pub budget_id: Option<i64>,
    /// Always positive; the type carries the direction
    #[schema(example = 50.0)]
    pub amount: f64,
    pub transaction_date: DateTime<Utc>,
    #[schema(example = "Weekly groceries")]
    pub description: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub payee: Option<String>,
    pub note: Option<String>,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            transaction_type: t.get_type(),
            id: t.id,
            user_id: t.user_id,
            category_id: t.category_id,
            budget_id: t.budget_id,
            amount: t.amount,
            transaction_date: t.transaction_date,
            description: t.description,
            payee: t.payee,
            note: t.note,
            is_recurring: t.is_recurring,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Request body for creating a transaction
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionDto {
    #[schema(example = 3)]
    pub category_id: i64,

    /// Must be positive
    #[schema(example = 50.0)]
    pub amount: f64,

    /// Defaults to now
    pub transaction_date: Option<DateTime<Utc>>,

    #[validate(length(max = 200, message = "Description cannot exceed 200 characters"))]
    #[serde(default)]
    #[schema(example = "Weekly groceries")]
    pub description: String,

    #[serde(default, rename = "type")]
    pub transaction_type: TransactionType,

    #[validate(length(max = 100, message = "Payee cannot exceed 100 characters"))]
    pub payee: Option<String>,

    #[validate(length(max = 500, message = "Note cannot exceed 500 characters"))]
    pub note: Option<String>,

    #[serde(default)]
    pub is_recurring: bool,
}

impl CreateTransactionDto {
    pub fn validate_fields(&self) -> Result<(), ValidationError> {
        if self.category_id <= 0 {
            return Err(invalid("category_id_required", "Category ID is required"));
        }
        validate_positive(self.amount)
    }
}

/// Request body for updating a transaction (all fields optional)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionDto {
    pub category_id: Option<i64>,

    #[schema(example = 75.0)]
    pub amount: Option<f64>,

    pub transaction_date: Option<DateTime<Utc>>,

    #[validate(length(max = 200, message = "Description cannot exceed 200 characters"))]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,

    #[validate(length(max = 100, message = "Payee cannot exceed 100 characters"))]
    pub payee: Option<String>,

    #[validate(length(max = 500, message = "Note cannot exceed 500 characters"))]
    pub note: Option<String>,

    pub is_recurring: Option<bool>,
}

impl UpdateTransactionDto {
    /// Validate amount if provided
    pub fn validate_amount(&self) -> Result<(), ValidationError> {
        if let Some(amount) = self.amount {
            validate_positive(amount)?;
        }
        if matches!(self.category_id, Some(id) if id <= 0) {
            return Err(invalid("category_id_required", "Category ID is required"));
        }
        Ok(())
    }
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    /// Filter by category
    pub category_id: Option<i64>,

    /// Filter by type (expense, income)
    #[serde(rename = "type")]
    #[param(example = "expense")]
    pub transaction_type: Option<TransactionType>,

    /// Maximum results (1-100)
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    #[param(example = 50)]
    pub limit: i64,

    /// Number of results to skip
    #[validate(range(min = 0))]
    #[serde(default)]
    #[param(example = 0)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedTransactionResponse {
    pub data: Vec<TransactionResponse>,
    /// Total count matching filters
    #[schema(example = 100)]
    pub total: i64,
    #[schema(example = 50)]
    pub limit: i64,
    #[schema(example = 0)]
    pub offset: i64,
}

/// Path parameters for transaction ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionIdPath {
    /// Transaction ID
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_consumes_budget() {
        let effect = BalanceEffect::of(30.0, TransactionType::Expense, BalanceOperation::Apply);
        assert_eq!(effect.spent, 30.0);
        assert_eq!(effect.remaining, -30.0);
    }

    #[test]
    fn test_income_gives_budget_back() {
        let effect = BalanceEffect::of(30.0, TransactionType::Income, BalanceOperation::Apply);
        assert_eq!(effect.spent, -30.0);
        assert_eq!(effect.remaining, 30.0);
    }

    #[test]
    fn test_reverse_cancels_apply() {
        for kind in [TransactionType::Expense, TransactionType::Income] {
            let applied = BalanceEffect::of(12.5, kind, BalanceOperation::Apply);
            let reversed = BalanceEffect::of(12.5, kind, BalanceOperation::Reverse);
            assert_eq!(applied.spent + reversed.spent, 0.0);
            assert_eq!(applied.remaining + reversed.remaining, 0.0);
        }
    }

    #[test]
    fn test_type_round_trips_through_text() {
        assert_eq!(TransactionType::parse("income"), Some(TransactionType::Income));
        assert_eq!(
            TransactionType::parse(TransactionType::Expense.as_str()),
            Some(TransactionType::Expense)
        );
        assert_eq!(TransactionType::parse("transfer"), None);
    }

    #[test]
    fn test_create_defaults() {
        let dto: CreateTransactionDto =
            serde_json::from_str(r#"{"categoryId":3,"amount":20}"#).expect("Should deserialize");

        assert_eq!(dto.transaction_type, TransactionType::Expense);
        assert!(dto.description.is_empty());
        assert!(dto.transaction_date.is_none());
        assert!(dto.validate_fields().is_ok());
    }

    #[test]
    fn test_create_rejects_non_positive_amount() {
        let dto: CreateTransactionDto =
            serde_json::from_str(r#"{"categoryId":3,"amount":0}"#).expect("Should deserialize");
        assert!(dto.validate_fields().is_err());
    }

    #[test]
    fn test_create_rejects_unknown_type() {
        let result = serde_json::from_str::<CreateTransactionDto>(
            r#"{"categoryId":3,"amount":5,"type":"transfer"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_update_rejects_negative_amount() {
        let dto = UpdateTransactionDto {
            amount: Some(-1.0),
            ..Default::default()
        };
        assert!(dto.validate_amount().is_err());
    }

    #[test]
    fn test_filters_default_limit() {
        let filters: TransactionFilters = serde_json::from_str("{}").expect("Should deserialize");
        assert_eq!(filters.limit, 50);
        assert_eq!(filters.offset, 0);
        assert!(filters.validate().is_ok());

        let filters: TransactionFilters =
            serde_json::from_str(r#"{"limit":500}"#).expect("Should deserialize");
        assert!(filters.validate().is_err());
    }
}
