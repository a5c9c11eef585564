use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::ValidationError;

use crate::errors::AppError;
use crate::models::{invalid, progress_percent, validate_bounds, validate_non_negative};

/// Database entity for budgets
#[derive(Debug, Clone, FromRow)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: f64,
    pub spent: f64,
    pub remaining: f64,
    pub is_fixed: bool,
    pub is_flexible: bool,
    pub min_amount: f64,
    pub max_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Update and delete are only allowed for the budget's owner.
    pub fn ensure_owned_by(&self, user_id: i64, action: &str) -> Result<(), AppError> {
        if self.user_id != user_id {
            return Err(AppError::Forbidden(format!(
                "Not authorized to {action} this budget"
            )));
        }
        Ok(())
    }
}

/// Budget returned in responses, with computed progress.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    #[schema(example = 1)]
    pub id: i64,
    pub user_id: i64,
    #[schema(example = 3)]
    pub category_id: i64,
    #[schema(example = 100.0)]
    pub amount: f64,
    #[schema(example = 60.0)]
    pub spent: f64,
    #[schema(example = 40.0)]
    pub remaining: f64,
    /// Computed: (amount - remaining) / amount * 100
    #[schema(example = 60.0)]
    pub progress: f64,
    pub is_fixed: bool,
    pub is_flexible: bool,
    pub min_amount: f64,
    pub max_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Budget> for BudgetResponse {
    fn from(budget: Budget) -> Self {
        Self {
            id: budget.id,
            user_id: budget.user_id,
            category_id: budget.category_id,
            progress: progress_percent(budget.amount - budget.remaining, budget.amount),
            amount: budget.amount,
            spent: budget.spent,
            remaining: budget.remaining,
            is_fixed: budget.is_fixed,
            is_flexible: budget.is_flexible,
            min_amount: budget.min_amount,
            max_amount: budget.max_amount,
            created_at: budget.created_at,
            updated_at: budget.updated_at,
        }
    }
}

/// Columns of a budget that feed the global summary
#[derive(Debug, Clone, FromRow)]
pub struct BudgetTotalsRow {
    pub amount: f64,
    pub remaining: f64,
    pub is_fixed: bool,
    pub is_flexible: bool,
}

/// Aggregate overview across all live budgets
#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    #[schema(example = 150.0)]
    pub total_budgeted: f64,
    #[schema(example = 60.0)]
    pub total_spent: f64,
    #[schema(example = 90.0)]
    pub total_remaining: f64,
    #[schema(example = 100.0)]
    pub fixed_expenses: f64,
    #[schema(example = 50.0)]
    pub flexible_expenses: f64,
}

impl BudgetSummary {
    /// A budget flagged both fixed and flexible counts toward both buckets.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a BudgetTotalsRow>,
    {
        rows.into_iter().fold(Self::default(), |mut summary, row| {
            summary.total_budgeted += row.amount;
            summary.total_spent += row.amount - row.remaining;
            summary.total_remaining += row.remaining;
            if row.is_fixed {
                summary.fixed_expenses += row.amount;
            }
            if row.is_flexible {
                summary.flexible_expenses += row.amount;
            }
            summary
        })
    }
}

/// A category left-joined with its live budget (zeros when it has none)
#[derive(Debug, Clone, FromRow)]
pub struct CategoryBudgetRow {
    pub id: i64,
    pub name: String,
    pub budgeted: f64,
    pub remaining: f64,
    pub is_fixed: bool,
    pub is_flexible: bool,
}

/// Per-category budget progress
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCategoryResponse {
    #[schema(example = 3)]
    pub id: i64,
    #[schema(example = "Groceries")]
    pub name: String,
    #[schema(example = 400.0)]
    pub budgeted: f64,
    #[schema(example = 100.0)]
    pub spent: f64,
    #[schema(example = 300.0)]
    pub remaining: f64,
    #[schema(example = 25.0)]
    pub progress: f64,
    pub is_fixed: bool,
    pub is_flexible: bool,
}

impl From<CategoryBudgetRow> for BudgetCategoryResponse {
    fn from(row: CategoryBudgetRow) -> Self {
        let spent = row.budgeted - row.remaining;

        Self {
            id: row.id,
            name: row.name,
            budgeted: row.budgeted,
            spent,
            remaining: row.remaining,
            progress: progress_percent(spent, row.budgeted),
            is_fixed: row.is_fixed,
            is_flexible: row.is_flexible,
        }
    }
}

/// DTO for creating (or replacing) the budget of a category
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetDto {
    /// Category the budget applies to (required, non-zero)
    #[schema(example = 3)]
    pub category_id: Option<i64>,

    /// Allocated amount (required)
    #[schema(example = 400.0)]
    pub amount: Option<f64>,

    #[serde(default)]
    pub is_fixed: bool,

    #[serde(default)]
    pub is_flexible: bool,

    #[serde(default)]
    pub min_amount: f64,

    #[serde(default)]
    pub max_amount: f64,
}

impl CreateBudgetDto {
    /// The referenced category, rejecting missing or zero ids
    pub fn category_id(&self) -> Result<i64, AppError> {
        self.category_id
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::ValidationError("Category ID is required".to_string()))
    }

    pub fn amount(&self) -> Result<f64, AppError> {
        self.amount
            .ok_or_else(|| AppError::ValidationError("Amount is required".to_string()))
    }

    /// Validate required fields and decimal values that can't use derive macro
    pub fn validate_fields(&self) -> Result<(), AppError> {
        self.category_id()?;
        let amount = self.amount()?;

        validate_non_negative(amount)
            .and_then(|_| validate_bounds(self.min_amount, self.max_amount))
            .map_err(|e| AppError::ValidationError(e.to_string()))
    }
}

/// DTO for updating a budget (all fields optional). The category cannot be changed.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetDto {
    pub amount: Option<f64>,
    pub spent: Option<f64>,
    pub remaining: Option<f64>,
    pub is_fixed: Option<bool>,
    pub is_flexible: Option<bool>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl UpdateBudgetDto {
    /// Same error convention as `CreateBudgetDto::validate_fields`
    pub fn validate_fields(&self) -> Result<(), AppError> {
        self.check().map_err(|e| AppError::ValidationError(e.to_string()))
    }

    fn check(&self) -> Result<(), ValidationError> {
        for value in [self.amount, self.spent, self.min_amount, self.max_amount]
            .into_iter()
            .flatten()
        {
            validate_non_negative(value)?;
        }
        if let Some(remaining) = self.remaining {
            if !remaining.is_finite() {
                return Err(invalid("finite", "remaining must be a finite number"));
            }
        }
        Ok(())
    }
}

/// Path parameters for budget ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct BudgetIdPath {
    /// Budget ID
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(amount: f64, remaining: f64, is_fixed: bool, is_flexible: bool) -> BudgetTotalsRow {
        BudgetTotalsRow {
            amount,
            remaining,
            is_fixed,
            is_flexible,
        }
    }

    fn sample_budget(user_id: i64) -> Budget {
        Budget {
            id: 10,
            user_id,
            category_id: 3,
            amount: 100.0,
            spent: 0.0,
            remaining: 100.0,
            is_fixed: false,
            is_flexible: false,
            min_amount: 0.0,
            max_amount: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_over_fixed_and_flexible_budgets() {
        let rows = vec![
            totals(100.0, 40.0, true, false),
            totals(50.0, 50.0, false, true),
        ];

        let summary = BudgetSummary::from_rows(&rows);

        assert_eq!(
            summary,
            BudgetSummary {
                total_budgeted: 150.0,
                total_spent: 60.0,
                total_remaining: 90.0,
                fixed_expenses: 100.0,
                flexible_expenses: 50.0,
            }
        );
    }

    #[test]
    fn test_summary_counts_dual_flagged_budget_in_both_buckets() {
        let rows = vec![totals(80.0, 80.0, true, true)];

        let summary = BudgetSummary::from_rows(&rows);

        assert_eq!(summary.fixed_expenses, 80.0);
        assert_eq!(summary.flexible_expenses, 80.0);
        assert_eq!(summary.total_budgeted, 80.0);
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        let summary = BudgetSummary::from_rows(&Vec::<BudgetTotalsRow>::new());
        assert_eq!(summary, BudgetSummary::default());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let json = serde_json::to_value(BudgetSummary::default()).expect("Should serialize");

        for key in [
            "totalBudgeted",
            "totalSpent",
            "totalRemaining",
            "fixedExpenses",
            "flexibleExpenses",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_rollup_for_category_without_budget_is_zero() {
        let response = BudgetCategoryResponse::from(CategoryBudgetRow {
            id: 4,
            name: "Travel".to_string(),
            budgeted: 0.0,
            remaining: 0.0,
            is_fixed: false,
            is_flexible: false,
        });

        assert_eq!(response.budgeted, 0.0);
        assert_eq!(response.spent, 0.0);
        assert_eq!(response.remaining, 0.0);
        assert_eq!(response.progress, 0.0);
    }

    #[test]
    fn test_rollup_progress_from_remaining() {
        let response = BudgetCategoryResponse::from(CategoryBudgetRow {
            id: 5,
            name: "Groceries".to_string(),
            budgeted: 400.0,
            remaining: 300.0,
            is_fixed: false,
            is_flexible: true,
        });

        assert_eq!(response.spent, 100.0);
        assert_eq!(response.progress, 25.0);
    }

    #[test]
    fn test_budget_response_progress() {
        let mut budget = sample_budget(1);
        budget.remaining = 40.0;

        let response = BudgetResponse::from(budget);
        assert_eq!(response.progress, 60.0);
    }

    #[test]
    fn test_ownership_check() {
        let budget = sample_budget(1);

        assert!(budget.ensure_owned_by(1, "update").is_ok());
        assert!(matches!(
            budget.ensure_owned_by(2, "delete"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_create_requires_non_zero_category() {
        let dto: CreateBudgetDto =
            serde_json::from_str(r#"{"categoryId":0,"amount":10}"#).expect("Should deserialize");
        assert!(matches!(
            dto.validate_fields(),
            Err(AppError::ValidationError(_))
        ));

        let dto: CreateBudgetDto =
            serde_json::from_str(r#"{"amount":10}"#).expect("Should deserialize");
        assert!(matches!(
            dto.validate_fields(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_create_requires_amount() {
        let dto: CreateBudgetDto =
            serde_json::from_str(r#"{"categoryId":3}"#).expect("Should deserialize");
        assert!(dto.validate_fields().is_err());
    }

    #[test]
    fn test_create_accepts_flexible_range() {
        let dto: CreateBudgetDto = serde_json::from_str(
            r#"{"categoryId":3,"amount":200,"isFlexible":true,"minAmount":150,"maxAmount":250}"#,
        )
        .expect("Should deserialize");

        assert!(dto.validate_fields().is_ok());
        assert!(dto.is_flexible);
    }

    #[test]
    fn test_update_rejects_negative_amount() {
        let dto = UpdateBudgetDto {
            amount: Some(-10.0),
            ..Default::default()
        };
        assert!(matches!(
            dto.validate_fields(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_create_and_update_report_negative_amount_alike() {
        let create: CreateBudgetDto =
            serde_json::from_str(r#"{"categoryId":3,"amount":-10}"#).expect("Should deserialize");
        let update = UpdateBudgetDto {
            amount: Some(-10.0),
            ..Default::default()
        };

        let (Err(AppError::ValidationError(created)), Err(AppError::ValidationError(updated))) =
            (create.validate_fields(), update.validate_fields())
        else {
            panic!("both should be validation errors");
        };
        assert_eq!(created, updated);
        assert_eq!(created, "Amounts must be finite and non-negative");
    }
}
