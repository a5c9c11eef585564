use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::{
    invalid, progress_percent, validate_bounds, validate_color_hex, validate_non_negative,
};

/// Database entity for categories
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub amount: f64,
    pub spent: f64,
    pub remaining: f64,
    pub is_fixed: bool,
    pub is_flexible: bool,
    pub min_amount: f64,
    pub max_amount: f64,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    /// Unique category identifier
    #[schema(example = 1)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Category name
    #[schema(example = "Groceries")]
    pub name: String,
    /// Budgeted target for the category
    #[schema(example = 500.0)]
    pub amount: f64,
    /// Total expenses posted against the category
    #[schema(example = 350.0)]
    pub spent: f64,
    /// Amount left to spend
    #[schema(example = 150.0)]
    pub remaining: f64,
    /// Computed: spent / amount * 100
    #[schema(example = 70.0)]
    pub progress: f64,
    /// Non-negotiable recurring cost
    pub is_fixed: bool,
    /// Budgeted as a min/max range
    pub is_flexible: bool,
    /// Lower bound for flexible categories
    pub min_amount: f64,
    /// Upper bound for flexible categories
    pub max_amount: f64,
    /// Display color in hex format
    #[schema(example = "#4CAF50")]
    pub color: Option<String>,
    /// Icon identifier
    #[schema(example = "cart")]
    pub icon: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(cat: Category) -> Self {
        Self {
            id: cat.id,
            user_id: cat.user_id,
            progress: progress_percent(cat.spent, cat.amount),
            name: cat.name,
            amount: cat.amount,
            spent: cat.spent,
            remaining: cat.remaining,
            is_fixed: cat.is_fixed,
            is_flexible: cat.is_flexible,
            min_amount: cat.min_amount,
            max_amount: cat.max_amount,
            color: cat.color,
            icon: cat.icon,
            created_at: cat.created_at,
            updated_at: cat.updated_at,
        }
    }
}

/// Request body for creating a category
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    /// Category name (1-100 characters)
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Groceries")]
    pub name: String,

    /// Budgeted target (defaults to 0)
    #[serde(default)]
    #[schema(example = 500.0)]
    pub amount: f64,

    #[serde(default)]
    pub is_fixed: bool,

    #[serde(default)]
    pub is_flexible: bool,

    #[serde(default)]
    pub min_amount: f64,

    #[serde(default)]
    pub max_amount: f64,

    /// Display color in hex format
    #[schema(example = "#4CAF50")]
    pub color: Option<String>,

    /// Icon identifier
    pub icon: Option<String>,
}

impl CreateCategoryDto {
    /// Validate amount, bounds and color
    pub fn validate_fields(&self) -> Result<(), ValidationError> {
        validate_non_negative(self.amount)?;
        validate_bounds(self.min_amount, self.max_amount)?;
        if let Some(color) = &self.color {
            validate_color_hex(color)?;
        }
        Ok(())
    }
}

/// Request body for updating a category (all fields optional)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Food & Dining")]
    pub name: Option<String>,

    #[schema(example = 600.0)]
    pub amount: Option<f64>,

    pub spent: Option<f64>,

    /// Not recomputed from amount; pass explicitly to change it
    pub remaining: Option<f64>,

    pub is_fixed: Option<bool>,

    pub is_flexible: Option<bool>,

    pub min_amount: Option<f64>,

    pub max_amount: Option<f64>,

    #[schema(example = "#2196F3")]
    pub color: Option<String>,

    pub icon: Option<String>,
}

impl UpdateCategoryDto {
    /// Validate the provided amount and color fields. `remaining` may go negative
    /// once a category is overspent, so only finiteness is checked there.
    pub fn validate_fields(&self) -> Result<(), ValidationError> {
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
        if let Some(color) = &self.color {
            validate_color_hex(color)?;
        }
        Ok(())
    }
}

/// Path parameters for category ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct CategoryIdPath {
    /// Category ID
    pub id: i64,
}
