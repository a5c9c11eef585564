use utoipa::OpenApi;

use crate::budget::models::{
    BudgetCategoryResponse, BudgetResponse, BudgetSummary, CreateBudgetDto, UpdateBudgetDto,
};
use crate::category::models::{CategoryResponse, CreateCategoryDto, UpdateCategoryDto};
use crate::errors::ErrorResponse;
use crate::models::DeleteResponse;
use crate::routes::HealthResponse;
use crate::transaction::models::{
    CreateTransactionDto, PaginatedTransactionResponse, TransactionResponse, TransactionType,
    UpdateTransactionDto,
};
use crate::user::models::UserResponse;

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Budget API",
        version = "1.0.0",
        description = "Personal budgeting: categories, budgets, transactions and summaries"
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Categories", description = "Spending category management"),
        (name = "Budgets", description = "Per-category budgets and summaries"),
        (name = "Transactions", description = "Income and expense postings"),
        (name = "Users", description = "Acting user profile")
    ),
    paths(
        crate::routes::health_check,
        // Category endpoints
        crate::category::handlers::list_categories,
        crate::category::handlers::get_category_summary,
        crate::category::handlers::get_category,
        crate::category::handlers::create_category,
        crate::category::handlers::update_category,
        crate::category::handlers::delete_category,
        // Budget endpoints
        crate::budget::handlers::get_budget_summary,
        crate::budget::handlers::get_budget_categories,
        crate::budget::handlers::get_budget,
        crate::budget::handlers::create_budget,
        crate::budget::handlers::update_budget,
        crate::budget::handlers::delete_budget,
        // Transaction endpoints
        crate::transaction::handlers::list_transactions,
        crate::transaction::handlers::get_transaction,
        crate::transaction::handlers::create_transaction,
        crate::transaction::handlers::update_transaction,
        crate::transaction::handlers::delete_transaction,
        // User endpoints
        crate::user::handlers::me,
    ),
    components(
        schemas(
            ErrorResponse,
            DeleteResponse,
            HealthResponse,
            // Category schemas
            CategoryResponse,
            CreateCategoryDto,
            UpdateCategoryDto,
            // Budget schemas
            BudgetResponse,
            BudgetSummary,
            BudgetCategoryResponse,
            CreateBudgetDto,
            UpdateBudgetDto,
            // Transaction schemas
            TransactionType,
            TransactionResponse,
            PaginatedTransactionResponse,
            CreateTransactionDto,
            UpdateTransactionDto,
            // User schemas
            UserResponse,
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_budget_routes() {
        let doc = ApiDoc::openapi();

        for path in [
            "/health",
            "/api/categories/{id}",
            "/api/budgets",
            "/api/budgets/categories",
            "/api/transactions",
            "/api/users/me",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
