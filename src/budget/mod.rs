pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::{
    create_budget, delete_budget, get_budget, get_budget_categories, get_budget_summary,
    update_budget,
};
