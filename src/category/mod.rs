pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::{
    create_category, delete_category, get_category, get_category_summary, list_categories,
    update_category,
};
