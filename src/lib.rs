//! ToolkitHub - content publishing backend
//!
//! This crate provides the data layer and HTTP surface for a
//! content-managed article site: public browsing endpoints organized by
//! category, and an authenticated admin back office for managing
//! articles and categories.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod models;
pub mod sanitize;
pub mod services;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::Config;
pub use errors::AppError;
pub use models::{Admin, Article, ArticleInput, ArticleStatus, Category, CategoryInput};
pub use sanitize::sanitize_html;
pub use services::{
    ArticleQuery, ArticleService, AuthService, CategoryService, DashboardService, SearchService,
};
pub use store::Store;
pub use types::AppState;

// Re-export utility functions
pub use utils::{contains_ignore_case, slugify, truncate_chars};
