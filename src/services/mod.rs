pub mod article_service;
pub mod auth_service;
pub mod category_service;
pub mod dashboard_service;
pub mod search_service;

pub use article_service::ArticleService;
pub use auth_service::{AuthService, Claims};
pub use category_service::CategoryService;
pub use dashboard_service::DashboardService;
pub use search_service::{ArticleQuery, QueryPage, SearchService, SortKey};
