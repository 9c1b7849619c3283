use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Admin, Article, ArticleStatus, Category};
use crate::store::Store;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Arc<Config>,
}

/// The category fields populated onto returned articles
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            color: category.color.clone(),
        }
    }
}

/// Article listing entry; excludes the full content
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub category: CategoryRef,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: ArticleStatus,
    pub featured: bool,
    pub views: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ArticleSummary {
    pub fn new(article: &Article, category: &Category) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            slug: article.slug.clone(),
            excerpt: article.excerpt.clone(),
            category: CategoryRef::from(category),
            tags: article.tags.clone(),
            featured_image: article.featured_image.clone(),
            status: article.status,
            featured: article.featured,
            views: article.views,
            published_at: article.published_at,
            created_at: article.created_at,
        }
    }
}

/// Full article payload for single-article endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ArticleDetail {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub category: CategoryRef,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: ArticleStatus,
    pub featured: bool,
    pub author_id: Uuid,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub views: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ArticleDetail {
    pub fn new(article: &Article, category: &Category) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            slug: article.slug.clone(),
            excerpt: article.excerpt.clone(),
            content: article.content.clone(),
            category: CategoryRef::from(category),
            tags: article.tags.clone(),
            featured_image: article.featured_image.clone(),
            status: article.status,
            featured: article.featured,
            author_id: article.author_id,
            meta_title: article.meta_title.clone(),
            meta_description: article.meta_description.clone(),
            meta_keywords: article.meta_keywords.clone(),
            views: article.views,
            published_at: article.published_at,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// Pagination metadata returned alongside article lists
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64) as u32
        };
        Self { page, limit, total, total_pages }
    }
}

/// Response body for article list endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleSummary>,
    pub pagination: Pagination,
}

/// The authenticated principal, as exposed to callers
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalSummary {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl From<&Admin> for PrincipalSummary {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            role: admin.role.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: PrincipalSummary,
}

#[derive(Debug, Deserialize)]
pub struct SetFeaturedRequest {
    pub featured: bool,
}

/// Per-category entry of the dashboard breakdown
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    pub name: String,
    pub slug: String,
    pub article_count: i64,
}

/// Aggregate counts for the admin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_articles: u64,
    pub published_articles: u64,
    pub draft_articles: u64,
    pub total_categories: u64,
    /// Summed views across published articles
    pub total_views: i64,
    pub recent_articles: Vec<ArticleSummary>,
    pub categories: Vec<CategoryBreakdown>,
}
