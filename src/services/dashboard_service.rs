use std::sync::Arc;

use log::debug;

use crate::models::ArticleStatus;
use crate::store::Store;
use crate::types::{ArticleSummary, CategoryBreakdown, DashboardSummary};

const RECENT_ARTICLES: usize = 5;

/// Aggregates the admin dashboard summary from the store
pub struct DashboardService {
    store: Arc<Store>,
}

impl DashboardService {
    /// Create a new dashboard service
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Build the dashboard summary: totals, recent articles, and the
    /// per-category breakdown.
    pub fn summary(&self) -> DashboardSummary {
        let articles = self.store.read_articles(|a| a.values().cloned().collect::<Vec<_>>());
        let categories = self.store.read_categories(|c| c.values().cloned().collect::<Vec<_>>());

        let total_articles = articles.len() as u64;
        let published_articles = articles
            .iter()
            .filter(|a| a.status == ArticleStatus::Published)
            .count() as u64;
        let draft_articles = total_articles - published_articles;
        let total_views: i64 = articles
            .iter()
            .filter(|a| a.status == ArticleStatus::Published)
            .map(|a| a.views)
            .sum();

        let mut recent = articles;
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_articles: Vec<ArticleSummary> = recent
            .iter()
            .take(RECENT_ARTICLES)
            .filter_map(|article| {
                categories
                    .iter()
                    .find(|c| c.id == article.category_id)
                    .map(|category| ArticleSummary::new(article, category))
            })
            .collect();

        let mut breakdown: Vec<CategoryBreakdown> = categories
            .iter()
            .map(|c| CategoryBreakdown {
                name: c.name.clone(),
                slug: c.slug.clone(),
                article_count: c.article_count,
            })
            .collect();
        breakdown.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            "Dashboard summary: {total_articles} articles ({published_articles} published), {} categories",
            categories.len()
        );

        DashboardSummary {
            total_articles,
            published_articles,
            draft_articles,
            total_categories: categories.len() as u64,
            total_views,
            recent_articles,
            categories: breakdown,
        }
    }
}
