use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Article, ArticleStatus, Category};
use crate::store::Store;
use crate::utils::contains_ignore_case;

/// Sort key for article listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Public reads: newest published first
    PublishedAt,
    /// Admin reads: newest created first
    CreatedAt,
}

/// Typed filter object for article queries.
///
/// Built once from request parameters, validated by the handler layer,
/// and translated into a store predicate by a single mapping function.
#[derive(Debug, Clone)]
pub struct ArticleQuery {
    /// Public filter: category resolved by slug
    pub category_slug: Option<String>,
    /// Admin filter: category resolved by name
    pub category_name: Option<String>,
    pub search: Option<String>,
    pub status: Option<ArticleStatus>,
    pub featured: bool,
    pub page: u32,
    pub limit: u32,
    pub sort: SortKey,
}

impl ArticleQuery {
    /// Defaults for public endpoints: published only, publish-date order
    pub fn public(page: u32, limit: u32) -> Self {
        Self {
            category_slug: None,
            category_name: None,
            search: None,
            status: Some(ArticleStatus::Published),
            featured: false,
            page,
            limit,
            sort: SortKey::PublishedAt,
        }
    }

    /// Defaults for admin endpoints: no status restriction, creation order
    pub fn admin(page: u32, limit: u32) -> Self {
        Self {
            category_slug: None,
            category_name: None,
            search: None,
            status: None,
            featured: false,
            page,
            limit,
            sort: SortKey::CreatedAt,
        }
    }
}

/// One page of query results with the pre-pagination total
pub struct QueryPage {
    pub articles: Vec<(Article, Category)>,
    pub total: u64,
}

impl QueryPage {
    fn empty() -> Self {
        Self { articles: Vec::new(), total: 0 }
    }
}

/// Read-only query service over the article and category collections
pub struct SearchService {
    store: Arc<Store>,
}

impl SearchService {
    /// Create a new search service
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Execute a filtered, paginated article query.
    ///
    /// A category filter that resolves to no category yields an empty
    /// page with total 0, which is distinct from "no category filter".
    pub fn run(&self, query: &ArticleQuery) -> Result<QueryPage, AppError> {
        debug!("Running article query: {:?}", query);

        let category_id = match self.resolve_category_filter(query) {
            Ok(resolved) => resolved,
            Err(()) => {
                info!("Category filter matched no category, returning empty page");
                return Ok(QueryPage::empty());
            }
        };

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mut matches: Vec<Article> = self.store.read_articles(|articles| {
            articles
                .values()
                .filter(|article| Self::matches(article, query, category_id, search))
                .cloned()
                .collect()
        });
        let total = matches.len() as u64;

        match query.sort {
            SortKey::PublishedAt => matches.sort_by(|a, b| {
                let key_a = a.published_at.unwrap_or(a.created_at);
                let key_b = b.published_at.unwrap_or(b.created_at);
                key_b.cmp(&key_a)
            }),
            SortKey::CreatedAt => matches.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        let skip = (query.page.max(1) as usize - 1) * query.limit as usize;
        let page: Vec<Article> = matches
            .into_iter()
            .skip(skip)
            .take(query.limit as usize)
            .collect();

        // Populate the category relation onto every returned article
        let articles = self.store.read_categories(|categories| {
            page.into_iter()
                .filter_map(|article| {
                    let category = categories.get(&article.category_id).cloned();
                    if category.is_none() {
                        log::warn!(
                            "Article {} references missing category {}",
                            article.id,
                            article.category_id
                        );
                    }
                    category.map(|c| (article, c))
                })
                .collect::<Vec<_>>()
        });

        info!(
            "Article query returned {} of {} matches (page {}, limit {})",
            articles.len(),
            total,
            query.page,
            query.limit
        );
        Ok(QueryPage { articles, total })
    }

    /// Resolve the category filter to an id.
    ///
    /// Ok(None) means no filter; Err(()) means a filter was given but no
    /// category matched it.
    fn resolve_category_filter(&self, query: &ArticleQuery) -> Result<Option<Uuid>, ()> {
        if let Some(slug) = query.category_slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let slug = slug.to_lowercase();
            return self
                .store
                .read_categories(|c| c.values().find(|cat| cat.slug == slug).map(|cat| cat.id))
                .map(Some)
                .ok_or(());
        }
        if let Some(name) = query.category_name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return self
                .store
                .read_categories(|c| {
                    c.values()
                        .find(|cat| cat.name.eq_ignore_ascii_case(name))
                        .map(|cat| cat.id)
                })
                .map(Some)
                .ok_or(());
        }
        Ok(None)
    }

    /// The single mapping from the typed filter to a per-article predicate
    fn matches(
        article: &Article,
        query: &ArticleQuery,
        category_id: Option<Uuid>,
        search: Option<&str>,
    ) -> bool {
        if let Some(id) = category_id {
            if article.category_id != id {
                return false;
            }
        }
        if let Some(status) = query.status {
            if article.status != status {
                return false;
            }
        }
        if query.featured && !article.featured {
            return false;
        }
        if let Some(term) = search {
            let hit = contains_ignore_case(&article.title, term)
                || contains_ignore_case(&article.excerpt, term)
                || article.tags.iter().any(|tag| contains_ignore_case(tag, term));
            if !hit {
                return false;
            }
        }
        true
    }
}
