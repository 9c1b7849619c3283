use std::sync::Arc;

use log::{debug, info, warn};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    Article, ArticleInput, ArticleStatus, Category, META_DESCRIPTION_MAX, META_TITLE_MAX,
};
use crate::sanitize::sanitize_html;
use crate::store::Store;
use crate::utils::{slugify, truncate_chars};

/// Service owning the article lifecycle: validation, sanitization,
/// publish stamping, and category counter maintenance.
pub struct ArticleService {
    store: Arc<Store>,
}

impl ArticleService {
    /// Create a new article service
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Create an article from an admin-submitted payload.
    ///
    /// All validation happens before any store mutation, so a rejected
    /// create leaves every collection untouched.
    pub fn create(&self, input: &ArticleInput, author_id: Uuid) -> Result<(Article, Category), AppError> {
        Self::validate_required(input)?;
        let slug = Self::normalize_slug(&input.slug)?;
        let category = self.resolve_category(&input.category)?;

        let duplicate = self
            .store
            .read_articles(|articles| articles.values().any(|a| a.slug == slug));
        if duplicate {
            return Err(AppError::Validation(format!(
                "an article with slug '{slug}' already exists"
            )));
        }

        let now = OffsetDateTime::now_utc();
        let article = Article {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            slug,
            excerpt: input.excerpt.trim().to_string(),
            content: sanitize_html(&input.content),
            category_id: category.id,
            tags: Self::clean_tags(&input.tags),
            featured_image: input.featured_image.clone(),
            status: input.status,
            featured: input.featured,
            author_id,
            meta_title: input.meta_title.as_deref().map(|m| truncate_chars(m, META_TITLE_MAX)),
            meta_description: input
                .meta_description
                .as_deref()
                .map(|m| truncate_chars(m, META_DESCRIPTION_MAX)),
            meta_keywords: input.meta_keywords.clone(),
            views: 0,
            published_at: (input.status == ArticleStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        };

        self.store.write_articles(|articles| {
            articles.insert(article.id, article.clone());
        })?;
        self.adjust_category_count(category.id, 1)?;

        info!("Created article '{}' in category '{}'", article.slug, category.name);
        Ok((article, self.refreshed_category(category)))
    }

    /// Update an article; content is re-sanitized on every update.
    pub fn update(&self, id: Uuid, input: &ArticleInput) -> Result<(Article, Category), AppError> {
        Self::validate_required(input)?;
        let slug = Self::normalize_slug(&input.slug)?;
        let category = self.resolve_category(&input.category)?;

        let existing = self
            .store
            .read_articles(|articles| articles.get(&id).cloned())
            .ok_or_else(|| AppError::NotFound("article not found".to_string()))?;

        let collision = self
            .store
            .read_articles(|articles| articles.values().any(|a| a.id != id && a.slug == slug));
        if collision {
            return Err(AppError::Validation(format!(
                "an article with slug '{slug}' already exists"
            )));
        }

        let now = OffsetDateTime::now_utc();
        let mut updated = existing.clone();
        updated.title = input.title.trim().to_string();
        updated.slug = slug;
        updated.excerpt = input.excerpt.trim().to_string();
        updated.content = sanitize_html(&input.content);
        updated.category_id = category.id;
        updated.tags = Self::clean_tags(&input.tags);
        updated.featured_image = input.featured_image.clone();
        updated.status = input.status;
        updated.featured = input.featured;
        updated.meta_title = input.meta_title.as_deref().map(|m| truncate_chars(m, META_TITLE_MAX));
        updated.meta_description = input
            .meta_description
            .as_deref()
            .map(|m| truncate_chars(m, META_DESCRIPTION_MAX));
        updated.meta_keywords = input.meta_keywords.clone();
        updated.updated_at = now;

        // Stamped exactly once: the first observed transition to
        // published. A later draft/published cycle never re-stamps.
        if input.status == ArticleStatus::Published && updated.published_at.is_none() {
            updated.published_at = Some(now);
            debug!("Stamping publish time for article '{}'", updated.slug);
        }

        self.store.write_articles(|articles| {
            articles.insert(id, updated.clone());
        })?;

        if existing.category_id != category.id {
            self.reassign_category(existing.category_id, category.id)?;
        }

        info!("Updated article '{}'", updated.slug);
        Ok((updated, self.refreshed_category(category)))
    }

    /// Dedicated partial update for the featured flag, so toggling does
    /// not require resubmitting the whole record.
    pub fn set_featured(&self, id: Uuid, featured: bool) -> Result<Article, AppError> {
        let updated = self.store.write_articles(|articles| {
            articles.get_mut(&id).map(|article| {
                article.featured = featured;
                article.updated_at = OffsetDateTime::now_utc();
                article.clone()
            })
        })?;
        updated.ok_or_else(|| AppError::NotFound("article not found".to_string()))
    }

    /// Delete an article and release its category's counter.
    /// Deleting a nonexistent article is a not-found error, not a no-op.
    pub fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self.store.write_articles(|articles| articles.remove(&id))?;
        let article = removed.ok_or_else(|| AppError::NotFound("article not found".to_string()))?;
        self.adjust_category_count(article.category_id, -1)?;
        info!("Deleted article '{}'", article.slug);
        Ok(())
    }

    /// Admin fetch of a single article by id, with its category populated
    pub fn get(&self, id: Uuid) -> Result<(Article, Category), AppError> {
        let article = self
            .store
            .read_articles(|articles| articles.get(&id).cloned())
            .ok_or_else(|| AppError::NotFound("article not found".to_string()))?;
        let category = self.category_of(&article)?;
        Ok((article, category))
    }

    /// Public fetch of a published article by slug.
    ///
    /// Increments the view counter by exactly 1 per call; a draft or
    /// unknown slug is a 404.
    pub fn fetch_published(&self, slug: &str) -> Result<(Article, Category), AppError> {
        let slug = slug.to_lowercase();
        let updated = self.store.write_articles(|articles| {
            articles
                .values_mut()
                .find(|a| a.slug == slug && a.status == ArticleStatus::Published)
                .map(|a| {
                    a.views += 1;
                    a.clone()
                })
        })?;
        let article = updated.ok_or_else(|| AppError::NotFound("article not found".to_string()))?;
        let category = self.category_of(&article)?;
        debug!("Serving article '{}' (views now {})", article.slug, article.views);
        Ok((article, category))
    }

    /// Both counter mutations for a category change live here, as one
    /// store write, so a transactional store can wrap them as one unit.
    fn reassign_category(&self, old_id: Uuid, new_id: Uuid) -> Result<(), AppError> {
        if old_id == new_id {
            return Ok(());
        }
        let now = OffsetDateTime::now_utc();
        self.store.write_categories(|categories| {
            if let Some(old) = categories.get_mut(&old_id) {
                old.article_count -= 1;
                old.updated_at = now;
            } else {
                warn!("Reassignment from missing category {old_id}");
            }
            if let Some(new) = categories.get_mut(&new_id) {
                new.article_count += 1;
                new.updated_at = now;
            } else {
                warn!("Reassignment to missing category {new_id}");
            }
        })?;
        debug!("Moved one article count from {old_id} to {new_id}");
        Ok(())
    }

    fn adjust_category_count(&self, id: Uuid, delta: i64) -> Result<(), AppError> {
        let now = OffsetDateTime::now_utc();
        self.store.write_categories(|categories| {
            if let Some(category) = categories.get_mut(&id) {
                category.article_count += delta;
                category.updated_at = now;
            } else {
                warn!("Counter adjustment for missing category {id}");
            }
        })
    }

    fn category_of(&self, article: &Article) -> Result<Category, AppError> {
        self.store
            .read_categories(|c| c.get(&article.category_id).cloned())
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "article {} references missing category {}",
                    article.id, article.category_id
                ))
            })
    }

    fn refreshed_category(&self, category: Category) -> Category {
        self.store
            .read_categories(|c| c.get(&category.id).cloned())
            .unwrap_or(category)
    }

    fn resolve_category(&self, name: &str) -> Result<Category, AppError> {
        let name = name.trim();
        self.store
            .read_categories(|categories| {
                categories.values().find(|c| c.name == name).cloned()
            })
            .ok_or_else(|| AppError::Validation(format!("category '{name}' does not exist")))
    }

    fn validate_required(input: &ArticleInput) -> Result<(), AppError> {
        let required = [
            (input.title.as_str(), "title"),
            (input.slug.as_str(), "slug"),
            (input.excerpt.as_str(), "excerpt"),
            (input.content.as_str(), "content"),
            (input.category.as_str(), "category"),
        ];
        for (value, field) in required {
            if value.trim().is_empty() {
                return Err(AppError::missing_field(field));
            }
        }
        Ok(())
    }

    fn normalize_slug(raw: &str) -> Result<String, AppError> {
        let slug = slugify(raw);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "slug must contain alphanumeric characters".to_string(),
            ));
        }
        Ok(slug)
    }

    fn clean_tags(tags: &[String]) -> Vec<String> {
        tags.iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}
