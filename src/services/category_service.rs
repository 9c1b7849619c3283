use std::sync::Arc;

use log::{info, warn};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Category, CategoryInput};
use crate::store::Store;
use crate::utils::slugify;

/// Service for managing content categories
pub struct CategoryService {
    store: Arc<Store>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Create a category from an admin-submitted payload
    pub fn create(&self, input: &CategoryInput) -> Result<Category, AppError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::missing_field("name"));
        }

        let slug = Self::normalize_slug(&name, &input.slug)?;
        self.check_uniqueness(&name, &slug, None)?;

        let now = OffsetDateTime::now_utc();
        let category = Category {
            id: Uuid::new_v4(),
            name,
            slug,
            description: input.description.clone(),
            color: input.color.clone(),
            order: input.order,
            is_active: input.is_active,
            article_count: 0,
            created_at: now,
            updated_at: now,
        };

        self.store.write_categories(|categories| {
            categories.insert(category.id, category.clone());
        })?;
        info!("Created category '{}' ({})", category.name, category.slug);
        Ok(category)
    }

    /// Update a category; the denormalized article count is never touched here
    pub fn update(&self, id: Uuid, input: &CategoryInput) -> Result<Category, AppError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::missing_field("name"));
        }
        let slug = Self::normalize_slug(&name, &input.slug)?;

        let existing = self
            .store
            .read_categories(|c| c.get(&id).cloned())
            .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;
        self.check_uniqueness(&name, &slug, Some(id))?;

        let mut updated = existing;
        updated.name = name;
        updated.slug = slug;
        updated.description = input.description.clone();
        updated.color = input.color.clone();
        updated.order = input.order;
        updated.is_active = input.is_active;
        updated.updated_at = OffsetDateTime::now_utc();

        self.store.write_categories(|categories| {
            categories.insert(id, updated.clone());
        })?;
        info!("Updated category '{}'", updated.name);
        Ok(updated)
    }

    /// Delete a category; rejected while any article still references it
    pub fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let category = self
            .store
            .read_categories(|c| c.get(&id).cloned())
            .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;

        if category.article_count > 0 {
            warn!(
                "Refusing to delete category '{}' with {} article(s)",
                category.name, category.article_count
            );
            return Err(AppError::Validation(format!(
                "cannot delete category '{}': {} article(s) still reference it",
                category.name, category.article_count
            )));
        }

        self.store.write_categories(|categories| {
            categories.remove(&id);
        })?;
        info!("Deleted category '{}'", category.name);
        Ok(())
    }

    /// Fetch a single category by id
    pub fn get(&self, id: Uuid) -> Result<Category, AppError> {
        self.store
            .read_categories(|c| c.get(&id).cloned())
            .ok_or_else(|| AppError::NotFound("category not found".to_string()))
    }

    /// Active categories for the public site, sorted by order then name
    pub fn list_active(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self
            .store
            .read_categories(|c| c.values().filter(|cat| cat.is_active).cloned().collect());
        Self::sort(&mut categories);
        categories
    }

    /// Every category for the admin back office, sorted by order then name
    pub fn list_all(&self) -> Vec<Category> {
        let mut categories: Vec<Category> =
            self.store.read_categories(|c| c.values().cloned().collect());
        Self::sort(&mut categories);
        categories
    }

    fn sort(categories: &mut [Category]) {
        categories.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
    }

    fn normalize_slug(name: &str, raw_slug: &str) -> Result<String, AppError> {
        let source = if raw_slug.trim().is_empty() { name } else { raw_slug };
        let slug = slugify(source);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "slug must contain alphanumeric characters".to_string(),
            ));
        }
        Ok(slug)
    }

    fn check_uniqueness(&self, name: &str, slug: &str, exclude: Option<Uuid>) -> Result<(), AppError> {
        let conflict = self.store.read_categories(|categories| {
            categories
                .values()
                .filter(|c| Some(c.id) != exclude)
                .find_map(|c| {
                    if c.name.eq_ignore_ascii_case(name) {
                        Some(format!("a category named '{}' already exists", c.name))
                    } else if c.slug == slug {
                        Some(format!("a category with slug '{}' already exists", c.slug))
                    } else {
                        None
                    }
                })
        });
        match conflict {
            Some(message) => Err(AppError::Validation(message)),
            None => Ok(()),
        }
    }
}
