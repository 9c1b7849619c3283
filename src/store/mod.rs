use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{debug, error, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Admin, Article, Category};

/// A stored record addressable by id
pub trait Record {
    fn id(&self) -> Uuid;
}

impl Record for Article {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Admin {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Document store backing the whole application.
///
/// Collections live in memory and are persisted as one JSON file each
/// under the data directory. The store is constructed once at process
/// start and injected into the service layer; it is the only long-lived
/// resource in the process.
pub struct Store {
    data_dir: PathBuf,
    articles: RwLock<HashMap<Uuid, Article>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    admins: RwLock<HashMap<Uuid, Admin>>,
}

impl Store {
    /// Open the store, creating the data directory and loading any
    /// previously persisted collections.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;

        let articles = Self::load_collection::<Article>(&data_dir, "articles")?;
        let categories = Self::load_collection::<Category>(&data_dir, "categories")?;
        let admins = Self::load_collection::<Admin>(&data_dir, "admins")?;

        info!(
            "Store opened at {:?}: {} articles, {} categories, {} admins",
            data_dir,
            articles.len(),
            categories.len(),
            admins.len()
        );

        Ok(Self {
            data_dir,
            articles: RwLock::new(articles),
            categories: RwLock::new(categories),
            admins: RwLock::new(admins),
        })
    }

    fn load_collection<T>(data_dir: &Path, name: &str) -> Result<HashMap<Uuid, T>, AppError>
    where
        T: DeserializeOwned + Record,
    {
        let path = data_dir.join(format!("{name}.json"));
        if !path.exists() {
            debug!("No persisted {name} collection at {:?}, starting empty", path);
            return Ok(HashMap::new());
        }

        let raw = fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read {:?}: {e}", path);
            AppError::Io(e)
        })?;
        let records: Vec<T> = serde_json::from_str(&raw)?;
        debug!("Loaded {} {name} records from {:?}", records.len(), path);
        Ok(records.into_iter().map(|r| (r.id(), r)).collect())
    }

    fn flush_collection<T>(&self, name: &str, records: &HashMap<Uuid, T>) -> Result<(), AppError>
    where
        T: Serialize + Record + Clone,
    {
        let mut values: Vec<T> = records.values().cloned().collect();
        values.sort_by_key(|r| r.id());

        let path = self.data_dir.join(format!("{name}.json"));
        let raw = serde_json::to_string_pretty(&values)?;
        fs::write(&path, raw).map_err(|e| {
            error!("Failed to persist {name} collection to {:?}: {e}", path);
            AppError::Io(e)
        })?;
        debug!("Flushed {} {name} records", values.len());
        Ok(())
    }

    /// Read access to the article collection
    pub fn read_articles<R>(&self, f: impl FnOnce(&HashMap<Uuid, Article>) -> R) -> R {
        let guard = self.articles.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    /// Mutate the article collection and persist it
    pub fn write_articles<R>(
        &self,
        f: impl FnOnce(&mut HashMap<Uuid, Article>) -> R,
    ) -> Result<R, AppError> {
        let mut guard = self.articles.write().unwrap_or_else(|e| e.into_inner());
        let out = f(&mut guard);
        self.flush_collection("articles", &guard)?;
        Ok(out)
    }

    /// Read access to the category collection
    pub fn read_categories<R>(&self, f: impl FnOnce(&HashMap<Uuid, Category>) -> R) -> R {
        let guard = self.categories.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    /// Mutate the category collection and persist it
    pub fn write_categories<R>(
        &self,
        f: impl FnOnce(&mut HashMap<Uuid, Category>) -> R,
    ) -> Result<R, AppError> {
        let mut guard = self.categories.write().unwrap_or_else(|e| e.into_inner());
        let out = f(&mut guard);
        self.flush_collection("categories", &guard)?;
        Ok(out)
    }

    /// Read access to the admin collection
    pub fn read_admins<R>(&self, f: impl FnOnce(&HashMap<Uuid, Admin>) -> R) -> R {
        let guard = self.admins.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    /// Mutate the admin collection and persist it
    pub fn write_admins<R>(
        &self,
        f: impl FnOnce(&mut HashMap<Uuid, Admin>) -> R,
    ) -> Result<R, AppError> {
        let mut guard = self.admins.write().unwrap_or_else(|e| e.into_inner());
        let out = f(&mut guard);
        self.flush_collection("admins", &guard)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleStatus;
    use time::OffsetDateTime;

    fn sample_category(name: &str, slug: &str) -> Category {
        let now = OffsetDateTime::now_utc();
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            color: "#3b82f6".to_string(),
            order: 0,
            is_active: true,
            article_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_article(slug: &str, category_id: Uuid) -> Article {
        let now = OffsetDateTime::now_utc();
        Article {
            id: Uuid::new_v4(),
            title: "Title".to_string(),
            slug: slug.to_string(),
            excerpt: "Excerpt".to_string(),
            content: "<p>hi</p>".to_string(),
            category_id,
            tags: vec!["rust".to_string()],
            featured_image: None,
            status: ArticleStatus::Draft,
            featured: false,
            author_id: Uuid::new_v4(),
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            views: 0,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn open_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(dir.path().join("data")).expect("store");
        assert_eq!(store.read_articles(|a| a.len()), 0);
        assert_eq!(store.read_categories(|c| c.len()), 0);
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data_dir = dir.path().join("data");

        let category = sample_category("Dev Tools", "dev-tools");
        let article = sample_article("x", category.id);
        let article_id = article.id;

        {
            let store = Store::open(data_dir.clone()).expect("store");
            store
                .write_categories(|c| {
                    c.insert(category.id, category.clone());
                })
                .expect("write categories");
            store
                .write_articles(|a| {
                    a.insert(article.id, article.clone());
                })
                .expect("write articles");
        }

        let reopened = Store::open(data_dir).expect("reopen");
        assert_eq!(reopened.read_articles(|a| a.len()), 1);
        let loaded = reopened
            .read_articles(|a| a.get(&article_id).cloned())
            .expect("article present");
        assert_eq!(loaded.slug, "x");
        assert_eq!(loaded.category_id, category.id);
    }

    #[test]
    fn removal_is_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data_dir = dir.path().join("data");
        let category = sample_category("Guides", "guides");

        {
            let store = Store::open(data_dir.clone()).expect("store");
            store
                .write_categories(|c| {
                    c.insert(category.id, category.clone());
                })
                .expect("insert");
            store
                .write_categories(|c| {
                    c.remove(&category.id);
                })
                .expect("remove");
        }

        let reopened = Store::open(data_dir).expect("reopen");
        assert_eq!(reopened.read_categories(|c| c.len()), 0);
    }
}
