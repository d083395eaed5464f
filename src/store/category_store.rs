//! Category store implementation.

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{Catalog, CatalogPersistence, Post, StoreError};

/// Catalog of categories and posts with write-through persistence.
///
/// Mutations are serialized behind one write lock. Each one is applied to a
/// working copy, saved, and only then committed to memory, so a failed save
/// leaves both memory and the document untouched.
pub struct CategoryStore {
    /// Current catalog.
    catalog: RwLock<Catalog>,

    /// Where the catalog is persisted.
    persistence: Box<dyn CatalogPersistence>,
}

impl CategoryStore {
    /// Opens the store, seeding and persisting the example catalog if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted catalog cannot be read or the seed cannot be written.
    pub fn open(persistence: impl CatalogPersistence + 'static) -> Result<Self, StoreError> {
        let catalog = if let Some(catalog) = persistence.load()? {
            info!(
                "Loaded {} categories ({} posts)",
                catalog.len(),
                catalog.post_count()
            );
            catalog
        } else {
            let seed = Catalog::example();
            persistence.save(&seed)?;
            info!("No catalog found, seeded {} default categories", seed.len());
            seed
        };

        Ok(Self::with_catalog(catalog, persistence))
    }

    /// Creates a store over an already loaded catalog without touching persistence.
    #[must_use]
    pub fn with_catalog(catalog: Catalog, persistence: impl CatalogPersistence + 'static) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            persistence: Box::new(persistence),
        }
    }

    /// Returns a snapshot of the full catalog.
    pub async fn get_all(&self) -> Catalog {
        self.catalog.read().await.clone()
    }

    /// Returns the number of categories.
    pub async fn category_count(&self) -> usize {
        self.catalog.read().await.len()
    }

    /// Returns the number of posts across all categories.
    pub async fn post_count(&self) -> usize {
        self.catalog.read().await.post_count()
    }

    /// Applies `op` to a copy of the catalog, persists it, then commits it.
    ///
    /// # Errors
    ///
    /// Returns the error from `op`, or a storage error if saving fails.
    pub async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Catalog) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut catalog = self.catalog.write().await;
        let mut working = catalog.clone();
        let result = op(&mut working)?;

        if let Err(e) = self.persistence.save(&working) {
            warn!("Failed to save catalog: {}", e);
            return Err(e);
        }

        *catalog = working;
        Ok(result)
    }

    /// Adds an empty category at the end.
    pub async fn add_category(&self, name: &str) -> Result<(), StoreError> {
        self.mutate(|catalog| {
            if catalog.contains(name) {
                return Err(StoreError::AlreadyExists(format!(
                    "Category '{name}' already exists"
                )));
            }
            catalog.insert(name, Vec::new());
            Ok(())
        })
        .await?;

        info!("Added category '{}'", name);
        Ok(())
    }

    /// Deletes a category and its posts, returning the removed posts.
    pub async fn delete_category(&self, name: &str) -> Result<Vec<Post>, StoreError> {
        let removed = self
            .mutate(|catalog| catalog.remove(name).ok_or_else(|| category_not_found(name)))
            .await?;

        info!("Deleted category '{}' ({} posts)", name, removed.len());
        Ok(removed)
    }

    /// Moves a category's posts to a new name; the new name goes last.
    pub async fn rename_category(&self, old: &str, new: &str) -> Result<(), StoreError> {
        self.mutate(|catalog| {
            if !catalog.contains(old) {
                return Err(category_not_found(old));
            }
            if catalog.contains(new) {
                return Err(StoreError::AlreadyExists(format!(
                    "Category '{new}' already exists"
                )));
            }
            let posts = catalog.remove(old).unwrap_or_default();
            catalog.insert(new, posts);
            Ok(())
        })
        .await?;

        info!("Renamed category '{}' to '{}'", old, new);
        Ok(())
    }

    /// Appends a post to a category and returns it.
    pub async fn add_post(&self, category: &str, post: Post) -> Result<Post, StoreError> {
        let stored = self
            .mutate(|catalog| {
                let posts = catalog
                    .get_mut(category)
                    .ok_or_else(|| category_not_found(category))?;
                posts.push(post.clone());
                Ok(post)
            })
            .await?;

        info!("Added post '{}' to '{}'", stored.title, category);
        Ok(stored)
    }

    /// Replaces the post at `index`, returning the previous one.
    pub async fn update_post(
        &self,
        category: &str,
        index: usize,
        post: Post,
    ) -> Result<Post, StoreError> {
        let previous = self
            .mutate(|catalog| {
                let slot = post_slot(catalog, category, index)?;
                Ok(std::mem::replace(slot, post))
            })
            .await?;

        info!("Updated post {} in '{}'", index, category);
        Ok(previous)
    }

    /// Removes the post at `index`; later posts shift down by one.
    pub async fn delete_post(&self, category: &str, index: usize) -> Result<Post, StoreError> {
        let removed = self
            .mutate(|catalog| {
                post_slot(catalog, category, index)?;
                let posts = catalog
                    .get_mut(category)
                    .ok_or_else(|| category_not_found(category))?;
                Ok(posts.remove(index))
            })
            .await?;

        info!("Deleted post {} ('{}') from '{}'", index, removed.title, category);
        Ok(removed)
    }
}

fn category_not_found(name: &str) -> StoreError {
    StoreError::NotFound(format!("Category '{name}' not found"))
}

fn post_slot<'a>(
    catalog: &'a mut Catalog,
    category: &str,
    index: usize,
) -> Result<&'a mut Post, StoreError> {
    let posts = catalog
        .get_mut(category)
        .ok_or_else(|| category_not_found(category))?;
    let len = posts.len();
    posts.get_mut(index).ok_or_else(|| {
        StoreError::NotFound(format!(
            "Post {index} not found in '{category}' ({len} posts)"
        ))
    })
}

impl std::fmt::Debug for CategoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryStore").finish_non_exhaustive()
    }
}
