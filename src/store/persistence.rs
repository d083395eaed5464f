//! Backends that hold the persisted catalog document.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::{Catalog, StoreError};

/// Loads and saves the whole catalog document.
pub trait CatalogPersistence: Send + Sync {
    /// Loads the persisted catalog, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<Catalog>, StoreError>;

    /// Replaces the persisted catalog.
    fn save(&self, catalog: &Catalog) -> Result<(), StoreError>;
}

/// Catalog stored as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Creates a backend for the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Option<Catalog>, StoreError> {
        match Catalog::load_from_file(&self.path) {
            Ok(catalog) => Ok(Some(catalog)),
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("Catalog file {} does not exist yet", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        catalog.save_to_file(&self.path)?;
        debug!(
            "Saved {} categories to {}",
            catalog.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// In-process backend, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    saved: Mutex<Option<Catalog>>,
    fail_saves: AtomicBool,
}

impl MemoryPersistence {
    /// Creates an empty backend with nothing persisted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that already holds a catalog.
    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            saved: Mutex::new(Some(catalog)),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Makes subsequent saves fail with an I/O error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Returns the last saved catalog.
    #[must_use]
    pub fn snapshot(&self) -> Option<Catalog> {
        self.saved
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl CatalogPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<Catalog>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("simulated write failure")));
        }
        *self
            .saved
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(catalog.clone());
        Ok(())
    }
}

impl<P: CatalogPersistence + ?Sized> CatalogPersistence for std::sync::Arc<P> {
    fn load(&self) -> Result<Option<Catalog>, StoreError> {
        (**self).load()
    }

    fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        (**self).save(catalog)
    }
}
