//! Item storage: the `ItemStore` contract and its backends.

pub mod memory;
pub mod spanner;

use std::future::Future;

use thiserror::Error;

use crate::models::{Item, ItemPatch};

pub use memory::MemoryStore;
pub use spanner::SpannerStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item {0} not found")]
    NotFound(i64),
    #[error("item {0} already exists")]
    AlreadyExists(i64),
    #[error("index {0} out of range")]
    IndexOutOfRange(i64),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Keyed, ordered collection of items
///
/// Both backends report a missing id or index through [`StoreError`] rather
/// than an empty result, except for `get` and `delete` where absence is an
/// ordinary answer.
pub trait ItemStore {
    /// All items, in the backend's natural order
    fn list(&self) -> impl Future<Output = Result<Vec<Item>, StoreError>> + Send;

    /// Look up a single item by id
    ///
    /// # Returns
    /// * `Ok(Some(item))` - Item found
    /// * `Ok(None)` - No item with that id
    /// * `Err(_)` - Backend failure
    fn get(&self, id: i64) -> impl Future<Output = Result<Option<Item>, StoreError>> + Send;

    /// Item at the zero-based `index` in ascending id order
    ///
    /// # Errors
    /// Returns `StoreError::IndexOutOfRange` for a negative index or one past
    /// the last item
    fn get_by_index(&self, index: i64) -> impl Future<Output = Result<Item, StoreError>> + Send;

    /// Insert a new item. When `id` is `None` the next unused id is assigned.
    ///
    /// # Errors
    /// Returns `StoreError::AlreadyExists` if `id` is taken, or
    /// `StoreError::Backend` if no id above the current maximum is left
    fn create(
        &self,
        id: Option<i64>,
        name: String,
        price: f64,
    ) -> impl Future<Output = Result<Item, StoreError>> + Send;

    /// Replace both fields of an existing item
    fn update(
        &self,
        id: i64,
        name: String,
        price: f64,
    ) -> impl Future<Output = Result<Item, StoreError>> + Send;

    /// Apply the supplied fields of `patch` to an existing item
    ///
    /// An empty patch leaves the item untouched and still returns it.
    ///
    /// # Arguments
    /// * `id` - Id of the item to change
    /// * `patch` - Fields to overwrite; `None` keeps the stored value
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if there is no item with that id
    fn patch(
        &self,
        id: i64,
        patch: ItemPatch,
    ) -> impl Future<Output = Result<Item, StoreError>> + Send;

    /// Patch the item at `index` in ascending id order and return it
    ///
    /// # Errors
    /// Returns `StoreError::IndexOutOfRange` if no item sits at `index`
    fn patch_at_index(
        &self,
        index: i64,
        patch: ItemPatch,
    ) -> impl Future<Output = Result<Item, StoreError>> + Send;

    /// Returns `false` when there was nothing to delete
    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Check that the backend can serve requests
    ///
    /// # Returns
    /// * `Ok(())` - Backend is reachable
    /// * `Err(_)` - Backend is unreachable or misbehaving
    fn health_check(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Runtime-selected item store
pub enum AnyStore {
    Memory(MemoryStore),
    Spanner(SpannerStore),
}

impl AnyStore {
    pub fn backend_name(&self) -> &'static str {
        match self {
            AnyStore::Memory(_) => "memory",
            AnyStore::Spanner(_) => "spanner",
        }
    }
}

impl From<MemoryStore> for AnyStore {
    fn from(store: MemoryStore) -> Self {
        AnyStore::Memory(store)
    }
}

impl From<SpannerStore> for AnyStore {
    fn from(store: SpannerStore) -> Self {
        AnyStore::Spanner(store)
    }
}

impl ItemStore for AnyStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        match self {
            AnyStore::Memory(s) => s.list().await,
            AnyStore::Spanner(s) => s.list().await,
        }
    }

    async fn get(&self, id: i64) -> Result<Option<Item>, StoreError> {
        match self {
            AnyStore::Memory(s) => s.get(id).await,
            AnyStore::Spanner(s) => s.get(id).await,
        }
    }

    async fn get_by_index(&self, index: i64) -> Result<Item, StoreError> {
        match self {
            AnyStore::Memory(s) => s.get_by_index(index).await,
            AnyStore::Spanner(s) => s.get_by_index(index).await,
        }
    }

    async fn create(&self, id: Option<i64>, name: String, price: f64) -> Result<Item, StoreError> {
        match self {
            AnyStore::Memory(s) => s.create(id, name, price).await,
            AnyStore::Spanner(s) => s.create(id, name, price).await,
        }
    }

    async fn update(&self, id: i64, name: String, price: f64) -> Result<Item, StoreError> {
        match self {
            AnyStore::Memory(s) => s.update(id, name, price).await,
            AnyStore::Spanner(s) => s.update(id, name, price).await,
        }
    }

    async fn patch(&self, id: i64, patch: ItemPatch) -> Result<Item, StoreError> {
        match self {
            AnyStore::Memory(s) => s.patch(id, patch).await,
            AnyStore::Spanner(s) => s.patch(id, patch).await,
        }
    }

    async fn patch_at_index(&self, index: i64, patch: ItemPatch) -> Result<Item, StoreError> {
        match self {
            AnyStore::Memory(s) => s.patch_at_index(index, patch).await,
            AnyStore::Spanner(s) => s.patch_at_index(index, patch).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        match self {
            AnyStore::Memory(s) => s.delete(id).await,
            AnyStore::Spanner(s) => s.delete(id).await,
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        match self {
            AnyStore::Memory(s) => s.health_check().await,
            AnyStore::Spanner(s) => s.health_check().await,
        }
    }
}
