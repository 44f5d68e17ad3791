use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use super::{ItemStore, StoreError};
use crate::models::{Item, ItemPatch};

/// Process-lifetime item store.
///
/// Items are kept in insertion order; `get_by_index` still counts in
/// ascending id order so both backends agree on positions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<IndexMap<i64, Item>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a couple of demo items
    pub fn with_sample_data() -> Self {
        let store = Self::new();
        {
            let mut items = store.write();
            for (id, name, price) in [(1, "Apple", 1.99), (2, "Banana", 0.99)] {
                items.insert(
                    id,
                    Item {
                        id,
                        name: name.to_string(),
                        price,
                    },
                );
            }
        }
        store
    }

    // A panicking writer cannot leave an item half-written, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, IndexMap<i64, Item>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<i64, Item>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Id of the item at `index` in ascending id order
fn id_at_index(items: &IndexMap<i64, Item>, index: i64) -> Result<i64, StoreError> {
    let position = usize::try_from(index).map_err(|_| StoreError::IndexOutOfRange(index))?;

    let mut ids: Vec<i64> = items.keys().copied().collect();
    ids.sort_unstable();

    ids.get(position)
        .copied()
        .ok_or(StoreError::IndexOutOfRange(index))
}

fn next_unused_id(items: &IndexMap<i64, Item>) -> Result<i64, StoreError> {
    match items.keys().max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| anyhow::anyhow!("no unused item id left after {}", max).into()),
    }
}

impl ItemStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.read().values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Item>, StoreError> {
        Ok(self.read().get(&id).cloned())
    }

    async fn get_by_index(&self, index: i64) -> Result<Item, StoreError> {
        let items = self.read();
        let id = id_at_index(&items, index)?;

        items
            .get(&id)
            .cloned()
            .ok_or(StoreError::IndexOutOfRange(index))
    }

    async fn create(&self, id: Option<i64>, name: String, price: f64) -> Result<Item, StoreError> {
        let mut items = self.write();

        let id = match id {
            Some(id) if items.contains_key(&id) => return Err(StoreError::AlreadyExists(id)),
            Some(id) => id,
            None => next_unused_id(&items)?,
        };

        let item = Item { id, name, price };
        items.insert(id, item.clone());

        tracing::debug!("Created item with id: {}", id);
        Ok(item)
    }

    async fn update(&self, id: i64, name: String, price: f64) -> Result<Item, StoreError> {
        let mut items = self.write();
        let item = items.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        item.name = name;
        item.price = price;

        tracing::debug!("Updated item with id: {}", id);
        Ok(item.clone())
    }

    async fn patch(&self, id: i64, patch: ItemPatch) -> Result<Item, StoreError> {
        let mut items = self.write();
        let item = items.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        patch.apply_to(item);

        tracing::debug!("Patched item with id: {}", id);
        Ok(item.clone())
    }

    async fn patch_at_index(&self, index: i64, patch: ItemPatch) -> Result<Item, StoreError> {
        let mut items = self.write();
        let id = id_at_index(&items, index)?;
        let item = items
            .get_mut(&id)
            .ok_or(StoreError::IndexOutOfRange(index))?;

        patch.apply_to(item);

        tracing::debug!("Patched item at index {} (id: {})", index, id);
        Ok(item.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let removed = self.write().shift_remove(&id).is_some();
        tracing::debug!("Delete item with id: {} (removed: {})", id, removed);
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
