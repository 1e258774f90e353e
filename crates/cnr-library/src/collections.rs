//! Collection repository

use crate::models::{Collection, is_valid_name};
use crate::{COLLECTIONS_KEY, LibraryError, new_id};
use cnr_storage::RecordStore;
use std::sync::Arc;

/// CRUD access to the `collections` list
pub struct CollectionRepository {
    store: Arc<RecordStore>,
}

impl CollectionRepository {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// All collections, in storage order
    pub async fn list(&self) -> Result<Vec<Collection>, LibraryError> {
        Ok(self.store.get_as(COLLECTIONS_KEY).await?.unwrap_or_default())
    }

    /// Get a collection by id
    pub async fn get(&self, id: &str) -> Result<Option<Collection>, LibraryError> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }

    /// Create an empty collection at the front of the list
    ///
    /// Returns `None` without touching the store when the name is too short
    /// or another collection already has it, ignoring case.
    pub async fn create(&self, name: &str) -> Result<Option<Collection>, LibraryError> {
        if !is_valid_name(name) {
            return Ok(None);
        }

        let wanted = name.to_lowercase();
        let collection = Collection {
            id: new_id(),
            name: name.to_string(),
            game_ids: Vec::new(),
        };

        let created = self
            .store
            .update_with(COLLECTIONS_KEY, |collections: &mut Vec<Collection>| {
                if collections
                    .iter()
                    .any(|c| c.name.to_lowercase() == wanted)
                {
                    return None;
                }
                collections.insert(0, collection.clone());
                Some(collection)
            })
            .await?;

        match &created {
            Some(c) => tracing::info!("Created collection {} ({})", c.name, c.id),
            None => tracing::debug!("Collection name {:?} already taken", name),
        }

        Ok(created)
    }

    /// Append a game to a collection
    ///
    /// Membership is not de-duplicated: adding the same game twice lists it
    /// twice. The updated collection moves to the end of the list.
    pub async fn add_game(&self, collection_id: &str, game_id: &str) -> Result<bool, LibraryError> {
        self.modify_and_move_last(collection_id, |collection| {
            collection.game_ids.push(game_id.to_string());
        })
        .await
    }

    /// Replace a collection's membership
    pub async fn set_games(
        &self,
        collection_id: &str,
        game_ids: Vec<String>,
    ) -> Result<bool, LibraryError> {
        let touched = self
            .store
            .update_with(COLLECTIONS_KEY, |collections: &mut Vec<Collection>| {
                let collection = collections.iter_mut().find(|c| c.id == collection_id)?;
                collection.game_ids = game_ids;
                Some(())
            })
            .await?;

        Ok(touched.is_some())
    }

    /// Remove the given games from one collection
    pub async fn remove_games(
        &self,
        collection_id: &str,
        game_ids: &[String],
    ) -> Result<bool, LibraryError> {
        self.modify_and_move_last(collection_id, |collection| {
            collection.game_ids.retain(|id| !game_ids.contains(id));
        })
        .await
    }

    /// Remove a game from every collection, returning how many collections changed
    pub async fn remove_game_from_all(&self, game_id: &str) -> Result<usize, LibraryError> {
        let changed = self
            .store
            .update_with(COLLECTIONS_KEY, |collections: &mut Vec<Collection>| {
                let mut changed = 0;
                for collection in collections.iter_mut() {
                    let before = collection.game_ids.len();
                    collection.game_ids.retain(|id| id != game_id);
                    if collection.game_ids.len() != before {
                        changed += 1;
                    }
                }
                (changed > 0).then_some(changed)
            })
            .await?;

        Ok(changed.unwrap_or(0))
    }

    /// Remove a collection; games still referencing it are the caller's concern
    pub async fn delete(&self, id: &str) -> Result<bool, LibraryError> {
        let removed = self
            .store
            .update_with(COLLECTIONS_KEY, |collections: &mut Vec<Collection>| {
                let before = collections.len();
                collections.retain(|c| c.id != id);
                (collections.len() != before).then_some(())
            })
            .await?;

        Ok(removed.is_some())
    }

    async fn modify_and_move_last<F>(&self, collection_id: &str, f: F) -> Result<bool, LibraryError>
    where
        F: FnOnce(&mut Collection),
    {
        let touched = self
            .store
            .update_with(COLLECTIONS_KEY, |collections: &mut Vec<Collection>| {
                let index = collections.iter().position(|c| c.id == collection_id)?;
                let mut collection = collections.remove(index);
                f(&mut collection);
                collections.push(collection);
                Some(())
            })
            .await?;

        Ok(touched.is_some())
    }
}
