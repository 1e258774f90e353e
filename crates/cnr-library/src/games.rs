//! Game repository

use crate::models::{Game, NewGame, is_valid_name};
use crate::{GAMES_KEY, LibraryError, new_id};
use chrono::Utc;
use cnr_storage::RecordStore;
use std::sync::Arc;

/// CRUD access to the `games` list
///
/// Every mutation rewrites the whole list. Unknown ids are ignored rather
/// than reported; mutators return whether a record was touched.
pub struct GameRepository {
    store: Arc<RecordStore>,
}

impl GameRepository {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// All games, in storage order
    pub async fn list(&self) -> Result<Vec<Game>, LibraryError> {
        Ok(self.store.get_as(GAMES_KEY).await?.unwrap_or_default())
    }

    /// Get a game by id
    pub async fn get(&self, id: &str) -> Result<Option<Game>, LibraryError> {
        Ok(self.list().await?.into_iter().find(|g| g.id == id))
    }

    /// Add a game at the front of the list
    ///
    /// Returns `None` without touching the store when the name is too short.
    pub async fn create(&self, new_game: NewGame) -> Result<Option<Game>, LibraryError> {
        if !is_valid_name(&new_game.name) {
            tracing::debug!("Rejected game with name {:?}", new_game.name);
            return Ok(None);
        }

        let game = new_game.into_game(new_id(), Utc::now());
        let created = game.clone();

        self.store
            .update_with(GAMES_KEY, move |games: &mut Vec<Game>| {
                games.insert(0, game);
                Some(())
            })
            .await?;

        tracing::info!("Created game {} ({})", created.name, created.id);
        Ok(Some(created))
    }

    /// Replace the stored record with the same id
    pub async fn update(&self, game: &Game) -> Result<bool, LibraryError> {
        let id = game.id.clone();
        let game = game.clone();
        self.modify(&id, move |stored| *stored = game).await
    }

    /// Bump the play count by one
    pub async fn increment_play_count(&self, id: &str) -> Result<bool, LibraryError> {
        self.modify(id, |game| game.play_count += 1).await
    }

    /// Set the last-played timestamp to now
    pub async fn set_last_played(&self, id: &str) -> Result<bool, LibraryError> {
        let now = Utc::now();
        self.modify(id, move |game| game.last_played = now).await
    }

    /// Overwrite a game's collection list
    pub async fn set_collection_ids(
        &self,
        id: &str,
        collection_ids: Vec<String>,
    ) -> Result<bool, LibraryError> {
        self.modify(id, move |game| game.collection_ids = collection_ids)
            .await
    }

    /// Strip a collection id from every game, returning how many games changed
    pub async fn remove_collection_from_all(&self, collection_id: &str) -> Result<usize, LibraryError> {
        let changed = self
            .store
            .update_with(GAMES_KEY, |games: &mut Vec<Game>| {
                let mut changed = 0;
                for game in games.iter_mut() {
                    let before = game.collection_ids.len();
                    game.collection_ids.retain(|cid| cid != collection_id);
                    if game.collection_ids.len() != before {
                        changed += 1;
                    }
                }
                (changed > 0).then_some(changed)
            })
            .await?;

        Ok(changed.unwrap_or(0))
    }

    /// Remove a game; collections still referencing it are the caller's concern
    pub async fn delete(&self, id: &str) -> Result<bool, LibraryError> {
        let removed = self
            .store
            .update_with(GAMES_KEY, |games: &mut Vec<Game>| {
                let before = games.len();
                games.retain(|g| g.id != id);
                (games.len() != before).then_some(())
            })
            .await?;

        Ok(removed.is_some())
    }

    async fn modify<F>(&self, id: &str, f: F) -> Result<bool, LibraryError>
    where
        F: FnOnce(&mut Game),
    {
        let touched = self
            .store
            .update_with(GAMES_KEY, |games: &mut Vec<Game>| {
                let game = games.iter_mut().find(|g| g.id == id)?;
                f(game);
                Some(())
            })
            .await?;

        Ok(touched.is_some())
    }
}
