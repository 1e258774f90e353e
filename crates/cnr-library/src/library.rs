//! Library workflows spanning games, collections and media

use crate::collections::CollectionRepository;
use crate::games::GameRepository;
use crate::models::{Collection, Game, NewGame};
use crate::ordering::{GameOrder, SortDirection, compare_names, sort_games};
use crate::preferences::PreferencesRepository;
use crate::LibraryError;
use cnr_storage::{MediaStore, RecordStore};
use std::sync::Arc;

/// The game library
///
/// Owns the repositories over a shared record store and keeps the
/// game <-> collection relation consistent from both sides.
pub struct Library {
    games: GameRepository,
    collections: CollectionRepository,
    preferences: PreferencesRepository,
    media: MediaStore,
}

impl Library {
    pub fn new(store: Arc<RecordStore>, media: MediaStore) -> Self {
        Self {
            games: GameRepository::new(Arc::clone(&store)),
            collections: CollectionRepository::new(Arc::clone(&store)),
            preferences: PreferencesRepository::new(store),
            media,
        }
    }

    pub fn games(&self) -> &GameRepository {
        &self.games
    }

    pub fn collections(&self) -> &CollectionRepository {
        &self.collections
    }

    pub fn preferences(&self) -> &PreferencesRepository {
        &self.preferences
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    /// Create a game and add it to every collection listed in `collection_ids`
    pub async fn add_game(&self, new_game: NewGame) -> Result<Option<Game>, LibraryError> {
        let Some(game) = self.games.create(new_game).await? else {
            return Ok(None);
        };

        for collection_id in &game.collection_ids {
            self.collections.add_game(collection_id, &game.id).await?;
        }

        Ok(Some(game))
    }

    /// Save a game and make its collections match `game.collection_ids`
    pub async fn update_game(&self, game: &Game) -> Result<bool, LibraryError> {
        if !self.games.update(game).await? {
            return Ok(false);
        }

        self.collections.remove_game_from_all(&game.id).await?;
        for collection_id in &game.collection_ids {
            self.collections.add_game(collection_id, &game.id).await?;
        }

        Ok(true)
    }

    /// Delete a game, its icons and its collection memberships
    ///
    /// Icon removal is best effort: failures are logged and the game is
    /// deleted regardless.
    pub async fn delete_game(&self, id: &str) -> Result<bool, LibraryError> {
        let Some(game) = self.games.get(id).await? else {
            return Ok(false);
        };

        if let Err(e) = self.media.delete_images(game.icon_uris()).await {
            tracing::warn!("Icons of game {} not fully removed: {}", game.id, e);
        }

        self.games.delete(id).await?;
        self.collections.remove_game_from_all(id).await?;

        tracing::info!("Deleted game {} ({})", game.name, game.id);
        Ok(true)
    }

    /// Delete a collection and drop it from every game
    pub async fn delete_collection(&self, id: &str) -> Result<bool, LibraryError> {
        let deleted = self.collections.delete(id).await?;
        self.games.remove_collection_from_all(id).await?;

        if deleted {
            tracing::info!("Deleted collection {}", id);
        }
        Ok(deleted)
    }

    /// Take a game out of one collection, on both sides of the relation
    pub async fn remove_game_from_collection(
        &self,
        collection_id: &str,
        game_id: &str,
    ) -> Result<(), LibraryError> {
        if let Some(collection) = self.collections.get(collection_id).await? {
            let remaining = collection
                .game_ids
                .into_iter()
                .filter(|id| id != game_id)
                .collect();
            self.collections.set_games(collection_id, remaining).await?;
        }

        if let Some(game) = self.games.get(game_id).await? {
            let remaining = game
                .collection_ids
                .into_iter()
                .filter(|id| id != collection_id)
                .collect();
            self.games.set_collection_ids(game_id, remaining).await?;
        }

        Ok(())
    }

    /// Record one play of a game
    pub async fn record_game_run(&self, id: &str) -> Result<bool, LibraryError> {
        if !self.games.increment_play_count(id).await? {
            return Ok(false);
        }
        self.games.set_last_played(id).await?;
        Ok(true)
    }

    /// All games in the requested order
    pub async fn sorted_games(
        &self,
        order: GameOrder,
        direction: SortDirection,
    ) -> Result<Vec<Game>, LibraryError> {
        let mut games = self.games.list().await?;
        sort_games(&mut games, order, direction);
        Ok(games)
    }

    /// All collections by name
    pub async fn sorted_collections(&self) -> Result<Vec<Collection>, LibraryError> {
        let mut collections = self.collections.list().await?;
        collections.sort_by(|a, b| compare_names(&a.name, &b.name));
        Ok(collections)
    }

    /// Games whose name contains `query`, ignoring case, alphabetically
    pub async fn search_games(&self, query: &str) -> Result<Vec<Game>, LibraryError> {
        let needle = query.trim().to_lowercase();
        let mut games: Vec<Game> = self
            .games
            .list()
            .await?
            .into_iter()
            .filter(|g| g.name.to_lowercase().contains(&needle))
            .collect();
        sort_games(&mut games, GameOrder::Alphabetic, SortDirection::Ascending);
        Ok(games)
    }

    /// Games played at least once, most recent first
    pub async fn recently_played(&self, limit: usize) -> Result<Vec<Game>, LibraryError> {
        let mut games: Vec<Game> = self
            .games
            .list()
            .await?
            .into_iter()
            .filter(|g| g.play_count > 0)
            .collect();
        sort_games(&mut games, GameOrder::RecentlyPlayed, SortDirection::Descending);
        games.truncate(limit);
        Ok(games)
    }

    /// Games belonging to a collection, in membership order
    pub async fn collection_games(&self, collection_id: &str) -> Result<Vec<Game>, LibraryError> {
        let Some(collection) = self.collections.get(collection_id).await? else {
            return Ok(Vec::new());
        };

        let games = self.games.list().await?;
        Ok(collection
            .game_ids
            .iter()
            .filter_map(|id| games.iter().find(|g| &g.id == id).cloned())
            .collect())
    }
}
