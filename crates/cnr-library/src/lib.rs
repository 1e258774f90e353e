//! Game library management for the CNR game launcher
//!
//! Typed repositories over the record store (games, collections, user
//! preferences) and the library workflows that keep games and collections
//! pointing at each other.

mod collections;
mod games;
mod id;
mod library;
mod models;
mod ordering;
mod preferences;
mod reminder;

pub use collections::CollectionRepository;
pub use games::GameRepository;
pub use id::new_id;
pub use library::Library;
pub use models::{
    Collection, Game, GameViewKind, NewGame, ReviewReminder, Theme, UserPreferences,
    WindowBounds, is_valid_name,
};
pub use ordering::{GameOrder, SortDirection, sort_games};
pub use preferences::PreferencesRepository;
pub use reminder::ReviewAnswer;

use cnr_storage::StorageError;
use thiserror::Error;

/// Record store key holding the game list
pub const GAMES_KEY: &str = "games";

/// Record store key holding the collection list
pub const COLLECTIONS_KEY: &str = "collections";

/// Record store key holding the user preferences
pub const PREFERENCES_KEY: &str = "user.preferences";

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
