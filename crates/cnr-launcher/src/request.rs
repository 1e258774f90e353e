//! Wire types of the request server
//!
//! Every operation of the library, preferences, media and backup services is
//! one `Request` variant. Requests and responses travel as single-line JSON
//! objects tagged by `op` and `type` respectively.

use cnr_backup::{ExportOutcome, ImportOutcome};
use cnr_library::{
    Collection, Game, GameOrder, NewGame, ReviewAnswer, ReviewReminder, SortDirection,
    UserPreferences, WindowBounds,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    // Games
    GetGames,
    GetGameById { id: String },
    AddGame { game: NewGame },
    UpdateGame { game: Game },
    DeleteGame { id: String },
    IncrementPlayCount { id: String },
    SetLastPlayedDate { id: String },
    SetCollections { id: String, collection_ids: Vec<String> },
    SortedGames {
        #[serde(default)]
        order: GameOrder,
        #[serde(default)]
        direction: SortDirection,
    },
    SearchGames { query: String },
    RecentlyPlayed { limit: usize },

    // Running
    Run { path: String },
    RunGame { id: String },

    // Collections
    GetCollections,
    SortedCollections,
    AddCollection { name: String },
    DeleteCollection { id: String },
    CollectionGames { collection_id: String },
    SetGamesToCollection { collection_id: String, game_ids: Vec<String> },
    AddGameToCollection { collection_id: String, game_id: String },
    RemoveGamesFromCollection { collection_id: String, game_ids: Vec<String> },
    RemoveGameFromCollection { collection_id: String, game_id: String },
    RemoveAGameFromAllCollections { game_id: String },

    // Preferences
    GetUserPrefs,
    SetUserPrefs { prefs: UserPreferences },
    SaveWindowState {
        bounds: WindowBounds,
        full_screen: bool,
        maximized: bool,
    },
    VerifyPin { pin: String },
    GetReviewReminder,
    AnswerReviewReminder { answer: ReviewAnswer },

    // Media
    SaveImage { image_data: String },
    DeleteGameIcons { files: Vec<Option<String>> },

    // Backup
    Backup {
        #[serde(default)]
        directory: Option<PathBuf>,
    },
    RestoreBackup {
        #[serde(default)]
        directory: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Response {
    Games { games: Vec<Game> },
    Game { game: Option<Game> },
    Collections { collections: Vec<Collection> },
    Collection { collection: Option<Collection> },
    Preferences { prefs: Option<UserPreferences> },
    Reminder { reminder: ReviewReminder, due: bool },
    /// Outcome of a command that only succeeds or not
    Flag { value: bool },
    /// Number of records a command touched
    Count { value: usize },
    ImageUpload {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    IconsDeleted {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Exported { outcome: ExportOutcome },
    Imported { outcome: ImportOutcome },
    Done,
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Whether the process must restart after sending this response
    pub fn requires_restart(&self) -> bool {
        matches!(
            self,
            Self::Imported {
                outcome: ImportOutcome::Restored
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let request: Request = serde_json::from_value(json!({
            "op": "addGameToCollection",
            "collectionId": "c1",
            "gameId": "g1"
        }))
        .unwrap();
        assert_eq!(
            request,
            Request::AddGameToCollection {
                collection_id: "c1".to_string(),
                game_id: "g1".to_string()
            }
        );

        let request: Request = serde_json::from_str(r#"{"op":"getGames"}"#).unwrap();
        assert_eq!(request, Request::GetGames);
    }

    #[test]
    fn test_request_defaults() {
        let request: Request = serde_json::from_str(r#"{"op":"backup"}"#).unwrap();
        assert_eq!(request, Request::Backup { directory: None });

        let request: Request = serde_json::from_str(r#"{"op":"sortedGames"}"#).unwrap();
        assert_eq!(
            request,
            Request::SortedGames {
                order: GameOrder::Alphabetic,
                direction: SortDirection::Ascending
            }
        );
    }

    #[test]
    fn test_unknown_op_rejected() {
        assert!(serde_json::from_str::<Request>(r#"{"op":"formatDisk"}"#).is_err());
    }

    #[test]
    fn test_response_wire_format() {
        let response = Response::ImageUpload {
            success: true,
            path: Some("app-image://1.png".to_string()),
            error: None,
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": "imageUpload", "success": true, "path": "app-image://1.png"})
        );

        let response = Response::Imported {
            outcome: ImportOutcome::IncorrectFile,
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": "imported", "outcome": "incorrect file"})
        );
    }

    #[test]
    fn test_requires_restart() {
        assert!(Response::Imported { outcome: ImportOutcome::Restored }.requires_restart());
        assert!(!Response::Imported { outcome: ImportOutcome::Canceled }.requires_restart());
        assert!(!Response::Done.requires_restart());
    }
}
