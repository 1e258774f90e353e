//! Strict shape of an importable store document
//!
//! The types below mirror the record store layout but reject unknown
//! properties at every level. They are only used to validate a document
//! before it replaces the live store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreDocument {
    games: Vec<GameRecord>,
    #[serde(default, deserialize_with = "present")]
    collections: Option<Vec<CollectionRecord>>,
    #[serde(default, deserialize_with = "present")]
    user: Option<UserRecord>,
}

/// Optional but not nullable: an absent key is `None`, an explicit `null` is rejected
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// Fields are only deserialized to check their presence and type.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GameRecord {
    id: String,
    name: String,
    exe_path: Option<String>,
    is_installed: bool,
    created_at: DateTime<Utc>,
    last_played: DateTime<Utc>,
    play_count: u64,
    icon_path: Option<String>,
    card_icon_path: Option<String>,
    collection_ids: Vec<String>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CollectionRecord {
    id: String,
    name: String,
    game_ids: Vec<String>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UserRecord {
    preferences: PreferencesRecord,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PreferencesRecord {
    #[serde(default, deserialize_with = "present")]
    window_bounds: Option<WindowBoundsRecord>,
    full_screen: Option<bool>,
    maximized: Option<bool>,
    login_with_pin: Option<bool>,
    pin_code: Option<String>,
    side_menu_collapsed: Option<bool>,
    theme: Option<ThemeRecord>,
    show_only_installed_games_as_default: Option<bool>,
    game_view_kind: Option<GameViewKindRecord>,
    open_bigpicture_mode: Option<bool>,
    start_on_windows_boot: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    review_remind: Option<ReviewRemindRecord>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WindowBoundsRecord {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ThemeRecord {
    Light,
    Dark,
    System,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GameViewKindRecord {
    List,
    Icon,
    Card,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ReviewRemindRecord {
    date: DateTime<Utc>,
    period_week: u32,
    complete: bool,
}

/// What a valid document contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentSummary {
    pub games: usize,
    pub collections: usize,
    pub has_preferences: bool,
}

/// Check `document` against the store schema
///
/// `games` is required; `collections` and `user` are optional but may not
/// be `null`; any property not in the schema is rejected.
pub fn validate_document(document: &Value) -> Result<DocumentSummary, serde_json::Error> {
    let parsed = StoreDocument::deserialize(document)?;

    Ok(DocumentSummary {
        games: parsed.games.len(),
        collections: parsed.collections.map_or(0, |c| c.len()),
        has_preferences: parsed.user.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn game() -> Value {
        json!({
            "id": "g1",
            "name": "Foo",
            "isInstalled": true,
            "createdAt": "2024-05-01T10:00:00.000Z",
            "lastPlayed": "2024-05-01T10:00:00.000Z",
            "playCount": 0,
            "collectionIds": []
        })
    }

    #[test]
    fn test_minimal_document() {
        let summary = validate_document(&json!({"games": []})).unwrap();
        assert_eq!(
            summary,
            DocumentSummary { games: 0, collections: 0, has_preferences: false }
        );
    }

    #[test]
    fn test_full_document() {
        let document = json!({
            "games": [game()],
            "collections": [{"id": "c1", "name": "Action", "gameIds": ["g1"]}],
            "user": {"preferences": {
                "windowBounds": {"x": 0, "y": 0, "width": 800, "height": 600},
                "theme": "dark",
                "gameViewKind": "card",
                "pinCode": null,
                "reviewRemind": {"date": "2024-06-01T00:00:00.000Z", "periodWeek": 2, "complete": false}
            }}
        });

        let summary = validate_document(&document).unwrap();
        assert_eq!(summary.games, 1);
        assert_eq!(summary.collections, 1);
        assert!(summary.has_preferences);
    }

    #[test]
    fn test_games_required() {
        assert!(validate_document(&json!({"collections": []})).is_err());
        assert!(validate_document(&json!([])).is_err());
    }

    #[test]
    fn test_unknown_properties_rejected() {
        assert!(validate_document(&json!({"games": [], "extra": 1})).is_err());

        let mut with_extra = game();
        with_extra["rating"] = json!(5);
        assert!(validate_document(&json!({"games": [with_extra]})).is_err());

        let bounds = json!({"user": {"preferences": {
            "windowBounds": {"x": 0, "y": 0, "width": 1, "height": 1, "z": 3}
        }}, "games": []});
        assert!(validate_document(&bounds).is_err());
    }

    #[test]
    fn test_required_game_fields() {
        let mut missing = game();
        missing.as_object_mut().unwrap().remove("playCount");
        assert!(validate_document(&json!({"games": [missing]})).is_err());
    }

    #[test]
    fn test_user_requires_preferences() {
        assert!(validate_document(&json!({"games": [], "user": {}})).is_err());
    }

    #[test]
    fn test_optional_objects_reject_null() {
        assert!(validate_document(&json!({"games": [], "collections": null})).is_err());
        assert!(validate_document(&json!({"games": [], "user": null})).is_err());

        let bounds = json!({"games": [], "user": {"preferences": {"windowBounds": null}}});
        assert!(validate_document(&bounds).is_err());
    }

    #[test]
    fn test_nullable_fields_accept_null() {
        let mut nullable = game();
        nullable["exePath"] = Value::Null;
        nullable["iconPath"] = Value::Null;
        nullable["cardIconPath"] = Value::Null;

        let document = json!({
            "games": [nullable],
            "user": {"preferences": {"theme": null, "fullScreen": null, "pinCode": null}}
        });
        assert!(validate_document(&document).is_ok());
    }

    #[test]
    fn test_enum_values_checked() {
        let document = json!({"games": [], "user": {"preferences": {"theme": "neon"}}});
        assert!(validate_document(&document).is_err());
    }
}
