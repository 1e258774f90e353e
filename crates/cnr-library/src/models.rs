//! Library records as they are stored in the record store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum trimmed length of game and collection names
const MIN_NAME_LEN: usize = 2;

/// Whether `name` is long enough to name a game or collection
pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_NAME_LEN
}

/// A game in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe_path: Option<String>,
    pub is_installed: bool,
    pub created_at: DateTime<Utc>,
    pub last_played: DateTime<Utc>,
    pub play_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_icon_path: Option<String>,
    #[serde(default)]
    pub collection_ids: Vec<String>,
}

impl Game {
    /// Icon URIs referenced by this game
    pub fn icon_uris(&self) -> [Option<&str>; 2] {
        [self.icon_path.as_deref(), self.card_icon_path.as_deref()]
    }

    /// Whether the game has something to launch
    pub fn is_launchable(&self) -> bool {
        self.exe_path
            .as_deref()
            .is_some_and(|path| !path.trim().is_empty())
    }
}

/// Fields supplied when adding a game; id, creation time and play count are assigned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub name: String,
    #[serde(default)]
    pub exe_path: Option<String>,
    #[serde(default)]
    pub is_installed: bool,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
    #[serde(default)]
    pub icon_path: Option<String>,
    #[serde(default)]
    pub card_icon_path: Option<String>,
    #[serde(default)]
    pub collection_ids: Vec<String>,
}

impl NewGame {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn into_game(self, id: String, now: DateTime<Utc>) -> Game {
        Game {
            id,
            name: self.name,
            exe_path: self.exe_path,
            is_installed: self.is_installed,
            created_at: now,
            last_played: self.last_played.unwrap_or(now),
            play_count: 0,
            icon_path: self.icon_path,
            card_icon_path: self.card_icon_path,
            collection_ids: self.collection_ids,
        }
    }
}

/// A user-defined group of games
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub game_ids: Vec<String>,
}

/// Saved window geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

/// How the game list is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameViewKind {
    List,
    Icon,
    Card,
}

/// Schedule of the "rate the app" prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReminder {
    /// Next time the prompt may be shown
    pub date: DateTime<Utc>,
    /// Current escalation period in weeks
    pub period_week: u32,
    /// Set once the user answered for good
    pub complete: bool,
}

/// User preferences singleton
///
/// Every field is optional: a preferences update only carries the fields it
/// changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_bounds: Option<WindowBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_screen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximized: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_with_pin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_menu_collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_only_installed_games_as_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_view_kind: Option<GameViewKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_bigpicture_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_on_windows_boot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_remind: Option<ReviewReminder>,
}

impl UserPreferences {
    /// Shallow merge: every field set in `update` replaces the current one
    pub fn merge(&mut self, update: UserPreferences) {
        if update.window_bounds.is_some() {
            self.window_bounds = update.window_bounds;
        }
        if update.full_screen.is_some() {
            self.full_screen = update.full_screen;
        }
        if update.maximized.is_some() {
            self.maximized = update.maximized;
        }
        if update.login_with_pin.is_some() {
            self.login_with_pin = update.login_with_pin;
        }
        if update.pin_code.is_some() {
            self.pin_code = update.pin_code;
        }
        if update.side_menu_collapsed.is_some() {
            self.side_menu_collapsed = update.side_menu_collapsed;
        }
        if update.theme.is_some() {
            self.theme = update.theme;
        }
        if update.show_only_installed_games_as_default.is_some() {
            self.show_only_installed_games_as_default = update.show_only_installed_games_as_default;
        }
        if update.game_view_kind.is_some() {
            self.game_view_kind = update.game_view_kind;
        }
        if update.open_bigpicture_mode.is_some() {
            self.open_bigpicture_mode = update.open_bigpicture_mode;
        }
        if update.start_on_windows_boot.is_some() {
            self.start_on_windows_boot = update.start_on_windows_boot;
        }
        if update.review_remind.is_some() {
            self.review_remind = update.review_remind;
        }
    }

    /// Whether a PIN must be entered before the library opens
    pub fn requires_pin(&self) -> bool {
        self.login_with_pin == Some(true)
            && self.pin_code.as_deref().is_some_and(|pin| !pin.is_empty())
    }

    /// Check a PIN attempt against the stored code
    pub fn verify_pin(&self, attempt: &str) -> bool {
        !self.requires_pin() || self.pin_code.as_deref() == Some(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("Foo"));
        assert!(is_valid_name("  ab  "));
        assert!(!is_valid_name("a"));
        assert!(!is_valid_name("   "));
        assert!(!is_valid_name(" x "));
    }

    #[test]
    fn test_game_serializes_camel_case() {
        let now = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let game = NewGame {
            exe_path: Some("C:/Games/foo.exe".to_string()),
            ..NewGame::named("Foo")
        }
        .into_game("g1".to_string(), now);

        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["exePath"], "C:/Games/foo.exe");
        assert_eq!(value["isInstalled"], false);
        assert_eq!(value["playCount"], 0);
        assert_eq!(value["createdAt"], value["lastPlayed"]);
        assert!(value.get("iconPath").is_none());
        assert_eq!(value["collectionIds"], json!([]));
    }

    #[test]
    fn test_game_reads_browser_dates() {
        let game: Game = serde_json::from_value(json!({
            "id": "g1",
            "name": "Foo",
            "isInstalled": true,
            "createdAt": "2024-05-01T10:00:00.000Z",
            "lastPlayed": "2024-05-02T10:00:00.000Z",
            "playCount": 3,
            "exePath": null,
            "collectionIds": ["c1"]
        }))
        .unwrap();

        assert_eq!(game.play_count, 3);
        assert!(game.exe_path.is_none());
        assert!(!game.is_launchable());
    }

    #[test]
    fn test_preferences_merge_is_shallow() {
        let mut prefs = UserPreferences {
            theme: Some(Theme::Dark),
            window_bounds: Some(WindowBounds { x: 1, y: 2, width: 800, height: 600 }),
            ..Default::default()
        };

        prefs.merge(UserPreferences {
            window_bounds: Some(WindowBounds { x: 0, y: 0, width: 1024, height: 768 }),
            game_view_kind: Some(GameViewKind::Card),
            ..Default::default()
        });

        assert_eq!(prefs.theme, Some(Theme::Dark));
        assert_eq!(prefs.game_view_kind, Some(GameViewKind::Card));
        assert_eq!(
            prefs.window_bounds,
            Some(WindowBounds { x: 0, y: 0, width: 1024, height: 768 })
        );
    }

    #[test]
    fn test_preferences_wire_names() {
        let prefs = UserPreferences {
            open_bigpicture_mode: Some(true),
            show_only_installed_games_as_default: Some(false),
            theme: Some(Theme::System),
            ..Default::default()
        };

        let value = serde_json::to_value(&prefs).unwrap();
        assert_eq!(
            value,
            json!({
                "openBigpictureMode": true,
                "showOnlyInstalledGamesAsDefault": false,
                "theme": "system"
            })
        );
    }

    #[test]
    fn test_pin_check() {
        let mut prefs = UserPreferences::default();
        assert!(prefs.verify_pin("anything"));

        prefs.login_with_pin = Some(true);
        prefs.pin_code = Some("1234".to_string());
        assert!(prefs.requires_pin());
        assert!(prefs.verify_pin("1234"));
        assert!(!prefs.verify_pin("0000"));
    }
}
