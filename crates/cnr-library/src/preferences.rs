//! User preferences repository

use crate::models::{ReviewReminder, UserPreferences, WindowBounds};
use crate::{LibraryError, PREFERENCES_KEY};
use cnr_storage::RecordStore;
use std::sync::Arc;

/// Access to the `user.preferences` singleton
pub struct PreferencesRepository {
    store: Arc<RecordStore>,
}

impl PreferencesRepository {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Current preferences, or `None` if never saved
    pub async fn get(&self) -> Result<Option<UserPreferences>, LibraryError> {
        Ok(self.store.get_as(PREFERENCES_KEY).await?)
    }

    /// Merge `update` onto the stored preferences
    ///
    /// Fields left unset keep their stored value; nested values such as
    /// `windowBounds` are replaced wholesale.
    pub async fn set(&self, update: UserPreferences) -> Result<UserPreferences, LibraryError> {
        let merged = self
            .store
            .update_with(PREFERENCES_KEY, |prefs: &mut UserPreferences| {
                prefs.merge(update);
                Some(prefs.clone())
            })
            .await?;

        Ok(merged.unwrap_or_default())
    }

    /// Persist window state on exit
    ///
    /// Bounds are only kept for a normal window; a maximized or full-screen
    /// window clears them so the next start opens centered.
    pub async fn save_window_state(
        &self,
        bounds: WindowBounds,
        full_screen: bool,
        maximized: bool,
    ) -> Result<(), LibraryError> {
        let maximized = if cfg!(target_os = "macos") && full_screen {
            true
        } else {
            maximized
        };

        self.store
            .update_with(PREFERENCES_KEY, |prefs: &mut UserPreferences| {
                prefs.window_bounds = (!maximized && !full_screen).then_some(bounds);
                prefs.full_screen = Some(full_screen);
                prefs.maximized = Some(maximized);
                Some(())
            })
            .await?;

        tracing::debug!(full_screen, maximized, "Window state saved");
        Ok(())
    }

    /// Stored review reminder, if one was scheduled
    pub async fn review_reminder(&self) -> Result<Option<ReviewReminder>, LibraryError> {
        Ok(self.get().await?.and_then(|prefs| prefs.review_remind))
    }

    /// Replace the review reminder
    pub async fn set_review_reminder(&self, reminder: ReviewReminder) -> Result<(), LibraryError> {
        self.set(UserPreferences {
            review_remind: Some(reminder),
            ..Default::default()
        })
        .await?;
        Ok(())
    }
}
