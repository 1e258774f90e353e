//! Routes requests to the library, media and backup services

use crate::process::GameSpawner;
use crate::request::{Request, Response};
use anyhow::Result;
use chrono::Utc;
use cnr_backup::{BackupService, FixedDirectory, Relauncher};
use cnr_library::{Library, ReviewReminder};
use std::path::Path;

pub struct Dispatcher {
    library: Library,
    backup: BackupService,
    spawner: Box<dyn GameSpawner>,
    relauncher: Box<dyn Relauncher + Send + Sync>,
}

impl Dispatcher {
    pub fn new(
        library: Library,
        backup: BackupService,
        spawner: Box<dyn GameSpawner>,
        relauncher: Box<dyn Relauncher + Send + Sync>,
    ) -> Self {
        Self {
            library,
            backup,
            spawner,
            relauncher,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Handle one request; failures come back as `Response::Error`
    pub async fn handle(&self, request: Request) -> Response {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Request failed: {:#}", e);
                Response::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Response> {
        let library = &self.library;

        let response = match request {
            Request::GetGames => Response::Games {
                games: library.games().list().await?,
            },
            Request::GetGameById { id } => Response::Game {
                game: library.games().get(&id).await?,
            },
            Request::AddGame { game } => Response::Game {
                game: library.add_game(game).await?,
            },
            Request::UpdateGame { game } => Response::Flag {
                value: library.update_game(&game).await?,
            },
            Request::DeleteGame { id } => Response::Flag {
                value: library.delete_game(&id).await?,
            },
            Request::IncrementPlayCount { id } => Response::Flag {
                value: library.games().increment_play_count(&id).await?,
            },
            Request::SetLastPlayedDate { id } => Response::Flag {
                value: library.games().set_last_played(&id).await?,
            },
            Request::SetCollections { id, collection_ids } => Response::Flag {
                value: library.games().set_collection_ids(&id, collection_ids).await?,
            },
            Request::SortedGames { order, direction } => Response::Games {
                games: library.sorted_games(order, direction).await?,
            },
            Request::SearchGames { query } => Response::Games {
                games: library.search_games(&query).await?,
            },
            Request::RecentlyPlayed { limit } => Response::Games {
                games: library.recently_played(limit).await?,
            },

            Request::Run { path } => Response::Flag {
                value: self.spawn(Path::new(&path)),
            },
            Request::RunGame { id } => Response::Flag {
                value: self.run_game(&id).await?,
            },

            Request::GetCollections => Response::Collections {
                collections: library.collections().list().await?,
            },
            Request::SortedCollections => Response::Collections {
                collections: library.sorted_collections().await?,
            },
            Request::AddCollection { name } => Response::Collection {
                collection: library.collections().create(&name).await?,
            },
            Request::DeleteCollection { id } => Response::Flag {
                value: library.delete_collection(&id).await?,
            },
            Request::CollectionGames { collection_id } => Response::Games {
                games: library.collection_games(&collection_id).await?,
            },
            Request::SetGamesToCollection {
                collection_id,
                game_ids,
            } => Response::Flag {
                value: library.collections().set_games(&collection_id, game_ids).await?,
            },
            Request::AddGameToCollection {
                collection_id,
                game_id,
            } => Response::Flag {
                value: library.collections().add_game(&collection_id, &game_id).await?,
            },
            Request::RemoveGamesFromCollection {
                collection_id,
                game_ids,
            } => Response::Flag {
                value: library
                    .collections()
                    .remove_games(&collection_id, &game_ids)
                    .await?,
            },
            Request::RemoveGameFromCollection {
                collection_id,
                game_id,
            } => {
                library
                    .remove_game_from_collection(&collection_id, &game_id)
                    .await?;
                Response::Done
            }
            Request::RemoveAGameFromAllCollections { game_id } => Response::Count {
                value: library.collections().remove_game_from_all(&game_id).await?,
            },

            Request::GetUserPrefs => Response::Preferences {
                prefs: library.preferences().get().await?,
            },
            Request::SetUserPrefs { prefs } => Response::Preferences {
                prefs: Some(library.preferences().set(prefs).await?),
            },
            Request::SaveWindowState {
                bounds,
                full_screen,
                maximized,
            } => {
                library
                    .preferences()
                    .save_window_state(bounds, full_screen, maximized)
                    .await?;
                Response::Done
            }
            Request::VerifyPin { pin } => {
                let prefs = library.preferences().get().await?.unwrap_or_default();
                Response::Flag {
                    value: prefs.verify_pin(&pin),
                }
            }
            Request::GetReviewReminder => {
                let now = Utc::now();
                let reminder = self.current_reminder().await?;
                Response::Reminder {
                    due: reminder.is_due(now),
                    reminder,
                }
            }
            Request::AnswerReviewReminder { answer } => {
                let now = Utc::now();
                let reminder = self.current_reminder().await?.after_answer(answer, now);
                library.preferences().set_review_reminder(reminder).await?;
                Response::Reminder {
                    due: reminder.is_due(now),
                    reminder,
                }
            }

            Request::SaveImage { image_data } => match library.media().save_image(&image_data).await {
                Ok(path) => Response::ImageUpload {
                    success: true,
                    path: Some(path),
                    error: None,
                },
                Err(e) => {
                    tracing::error!("Error saving image: {}", e);
                    Response::ImageUpload {
                        success: false,
                        path: None,
                        error: Some(e.to_string()),
                    }
                }
            },
            Request::DeleteGameIcons { files } => {
                let uris = files.iter().map(|file| file.as_deref());
                match library.media().delete_images(uris).await {
                    Ok(_) => Response::IconsDeleted {
                        success: true,
                        error: None,
                    },
                    Err(e) => Response::IconsDeleted {
                        success: false,
                        error: Some(e.to_string()),
                    },
                }
            }

            Request::Backup { directory } => Response::Exported {
                outcome: self.backup.export(&FixedDirectory(directory)).await?,
            },
            Request::RestoreBackup { directory } => Response::Imported {
                outcome: self
                    .backup
                    .import(&FixedDirectory(directory), &*self.relauncher)
                    .await?,
            },
        };

        Ok(response)
    }

    fn spawn(&self, path: &Path) -> bool {
        match self.spawner.spawn(path) {
            Ok(pid) => {
                tracing::info!("Started {} (pid {})", path.display(), pid);
                true
            }
            Err(e) => {
                tracing::error!("Failed to start {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Start a stored game and count the play once it is running
    async fn run_game(&self, id: &str) -> Result<bool> {
        let Some(game) = self.library.games().get(id).await? else {
            return Ok(false);
        };
        let Some(exe_path) = game.exe_path.as_deref().filter(|_| game.is_launchable()) else {
            tracing::warn!("Game {} has no executable", game.id);
            return Ok(false);
        };

        if !self.spawn(Path::new(exe_path)) {
            return Ok(false);
        }

        Ok(self.library.record_game_run(id).await?)
    }

    /// Stored review reminder, scheduling the first one when none exists
    async fn current_reminder(&self) -> Result<ReviewReminder> {
        let preferences = self.library.preferences();
        if let Some(reminder) = preferences.review_reminder().await? {
            return Ok(reminder);
        }

        let reminder = ReviewReminder::first(Utc::now());
        preferences.set_review_reminder(reminder).await?;
        Ok(reminder)
    }
}
