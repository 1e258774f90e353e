//! Integration tests for backup export and restore

use cnr_backup::{
    BackupService, ExportOutcome, FixedDirectory, ImportOutcome, Relauncher, CONFIG_FILE_NAME,
};
use cnr_library::{Library, NewGame, Theme, UserPreferences};
use cnr_storage::{MediaStore, RecordStore};
use serde_json::{Value, json};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const BACKUP_DIR_NAME: &str = "cnr-game-launcher-backup";

/// Relauncher that only counts calls
#[derive(Default)]
struct CountingRelauncher {
    calls: Cell<u32>,
}

impl Relauncher for CountingRelauncher {
    fn relaunch(&self) -> std::io::Result<()> {
        self.calls.set(self.calls.get() + 1);
        Ok(())
    }
}

/// An application data directory plus a scratch area for backups
struct TestEnvironment {
    #[allow(dead_code)]
    temp_dir: TempDir,
    uploads_dir: PathBuf,
    exports_dir: PathBuf,
    store: Arc<RecordStore>,
}

impl TestEnvironment {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let uploads_dir = temp_dir.path().join("data").join("uploads");
        let exports_dir = temp_dir.path().join("exports");
        fs::create_dir_all(&exports_dir).unwrap();

        let store = RecordStore::open(temp_dir.path().join("data").join("config.json"))
            .await
            .expect("Failed to open record store");

        Self {
            temp_dir,
            uploads_dir,
            exports_dir,
            store: Arc::new(store),
        }
    }

    fn library(&self) -> Library {
        Library::new(Arc::clone(&self.store), MediaStore::new(&self.uploads_dir))
    }

    fn service(&self) -> BackupService {
        BackupService::new(Arc::clone(&self.store), &self.uploads_dir, BACKUP_DIR_NAME)
    }

    async fn populate(&self) {
        let library = self.library();
        let action = library.collections().create("Action").await.unwrap().unwrap();
        let icon = library.media().save_image("QUJD").await.unwrap();
        library
            .add_game(NewGame {
                icon_path: Some(icon),
                collection_ids: vec![action.id],
                ..NewGame::named("Doom")
            })
            .await
            .unwrap();
        library
            .preferences()
            .set(UserPreferences {
                theme: Some(Theme::Dark),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    fn write_backup(&self, name: &str, file: &str, contents: &str) -> PathBuf {
        let dir = self.exports_dir.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), contents).unwrap();
        dir
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_export_layout() {
    let env = TestEnvironment::new().await;
    env.populate().await;

    let prompt = FixedDirectory(Some(env.exports_dir.clone()));
    let outcome = env.service().export(&prompt).await.unwrap();
    assert_eq!(outcome, ExportOutcome::Completed);

    let backup_dir = env.exports_dir.join(BACKUP_DIR_NAME);
    let exported: Value =
        serde_json::from_str(&fs::read_to_string(backup_dir.join(CONFIG_FILE_NAME)).unwrap())
            .unwrap();
    assert_eq!(exported, env.store.document().await);

    assert_eq!(file_names(&backup_dir.join("uploads")), file_names(&env.uploads_dir));
    assert_eq!(file_names(&backup_dir.join("uploads")).len(), 1);
}

#[tokio::test]
async fn test_export_creates_missing_uploads() {
    let env = TestEnvironment::new().await;
    assert!(!env.uploads_dir.exists());

    let prompt = FixedDirectory(Some(env.exports_dir.clone()));
    env.service().export(&prompt).await.unwrap();

    assert!(env.uploads_dir.is_dir());
    assert!(env.exports_dir.join(BACKUP_DIR_NAME).join("uploads").is_dir());
}

#[tokio::test]
async fn test_export_canceled() {
    let env = TestEnvironment::new().await;

    let outcome = env.service().export(&FixedDirectory(None)).await.unwrap();

    assert_eq!(outcome, ExportOutcome::Canceled);
    assert!(!env.exports_dir.join(BACKUP_DIR_NAME).exists());
}

#[tokio::test]
async fn test_export_then_import_roundtrip() {
    let source = TestEnvironment::new().await;
    source.populate().await;
    let exported = source.store.document().await;

    let prompt = FixedDirectory(Some(source.exports_dir.clone()));
    source.service().export(&prompt).await.unwrap();
    let backup_dir = source.exports_dir.join(BACKUP_DIR_NAME);

    let target = TestEnvironment::new().await;
    target.library().add_game(NewGame::named("Leftover")).await.unwrap();
    fs::create_dir_all(&target.uploads_dir).unwrap();
    fs::write(target.uploads_dir.join("stale.png"), b"old").unwrap();

    let relauncher = CountingRelauncher::default();
    let outcome = target
        .service()
        .import(&FixedDirectory(Some(backup_dir)), &relauncher)
        .await
        .unwrap();

    assert_eq!(outcome, ImportOutcome::Restored);
    assert_eq!(relauncher.calls.get(), 1);
    assert_eq!(target.store.document().await, exported);
    assert_eq!(file_names(&target.uploads_dir), file_names(&source.uploads_dir));

    let reopened = RecordStore::open(target.store.path()).await.unwrap();
    assert_eq!(reopened.document().await, exported);
}

#[tokio::test]
async fn test_import_without_games_is_rejected() {
    let env = TestEnvironment::new().await;
    env.populate().await;
    let before = env.store.document().await;

    let backup = env.write_backup("bad", "config.json", r#"{"collections": []}"#);
    let relauncher = CountingRelauncher::default();
    let outcome = env
        .service()
        .import(&FixedDirectory(Some(backup)), &relauncher)
        .await
        .unwrap();

    assert_eq!(outcome, ImportOutcome::IncorrectFile);
    assert_eq!(relauncher.calls.get(), 0);
    assert_eq!(env.store.document().await, before);
}

#[tokio::test]
async fn test_import_invalid_json_leaves_store() {
    let env = TestEnvironment::new().await;
    env.populate().await;
    let before = env.store.document().await;
    let on_disk = fs::read_to_string(env.store.path()).unwrap();

    let backup = env.write_backup("broken", "backup.json", "{\"games\": [");
    let outcome = env.service().import_from(&backup).await.unwrap();

    assert_eq!(outcome, ImportOutcome::IncorrectFile);
    assert_eq!(env.store.document().await, before);
    assert_eq!(fs::read_to_string(env.store.path()).unwrap(), on_disk);
}

#[tokio::test]
async fn test_import_non_utf8_file_is_incorrect() {
    let env = TestEnvironment::new().await;
    env.populate().await;
    let before = env.store.document().await;

    let backup = env.exports_dir.join("binary");
    fs::create_dir_all(&backup).unwrap();
    fs::write(backup.join("config.json"), [0xff, 0xfe, b'{', b'}']).unwrap();

    let outcome = env.service().import_from(&backup).await.unwrap();

    assert_eq!(outcome, ImportOutcome::IncorrectFile);
    assert_eq!(env.store.document().await, before);
}

#[tokio::test]
async fn test_import_null_collections_is_rejected() {
    let env = TestEnvironment::new().await;
    env.populate().await;
    let before = env.store.document().await;

    let backup = env.write_backup("nulls", "config.json", r#"{"games": [], "collections": null}"#);
    let outcome = env.service().import_from(&backup).await.unwrap();

    assert_eq!(outcome, ImportOutcome::IncorrectFile);
    assert_eq!(env.store.document().await, before);
}

#[tokio::test]
async fn test_import_without_json_file() {
    let env = TestEnvironment::new().await;
    let backup = env.write_backup("empty", "readme.txt", "nothing here");

    let outcome = env.service().import_from(&backup).await.unwrap();
    assert_eq!(outcome, ImportOutcome::IncorrectFile);
}

#[tokio::test]
async fn test_import_without_uploads_keeps_going() {
    let env = TestEnvironment::new().await;
    let document = json!({
        "games": [{
            "id": "g1",
            "name": "Foo",
            "isInstalled": false,
            "createdAt": "2024-05-01T10:00:00.000Z",
            "lastPlayed": "2024-05-01T10:00:00.000Z",
            "playCount": 2,
            "collectionIds": []
        }]
    });
    let backup = env.write_backup("nomedia", "any-name.json", &document.to_string());

    let outcome = env.service().import_from(&backup).await.unwrap();

    assert_eq!(outcome, ImportOutcome::Restored);
    assert_eq!(env.store.document().await, document);
    assert!(env.uploads_dir.is_dir());

    let games = env.library().games().list().await.unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].play_count, 2);
}

#[tokio::test]
async fn test_import_canceled() {
    let env = TestEnvironment::new().await;
    let relauncher = CountingRelauncher::default();

    let outcome = env
        .service()
        .import(&FixedDirectory(None), &relauncher)
        .await
        .unwrap();

    assert_eq!(outcome, ImportOutcome::Canceled);
    assert_eq!(relauncher.calls.get(), 0);
}

#[tokio::test]
async fn test_import_missing_directory_fails() {
    let env = TestEnvironment::new().await;
    let missing = env.exports_dir.join("does-not-exist");

    let err = env.service().import_from(&missing).await.unwrap_err();
    assert_eq!(err.to_string(), "App Data Importing Process Failed");
}
