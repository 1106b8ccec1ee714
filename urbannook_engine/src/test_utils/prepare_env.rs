use std::env;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

/// Loads `.env.test`, initialises logging and creates a freshly migrated database at `url`.
pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

/// A database URL in the system temp directory that no other test is using.
pub fn random_db_path() -> String {
    let dir = env::temp_dir();
    format!("sqlite://{}/urbannook_test_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database(url: &str) {
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        if let Err(e) = Sqlite::drop_database(url).await {
            warn!("🚀️ Error dropping database {url}: {e:?}");
        }
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("🚀️ Created Sqlite database {url}");
}

/// Creates a fresh database and returns a connection to it along with its URL, so the caller can drop it afterwards.
pub async fn new_test_database() -> (String, SqliteDatabase) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
    (url, db)
}

pub async fn drop_test_database(url: &str, mut db: SqliteDatabase) {
    if let Err(e) = db.close().await {
        warn!("🚀️ Failed to close database {url}: {e}");
    }
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("🚀️ Failed to drop database {url}: {e}");
    }
}
