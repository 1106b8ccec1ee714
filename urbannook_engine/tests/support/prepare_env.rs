use std::env;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use urbannook_engine::SqliteDatabase;

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    if let Err(e) = Sqlite::drop_database(url).await {
        trace!("🚀️ Nothing to drop at {url}: {e}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    debug!("🚀️ Test database ready at {url}");
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/urbannook_it_{}.db", env::temp_dir().display(), rand::random::<u64>())
}

pub async fn new_database() -> SqliteDatabase {
    new_database_with_connections(1).await
}

/// A fresh database behind a pool of `max_connections`, so that concurrent writers really do hit SQLite at once.
pub async fn new_database_with_connections(max_connections: u32) -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, max_connections).await.expect("Error creating connection to database")
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    Sqlite::drop_database(&url).await.unwrap();
}
