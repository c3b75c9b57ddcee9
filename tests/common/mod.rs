use std::sync::Arc;
use tempfile::TempDir;

use wealthdesk_core::db::{self, DbPool};

/// Initializes a throwaway database under the temp dir and returns a pool
/// with all migrations applied.
pub fn setup_pool(tmp: &TempDir) -> Arc<DbPool> {
    let db_path = db::init(tmp.path().to_str().unwrap()).expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");
    pool
}
