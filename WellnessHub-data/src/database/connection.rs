//! Database connection module for the WellnessHub application
//!
//! Wearable profiles are kept in SQLite. The pool is built once at startup
//! and handed to the repositories that need it; nothing here is global.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info};

use super::migrations::run_sqlite_migrations;

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based or in-memory)
    Sqlite,
}

impl DatabaseType {
    /// Convert from string to database type
    pub fn from_str(s: &str) -> Result<Self, DatabaseError> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),

    /// Filesystem error while preparing the database location
    #[error("Database path error: {0}")]
    PathError(String),
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type
    pub db_type: DatabaseType,
    /// Path to SQLite database file
    pub sqlite_path: Option<String>,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some("./data/wellness_hub.db".to_string()),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type_str = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        let db_type = DatabaseType::from_str(&db_type_str)?;

        let defaults = Self::default();

        let sqlite_path = env::var("DB_SQLITE_PATH").ok().or(defaults.sqlite_path);

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_connections);

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        info!(
            "Database configuration: type={:?}, path={:?}, max_connections={}, timeout={}s",
            db_type, sqlite_path, max_connections, timeout_seconds
        );

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

/// Database connection pool enum for different database types
#[derive(Debug, Clone)]
pub enum DatabasePool {
    /// SQLite connection pool
    SQLite(Arc<r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>>),
}

impl DatabasePool {
    /// Open the pool described by `config` and run migrations on it
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Initializing database pool with type: {:?}", config.db_type);

        let pool = match config.db_type {
            DatabaseType::Sqlite => initialize_sqlite_pool(config)?,
        };

        pool.run_migrations()?;
        Ok(pool)
    }

    /// Open a private in-memory SQLite database.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// capped at a single connection.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        info!("Initializing in-memory SQLite database");

        let manager = r2d2_sqlite::SqliteConnectionManager::memory();
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;

        let pool = DatabasePool::SQLite(Arc::new(pool));
        pool.run_migrations()?;
        Ok(pool)
    }

    /// Run schema migrations
    pub fn run_migrations(&self) -> Result<(), DatabaseError> {
        info!("Running database migrations");

        match self {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;
            }
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Describe the current connection, or the error that prevents one
    pub fn connection_info(&self) -> Result<String, DatabaseError> {
        match self {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let path: String =
                    conn.query_row("PRAGMA database_list", [], |row| row.get(2))?;

                let location = if path.is_empty() || path == ":memory:" {
                    "SQLite in-memory database".to_string()
                } else {
                    format!("SQLite database at {}", path)
                };

                let state = pool.state();
                Ok(format!(
                    "{} (connections: active={}, idle={})",
                    location, state.connections, state.idle_connections
                ))
            }
        }
    }
}

/// Initialize SQLite connection pool
fn initialize_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let sqlite_path = config
        .sqlite_path
        .clone()
        .ok_or_else(|| DatabaseError::EnvVarNotFound("DB_SQLITE_PATH".to_string()))?;

    info!("Initializing SQLite database at: {}", sqlite_path);

    if let Some(parent) = Path::new(&sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create directory {:?}: {}", parent, e);
                DatabaseError::PathError(e.to_string())
            })?;
        }
    }

    let manager = r2d2_sqlite::SqliteConnectionManager::file(&sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
        .with_init(|conn| conn.execute_batch("PRAGMA busy_timeout = 5000;"));

    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    // Fail fast if the file cannot be opened
    pool.get()?;
    info!("SQLite connection pool created successfully");

    Ok(DatabasePool::SQLite(Arc::new(pool)))
}
