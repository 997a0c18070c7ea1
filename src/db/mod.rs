mod models;
mod todo_repository;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::errors::Error;

pub use models::*;
pub use todo_repository::*;

/// Schema of the `todos` table, shared with the Diesel CLI migrations
const SCHEMA_SQL: &str = include_str!("../../migrations/2024-11-02-093015_create_todos/up.sql");

/// Pooled SQLite connection handed out to request handlers
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Applies per-connection SQLite settings when the pool opens a connection
#[derive(Debug)]
struct SqlitePragmas {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Returns true for SQLite URLs that open a private in-memory database
fn is_in_memory(url: &str) -> bool {
    url == ":memory:" || url.starts_with("file::memory:") || url.contains("mode=memory")
}

#[derive(Clone, Debug)]
pub struct Database {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl Database {
    /// Opens a connection pool on `url` and makes sure the schema exists
    ///
    /// In-memory databases live as long as their connection, so they get a
    /// pool of exactly one connection that is never recycled.
    ///
    /// # Errors
    ///
    /// Returns an Error if the settings are invalid, the database cannot be
    /// opened or the schema cannot be applied
    pub fn connect(url: &str, settings: &DatabaseConfig) -> Result<Self, Error> {
        let timeout = settings.connect_timeout()?;
        let manager = ConnectionManager::<SqliteConnection>::new(url);

        let builder = Pool::builder()
            .connection_timeout(timeout)
            .connection_customizer(Box::new(SqlitePragmas {
                busy_timeout: timeout,
            }));

        let builder = if is_in_memory(url) {
            builder
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            builder.max_size(settings.pool_size.max(1))
        };

        let pool = builder.build(manager)?;
        let database = Database {
            pool: Arc::new(pool),
        };
        database.ensure_schema()?;

        info!("Opened database {}", url);
        Ok(database)
    }

    /// Checks a connection out of the pool
    ///
    /// # Errors
    ///
    /// Returns an Error if no connection frees up within the configured timeout
    pub fn get_conn(&self) -> Result<DbConnection, Error> {
        Ok(self.pool.get()?)
    }

    fn ensure_schema(&self) -> Result<(), Error> {
        let mut conn = self.get_conn()?;
        conn.batch_execute(SCHEMA_SQL)?;
        debug!("Schema is up to date");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IN_MEMORY_DATABASE_URL;

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory(":memory:"));
        assert!(is_in_memory("file::memory:?cache=shared"));
        assert!(is_in_memory("file:todos?mode=memory&cache=shared"));
        assert!(!is_in_memory("todos.db"));
        assert!(!is_in_memory("/var/lib/todos/todos.db"));
    }

    #[test]
    fn test_in_memory_pool_keeps_data_between_checkouts() {
        let database = Database::connect(IN_MEMORY_DATABASE_URL, &DatabaseConfig::default()).unwrap();

        {
            let mut conn = database.get_conn().unwrap();
            TodoRepository::new(&mut conn)
                .insert(&TodoDraft {
                    title: "persist me".to_string(),
                    ..Default::default()
                })
                .unwrap();
        }

        let mut conn = database.get_conn().unwrap();
        let todos = TodoRepository::new(&mut conn)
            .list(&TodoFilter::default())
            .unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "persist me");
    }

    #[test]
    fn test_file_database_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.db");
        let url = path.to_str().unwrap();

        let database = Database::connect(url, &DatabaseConfig::default()).unwrap();
        let created = {
            let mut conn = database.get_conn().unwrap();
            TodoRepository::new(&mut conn)
                .insert(&TodoDraft {
                    title: "on disk".to_string(),
                    ..Default::default()
                })
                .unwrap()
        };
        drop(database);

        let reopened = Database::connect(url, &DatabaseConfig::default()).unwrap();
        let mut conn = reopened.get_conn().unwrap();
        let found = TodoRepository::new(&mut conn).get(created.id).unwrap();
        assert_eq!(found, Some(created));
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let settings = DatabaseConfig {
            connect_timeout: "whenever".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Database::connect(IN_MEMORY_DATABASE_URL, &settings),
            Err(Error::ConfigError(_))
        ));
    }
}
