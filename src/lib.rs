pub mod error;
pub mod geo;
pub mod loader;
pub mod model;
pub mod parser;
pub mod query;
pub mod server;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::model::{Mark, NewMark};

const CREATE_MARKS: &str = "CREATE TABLE IF NOT EXISTS marks (
    pk            INTEGER PRIMARY KEY AUTOINCREMENT,
    id            TEXT NOT NULL,
    longitude     REAL NOT NULL DEFAULT 0.0,
    latitude      REAL NOT NULL DEFAULT 0.0,
    creation_date TEXT NOT NULL
)";

const SELECT_COLUMNS: &str = "SELECT pk, id, longitude, latitude, creation_date FROM marks";

/// Handle to the relational store.
///
/// Cheap to clone (wraps a connection pool); every operation takes it as an
/// explicit argument instead of going through process-global state.
#[derive(Debug, Clone)]
pub struct SatDb {
    pool: SqlitePool,
}

impl SatDb {
    /// Connect to the store selected by `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool. Used by tests that want a single shared
    /// in-memory connection.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `marks` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_MARKS).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop the current table generation and insert a fresh batch, all in
    /// one transaction: a reader racing a reload sees either the old
    /// generation or the complete new one, never a half-empty table.
    ///
    /// Returns the number of records present afterwards.
    pub async fn replace_all(&self, marks: &[NewMark]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS marks").execute(&mut *tx).await?;
        sqlx::query(CREATE_MARKS).execute(&mut *tx).await?;

        for mark in marks {
            sqlx::query(
                "INSERT INTO marks (id, longitude, latitude, creation_date) VALUES (?, ?, ?, ?)",
            )
            .bind(&mark.id)
            .bind(mark.longitude)
            .bind(mark.latitude)
            .bind(&mark.creation_date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.count().await
    }

    /// Total number of stored marks.
    pub async fn count(&self) -> Result<u64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM marks")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    /// Exact `(id, creation_date)` match. Among duplicate inserts of the
    /// same pair, the most recently inserted row (greatest `pk`) wins.
    pub async fn mark_at(&self, id: &str, creation_date: &str) -> Result<Option<Mark>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE id = ? AND creation_date = ? \
             ORDER BY creation_date DESC, pk DESC LIMIT 1"
        );
        let mark = sqlx::query_as::<_, Mark>(&sql)
            .bind(id)
            .bind(creation_date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(mark)
    }

    /// Every mark recorded at exactly `creation_date`, in insertion order.
    pub async fn marks_at(&self, creation_date: &str) -> Result<Vec<Mark>> {
        let sql = format!("{SELECT_COLUMNS} WHERE creation_date = ? ORDER BY pk");
        let marks = sqlx::query_as::<_, Mark>(&sql)
            .bind(creation_date)
            .fetch_all(&self.pool)
            .await?;
        Ok(marks)
    }
}
