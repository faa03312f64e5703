//! # SQLite Engine
//!
//! Relational persistence for card rows via SQLx. The schema is the
//! reference layout of the store:
//!
//! ```sql
//! CREATE TABLE card (
//!   hash    TEXT PRIMARY KEY,
//!   g_time  TEXT NOT NULL,
//!   content BLOB NOT NULL
//! )
//! ```
//!
//! plus an `ensure_unique_hash` BEFORE INSERT trigger that aborts with
//! `'Card with this hash already exists'` when the hash is present. The
//! primary key and the trigger are intentionally redundant: both map to
//! [`EngineError::HashConflict`].
//!
//! Enumeration order is `rowid`, which SQLite assigns monotonically on
//! insert, so pages are stable in insertion order. The pool is limited
//! to a single connection, which serializes `add` at the engine
//! boundary and keeps `sqlite::memory:` databases shared.

use std::str::FromStr;

use async_trait::async_trait;
use cardbox_core::{Card, Page};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::contract::{paginate, validate_page_args, CardEngine, EngineError};

const CREATE_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS card (
  hash    TEXT PRIMARY KEY,
  g_time  TEXT NOT NULL,
  content BLOB NOT NULL
)";

const CREATE_TRIGGER: &str = "\
CREATE TRIGGER IF NOT EXISTS ensure_unique_hash
BEFORE INSERT ON card
FOR EACH ROW
WHEN EXISTS (SELECT 1 FROM card WHERE hash = NEW.hash)
BEGIN
  SELECT RAISE(ABORT, 'Card with this hash already exists');
END";

/// A durable engine backed by a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteEngine {
    pool: SqlitePool,
}

impl SqliteEngine {
    /// Connect to `url` (e.g. `sqlite://cards.db`), creating the file
    /// and applying the schema when missing.
    pub async fn connect(url: &str) -> Result<SqliteEngine, EngineError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(EngineError::Storage)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_TRIGGER).execute(&pool).await?;
        tracing::info!(url, "sqlite card store ready");
        Ok(SqliteEngine { pool })
    }

    /// Connect to a private in-memory database.
    pub async fn connect_in_memory() -> Result<SqliteEngine, EngineError> {
        SqliteEngine::connect("sqlite::memory:").await
    }

    fn map_insert_error(hash: &str, err: sqlx::Error) -> EngineError {
        if let sqlx::Error::Database(ref db) = err {
            let unique = matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation);
            if unique || db.message().contains("Card with this hash already exists") {
                tracing::debug!(hash, "insert rejected by uniqueness guard");
                return EngineError::HashConflict(hash.to_owned());
            }
        }
        EngineError::Storage(err)
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct CardRow {
    hash: String,
    g_time: String,
    content: Vec<u8>,
}

impl CardRow {
    fn into_card(self) -> Result<Card, EngineError> {
        Card::from_row(self.content, self.hash, &self.g_time).map_err(EngineError::from)
    }
}

#[async_trait]
impl CardEngine for SqliteEngine {
    async fn add(&self, card: &Card) -> Result<(), EngineError> {
        sqlx::query("INSERT INTO card (hash, g_time, content) VALUES (?1, ?2, ?3)")
            .bind(card.hash())
            .bind(card.g_time().as_str())
            .bind(card.content_bytes())
            .execute(&self.pool)
            .await
            .map_err(|e| SqliteEngine::map_insert_error(card.hash(), e))?;
        tracing::debug!(hash = %card.hash(), "row added");
        Ok(())
    }

    async fn get(&self, hash: &str) -> Result<Option<Card>, EngineError> {
        let row = sqlx::query_as::<_, CardRow>(
            "SELECT hash, g_time, content FROM card WHERE hash = ?1",
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;
        row.map(CardRow::into_card).transpose()
    }

    async fn delete(&self, hash: &str) -> Result<bool, EngineError> {
        let result = sqlx::query("DELETE FROM card WHERE hash = ?1")
            .bind(hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update(&self, hash: &str, content: &[u8]) -> Result<bool, EngineError> {
        let result = sqlx::query("UPDATE card SET content = ?1 WHERE hash = ?2")
            .bind(content)
            .bind(hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, EngineError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM card")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn clear(&self) -> Result<(), EngineError> {
        sqlx::query("DELETE FROM card").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_page(&self, page_number: u64, page_size: u64) -> Result<Page<Card>, EngineError> {
        validate_page_args(page_number, page_size)?;
        let total_items = self.count().await?;
        if total_items == 0 {
            return Ok(Page::empty(page_number, page_size));
        }
        let total_pages = total_items.div_ceil(page_size);
        if page_number > total_pages {
            return Err(EngineError::PageOutOfRange {
                page_number,
                total_pages,
            });
        }
        let rows = sqlx::query_as::<_, CardRow>(
            "SELECT hash, g_time, content FROM card ORDER BY rowid LIMIT ?1 OFFSET ?2",
        )
        .bind(page_size as i64)
        .bind(((page_number - 1) * page_size) as i64)
        .fetch_all(&self.pool)
        .await?;
        let cards = rows
            .into_iter()
            .map(CardRow::into_card)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(cards, total_items, page_number, page_size))
    }

    async fn search_by_content(
        &self,
        query: &str,
        page_number: u64,
        page_size: u64,
    ) -> Result<Page<Card>, EngineError> {
        validate_page_args(page_number, page_size)?;
        // Substring semantics are defined over the lossy UTF-8 view of
        // the bytes, so the filter runs here rather than in SQL.
        let rows = sqlx::query_as::<_, CardRow>(
            "SELECT hash, g_time, content FROM card ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut matches = Vec::new();
        for row in rows {
            if String::from_utf8_lossy(&row.content).contains(query) {
                matches.push(row.into_card()?);
            }
        }
        paginate(matches, page_number, page_size)
    }
}
