//! sqlite-backed store
//!
//! Two tables mirror the two namespaces. Every operation is a single
//! statement, which sqlite runs as its own transaction, so readers never see
//! a half-written record.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use super::traits::{ItemStore, StoreError};
use crate::types::{BrowserId, ItemId, ItemRecord, ItemStatus, SubjectKey};

const CREATE_ITEMS: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        subject  BLOB    NOT NULL,
        item     BLOB    NOT NULL,
        mime     TEXT    NOT NULL,
        payload  BLOB    NOT NULL,
        status   INTEGER NOT NULL,
        PRIMARY KEY (subject, item)
    )
"#;

const CREATE_SESSIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS sessions (
        browser_id BLOB PRIMARY KEY,
        subject    BLOB NOT NULL
    )
"#;

/// sqlite implementation of [`ItemStore`]
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database. Pinned to one connection that never
    /// expires, since every new connection would see an empty database.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_ITEMS).execute(&pool).await?;
        sqlx::query(CREATE_SESSIONS).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ItemRecord, StoreError> {
    let status: i64 = row.try_get("status")?;
    let status = ItemStatus::from_code(status)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown item status {}", status)))?;

    Ok(ItemRecord {
        mime: row.try_get("mime")?,
        payload: row.try_get("payload")?,
        status,
    })
}

#[async_trait]
impl ItemStore for SqliteStore {
    async fn put_item(
        &self,
        subject: &SubjectKey,
        item: &ItemId,
        record: &ItemRecord,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO items (subject, item, mime, payload, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (subject, item) DO UPDATE
            SET mime = excluded.mime, payload = excluded.payload, status = excluded.status
            "#,
        )
        .bind(subject.as_bytes().as_slice())
        .bind(item.as_uuid().as_bytes().as_slice())
        .bind(record.mime.as_str())
        .bind(record.payload.as_slice())
        .bind(i64::from(record.status.code()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_item(
        &self,
        subject: &SubjectKey,
        item: &ItemId,
    ) -> Result<Option<ItemRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT mime, payload, status
            FROM items
            WHERE subject = ?1 AND item = ?2
            "#,
        )
        .bind(subject.as_bytes().as_slice())
        .bind(item.as_uuid().as_bytes().as_slice())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn list_items(
        &self,
        subject: &SubjectKey,
    ) -> Result<Vec<(ItemId, ItemRecord)>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT item, mime, payload, status
            FROM items
            WHERE subject = ?1
            "#,
        )
        .bind(subject.as_bytes().as_slice())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let raw: Vec<u8> = row.try_get("item")?;
                let item = ItemId::from_slice(&raw)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                Ok((item, record_from_row(row)?))
            })
            .collect()
    }

    async fn delete_item(&self, subject: &SubjectKey, item: &ItemId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM items WHERE subject = ?1 AND item = ?2")
            .bind(subject.as_bytes().as_slice())
            .bind(item.as_uuid().as_bytes().as_slice())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn put_session(
        &self,
        browser: &BrowserId,
        subject: &SubjectKey,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (browser_id, subject)
            VALUES (?1, ?2)
            ON CONFLICT (browser_id) DO UPDATE SET subject = excluded.subject
            "#,
        )
        .bind(browser.as_bytes().as_slice())
        .bind(subject.as_bytes().as_slice())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_session(&self, browser: &BrowserId) -> Result<Option<SubjectKey>, StoreError> {
        let row = sqlx::query("SELECT subject FROM sessions WHERE browser_id = ?1")
            .bind(browser.as_bytes().as_slice())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw: Vec<u8> = row.try_get("subject")?;
                SubjectKey::from_slice(&raw)
                    .map(Some)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))
            }
            None => Ok(None),
        }
    }
}
