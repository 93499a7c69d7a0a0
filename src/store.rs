use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::model::TrackerDocument;
use crate::util::{ensure_directory, now_utc_string};

const STORE_SCHEMA_VERSION: &str = "1";
const DOCUMENT_KEY: &str = "tracker";

pub struct DocumentStore {
    connection: Connection,
}

impl DocumentStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_directory(parent)?;
            }
        }

        let connection = Connection::open(db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        configure_connection(&connection)?;
        ensure_schema(&connection)?;

        Ok(Self { connection })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().context("failed to open in-memory database")?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    pub fn load(&self) -> Result<TrackerDocument> {
        read_document(&self.connection)
    }

    #[cfg(test)]
    pub fn save(&mut self, document: &TrackerDocument) -> Result<()> {
        write_document(&self.connection, document)
    }

    pub fn update<T, F>(&mut self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut TrackerDocument) -> Result<T>,
    {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("failed to begin document transaction")?;

        let mut document = read_document(&tx)?;
        let value = apply(&mut document)?;
        write_document(&tx, &document)?;

        tx.commit()
            .context("failed to commit document transaction")?;
        Ok(value)
    }

    pub fn updated_at(&self) -> Result<Option<String>> {
        self.connection
            .query_row(
                "SELECT updated_at FROM documents WHERE doc_key = ?1",
                params![DOCUMENT_KEY],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query document timestamp")
    }
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS documents (
              doc_key TEXT PRIMARY KEY,
              body TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );
            ",
        )
        .context("failed to create store schema")?;

    connection
        .execute(
            "
            INSERT INTO metadata(key, value) VALUES('schema_version', ?1)
            ON CONFLICT(key) DO UPDATE SET value=excluded.value
            ",
            params![STORE_SCHEMA_VERSION],
        )
        .context("failed to record store schema version")?;

    Ok(())
}

fn read_document(connection: &Connection) -> Result<TrackerDocument> {
    let body: Option<String> = connection
        .query_row(
            "SELECT body FROM documents WHERE doc_key = ?1",
            params![DOCUMENT_KEY],
            |row| row.get(0),
        )
        .optional()
        .context("failed to read tracker document")?;

    match body {
        Some(body) => {
            serde_json::from_str(&body).context("failed to parse stored tracker document")
        }
        None => Ok(TrackerDocument::default()),
    }
}

fn write_document(connection: &Connection, document: &TrackerDocument) -> Result<()> {
    let body = serde_json::to_string(document).context("failed to serialize tracker document")?;

    connection
        .execute(
            "
            INSERT INTO documents(doc_key, body, updated_at)
            VALUES(?1, ?2, ?3)
            ON CONFLICT(doc_key) DO UPDATE SET
              body=excluded.body,
              updated_at=excluded.updated_at
            ",
            params![DOCUMENT_KEY, body, now_utc_string()],
        )
        .context("failed to write tracker document")?;

    Ok(())
}
