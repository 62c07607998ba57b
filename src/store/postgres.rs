use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{FileRecord, FileStore};
use crate::error::Error;
use crate::types::FileId;

/// SQL type of the `files.id` column.
///
/// The bound identifier is cast to this type so the lookup stays on the
/// primary-key index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdColumn {
    #[default]
    Text,
    Uuid,
    BigInt,
}

impl IdColumn {
    fn cast(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Uuid => "uuid",
            Self::BigInt => "bigint",
        }
    }

    /// Whether `id` can be a value of this column type at all.
    fn accepts(self, id: &str) -> bool {
        match self {
            Self::Text => true,
            Self::BigInt => id.parse::<i64>().is_ok(),
            Self::Uuid => {
                let hex: String = id.chars().filter(|c| *c != '-').collect();
                let dashed = id.len() == 36
                    && [8, 13, 18, 23].iter().all(|&i| id.as_bytes()[i] == b'-');
                (dashed || id.len() == 32)
                    && hex.len() == 32
                    && hex.chars().all(|c| c.is_ascii_hexdigit())
            }
        }
    }

    fn lookup_query(self) -> String {
        format!("SELECT filename, path FROM files WHERE id = $1::{}", self.cast())
    }
}

/// [`FileStore`] over the `files` table.
///
/// Reads only the `filename` and `path` columns. Records come back without an
/// owner.
#[derive(Clone)]
pub struct PgFileStore {
    pool: PgPool,
    id_column: IdColumn,
    lookup_query: String,
}

impl PgFileStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            id_column: IdColumn::default(),
            lookup_query: IdColumn::default().lookup_query(),
        }
    }

    /// Override the `files.id` column type (default: `text`).
    #[must_use]
    pub fn with_id_column(mut self, id_column: IdColumn) -> Self {
        self.id_column = id_column;
        self.lookup_query = id_column.lookup_query();
        self
    }

    /// Connects a pool to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the database cannot be reached.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        tracing::info!(max_connections, "Connected to file metadata database");
        Ok(Self::new(pool))
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl FileStore for PgFileStore {
    async fn find(&self, id: &FileId) -> Result<Option<FileRecord>, Error> {
        if !self.id_column.accepts(id.as_str()) {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, (String, String)>(&self.lookup_query)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(filename, path)| FileRecord {
            id: id.clone(),
            filename,
            path,
            owner: None,
        }))
    }
}
