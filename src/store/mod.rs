//! Persistent file metadata.
//!
//! The gateway only reads records by identifier. Creating and deleting them
//! belongs to the upload flow; [`MemoryFileStore`] exposes both so tests and
//! local setups can seed data.

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{FileId, UserId};

pub use memory::MemoryFileStore;
#[cfg(feature = "postgres")]
pub use postgres::{IdColumn, PgFileStore};

/// Stored metadata for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    /// Display name supplied by the uploader.
    pub filename: String,
    /// Object key inside the storage bucket. Unique, never reused.
    pub path: String,
    /// Uploader, when known.
    pub owner: Option<UserId>,
}

/// Metadata for a file about to be recorded.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub filename: String,
    pub path: String,
    pub owner: Option<UserId>,
}

/// Read access to file metadata.
///
/// # Example
///
/// ```rust,ignore
/// impl FileStore for MyDb {
///     async fn find(&self, id: &FileId) -> Result<Option<FileRecord>, Error> {
///         self.files.get(id).await
///     }
/// }
/// ```
pub trait FileStore: Send + Sync + 'static {
    /// Look up a record by identifier. `Ok(None)` when no such file exists.
    ///
    /// Dropping the returned future must abandon the lookup.
    fn find(
        &self,
        id: &FileId,
    ) -> impl Future<Output = Result<Option<FileRecord>, Error>> + Send;
}
