use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use super::{FileRecord, FileStore, NewFile};
use crate::error::Error;
use crate::types::FileId;

#[derive(Default)]
struct Inner {
    records: HashMap<FileId, FileRecord>,
    // Every path ever recorded, including deleted ones.
    used_paths: HashSet<String>,
}

/// In-process [`FileStore`] keyed by ULID identifiers.
#[derive(Default)]
pub struct MemoryFileStore {
    inner: RwLock<Inner>,
}

impl MemoryFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new file under a freshly generated identifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the path is empty or has been used before,
    /// even by a since-deleted record.
    pub fn insert(&self, file: NewFile) -> Result<FileRecord, Error> {
        self.insert_with_id(FileId::generate(), file)
    }

    /// Records a new file under a caller-chosen identifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the identifier is empty or taken, or the path
    /// is empty or has been used before.
    pub fn insert_with_id(&self, id: FileId, file: NewFile) -> Result<FileRecord, Error> {
        if id.is_empty() {
            return Err(Error::Store("empty file id".into()));
        }
        if file.path.is_empty() {
            return Err(Error::Store("empty storage path".into()));
        }

        let mut inner = self.inner.write();
        if inner.records.contains_key(&id) {
            return Err(Error::Store(format!("duplicate file id: {id}")));
        }
        if !inner.used_paths.insert(file.path.clone()) {
            return Err(Error::Store(format!("storage path already used: {}", file.path)));
        }

        let record = FileRecord {
            id: id.clone(),
            filename: file.filename,
            path: file.path,
            owner: file.owner,
        };
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    /// Removes a record. Its path stays reserved.
    pub fn delete(&self, id: &FileId) -> Option<FileRecord> {
        self.inner.write().records.remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }
}

impl FileStore for MemoryFileStore {
    async fn find(&self, id: &FileId) -> Result<Option<FileRecord>, Error> {
        Ok(self.inner.read().records.get(id).cloned())
    }
}
