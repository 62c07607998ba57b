use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use crate::storage::ObjectStorage;
use crate::store::{FileRecord, FileStore};
use crate::types::FileId;

/// Redirect to a file's public object URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRedirect {
    pub location: String,
    pub content_disposition: String,
}

impl IntoResponse for DownloadRedirect {
    fn into_response(self) -> Response {
        let (Ok(location), Ok(disposition)) = (
            HeaderValue::try_from(self.location),
            HeaderValue::try_from(self.content_disposition),
        ) else {
            return ApiError::Internal("unencodable download headers".into()).into_response();
        };

        let mut response = StatusCode::FOUND.into_response();
        let headers = response.headers_mut();
        headers.insert(LOCATION, location);
        headers.insert(CONTENT_DISPOSITION, disposition);
        response
    }
}

/// `attachment; filename="<name>"` for a user-supplied display name.
///
/// Quotes and backslashes are escaped, control characters dropped. Names with
/// non-ASCII characters get an ASCII fallback plus an RFC 5987 `filename*`.
#[must_use]
pub fn content_disposition(filename: &str) -> String {
    let cleaned: String = filename.chars().filter(|c| !c.is_control()).collect();
    let cleaned = if cleaned.trim().is_empty() {
        "download".to_string()
    } else {
        cleaned
    };

    let mut quoted = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_ascii() => quoted.push(c),
            _ => quoted.push('_'),
        }
    }

    if cleaned.is_ascii() {
        format!("attachment; filename=\"{quoted}\"")
    } else {
        format!(
            "attachment; filename=\"{quoted}\"; filename*=UTF-8''{}",
            urlencoding::encode(&cleaned)
        )
    }
}

/// Resolves public download links to object storage redirects.
///
/// Not gated by identity: knowing a file's identifier is enough to fetch it.
pub struct DownloadResolver<S> {
    store: Arc<S>,
    storage: Arc<ObjectStorage>,
    lookup_timeout: Duration,
}

// Manual Clone: avoid derive adding an `S: Clone` bound.
impl<S> Clone for DownloadResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            storage: self.storage.clone(),
            lookup_timeout: self.lookup_timeout,
        }
    }
}

impl<S: FileStore> DownloadResolver<S> {
    #[must_use]
    pub fn new(store: Arc<S>, storage: ObjectStorage, lookup_timeout: Duration) -> Self {
        Self {
            store,
            storage: Arc::new(storage),
            lookup_timeout,
        }
    }

    /// Resolves `file_id` to a redirect.
    ///
    /// # Errors
    ///
    /// - [`ApiError::BadRequest`] for an empty identifier
    /// - [`ApiError::NotFound`] for an unknown identifier, a failed lookup, or
    ///   a lookup that exceeded the timeout
    pub async fn resolve(&self, file_id: &str) -> Result<DownloadRedirect, ApiError> {
        if file_id.is_empty() {
            return Err(ApiError::BadRequest("empty file id"));
        }
        let id = FileId::from(file_id);

        match tokio::time::timeout(self.lookup_timeout, self.store.find(&id)).await {
            Ok(Ok(Some(record))) => Ok(self.redirect_for(&record)),
            Ok(Ok(None)) => {
                tracing::debug!(file_id = %id, "Download of unknown file");
                Err(ApiError::NotFound)
            }
            Ok(Err(e)) => {
                tracing::error!(file_id = %id, error = %e, "File lookup failed");
                Err(ApiError::NotFound)
            }
            Err(_) => {
                tracing::warn!(
                    file_id = %id,
                    timeout = ?self.lookup_timeout,
                    "File lookup timed out"
                );
                Err(ApiError::NotFound)
            }
        }
    }

    fn redirect_for(&self, record: &FileRecord) -> DownloadRedirect {
        DownloadRedirect {
            location: self.storage.public_url(&record.path),
            content_disposition: content_disposition(&record.filename),
        }
    }
}

pub(super) async fn download<S: FileStore>(
    State(resolver): State<DownloadResolver<S>>,
    Path(file_id): Path<String>,
) -> Result<DownloadRedirect, ApiError> {
    resolver.resolve(&file_id).await
}

/// `/download/` with nothing after the prefix.
pub(super) async fn missing_file_id() -> ApiError {
    ApiError::BadRequest("empty file id")
}
