use url::Url;

use crate::error::Error;

/// Default bucket holding uploaded files.
pub const DEFAULT_BUCKET: &str = "files";

/// Public object path under the storage endpoint.
const PUBLIC_OBJECT_PATH: &str = "storage/v1/object/public";

/// Object storage coordinates needed to build public download links.
///
/// Downloads never call the storage service: the URL is composed and the
/// client is redirected to it.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    endpoint: Url,
    bucket: String,
}

impl ObjectStorage {
    /// # Errors
    ///
    /// Returns `Error::Config` if the bucket name is empty or contains `/`.
    pub fn new(endpoint: Url, bucket: impl Into<String>) -> Result<Self, Error> {
        let bucket = bucket.into();
        if bucket.is_empty() || bucket.contains('/') {
            return Err(Error::Config(format!("invalid bucket name: '{bucket}'")));
        }
        Ok(Self { endpoint, bucket })
    }

    /// Parses the endpoint from a string.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the endpoint is not an absolute URL or the
    /// bucket name is invalid.
    pub fn parse(endpoint: &str, bucket: impl Into<String>) -> Result<Self, Error> {
        let endpoint: Url = endpoint
            .parse()
            .map_err(|e| Error::Config(format!("storage endpoint: {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "storage endpoint is not a base URL: {endpoint}"
            )));
        }
        Self::new(endpoint, bucket)
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of the object stored at `path` in the bucket.
    ///
    /// Each `/`-separated segment of `path` is percent-encoded; separators are kept.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let key = path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{base}/{PUBLIC_OBJECT_PATH}/{}/{key}",
            urlencoding::encode(&self.bucket)
        )
    }
}
