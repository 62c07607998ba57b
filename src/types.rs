use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Authenticated user identifier (token `sub` / `user_id` claim).
///
/// Assigned by the external login flow; this crate only carries it.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque file identifier, taken verbatim from the download URL.
///
/// Server-generated at upload time. Holding one is enough to download
/// the file (public-link model).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct FileId(pub String);

impl FileId {
    /// Fresh ULID-based identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_from_string() {
        let id = UserId::from("user-123".to_string());
        assert_eq!(id.to_string(), "user-123");
        assert_eq!(id.as_str(), "user-123");
    }

    #[test]
    fn user_id_serializes_transparently() {
        let id = UserId::from("u1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u1\"");
    }

    #[test]
    fn generated_file_ids_are_unique_ulids() {
        let a = FileId::generate();
        let b = FileId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 26);
        assert!(a.as_str().parse::<Ulid>().is_ok());
    }

    #[test]
    fn empty_file_id() {
        assert!(FileId::from("").is_empty());
        assert!(!FileId::from("f1").is_empty());
    }

    #[test]
    fn newtypes_prevent_mixing() {
        fn takes_user_id(_: &UserId) {}
        fn takes_file_id(_: &FileId) {}

        let user = UserId::from("id");
        let file = FileId::from("id");

        takes_user_id(&user);
        takes_file_id(&file);
        // takes_user_id(&file);  // Compile error!
    }
}
