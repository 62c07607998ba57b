#![doc = include_str!("../README.md")]

pub mod error;
#[cfg(feature = "gateway")]
pub mod gateway;
pub mod secret;
pub mod storage;
pub mod store;
pub mod token;
pub mod types;

// Re-exports for convenient access
pub use error::Error;
#[cfg(feature = "gateway")]
pub use gateway::{
    ApiError, AuthGate, AuthUser, DownloadResolver, GatewayConfig, Identity, gateway_routes,
};
pub use secret::SigningSecret;
pub use storage::ObjectStorage;
pub use store::{FileRecord, FileStore, MemoryFileStore, NewFile};
#[cfg(feature = "postgres")]
pub use store::{IdColumn, PgFileStore};
pub use token::{Claims, TokenIssuer, TokenVerifier};
pub use types::{FileId, UserId};
