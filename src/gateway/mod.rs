//! Axum integration: authentication gate, identity propagation and public
//! download links.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use filevault_gateway::gateway::{GatewayConfig, Identity, gateway_routes};
//!
//! // 1. Configure from environment
//! let config = GatewayConfig::from_env()?;
//!
//! // 2. Business routes read the caller from the request
//! async fn files(identity: Identity) -> impl IntoResponse { /* match identity */ }
//! let app = axum::Router::new().route("/query", post(files));
//!
//! // 3. Mount behind the gate, next to the public download route
//! let router = gateway_routes(config, file_store, app);
//! ```

mod config;
mod download;
mod error;
mod gate;
mod identity;
mod routes;
mod server;

pub use config::GatewayConfig;
pub use download::{DownloadRedirect, DownloadResolver, content_disposition};
pub use error::ApiError;
pub use gate::{AuthGate, authenticate, bearer_token};
pub use identity::{AuthUser, Identity, attach, read};
pub use routes::{DOWNLOAD_PREFIX, gateway_routes};
pub use server::serve;
