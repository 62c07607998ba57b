use std::process::ExitCode;

use axum::Router;
use filevault_gateway::{GatewayConfig, IdColumn, PgFileStore, gateway_routes};
use tokio::net::TcpListener;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if config.secret().is_fallback() {
        tracing::warn!("Running with the development signing secret");
    }

    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        tracing::error!("DATABASE_URL is required");
        return ExitCode::FAILURE;
    };
    let id_column = match std::env::var("FILES_ID_TYPE").as_deref() {
        Err(_) | Ok("text") => IdColumn::Text,
        Ok("uuid") => IdColumn::Uuid,
        Ok("bigint") => IdColumn::BigInt,
        Ok(other) => {
            tracing::error!(value = %other, "FILES_ID_TYPE must be text, uuid or bigint");
            return ExitCode::FAILURE;
        }
    };
    let store = match PgFileStore::connect(&database_url, DEFAULT_MAX_CONNECTIONS).await {
        Ok(store) => store.with_id_column(id_column),
        Err(e) => {
            tracing::error!(error = %e, "Cannot connect to file metadata database");
            return ExitCode::FAILURE;
        }
    };

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %bind_addr, "Cannot bind listener");
            return ExitCode::FAILURE;
        }
    };

    let router = gateway_routes(config, store, Router::new());
    match filevault_gateway::gateway::serve(listener, router).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}
