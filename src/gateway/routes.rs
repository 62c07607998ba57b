use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router, middleware};
use serde::Serialize;

use super::config::GatewayConfig;
use super::download::{self, DownloadResolver};
use super::error::ApiError;
use super::gate::authenticate;
use super::identity::Identity;
use crate::store::FileStore;
use crate::types::UserId;

/// Route prefix for public download links.
pub const DOWNLOAD_PREFIX: &str = "/download/";

/// Create the gateway router.
///
/// `app` holds the identity-aware business routes (GraphQL and the like). It
/// is merged with `/whoami` behind the authentication gate. `/download/{file_id}`
/// is added outside the gate: download links stay public whatever the
/// anonymous policy.
pub fn gateway_routes<S: FileStore>(config: GatewayConfig, store: S, app: Router) -> Router {
    let gate = config.auth_gate();
    let resolver = DownloadResolver::new(
        Arc::new(store),
        config.storage,
        config.settings.lookup_timeout,
    );

    let identified = Router::new()
        .route("/whoami", get(whoami))
        .merge(app)
        .layer(middleware::from_fn_with_state(gate, authenticate));

    let public = Router::new()
        .route(DOWNLOAD_PREFIX, get(download::missing_file_id))
        .route(
            &format!("{DOWNLOAD_PREFIX}{{file_id}}"),
            get(download::download::<S>),
        )
        .with_state(resolver);

    identified.merge(public)
}

// ── Who am I ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WhoAmI {
    user_id: UserId,
}

async fn whoami(identity: Identity) -> Result<Json<WhoAmI>, ApiError> {
    match identity {
        Identity::User(user_id) => Ok(Json(WhoAmI { user_id })),
        Identity::Anonymous => Err(ApiError::Unauthenticated),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, LOCATION};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::secret::SigningSecret;
    use crate::storage::ObjectStorage;
    use crate::store::{MemoryFileStore, NewFile};
    use crate::types::FileId;

    fn config() -> GatewayConfig {
        GatewayConfig::new(
            SigningSecret::new("routes-secret"),
            ObjectStorage::parse("https://abc.supabase.co", "files").unwrap(),
        )
    }

    fn store() -> MemoryFileStore {
        let store = MemoryFileStore::new();
        store
            .insert_with_id(
                FileId::from("f1"),
                NewFile {
                    filename: "report.pdf".into(),
                    path: "u1/abc123".into(),
                    owner: Some(UserId::from("u1")),
                },
            )
            .unwrap();
        store
    }

    async fn business(identity: Identity) -> String {
        identity
            .user_id()
            .map_or_else(|| "anonymous".to_string(), ToString::to_string)
    }

    fn app(config: GatewayConfig) -> Router {
        gateway_routes(config, store(), Router::new().route("/query", get(business)))
    }

    async fn get_with(app: Router, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn download_redirects() {
        let response = get_with(app(config()), "/download/f1", None).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "https://abc.supabase.co/storage/v1/object/public/files/u1/abc123"
        );
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"report.pdf\""
        );
    }

    #[tokio::test]
    async fn download_errors() {
        let response = get_with(app(config()), "/download/", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get_with(app(config()), "/download/nonexistent-id", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn download_is_public_even_when_gate_is_strict() {
        let response = get_with(
            app(config().with_allow_anonymous(false)),
            "/download/f1",
            Some("garbage"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn business_routes_see_identity() {
        let config = config();
        let token = config.token_issuer().issue(&UserId::from("u1")).unwrap();

        let response = get_with(app(config.clone()), "/query", Some(token.as_str())).await;
        assert_eq!(body_string(response).await, "u1");

        let response = get_with(app(config.clone()), "/query", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");

        let response = get_with(app(config), "/query", Some("expired-or-garbage")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn business_routes_blocked_when_gate_is_strict() {
        let response = get_with(app(config().with_allow_anonymous(false)), "/query", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn whoami_reports_caller() {
        let config = config();
        let token = config.token_issuer().issue(&UserId::from("u1")).unwrap();

        let response = get_with(app(config.clone()), "/whoami", Some(token.as_str())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"user_id":"u1"}"#);

        let response = get_with(app(config), "/whoami", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
