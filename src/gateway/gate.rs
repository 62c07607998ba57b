use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use super::identity::{self, Identity};
use crate::token::TokenVerifier;

/// Turns bearer tokens into request identities.
///
/// With `allow_anonymous` (the default) the gate never rejects: a missing or
/// invalid token forwards the request as [`Identity::Anonymous`] and
/// authorization is left to the handlers.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<TokenVerifier>,
    allow_anonymous: bool,
}

impl AuthGate {
    #[must_use]
    pub fn new(verifier: TokenVerifier, allow_anonymous: bool) -> Self {
        Self {
            verifier: Arc::new(verifier),
            allow_anonymous,
        }
    }

    #[must_use]
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn allows_anonymous(&self) -> bool {
        self.allow_anonymous
    }

    /// Identity carried by the request headers.
    #[must_use]
    pub fn identify(&self, headers: &HeaderMap) -> Identity {
        let Some(token) = bearer_token(headers) else {
            return Identity::Anonymous;
        };

        match self.verifier.verify(token) {
            Some(user_id) => Identity::User(user_id),
            None => {
                tracing::debug!("Invalid bearer token, continuing as anonymous");
                Identity::Anonymous
            }
        }
    }
}

/// Extracts the credential from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Returns `None` when the header is
/// absent, not valid text, uses another scheme, or carries an empty token.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authentication middleware.
///
/// Attaches the verified user, if any, and always forwards to the next
/// handler unless the gate was built with `allow_anonymous = false`.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/query", post(graphql))
///     .layer(axum::middleware::from_fn_with_state(gate, authenticate));
/// ```
pub async fn authenticate(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.identify(request.headers()) {
        Identity::User(user_id) => {
            tracing::trace!(user_id = %user_id, "Request authenticated");
            identity::attach(request.extensions_mut(), user_id);
        }
        Identity::Anonymous if gate.allow_anonymous => {
            // Drop anything a previous layer may have attached.
            request.extensions_mut().remove::<Identity>();
        }
        Identity::Anonymous => return ApiError::Unauthenticated.into_response(),
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use axum::routing::get;
    use http_body_util::BodyExt;
    use time::{Duration, OffsetDateTime};
    use tower::ServiceExt;

    use super::*;
    use crate::secret::SigningSecret;
    use crate::token::TokenIssuer;
    use crate::types::UserId;

    fn secret() -> SigningSecret {
        SigningSecret::new("gate-secret")
    }

    async fn echo(identity: Identity) -> String {
        match identity {
            Identity::User(user_id) => format!("user:{user_id}"),
            Identity::Anonymous => "anonymous".to_string(),
        }
    }

    fn app(allow_anonymous: bool) -> Router {
        let gate = AuthGate::new(TokenVerifier::new(&secret()), allow_anonymous);
        Router::new()
            .route("/", get(echo))
            .layer(axum::middleware::from_fn_with_state(gate, authenticate))
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn token_for(subject: &str) -> String {
        TokenIssuer::new(&secret()).issue(&UserId::from(subject)).unwrap()
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        for (value, expected) in [
            ("Bearer abc", Some("abc")),
            ("bearer abc", Some("abc")),
            ("  Bearer   abc  ", Some("abc")),
            ("Bearer", None),
            ("Bearer   ", None),
            ("Basic dXNlcjpwYXNz", None),
            ("abc", None),
        ] {
            headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
            assert_eq!(bearer_token(&headers), expected, "header: {value:?}");
        }
    }

    #[tokio::test]
    async fn no_header_reaches_handler_anonymous() {
        assert_eq!(
            call(app(true), None).await,
            (StatusCode::OK, "anonymous".to_string())
        );
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_authenticated() {
        let header = format!("Bearer {}", token_for("u1"));
        assert_eq!(
            call(app(true), Some(header.as_str())).await,
            (StatusCode::OK, "user:u1".to_string())
        );
    }

    #[tokio::test]
    async fn invalid_tokens_degrade_to_anonymous() {
        let expired = TokenIssuer::new(&secret())
            .issue_at(
                &UserId::from("u1"),
                OffsetDateTime::now_utc() - Duration::hours(48),
            )
            .unwrap();
        let foreign = TokenIssuer::new(&SigningSecret::new("other"))
            .issue(&UserId::from("u1"))
            .unwrap();

        for token in [expired.as_str(), foreign.as_str(), "garbage", "a.b.c"] {
            let header = format!("Bearer {token}");
            assert_eq!(
                call(app(true), Some(header.as_str())).await,
                (StatusCode::OK, "anonymous".to_string()),
                "token: {token}"
            );
        }
    }

    #[tokio::test]
    async fn strict_gate_rejects_missing_and_invalid_tokens() {
        let (status, _) = call(app(false), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(app(false), Some("Bearer garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let header = format!("Bearer {}", token_for("u1"));
        assert_eq!(
            call(app(false), Some(header.as_str())).await,
            (StatusCode::OK, "user:u1".to_string())
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_see_only_their_own_identity() {
        let app = app(true);
        let mut handles = Vec::new();

        for i in 0..64 {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                let subject = format!("user-{i}");
                let header = format!("Bearer {}", token_for(&subject));
                let (status, body) = call(app, Some(header.as_str())).await;
                (subject, status, body)
            }));
        }

        for handle in handles {
            let (subject, status, body) = handle.await.unwrap();
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, format!("user:{subject}"));
        }
    }
}
