use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::Extensions;
use axum::http::request::Parts;

use super::error::ApiError;
use crate::types::UserId;

/// Who is calling, as established by the authentication gate.
///
/// Handlers must match on both variants: a request without a valid token
/// still reaches them as [`Identity::Anonymous`].
///
/// # Example
///
/// ```rust,ignore
/// async fn list_files(identity: Identity) -> Result<Json<Vec<File>>, ApiError> {
///     match identity {
///         Identity::User(user_id) => Ok(Json(repo.files_of(&user_id).await?)),
///         Identity::Anonymous => Err(ApiError::Unauthenticated),
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    User(UserId),
}

impl Identity {
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::User(user_id) => Some(user_id),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

/// Attaches a verified user to a request's extensions.
///
/// Extensions live and die with the request, so the identity is never visible
/// to another request.
pub fn attach(extensions: &mut Extensions, user_id: UserId) {
    extensions.insert(Identity::User(user_id));
}

/// Reads the identity attached to a request. Anonymous when none was attached.
#[must_use]
pub fn read(extensions: &Extensions) -> Identity {
    extensions.get::<Identity>().cloned().unwrap_or_default()
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(read(&parts.extensions))
    }
}

/// Authenticated user, for handlers that require one.
///
/// Returns `401 Unauthorized` when the request is anonymous. Use
/// `Option<AuthUser>` for handlers open to both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match read(&parts.extensions) {
            Identity::User(user_id) => Ok(Self { user_id }),
            Identity::Anonymous => Err(ApiError::Unauthenticated),
        }
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for AuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(read(&parts.extensions)
            .user_id()
            .cloned()
            .map(|user_id| Self { user_id }))
    }
}
