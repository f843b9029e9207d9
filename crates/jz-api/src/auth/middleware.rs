use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use uuid::Uuid;

use super::jwt::{AUTH_COOKIE, Claims, verify_jwt_token};
use crate::{error::ApiError, state::AuthConfig};

/// Authenticated user extractor
///
/// Reads and validates the JWT from the private `auth_token` cookie. Use
/// `Option<AuthUser>` where anonymous visitors are allowed; a missing or
/// invalid token then yields `None`.
///
/// # Example
/// ```
/// use jz_api::{auth::AuthUser, error::ApiError};
///
/// async fn protected_route(user: AuthUser) -> Result<String, ApiError> {
///     Ok(user.username)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub admin: bool,
}

impl TryFrom<Claims> for AuthUser {
    type Error = ApiError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        Ok(Self {
            user_id,
            username: claims.username,
            admin: claims.admin,
        })
    }
}

async fn token_from_cookie<S>(parts: &mut Parts, state: &S) -> Option<String>
where
    Key: FromRef<S>,
    S: Send + Sync,
{
    let jar = <PrivateCookieJar<Key> as FromRequestParts<S>>::from_request_parts(parts, state)
        .await
        .ok()?;
    jar.get(AUTH_COOKIE).map(|cookie| cookie.value().to_owned())
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_config = AuthConfig::from_ref(state);

        let token = token_from_cookie(parts, state)
            .await
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        verify_jwt_token(&token, &auth_config.jwt_secret)?.try_into()
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let auth_config = AuthConfig::from_ref(state);

        let Some(token) = token_from_cookie(parts, state).await else {
            return Ok(None);
        };

        match verify_jwt_token(&token, &auth_config.jwt_secret).and_then(AuthUser::try_from) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                tracing::debug!(error = %err, "Ignoring invalid auth token");
                Ok(None)
            }
        }
    }
}

/// Extractor for routes reserved to administrators
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    AuthConfig: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await?;

        if !user.admin {
            tracing::warn!(user_id = %user.user_id, "Admin route requested by non-admin");
            return Err(ApiError::Forbidden(
                "Only administrators may change topics".to_string(),
            ));
        }

        Ok(Self(user))
    }
}
