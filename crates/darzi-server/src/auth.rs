use axum::Extension;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;

use darzi_core::types::{Account, Role};
use darzi_core::{AccountStore, DarziError};

use crate::error::ApiError;

/// A newtype wrapper around the JWT secret, added as an Axum Extension.
#[derive(Clone)]
pub struct JwtSecret(pub String);

/// The account id extracted from a valid bearer access token. Existence of
/// the account itself is checked per-handler via [`require_account`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub account_id: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(jwt_secret) = Extension::<JwtSecret>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "JWT secret not configured",
                )
            })?;

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "You are not logged in!"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "You are not logged in!"))?;

        let claims =
            darzi_crypto::validate_access_token(token, &jwt_secret.0).map_err(|e| {
                if e.to_string().contains("ExpiredSignature") {
                    ApiError::new(
                        StatusCode::UNAUTHORIZED,
                        "Your token has expired! Please log in again.",
                    )
                } else {
                    ApiError::new(StatusCode::UNAUTHORIZED, "Invalid token")
                }
            })?;

        Ok(AuthenticatedUser {
            account_id: claims.sub,
        })
    }
}

/// Load the authenticated account, rejecting tokens whose account has since
/// been deleted.
pub async fn require_account<A: AccountStore>(
    store: &A,
    user: &AuthenticatedUser,
) -> Result<Account, ApiError> {
    let account = store
        .get_account_by_id(&user.account_id)
        .await
        .map_err(|e: DarziError| ApiError::from(e))?;
    account.ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "User no longer exists."))
}

/// [`require_account`] plus an admin-role gate.
pub async fn require_admin<A: AccountStore>(
    store: &A,
    user: &AuthenticatedUser,
) -> Result<Account, ApiError> {
    let account = require_account(store, user).await?;
    if account.role != Role::Admin {
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "Access denied. Admin only.",
        ));
    }
    Ok(account)
}
