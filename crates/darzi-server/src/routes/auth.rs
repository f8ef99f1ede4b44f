use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use serde_json::{Value, json};

use darzi_core::traits::*;
use darzi_core::types::{Account, CreateAccountInput, Gender, Role};
use darzi_core::DarziError;

use crate::auth::{AuthenticatedUser, require_account};
use crate::error::ApiError;
use crate::state::AppState;

const REFRESH_COOKIE: &str = "refreshToken";

fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::days(darzi_crypto::REFRESH_TOKEN_TTL_DAYS))
        .build()
}

/// Issue a fresh access/refresh pair for an account: the refresh token is
/// persisted server-side and travels only in the httpOnly cookie, the access
/// token only in the response body.
async fn token_response<A, P, C, O, I>(
    state: &AppState<A, P, C, O, I>,
    account: &Account,
    status: StatusCode,
    jar: CookieJar,
) -> Result<(CookieJar, (StatusCode, Json<Value>)), ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let access_token = darzi_crypto::create_access_token(&account.id, &state.config.jwt.secret)?;
    let record = darzi_crypto::new_refresh_token_record(&account.id);
    state.account_store.create_refresh_token(&record).await?;

    let jar = jar.add(refresh_cookie(record.token));
    Ok((
        jar,
        (
            status,
            Json(json!({
                "status": "success",
                "accessToken": access_token,
                "data": { "user": account },
            })),
        ),
    ))
}

// ---------------------------------------------------------------------------
// 1. signup
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

pub async fn signup<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    jar: CookieJar,
    Json(body): Json<SignupRequest>,
) -> Result<(CookieJar, (StatusCode, Json<Value>)), ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let (Some(name), Some(email), Some(password), Some(phone)) =
        (body.name, body.email, body.password, body.phone)
    else {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Please provide name, email, password and phone!",
        ));
    };

    let password_hash = darzi_crypto::hash_password(&password)?;
    let account = state
        .account_store
        .create_account(&CreateAccountInput {
            name,
            email,
            phone,
            password_hash,
            role: Role::User,
            gender: body.gender.unwrap_or(Gender::Male),
        })
        .await?;

    token_response(&state, &account, StatusCode::CREATED, jar).await
}

// ---------------------------------------------------------------------------
// 2. login
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, (StatusCode, Json<Value>)), ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Please provide email and password!",
        ));
    };

    // Unknown email and wrong password are indistinguishable on purpose.
    let account = state
        .account_store
        .get_account_by_email(&email)
        .await?
        .ok_or(DarziError::InvalidCredentials)?;

    let valid = darzi_crypto::verify_password(&password, &account.password_hash)?;
    if !valid {
        return Err(DarziError::InvalidCredentials.into());
    }

    token_response(&state, &account, StatusCode::OK, jar).await
}

// ---------------------------------------------------------------------------
// 3. refresh-token (rotation)
// ---------------------------------------------------------------------------

pub async fn refresh_token<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    jar: CookieJar,
) -> Result<(CookieJar, (StatusCode, Json<Value>)), ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(DarziError::RefreshTokenMissing)?;

    // Unknown, revoked and expired tokens all fail the same way.
    let record = state
        .account_store
        .get_refresh_token(&token)
        .await?
        .filter(|r| r.is_active())
        .ok_or(DarziError::RefreshTokenInvalid)?;

    let account = state
        .account_store
        .get_account_by_id(&record.account_id)
        .await?
        .ok_or(DarziError::RefreshTokenInvalid)?;

    // Rotation: the presented token is revoked (pointing at its successor)
    // before the new pair is issued, so replays fail from here on.
    let new_record = darzi_crypto::new_refresh_token_record(&account.id);
    state
        .account_store
        .revoke_refresh_token(&record.token, Some(&new_record.token))
        .await?;
    state.account_store.create_refresh_token(&new_record).await?;

    let access_token = darzi_crypto::create_access_token(&account.id, &state.config.jwt.secret)?;
    let jar = jar.add(refresh_cookie(new_record.token));
    Ok((
        jar,
        (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "accessToken": access_token,
                "data": { "user": account },
            })),
        ),
    ))
}

// ---------------------------------------------------------------------------
// 4. logout
// ---------------------------------------------------------------------------

pub async fn logout<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    jar: CookieJar,
) -> Result<Response, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let token = cookie.value().to_string();

    // Revocation is idempotent; the cookie is cleared either way.
    state.account_store.revoke_refresh_token(&token, None).await?;

    let jar = jar.remove(Cookie::build(REFRESH_COOKIE).path("/").build());
    Ok((
        jar,
        Json(json!({
            "status": "success",
            "message": "Logged out successfully",
        })),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// 5. me
// ---------------------------------------------------------------------------

pub async fn me<A, P, C, O, I>(
    State(state): State<AppState<A, P, C, O, I>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: CatalogStore,
    C: CartStore,
    O: OrderStore,
    I: ImageStore,
{
    let account = require_account(state.account_store.as_ref(), &user).await?;
    Ok(Json(json!({
        "status": "success",
        "data": { "user": account },
    })))
}
