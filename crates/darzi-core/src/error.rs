use thiserror::Error;

#[derive(Debug, Error)]
pub enum DarziError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("User not found")]
    AccountNotFound,

    #[error("Profile not found.")]
    ProfileNotFound,

    #[error("Product not found")]
    ProductNotFound,

    #[error("An account with this email already exists.")]
    EmailAlreadyRegistered,

    #[error("A profile with this name already exists.")]
    DuplicateProfileName,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Token not found")]
    RefreshTokenMissing,

    #[error("Invalid token")]
    RefreshTokenInvalid,

    #[error("Cart is empty. Add items before booking.")]
    EmptyOrder,

    #[error("internal error: {0}")]
    InternalError(String),
}

pub type DarziResult<T> = Result<T, DarziError>;
