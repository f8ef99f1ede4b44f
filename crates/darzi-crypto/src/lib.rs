pub mod jwt;
pub mod password;
pub mod token;

pub use jwt::{AccessTokenClaims, create_access_token, validate_access_token};
pub use password::{hash_password, verify_password};
pub use token::{REFRESH_TOKEN_TTL_DAYS, generate_refresh_token, new_refresh_token_record};
