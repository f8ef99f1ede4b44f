use darzi_core::types::RefreshTokenRecord;

/// Refresh tokens live for 7 days; the same window bounds the cookie max-age
/// and the retention sweep.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Generate an opaque refresh token: 40 random bytes, hex-encoded.
///
/// Unlike the access token this carries no claims; it is only meaningful
/// against the server-side record.
pub fn generate_refresh_token() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 40];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Build a fresh server-side record for an account, expiring in 7 days.
pub fn new_refresh_token_record(account_id: &str) -> RefreshTokenRecord {
    let now = chrono::Utc::now();
    RefreshTokenRecord {
        token: generate_refresh_token(),
        account_id: account_id.to_string(),
        expires_at: now + chrono::Duration::days(REFRESH_TOKEN_TTL_DAYS),
        revoked_at: None,
        replaced_by: None,
        created_at: now,
    }
}
