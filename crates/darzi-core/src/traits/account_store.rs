use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DarziResult;
use crate::types::{
    Account, CreateAccountInput, NewProfile, Profile, ProfileUpdate, RefreshTokenRecord, Role,
    SelfUpdate,
};

/// Accounts, their embedded measurement profiles, and refresh-token state.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Fails with `EmailAlreadyRegistered` when the email is taken
    /// (case-insensitively).
    async fn create_account(&self, input: &CreateAccountInput) -> DarziResult<Account>;
    async fn get_account_by_id(&self, id: &str) -> DarziResult<Option<Account>>;
    async fn get_account_by_email(&self, email: &str) -> DarziResult<Option<Account>>;
    /// Applies the `"me"` profile mutation: name/phone/email on the account,
    /// location as the first address's city (created when missing).
    async fn update_account_self(&self, id: &str, update: &SelfUpdate) -> DarziResult<Account>;
    async fn list_accounts_by_role(&self, role: Role) -> DarziResult<Vec<Account>>;
    async fn count_accounts_by_role(&self, role: Role) -> DarziResult<i64>;
    async fn delete_account(&self, id: &str) -> DarziResult<()>;

    // Measurement profiles (part of the account aggregate)
    async fn list_profiles(&self, account_id: &str) -> DarziResult<Vec<Profile>>;
    /// Fails with `DuplicateProfileName` on a case-insensitive name clash
    /// within the account.
    async fn add_profile(&self, account_id: &str, profile: &NewProfile) -> DarziResult<Profile>;
    async fn get_profile(&self, account_id: &str, profile_id: &str)
    -> DarziResult<Option<Profile>>;
    /// Merges the supplied fields; fails with `ProfileNotFound` when absent.
    async fn update_profile(
        &self,
        account_id: &str,
        profile_id: &str,
        update: &ProfileUpdate,
    ) -> DarziResult<Profile>;
    async fn delete_profile(&self, account_id: &str, profile_id: &str) -> DarziResult<()>;

    // Refresh tokens
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> DarziResult<()>;
    async fn get_refresh_token(&self, token: &str) -> DarziResult<Option<RefreshTokenRecord>>;
    /// Marks a token revoked without deleting it. Idempotent; unknown tokens
    /// are a no-op.
    async fn revoke_refresh_token(&self, token: &str, replaced_by: Option<&str>)
    -> DarziResult<()>;
    async fn purge_refresh_tokens_created_before(&self, cutoff: DateTime<Utc>)
    -> DarziResult<u64>;
}
