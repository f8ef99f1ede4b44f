use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use darzi_core::{
    Account, AccountStore, Address, CreateAccountInput, DarziError, DarziResult, Gender,
    NewProfile, Profile, ProfileUpdate, RefreshTokenRecord, Role, SelfUpdate,
};

use crate::datetime::{format_datetime, parse_datetime, parse_datetime_opt};

#[derive(Clone)]
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

fn row_to_account(
    row: &sqlx::sqlite::SqliteRow,
    addresses: Vec<Address>,
) -> Result<Account, DarziError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let phone: String = row
        .try_get("phone")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let role: String = row
        .try_get("role")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let gender: String = row
        .try_get("gender")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| DarziError::Storage(e.to_string()))?;

    Ok(Account {
        id,
        name,
        email,
        phone,
        password_hash,
        role: Role::parse(&role)
            .ok_or_else(|| DarziError::Storage(format!("unknown role: {role}")))?,
        gender: Gender::parse(&gender)
            .ok_or_else(|| DarziError::Storage(format!("unknown gender: {gender}")))?,
        addresses,
        created_at: parse_datetime(&created_at)?,
    })
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile, DarziError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let phone: String = row
        .try_get("phone")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let email: Option<String> = row
        .try_get("email")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let location: Option<String> = row
        .try_get("location")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let measurements: Option<String> = row
        .try_get("measurements")
        .map_err(|e| DarziError::Storage(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| DarziError::Storage(e.to_string()))?;

    Ok(Profile {
        id,
        name,
        phone,
        email,
        location,
        measurements,
        created_at: parse_datetime(&created_at)?,
    })
}

impl SqliteAccountStore {
    pub async fn connect(url: &str) -> DarziResult<Self> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        Ok(Self { pool })
    }

    async fn addresses_for(&self, account_id: &str) -> DarziResult<Vec<Address>> {
        let rows = sqlx::query(
            "SELECT street, city, state, zip, country FROM address WHERE account_id = ? ORDER BY position ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;

        let mut addresses = Vec::with_capacity(rows.len());
        for row in &rows {
            addresses.push(Address {
                street: row
                    .try_get("street")
                    .map_err(|e| DarziError::Storage(e.to_string()))?,
                city: row
                    .try_get("city")
                    .map_err(|e| DarziError::Storage(e.to_string()))?,
                state: row
                    .try_get("state")
                    .map_err(|e| DarziError::Storage(e.to_string()))?,
                zip: row
                    .try_get("zip")
                    .map_err(|e| DarziError::Storage(e.to_string()))?,
                country: row
                    .try_get("country")
                    .map_err(|e| DarziError::Storage(e.to_string()))?,
            });
        }
        Ok(addresses)
    }

    async fn get_account_where(
        &self,
        where_clause: &str,
        bind_value: &str,
    ) -> DarziResult<Option<Account>> {
        let sql = format!("SELECT * FROM account WHERE {where_clause}");
        let row = sqlx::query(&sql)
            .bind(bind_value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        match row {
            Some(ref r) => {
                let id: String = r
                    .try_get("id")
                    .map_err(|e| DarziError::Storage(e.to_string()))?;
                let addresses = self.addresses_for(&id).await?;
                Ok(Some(row_to_account(r, addresses)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn create_account(&self, input: &CreateAccountInput) -> DarziResult<Account> {
        // The email column is COLLATE NOCASE, so this also catches
        // case-variant duplicates.
        let existing = sqlx::query("SELECT id FROM account WHERE email = ?")
            .bind(&input.email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        if existing.is_some() {
            return Err(DarziError::EmailAlreadyRegistered);
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO account (id, name, email, phone, password_hash, role, gender) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.password_hash)
        .bind(input.role.as_str())
        .bind(input.gender.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint failed") {
                DarziError::EmailAlreadyRegistered
            } else {
                DarziError::Storage(msg)
            }
        })?;

        self.get_account_by_id(&id).await?.ok_or_else(|| {
            DarziError::Storage("failed to retrieve account after creation".to_string())
        })
    }

    async fn get_account_by_id(&self, id: &str) -> DarziResult<Option<Account>> {
        self.get_account_where("id = ?", id).await
    }

    async fn get_account_by_email(&self, email: &str) -> DarziResult<Option<Account>> {
        self.get_account_where("email = ?", email).await
    }

    async fn update_account_self(&self, id: &str, update: &SelfUpdate) -> DarziResult<Account> {
        let current = self
            .get_account_by_id(id)
            .await?
            .ok_or(DarziError::AccountNotFound)?;

        let name = update.name.clone().unwrap_or(current.name);
        let phone = update.phone.clone().unwrap_or(current.phone);
        let email = update.email.clone().unwrap_or(current.email);

        sqlx::query("UPDATE account SET name = ?, phone = ?, email = ? WHERE id = ?")
            .bind(&name)
            .bind(&phone)
            .bind(&email)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE constraint failed") {
                    DarziError::EmailAlreadyRegistered
                } else {
                    DarziError::Storage(msg)
                }
            })?;

        if let Some(location) = &update.location {
            let updated =
                sqlx::query("UPDATE address SET city = ? WHERE account_id = ? AND position = 0")
                    .bind(location)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| DarziError::Storage(e.to_string()))?;
            if updated.rows_affected() == 0 {
                sqlx::query("INSERT INTO address (account_id, position, city) VALUES (?, 0, ?)")
                    .bind(id)
                    .bind(location)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| DarziError::Storage(e.to_string()))?;
            }
        }

        self.get_account_by_id(id)
            .await?
            .ok_or(DarziError::AccountNotFound)
    }

    async fn list_accounts_by_role(&self, role: Role) -> DarziResult<Vec<Account>> {
        let rows =
            sqlx::query("SELECT * FROM account WHERE role = ? ORDER BY created_at DESC, rowid DESC")
                .bind(role.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DarziError::Storage(e.to_string()))?;

        let mut accounts = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row
                .try_get("id")
                .map_err(|e| DarziError::Storage(e.to_string()))?;
            let addresses = self.addresses_for(&id).await?;
            accounts.push(row_to_account(row, addresses)?);
        }
        Ok(accounts)
    }

    async fn count_accounts_by_role(&self, role: Role) -> DarziResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM account WHERE role = ?")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        row.try_get("n")
            .map_err(|e| DarziError::Storage(e.to_string()))
    }

    async fn delete_account(&self, id: &str) -> DarziResult<()> {
        // The account aggregate owns its addresses and profiles; refresh
        // tokens are left for the retention sweep and the cart is left
        // behind on purpose.
        sqlx::query("DELETE FROM address WHERE account_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        sqlx::query("DELETE FROM profile WHERE account_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        sqlx::query("DELETE FROM account WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn list_profiles(&self, account_id: &str) -> DarziResult<Vec<Profile>> {
        let rows = sqlx::query("SELECT * FROM profile WHERE account_id = ? ORDER BY rowid ASC")
            .bind(account_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        rows.iter().map(row_to_profile).collect()
    }

    async fn add_profile(&self, account_id: &str, profile: &NewProfile) -> DarziResult<Profile> {
        let duplicate =
            sqlx::query("SELECT id FROM profile WHERE account_id = ? AND name = ? COLLATE NOCASE")
                .bind(account_id)
                .bind(&profile.name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DarziError::Storage(e.to_string()))?;
        if duplicate.is_some() {
            return Err(DarziError::DuplicateProfileName);
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO profile (id, account_id, name, phone, email, location, measurements) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(account_id)
        .bind(&profile.name)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.location)
        .bind(&profile.measurements)
        .execute(&self.pool)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;

        self.get_profile(account_id, &id).await?.ok_or_else(|| {
            DarziError::Storage("failed to retrieve profile after creation".to_string())
        })
    }

    async fn get_profile(
        &self,
        account_id: &str,
        profile_id: &str,
    ) -> DarziResult<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profile WHERE account_id = ? AND id = ?")
            .bind(account_id)
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        match row {
            Some(ref r) => Ok(Some(row_to_profile(r)?)),
            None => Ok(None),
        }
    }

    async fn update_profile(
        &self,
        account_id: &str,
        profile_id: &str,
        update: &ProfileUpdate,
    ) -> DarziResult<Profile> {
        let current = self
            .get_profile(account_id, profile_id)
            .await?
            .ok_or(DarziError::ProfileNotFound)?;

        let name = update.name.clone().unwrap_or(current.name);
        let phone = update.phone.clone().unwrap_or(current.phone);
        let email = update.email.clone().or(current.email);
        let location = update.location.clone().or(current.location);
        let measurements = update.measurements.clone().or(current.measurements);

        sqlx::query(
            "UPDATE profile SET name = ?, phone = ?, email = ?, location = ?, measurements = ? WHERE account_id = ? AND id = ?",
        )
        .bind(&name)
        .bind(&phone)
        .bind(&email)
        .bind(&location)
        .bind(&measurements)
        .bind(account_id)
        .bind(profile_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;

        self.get_profile(account_id, profile_id)
            .await?
            .ok_or(DarziError::ProfileNotFound)
    }

    async fn delete_profile(&self, account_id: &str, profile_id: &str) -> DarziResult<()> {
        let result = sqlx::query("DELETE FROM profile WHERE account_id = ? AND id = ?")
            .bind(account_id)
            .bind(profile_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DarziError::ProfileNotFound);
        }
        Ok(())
    }

    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> DarziResult<()> {
        sqlx::query(
            "INSERT INTO refresh_token (token, account_id, expires_at, revoked_at, replaced_by, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.token)
        .bind(&record.account_id)
        .bind(format_datetime(record.expires_at))
        .bind(record.revoked_at.map(format_datetime))
        .bind(&record.replaced_by)
        .bind(format_datetime(record.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_refresh_token(&self, token: &str) -> DarziResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query("SELECT * FROM refresh_token WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        let row = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let token: String = row
            .try_get("token")
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        let account_id: String = row
            .try_get("account_id")
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        let expires_at: String = row
            .try_get("expires_at")
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        let revoked_at: Option<String> = row
            .try_get("revoked_at")
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        let replaced_by: Option<String> = row
            .try_get("replaced_by")
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| DarziError::Storage(e.to_string()))?;

        Ok(Some(RefreshTokenRecord {
            token,
            account_id,
            expires_at: parse_datetime(&expires_at)?,
            revoked_at: parse_datetime_opt(revoked_at.as_deref())?,
            replaced_by,
            created_at: parse_datetime(&created_at)?,
        }))
    }

    async fn revoke_refresh_token(
        &self,
        token: &str,
        replaced_by: Option<&str>,
    ) -> DarziResult<()> {
        // Only the first revocation sticks; replays keep the original
        // revoked_at for reuse detection.
        sqlx::query(
            "UPDATE refresh_token SET revoked_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), replaced_by = ? WHERE token = ? AND revoked_at IS NULL",
        )
        .bind(replaced_by)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn purge_refresh_tokens_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> DarziResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_token WHERE created_at < ?")
            .bind(format_datetime(cutoff))
            .execute(&self.pool)
            .await
            .map_err(|e| DarziError::Storage(e.to_string()))?;
        Ok(result.rows_affected())
    }
}
