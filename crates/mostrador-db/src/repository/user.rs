//! # User Repository
//!
//! User accounts and credential verification. Passwords are stored as
//! Argon2id hashes; the plaintext never leaves this module's functions.
//!
//! The engines never consult this repository: the acting user id arrives
//! as an explicit parameter on every request. Authentication belongs to
//! the outer web layer, which calls [`UserRepository::verify_credentials`].

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use mostrador_core::{Role, User};

const USER_COLUMNS: &str = "id, username, password_hash, role, is_active";

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user with an Argon2id-hashed password, returning the id.
    pub async fn create(&self, username: &str, password: &str, role: Role) -> DbResult<i64> {
        debug!(username, ?role, "Creating user");

        let password_hash = hash_password(password)?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, is_active)
            VALUES (?1, ?2, ?3, 1)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role as i32)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Gets a user by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user: Option<User> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Gets a user by username (unique).
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user: Option<User> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists active users ordered by username.
    pub async fn list_active(&self) -> DbResult<Vec<User>> {
        let users: Vec<User> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_active = 1 ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Verifies a username/password pair against the stored hash.
    ///
    /// Returns the user on success, None for an unknown username, an
    /// inactive account, or a wrong password. Callers get the same None
    /// in all three cases.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> DbResult<Option<User>> {
        let Some(user) = self.get_by_username(username).await? else {
            return Ok(None);
        };

        if !user.is_active || !verify_password(password, &user.password_hash) {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Replaces a user's password with a freshly hashed one.
    pub async fn change_password(&self, id: i64, new_password: &str) -> DbResult<()> {
        debug!(id, "Changing user password");

        let password_hash = hash_password(new_password)?;

        let result = sqlx::query("UPDATE users SET password_hash = ?2 WHERE id = ?1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Deactivates a user. History keeps the row; logins stop working.
    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deactivating user");

        let result = sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

fn hash_password(password: &str) -> DbResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("password hashing failed: {e}")))?;

    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
