//! sqlx queries for the user record store. Uniqueness on email and mobile
//! is enforced by unique indexes; a concurrent insert that loses the race
//! surfaces as SQLSTATE 23505 and is mapped to a typed duplicate error.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, ProfilePatch, User};
use crate::auth::validate::{normalize_email, normalize_mobile};
use crate::error::AuthError;

const USER_COLUMNS: &str = r#"
    id, first_name, last_name, email, mobile, age, password_hash,
    profile_picture_url, status, is_verified, terms_accepted,
    last_login_at, created_at, updated_at
"#;

fn map_unique_violation(e: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23505") {
            return match db_err.constraint() {
                Some("users_email_key") => AuthError::Duplicate("email"),
                Some("users_mobile_key") => AuthError::Duplicate("mobile"),
                _ => AuthError::Duplicate("email"),
            };
        }
    }
    AuthError::Store(e)
}

impl User {
    /// Inserts a new user. The unique indexes are the authoritative
    /// uniqueness guarantee regardless of any pre-check the service ran.
    pub async fn create(db: &PgPool, candidate: &NewUser) -> Result<User, AuthError> {
        let query = format!(
            r#"
            INSERT INTO users (first_name, last_name, email, mobile, age, password_hash, terms_accepted)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&candidate.first_name)
            .bind(&candidate.last_name)
            .bind(&candidate.email)
            .bind(&candidate.mobile)
            .bind(candidate.age)
            .bind(&candidate.password_hash)
            .fetch_one(db)
            .await
            .map_err(map_unique_violation)?;
        Ok(user)
    }

    /// Find a user by email. The lookup key is normalized the same way the
    /// write side normalizes it.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(email))
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Find a user by mobile number, digits-only.
    pub async fn find_by_mobile(db: &PgPool, mobile: &str) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE mobile = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(normalize_mobile(mobile))
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Applies a partial profile patch; absent fields keep their value.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<User, AuthError> {
        let query = format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                age = COALESCE($4, age),
                profile_picture_url = COALESCE($5, profile_picture_url),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&patch.first_name)
            .bind(&patch.last_name)
            .bind(patch.age)
            .bind(&patch.profile_picture_url)
            .fetch_optional(db)
            .await?
            .ok_or(AuthError::NotFound)?;
        Ok(user)
    }

    /// Replaces the stored password hash, nothing else.
    pub async fn set_password_hash(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }
        Ok(())
    }

    /// Stamps the last successful login.
    pub async fn touch_last_login(db: &PgPool, id: Uuid) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET last_login_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
