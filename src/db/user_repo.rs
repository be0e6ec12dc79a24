//! Credential store queries.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::User;
use crate::error::ApiError;

const USER_COLUMNS: &str = "id, name, email, password_hash, street_address, created_at";

pub async fn insert(
    db: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    street_address: &str,
) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash, street_address)
         VALUES ($1, $2, $3, $4)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(street_address)
    .fetch_one(db)
    .await
    .map_err(|e| match &e {
        // 23505 = unique_violation (email)
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            ApiError::conflict("EMAIL_IN_USE", "That email address is already registered")
        }
        _ => e.into(),
    })
}

pub async fn by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, ApiError> {
    Ok(
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?,
    )
}

pub async fn by_email(db: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
    Ok(
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await?,
    )
}

/// Resolves the user behind a verified token. A token whose subject no
/// longer resolves is treated as invalid, not as a missing resource.
pub async fn require_token_user(db: &PgPool, id: Uuid) -> Result<User, ApiError> {
    by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("INVALID_TOKEN", "User not found for token"))
}

/// Partial profile update; `None` fields keep their current value.
/// Email is immutable and never touched here.
pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    name: Option<&str>,
    street_address: Option<&str>,
    password_hash: Option<&str>,
) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users
            SET name           = COALESCE($2, name),
                street_address = COALESCE($3, street_address),
                password_hash  = COALESCE($4, password_hash)
          WHERE id = $1
          RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(street_address)
    .bind(password_hash)
    .fetch_one(db)
    .await
    .map_err(Into::into)
}
