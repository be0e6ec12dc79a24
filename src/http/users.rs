//! User registration and profile management.

use actix_web::{get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::User;
use crate::db::user_repo;
use crate::error::ApiError;
use crate::hateoas::{self, Links};
use crate::http::auth::JwtAuth;

//////////////////////////////////////////////////
// Payloads
//////////////////////////////////////////////////

#[derive(Deserialize)]
pub struct UserRegister {
    pub name: String,
    pub email: String,
    pub password: String,
    pub street_address: String,
}

#[derive(Deserialize, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub street_address: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct UserOut {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub street_address: String,
    #[serde(rename = "_links")]
    pub links: Links,
}

fn to_user_out(user: User, is_self: bool) -> UserOut {
    UserOut {
        links: hateoas::user_links(user.id, is_self),
        id: user.id,
        name: user.name,
        email: user.email,
        street_address: user.street_address,
    }
}

//////////////////////////////////////////////////
// Validation
//////////////////////////////////////////////////

fn bad(message: &str) -> ApiError {
    ApiError::validation("VALIDATION_ERROR", message)
}

fn check_len(value: &str, min: usize, max: usize, field: &str) -> Result<(), ApiError> {
    let n = value.chars().count();
    if n < min || n > max {
        return Err(bad(&format!("{field} must be {min}..{max} characters")));
    }
    Ok(())
}

/// Cheap shape check; uniqueness is enforced by the database.
fn check_email(email: &str) -> Result<(), ApiError> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(bad("email is not a valid address"));
    }
    Ok(())
}

/// bcrypt ignores input past 72 bytes, so longer passwords are refused
/// rather than silently truncated.
fn check_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < 8 || password.len() > 72 {
        return Err(bad("password must be at least 8 characters and at most 72 bytes"));
    }
    Ok(())
}

pub(crate) fn validate_register(payload: &UserRegister) -> Result<(), ApiError> {
    check_len(&payload.name, 1, 200, "name")?;
    check_email(&payload.email)?;
    check_password(&payload.password)?;
    check_len(&payload.street_address, 1, 400, "street_address")
}

pub(crate) fn validate_update(payload: &UserUpdate) -> Result<(), ApiError> {
    if let Some(name) = &payload.name {
        check_len(name, 1, 200, "name")?;
    }
    if let Some(street_address) = &payload.street_address {
        check_len(street_address, 1, 400, "street_address")?;
    }
    if let Some(password) = &payload.password {
        check_password(password)?;
    }
    Ok(())
}

//////////////////////////////////////////////////
// Handlers
//////////////////////////////////////////////////

/// POST /api/users: register (no auth).
#[post("/users")]
pub async fn register(
    payload: web::Json<UserRegister>,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    validate_register(&payload)?;

    let email = payload.email.trim().to_lowercase();
    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)?;
    let user = user_repo::insert(
        &db,
        &payload.name,
        &email,
        &password_hash,
        &payload.street_address,
    )
    .await?;

    let location = format!("/api/users/{}", user.id);
    Ok(HttpResponse::Created()
        .insert_header(("Location", location))
        .json(to_user_out(user, true)))
}

/// GET /api/users/me
#[get("/users/me")]
pub async fn me(auth: JwtAuth, db: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let user = user_repo::require_token_user(&db, auth.user_id).await?;
    Ok(HttpResponse::Ok().json(to_user_out(user, true)))
}

/// GET /api/users/{id}: public profile, richer links for yourself.
#[get("/users/{user_id}")]
pub async fn get_user(
    path: web::Path<Uuid>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let user = user_repo::by_id(&db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let is_self = auth.user_id == user.id;
    Ok(HttpResponse::Ok().json(to_user_out(user, is_self)))
}

/// PUT /api/users/{id}: self-only. Email is immutable.
#[put("/users/{user_id}")]
pub async fn update_user(
    path: web::Path<Uuid>,
    payload: web::Json<UserUpdate>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    if auth.user_id != user_id {
        return Err(ApiError::forbidden(
            "You may only update your own user details",
        ));
    }
    validate_update(&payload)?;

    user_repo::by_id(&db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let password_hash = match &payload.password {
        Some(password) => Some(bcrypt::hash(password, bcrypt::DEFAULT_COST)?),
        None => None,
    };
    let user = user_repo::update_profile(
        &db,
        user_id,
        payload.name.as_deref(),
        payload.street_address.as_deref(),
        password_hash.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(to_user_out(user, true)))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // `/users/me` must register before the `{user_id}` matcher.
    cfg.service(register)
        .service(me)
        .service(get_user)
        .service(update_user);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_payload() -> UserRegister {
        UserRegister {
            name: "Lorenzo".into(),
            email: "lorenzo@example.com".into(),
            password: "hunter2hunter2".into(),
            street_address: "1 Retro Way".into(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(validate_register(&register_payload()).is_ok());
    }

    #[test]
    fn rejects_bad_email_shapes() {
        for email in ["", "no-at-sign", "@nodomain.com", "user@", "user@tld"] {
            let mut p = register_payload();
            p.email = email.into();
            assert!(validate_register(&p).is_err(), "accepted {email:?}");
        }
    }

    #[test]
    fn rejects_short_and_oversized_passwords() {
        let mut p = register_payload();
        p.password = "short".into();
        assert!(validate_register(&p).is_err());

        p.password = "x".repeat(73);
        assert!(validate_register(&p).is_err());
    }

    #[test]
    fn update_accepts_empty_patch() {
        assert!(validate_update(&UserUpdate::default()).is_ok());
    }

    #[test]
    fn update_rejects_blank_name() {
        let patch = UserUpdate {
            name: Some(String::new()),
            ..UserUpdate::default()
        };
        assert!(validate_update(&patch).is_err());
    }
}
