use uuid::Uuid;

use retro_exchange_server::error::ApiError;
use retro_exchange_server::http::auth::{create_access_token, decode_access_token, parse_bearer};

const SECRET: &str = "test-secret";

#[test]
fn token_round_trip_carries_the_user_id() {
    let user_id = Uuid::new_v4();
    let token = create_access_token(user_id, SECRET, 60).unwrap();
    assert_eq!(decode_access_token(&token, SECRET).unwrap(), user_id);
}

#[test]
fn token_signed_with_another_secret_is_rejected() {
    let token = create_access_token(Uuid::new_v4(), "other-secret", 60).unwrap();
    let err = decode_access_token(&token, SECRET).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(err.code(), "INVALID_TOKEN");
}

#[test]
fn expired_token_is_rejected() {
    // Issued with a TTL well past jsonwebtoken's default leeway.
    let token = create_access_token(Uuid::new_v4(), SECRET, -5).unwrap();
    let err = decode_access_token(&token, SECRET).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn garbage_token_is_rejected() {
    assert!(decode_access_token("not.a.jwt", SECRET).is_err());
    assert!(decode_access_token("", SECRET).is_err());
}

#[test]
fn bearer_header_parsing() {
    assert_eq!(parse_bearer(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");

    let missing = parse_bearer(None).unwrap_err();
    assert_eq!(missing.code(), "AUTH_REQUIRED");

    let malformed = parse_bearer(Some("Token abc")).unwrap_err();
    assert_eq!(malformed.code(), "AUTH_REQUIRED");

    // Scheme is case-sensitive and space-delimited.
    assert!(parse_bearer(Some("bearer abc")).is_err());
    assert!(parse_bearer(Some("Bearerabc")).is_err());
}
