//! Runtime configuration for the exchange server.

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug)]
pub struct Settings {
    /// HMAC secret used to sign access tokens.
    pub jwt_secret: String,
    /// Access-token lifetime (minutes).
    pub token_ttl_minutes: i64,
    /// Identifier echoed in `X-Instance-Id` so round-robin balancing
    /// across instances can be observed from outside.
    pub instance_id: String,
    /// Upper bound for the `pageSize` query parameter.
    pub max_page_size: i64,
}

impl Settings {
    fn from_env() -> Self {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "dev-only-change-me".into());

        let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60);

        let instance_id = env::var("INSTANCE_ID").unwrap_or_else(|_| "local".into());

        let max_page_size = env::var("MAX_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(100);

        Settings {
            jwt_secret,
            token_ttl_minutes,
            instance_id,
            max_page_size,
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
