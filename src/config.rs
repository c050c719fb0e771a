use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Database
    pub database_url: String,

    // JWT
    pub jwt_secret: String,
    pub access_token_expire_secs: i64,

    // Invite links
    pub default_max_uses: i32,
    pub redeem_retry_limit: u32,
    pub codec_retry_limit: u32,

    // Logging
    pub log_level: String,

    // Build info
    pub version: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            // Server
            host: env::var("BOARDHUB_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BOARDHUB_API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            // Database
            database_url: env::var("BOARDHUB_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:///data/boardhub.db?mode=rwc".to_string()),

            // JWT
            jwt_secret: env::var("BOARDHUB_JWT_SECRET")
                .unwrap_or_else(|_| "insecure-dev-secret".to_string()),
            access_token_expire_secs: env::var("BOARDHUB_ACCESS_TOKEN_EXPIRE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),

            // Invite links
            default_max_uses: env::var("BOARDHUB_INVITE_DEFAULT_MAX_USES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            redeem_retry_limit: env::var("BOARDHUB_INVITE_REDEEM_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            codec_retry_limit: env::var("BOARDHUB_INVITE_CODEC_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            // Logging
            log_level: env::var("BOARDHUB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            // Build info
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_env();
        assert!(config.port > 0);
        assert!(config.default_max_uses >= 1);
        assert!(config.redeem_retry_limit >= 1);
        assert!(config.codec_retry_limit >= 1);
    }
}
