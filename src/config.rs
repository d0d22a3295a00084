use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub session_ttl_days: i64,
    pub reset_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// When set, registration only accepts emails of this domain
    /// (e.g. "gmail.com"). Unset accepts any syntactically valid address.
    pub allowed_email_domain: Option<String>,
}

impl AppConfig {
    /// Loads configuration from the environment. Missing DATABASE_URL or
    /// JWT_SECRET is a fatal startup condition.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?,
            session_ttl_days: std::env::var("JWT_SESSION_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
            reset_ttl_minutes: std::env::var("JWT_RESET_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let allowed_email_domain = std::env::var("ALLOWED_EMAIL_DOMAIN")
            .ok()
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty());
        Ok(Self {
            database_url,
            jwt,
            allowed_email_domain,
        })
    }
}
