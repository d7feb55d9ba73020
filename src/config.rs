use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    /// Name of the cookie carrying the session token.
    pub token_name: String,
    pub environment: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt_secret = std::env::var("JWT_SECRET")?;
        let token_name = std::env::var("TOKEN_NAME").unwrap_or_else(|_| "jwt".into());
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        Ok(Self {
            database_url,
            jwt_secret,
            token_name,
            environment,
        })
    }

    /// Session cookies carry `Secure` everywhere except local development.
    pub fn secure_cookies(&self) -> bool {
        self.environment != "development"
    }
}
