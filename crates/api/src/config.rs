//! Environment-derived configuration, loaded once at startup.

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub jwt_secret: String,
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port = match std::env::var("SERVER_PORT") {
            Ok(port) => port
                .parse::<u16>()
                .context("SERVER_PORT must be a port number")?,
            Err(_) => 8080,
        };

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let database_url = std::env::var("DATABASE_URL").ok();

        Ok(Self {
            server_port,
            jwt_secret,
            database_url,
        })
    }
}
