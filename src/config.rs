use std::{fmt, time::Duration};

use anyhow::{bail, Context, Result};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// Max Postgres pool connections.
    pub db_max_connections: u32,
    /// HMAC secret used to verify (and sign) bearer tokens.
    pub token_secret: String,
    pub server_host: String,
    pub server_port: u16,
    /// Timeout applied to every outbound trigger notification.
    pub webhook_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("token_secret", &"<redacted>")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("webhook_timeout", &self.webhook_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a `Config` from an arbitrary key lookup.
    ///
    /// `from_env` is a thin wrapper over this; tests feed it a map so they
    /// never touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key).with_context(|| format!("missing required env var: {key}"))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| default.to_owned())
        };
        let positive = |key: &str, default: &str| -> Result<u64> {
            match optional(key, default).parse::<u64>() {
                Ok(n) if n > 0 => Ok(n),
                _ => bail!("{key} must be a positive integer"),
            }
        };

        let token_secret = required("AIRSENSE_SECRET")?;
        if token_secret.trim().is_empty() {
            bail!("AIRSENSE_SECRET must not be empty");
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: u32::try_from(positive("DB_MAX_CONNECTIONS", "10")?)
                .context("DB_MAX_CONNECTIONS is too large")?,
            token_secret,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "7325")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            webhook_timeout: Duration::from_secs(positive("WEBHOOK_TIMEOUT_SECS", "10")?),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
