use anyhow::Context;

/// Port used when the environment does not provide one.
pub const DEFAULT_PORT: u16 = 8080;

/// Process configuration, drawn entirely from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string for the order store backend.
    pub database_url: String,
    /// HTTP listen port.
    pub port: u16,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// A missing `DATABASE_URL` is fatal at startup; a missing `PORT`
    /// falls back to [`DEFAULT_PORT`].
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self { database_url, port })
    }
}
