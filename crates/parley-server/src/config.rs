use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use axum::http::HeaderValue;

/// Origins allowed to open the socket and make cross-origin requests.
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return Ok(Self::Any);
        }
        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).with_context(|| format!("invalid origin '{}'", origin))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::List(origins))
    }

    /// A request without an Origin header is not cross-origin and is allowed.
    pub fn permits(&self, origin: Option<&HeaderValue>) -> bool {
        match (self, origin) {
            (Self::Any, _) | (_, None) => true,
            (Self::List(list), Some(origin)) => list.contains(origin),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub socket_path: String,
    pub allowed_origins: AllowedOrigins,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PARLEY_PORT", "8080");
        let port: u16 = port
            .parse()
            .with_context(|| format!("PARLEY_PORT must be a port number, got '{}'", port))?;

        let socket_path = var("PARLEY_SOCKET_PATH", "/stomp");
        if !socket_path.starts_with('/') {
            bail!("PARLEY_SOCKET_PATH must start with '/', got '{}'", socket_path);
        }

        Ok(Self {
            host: var("PARLEY_HOST", "0.0.0.0"),
            port,
            db_path: PathBuf::from(var("PARLEY_DB_PATH", "parley.db")),
            socket_path,
            allowed_origins: AllowedOrigins::parse(&var("PARLEY_ALLOWED_ORIGINS", "*"))?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
