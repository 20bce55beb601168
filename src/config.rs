use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub forecast: ForecastConfig,
    pub events: EventsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. Absent means the in-memory backend.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// Hard ceiling on query windows, in days.
    pub max_query_range_days: i64,
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    pub enabled: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("PFS__").split("__"));
        Ok(figment.extract()?)
    }
}
