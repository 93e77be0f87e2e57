use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::transfer::TransferLimits;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default)]
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub limits: TransferLimits,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Full connection URL; wins over the individual fields
    pub url: Option<String>,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "ledger".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 5,
            url: None,
        }
    }
}

impl PostgresConfig {
    /// Connection URL: explicit `url` or assembled from the parts
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.database
            ),
        }
    }

    /// Apply `DB_*` and `DATABASE_URL` overrides from `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("DB_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("Invalid DB_PORT: {}", port))?;
        }
        if let Some(user) = lookup("DB_USER") {
            self.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.password = password;
        }
        if let Some(database) = lookup("DB_NAME") {
            self.database = database;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.url = Some(url);
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml` and apply environment overrides
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn load(env: &str) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;

        config
            .postgres
            .apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}
