use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MARINE_API_URL: &str = "https://marine-api.open-meteo.com/v1/marine";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub marine_api_url: String,
    pub marine_api_timeout_secs: u64,
    pub fetch_concurrency: usize,
    pub check_interval_secs: u64,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub dashboard_url: String,
}

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "coastal_alerts".to_string());
        let db_user = env::var("DB_USER").unwrap_or_else(|_| "coastal".to_string());
        let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "coastal".to_string());

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_user, db_pwd, db_host, db_port, db_name
        );

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let marine_api_url =
            env::var("MARINE_API_URL").unwrap_or_else(|_| DEFAULT_MARINE_API_URL.to_string());
        let marine_api_timeout_secs = parse_or("MARINE_API_TIMEOUT_SECS", 30);
        // At least one fetch must be allowed in flight.
        let fetch_concurrency = parse_or("FETCH_CONCURRENCY", 4usize).max(1);
        let check_interval_secs = parse_or("CHECK_INTERVAL_SECS", 600u64).max(1);

        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = parse_or("SMTP_PORT", 587);
        let smtp_username = env::var("SMTP_USER").ok().filter(|s| !s.is_empty());
        let smtp_password = env::var("SMTP_PASSWORD").ok().filter(|s| !s.is_empty());
        let smtp_from = env::var("SMTP_FROM")
            .unwrap_or_else(|_| "Sea-Blue Alerts <alerts@sea-blue.com>".to_string());

        let dashboard_url =
            env::var("DASHBOARD_URL").unwrap_or_else(|_| "https://sea-blue.com/dashboard".to_string());

        Ok(Self {
            database_url,
            log_level,
            marine_api_url,
            marine_api_timeout_secs,
            fetch_concurrency,
            check_interval_secs,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_from,
            dashboard_url,
        })
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn marine_api_timeout(&self) -> Duration {
        Duration::from_secs(self.marine_api_timeout_secs)
    }
}
