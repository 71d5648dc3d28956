use anyhow::{Context, anyhow};
use dotenvy::dotenv;
use std::env;

use crate::calendar::HolidayCalendar;

const DEFAULT_HOLIDAYS: &str = "01-01,01-26,08-15,10-02,12-25";

#[derive(Clone)]
pub struct Config {
    /// MySQL URL; without one the service keeps everything in memory
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    /// Prefix for attachment URLs handed back to clients
    pub attachment_base_url: String,
    pub holidays: HolidayCalendar,

    pub log_dir: String,
    pub log_level: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        let server_addr = var_or("SERVER_ADDR", "127.0.0.1:8081");
        let default_attachment_url = format!("http://{server_addr}/uploads/leaves");

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 5)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            api_prefix: var_or("API_PREFIX", "/api"),
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,
            attachment_base_url: var_or("ATTACHMENT_BASE_URL", &default_attachment_url),
            holidays: HolidayCalendar::parse(&var_or("HOLIDAYS", DEFAULT_HOLIDAYS))
                .map_err(|e| anyhow!("HOLIDAYS: {e}"))?,
            log_dir: var_or("LOG_DIR", "logs"),
            log_level: var_or("LOG_LEVEL", "debug"),
            server_addr,
        })
    }

    /// Settings for tests and local runs without a `.env`.
    pub fn local(jwt_secret: &str) -> Self {
        Self {
            database_url: None,
            db_max_connections: 5,
            jwt_secret: jwt_secret.to_string(),
            server_addr: "127.0.0.1:8081".to_string(),
            api_prefix: "/api".to_string(),
            rate_protected_per_min: 1000,
            attachment_base_url: "http://127.0.0.1:8081/uploads/leaves".to_string(),
            holidays: HolidayCalendar::default(),
            log_dir: "logs".to_string(),
            log_level: "debug".to_string(),
        }
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::DEBUG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_holidays_match_the_built_in_calendar() {
        let parsed = HolidayCalendar::parse(DEFAULT_HOLIDAYS).unwrap();
        assert_eq!(parsed, HolidayCalendar::default());
    }

    #[test]
    fn unknown_log_level_falls_back_to_debug() {
        let mut config = Config::local("secret");
        config.log_level = "chatty".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::DEBUG);
        config.log_level = "warn".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::WARN);
    }
}
