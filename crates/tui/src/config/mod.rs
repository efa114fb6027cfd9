use std::time::Duration;

use chrono_tz::Tz;
use clap::Parser;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/expense_tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// IANA name used to decide what "today" is for new expenses.
    pub timezone: String,
    pub request_timeout_secs: u64,
    pub notice_secs: u64,
    pub log_file: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            request_timeout_secs: 10,
            notice_secs: 3,
            log_file: "expense_tui.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Timezone(self.timezone.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }
}

#[derive(Debug, Parser)]
#[command(name = "expense_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the API base URL (e.g. http://localhost:8000/api).
    #[arg(long)]
    base_url: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Seconds before a request is treated as failed.
    #[arg(long)]
    request_timeout_secs: Option<u64>,
    #[arg(long)]
    log_file: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("EXPENSE_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(secs) = args.request_timeout_secs {
        settings.request_timeout_secs = secs;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    // Fail at startup rather than on the first submit.
    settings.tz()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.notice_ttl(), Duration::from_secs(3));
        assert_eq!(config.tz().unwrap(), chrono_tz::Asia::Kolkata);
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let config = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.tz(), Err(AppError::Timezone(_))));
    }

    #[test]
    fn file_values_override_defaults() {
        let settings: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "base_url = \"http://expenses.internal/api\"\nnotice_secs = 5\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.base_url, "http://expenses.internal/api");
        assert_eq!(settings.notice_secs, 5);
        assert_eq!(settings.timezone, "Asia/Kolkata");
    }
}
