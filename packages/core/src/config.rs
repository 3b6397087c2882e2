use std::env;
use std::fmt;

use chrono::NaiveTime;
use lettre::message::Mailbox;

use crate::error::ConfigError;
use crate::services::currency_api::DEFAULT_BASE_URL;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_FIRE_TIME: &str = "08:00";

#[derive(Debug, Clone)]
pub struct Config {
    pub rate_api: RateApiConfig,
    pub email: EmailConfig,
    pub schedule: ScheduleConfig,
    pub run_mode: RunMode,
}

#[derive(Debug, Clone)]
pub struct RateApiConfig {
    pub base_url: String,
    pub api_key: Secret,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from: Mailbox,
    pub to: Mailbox,
    pub password: Secret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Wall-clock time of day, in UTC, at which the daily tick fires.
    pub daily_fire_time: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Daily,
    Once,
}

/// A credential that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_fire_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("'{}' is not a time of day (expected HH:MM)", raw))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing { key })
        };

        let from = parse_mailbox("SMTP_FROM_EMAIL", &required("SMTP_FROM_EMAIL")?)?;
        let to = parse_mailbox("SMTP_TO_EMAIL", &required("SMTP_TO_EMAIL")?)?;
        let password = Secret::new(required("SMTP_PASSWORD")?);
        let api_key = Secret::new(required("API_KEY")?);

        let smtp_host = lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());

        let smtp_port = match lookup("SMTP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid("SMTP_PORT", "must be a valid port number"))?,
            None => DEFAULT_SMTP_PORT,
        };

        let base_url = lookup("RATE_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let daily_fire_time = parse_fire_time(
            &lookup("DAILY_FIRE_TIME").unwrap_or_else(|| DEFAULT_FIRE_TIME.to_string()),
        )
        .map_err(|msg| ConfigError::invalid("DAILY_FIRE_TIME", msg))?;

        let run_mode = match lookup("RUN_MODE").as_deref() {
            None | Some("daily") => RunMode::Daily,
            Some("once") => RunMode::Once,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "RUN_MODE",
                    format!("'{}' (expected daily or once)", other),
                ))
            }
        };

        Ok(Self {
            rate_api: RateApiConfig { base_url, api_key },
            email: EmailConfig {
                smtp_host,
                smtp_port,
                from,
                to,
                password,
            },
            schedule: ScheduleConfig { daily_fire_time },
            run_mode,
        })
    }
}

fn parse_mailbox(key: &'static str, raw: &str) -> Result<Mailbox, ConfigError> {
    raw.trim()
        .parse::<Mailbox>()
        .map_err(|err| ConfigError::invalid(key, err.to_string()))
}
