use std::env;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 9500;
const DEFAULT_PORT_ATTEMPTS: u16 = 5;
const DEFAULT_PUSH_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub port: u16,
    pub port_attempts: u16,
    pub seed_demo_notifications: bool,
    pub push_channel_capacity: usize,
}

impl AppConfig {
    /// Read configuration from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            jwt_secret,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            port_attempts: parse_or(&lookup, "PORT_ATTEMPTS", DEFAULT_PORT_ATTEMPTS)?,
            seed_demo_notifications: parse_or(&lookup, "SEED_DEMO_NOTIFICATIONS", false)?,
            push_channel_capacity: parse_or(
                &lookup,
                "PUSH_CHANNEL_CAPACITY",
                DEFAULT_PUSH_CHANNEL_CAPACITY,
            )?
            .max(1),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
