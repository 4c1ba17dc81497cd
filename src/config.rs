use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_url: String,
    pub ai_timeout_secs: u64,
    pub client_origin: Option<String>,
    pub body_limit_bytes: usize,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            gemini_api_key: get_env("GEMINI_API_KEY")?,
            gemini_model: get_env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_api_url: get_env_or("GEMINI_API_URL", DEFAULT_GEMINI_API_URL),
            ai_timeout_secs: get_env_parse_or("AI_TIMEOUT_SECS", 60)?,
            client_origin: env::var("CLIENT_ORIGIN").ok().filter(|v| !v.is_empty()),
            body_limit_bytes: get_env_parse_or("BODY_LIMIT_BYTES", 64 * 1024)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_uses_default_when_unset() {
        let value: u64 = get_env_parse_or("QUIZ_TEST_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn parse_or_reports_bad_values() {
        env::set_var("QUIZ_TEST_BAD_TIMEOUT", "soon");
        let err = get_env_parse_or::<u64>("QUIZ_TEST_BAD_TIMEOUT", 1).unwrap_err();
        assert!(err.to_string().contains("QUIZ_TEST_BAD_TIMEOUT"));
        env::remove_var("QUIZ_TEST_BAD_TIMEOUT");
    }

    #[test]
    fn missing_required_variable_is_a_config_error() {
        let err = get_env("QUIZ_TEST_SURELY_UNSET_KEY").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
