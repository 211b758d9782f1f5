use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub frontend_url: String,
    pub email_gateway_url: Option<String>,
    pub default_from_email: String,
    pub api_rps: u32,
    pub invitation_ttl_days: i64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            access_token_ttl_minutes: get_env_parse_or("ACCESS_TOKEN_TTL_MINUTES", 60)?,
            refresh_token_ttl_days: get_env_parse_or("REFRESH_TOKEN_TTL_DAYS", 7)?,
            frontend_url: get_env("FRONTEND_URL")?,
            email_gateway_url: env::var("EMAIL_GATEWAY_URL").ok(),
            default_from_email: get_env("DEFAULT_FROM_EMAIL")?,
            api_rps: get_env_parse_or("API_RPS", 100)?,
            invitation_ttl_days: get_env_parse_or("INVITATION_TTL_DAYS", 7)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
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
