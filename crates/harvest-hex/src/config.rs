use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: String,
    pub database_url: Option<String>,
    pub currency: String,
    pub publishable_key: String,
    pub gateway_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port = env::var("SERVER_PORT").unwrap_or_else(|_| "3000".into());
        let database_url = env::var("DATABASE_URL").ok();
        let currency = env::var("CURRENCY").unwrap_or_else(|_| "LKR".into());
        let publishable_key =
            env::var("PUBLISHABLE_KEY").unwrap_or_else(|_| "pk_test_placeholder".into());
        let gateway_timeout_ms = match env::var("GATEWAY_TIMEOUT_MS") {
            Ok(v) => v.parse()?,
            Err(_) => 10_000,
        };
        Ok(Self {
            server_port,
            database_url,
            currency,
            publishable_key,
            gateway_timeout_ms,
        })
    }
}
