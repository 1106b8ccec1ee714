use std::env;

use log::*;
use urbannook_engine::{gateway::RazorpayConfig, notifications::DispatchConfig, EngineConfig};

const DEFAULT_UN_HOST: &str = "127.0.0.1";
const DEFAULT_UN_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/urbannook_orders.db?mode=rwc";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Transition policy, conflict retries and queue sizes for the order engine.
    pub engine: EngineConfig,
    /// Retry and sender settings for customer emails.
    pub dispatch: DispatchConfig,
    /// Credentials used to check Razorpay payment signatures.
    pub razorpay: RazorpayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_UN_HOST.to_string(),
            port: DEFAULT_UN_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            engine: EngineConfig::default(),
            dispatch: DispatchConfig::default(),
            razorpay: RazorpayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("UN_HOST").ok().unwrap_or_else(|| DEFAULT_UN_HOST.into());
        let port = env::var("UN_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for UN_PORT. {e} Using the default, {DEFAULT_UN_PORT}, instead.");
                    DEFAULT_UN_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_UN_PORT);
        let database_url = env::var("UN_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ UN_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        Self {
            host,
            port,
            database_url,
            engine: EngineConfig::from_env_or_default(),
            dispatch: DispatchConfig::from_env_or_default(),
            razorpay: RazorpayConfig::from_env_or_default(),
        }
    }
}
