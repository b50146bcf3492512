//! Server configuration, read from `TES_*` environment variables.
use std::env;

use log::*;

const DEFAULT_TES_HOST: &str = "127.0.0.1";
const DEFAULT_TES_PORT: u16 = 8360;
const DEFAULT_ESCROW_EMAIL_DOMAIN: &str = "escrowtickets.com";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The domain used when generating escrow addresses for new listings, e.g. `escrowtickets.com` yields
    /// `escrow+ticketmaster@escrowtickets.com`.
    pub escrow_email_domain: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TES_HOST.to_string(),
            port: DEFAULT_TES_PORT,
            database_url: String::default(),
            escrow_email_domain: DEFAULT_ESCROW_EMAIL_DOMAIN.to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("TES_HOST").ok().unwrap_or_else(|| DEFAULT_TES_HOST.into());
        let port = env::var("TES_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for TES_PORT. {e} Using the default, {DEFAULT_TES_PORT}, instead."
                    );
                    DEFAULT_TES_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_TES_PORT);
        let database_url = env::var("TES_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ TES_DATABASE_URL is not set. Please set it to the URL for the escrow database.");
            String::default()
        });
        let escrow_email_domain =
            env::var("TES_ESCROW_EMAIL_DOMAIN").ok().unwrap_or_else(|| DEFAULT_ESCROW_EMAIL_DOMAIN.into());
        let use_x_forwarded_for =
            env::var("TES_USE_X_FORWARDED_FOR").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        let use_forwarded = env::var("TES_USE_FORWARDED").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        Self { host, port, database_url, escrow_email_domain, use_x_forwarded_for, use_forwarded }
    }
}
