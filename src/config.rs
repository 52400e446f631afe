//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Presence CSV path
    pub data_csv: PathBuf,
    /// Users XML path
    pub user_data_xml: PathBuf,
    /// Where `download_users` fetches the users XML from
    pub users_xml_url: String,
    /// Lifetime in seconds of cached file loads
    pub cache_ttl: u64,
}

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DATA_CSV: &str = "runtime/data/sample_data.csv";
const DEFAULT_USER_DATA_XML: &str = "runtime/data/users.xml";
const DEFAULT_USERS_XML_URL: &str = "http://sargo.bolt.stxnext.pl/users.xml";
const DEFAULT_CACHE_TTL: u64 = 60;

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATA_CSV` - Presence CSV path (default: runtime/data/sample_data.csv)
    /// - `USER_DATA_XML` - Users XML path (default: runtime/data/users.xml)
    /// - `USERS_XML_URL` - Users XML source URL
    /// - `CACHE_TTL` - Cache lifetime of loaded files in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            data_csv: env::var("DATA_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_CSV)),
            user_data_xml: env::var("USER_DATA_XML")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_USER_DATA_XML)),
            users_xml_url: env::var("USERS_XML_URL")
                .unwrap_or_else(|_| DEFAULT_USERS_XML_URL.to_string()),
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CACHE_TTL),
        }
    }

    /// Cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            data_csv: PathBuf::from(DEFAULT_DATA_CSV),
            user_data_xml: PathBuf::from(DEFAULT_USER_DATA_XML),
            users_xml_url: DEFAULT_USERS_XML_URL.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}
