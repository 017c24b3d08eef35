//! Server configuration.
//!
//! Everything is read from `MKT_*` environment variables. Missing or malformed values fall back to defaults, and the
//! fallback is logged so that a misconfigured deployment is visible in the logs.
use std::{env, time::Duration};

use log::*;
use market_common::helpers::{parse_boolean_flag, parse_number};
use market_engine::{db_url, ScanConfig, DEFAULT_POLL_INTERVAL};

const DEFAULT_MKT_HOST: &str = "127.0.0.1";
const DEFAULT_MKT_PORT: u16 = 8360;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Scoring threshold and pool sizes for the match scanner.
    pub scan: ScanConfig,
    /// How often change-feed subscriptions poll the store for new rows.
    pub feed_poll_interval: Duration,
    /// If true, every listing received on the webhook is scanned for matches straight away.
    pub auto_scan: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MKT_HOST.to_string(),
            port: DEFAULT_MKT_PORT,
            database_url: String::default(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            scan: ScanConfig::default(),
            feed_poll_interval: DEFAULT_POLL_INTERVAL,
            auto_scan: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MKT_HOST").ok().unwrap_or_else(|| DEFAULT_MKT_HOST.into());
        let port = env::var("MKT_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for MKT_PORT. {e} Using the default, {DEFAULT_MKT_PORT}.");
                    DEFAULT_MKT_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MKT_PORT);
        let database_url = db_url();
        let db_max_connections = numeric_setting("MKT_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        let scan = scan_config_from_env();
        let poll_ms = numeric_setting("MKT_FEED_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL.as_millis() as u64);
        let feed_poll_interval = Duration::from_millis(poll_ms.max(1));
        let auto_scan = parse_boolean_flag(env::var("MKT_AUTO_SCAN").ok(), true);
        if !auto_scan {
            info!("🪛️ MKT_AUTO_SCAN is off. New listings will only be matched by explicit scans.");
        }
        Self { host, port, database_url, db_max_connections, scan, feed_poll_interval, auto_scan }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The subset of the server configuration that request handlers need to see.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub auto_scan: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { auto_scan: config.auto_scan }
    }
}

fn scan_config_from_env() -> ScanConfig {
    let defaults = ScanConfig::default();
    let threshold = numeric_setting("MKT_MATCH_THRESHOLD", defaults.threshold);
    let threshold = if threshold > 100 {
        warn!("🪛️ MKT_MATCH_THRESHOLD must be between 0 and 100. Using the default, {}.", defaults.threshold);
        defaults.threshold
    } else {
        threshold
    };
    ScanConfig {
        threshold,
        candidate_pool_size: numeric_setting("MKT_CANDIDATE_POOL_SIZE", defaults.candidate_pool_size),
        own_listing_page: numeric_setting("MKT_OWN_LISTING_PAGE", defaults.own_listing_page),
        max_per_listing: numeric_setting("MKT_MAX_MATCHES_PER_LISTING", defaults.max_per_listing),
    }
}

/// Reads a numeric environment variable, logging when the default is used instead.
fn numeric_setting<T>(name: &str, default: T) -> T
where T: std::str::FromStr + std::fmt::Display + Copy {
    match env::var(name) {
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
        Ok(s) if s.trim().parse::<T>().is_err() => {
            warn!("🪛️ Invalid configuration value for {name}: '{s}'. Using the default value of {default}.");
            default
        },
        Ok(s) => parse_number(Some(s), default),
    }
}
