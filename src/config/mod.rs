//! Configuration module for the AOI backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 5000));
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A configuration variable that could not be interpreted.
#[derive(Debug, Error)]
#[error("Invalid {variable} value {value:?}: {reason}")]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
    pub reason: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Directory holding request-scoped AOI copies
    pub upload_dir: PathBuf,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Reject uploads on advisory hints, not only on errors
    pub reject_advisory_hints: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_var(&lookup, "AOI_BIND_ADDR", DEFAULT_BIND_ADDR)?;

        let upload_dir = lookup("AOI_UPLOAD_DIR")
            .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string())
            .into();

        let max_upload_bytes =
            parse_var(&lookup, "AOI_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let reject_advisory_hints = match lookup("AOI_REJECT_ADVISORY_HINTS") {
            None => true,
            Some(value) => parse_flag(&value).ok_or_else(|| ConfigError {
                variable: "AOI_REJECT_ADVISORY_HINTS",
                value,
                reason: "expected true or false".to_string(),
            })?,
        };

        let log_level = lookup("AOI_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            bind_addr,
            upload_dir,
            max_upload_bytes,
            reject_advisory_hints,
            log_level,
        })
    }
}

fn parse_var<F, T>(lookup: &F, variable: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(variable) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            variable,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
