// src/config.rs
use std::path::Path;

use serde_json::Value;

use crate::errors::{EvalError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_MAX_WAIT_MS: u64 = 600_000;

/// Names the credential may arrive under; the first one set wins.
const CREDENTIAL_VARS: [&str; 2] = ["EVALRUN_API_KEY", "EVAL_API_KEY"];

/// High-level application configuration, read from the environment once at
/// startup and threaded through every component from there.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub max_wait_ms: u64,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from environment variables. Fails with
    /// `MissingCredential` before anything touches the network.
    pub fn from_env() -> Result<Self> {
        let api_key = CREDENTIAL_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
            .ok_or(EvalError::MissingCredential)?;

        let base_url = std::env::var("EVALRUN_API_URL")
            .map(|raw| normalize_base_url(&raw))
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(AppConfig {
            api_key,
            base_url,
            poll_interval_ms: parse_ms("EVALRUN_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?,
            max_wait_ms: parse_ms("EVALRUN_MAX_WAIT_MS", DEFAULT_MAX_WAIT_MS)?,
            debug: debug_requested(),
        })
    }

    /// Root of the eval API, version segment included.
    pub fn api_root(&self) -> String {
        format!("{}/v1/eval", self.base_url)
    }
}

/// Checked separately ahead of full config loading so the logger can be
/// initialized before the credential check runs.
pub fn debug_requested() -> bool {
    is_truthy(std::env::var("EVALRUN_DEBUG").ok().as_deref())
}

/// Users paste base URLs with or without a trailing `/api` segment and with
/// or without a trailing slash; strip both so endpoint paths join cleanly.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    trimmed.trim_end_matches('/').to_string()
}

fn parse_ms(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
            EvalError::Config(format!("{name} must be a number of milliseconds, got '{raw}'"))
        }),
        Err(_) => Ok(default),
    }
}

fn is_truthy(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("1") | Some("true") | Some("yes"))
}

/// User-supplied job description. Opaque to this client beyond the few
/// display fields read below; the raw document is submitted unmodified.
#[derive(Debug, Clone)]
pub struct EvalJobConfig {
    raw: Value,
}

impl EvalJobConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let raw: Value = serde_json::from_str(&text)?;
        Ok(EvalJobConfig { raw })
    }

    pub fn from_value(raw: Value) -> Self {
        EvalJobConfig { raw }
    }

    /// The submission payload, passed through as-is.
    pub fn payload(&self) -> &Value {
        &self.raw
    }

    pub fn flow_name(&self) -> &str {
        self.raw
            .get("flow_definition")
            .and_then(|flow| flow.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("(unnamed flow)")
    }

    pub fn record_count(&self) -> usize {
        self.raw.get("records").and_then(Value::as_array).map_or(0, Vec::len)
    }

    pub fn eval_config_count(&self) -> usize {
        self.raw.get("eval_configs").and_then(Value::as_array).map_or(0, Vec::len)
    }
}
