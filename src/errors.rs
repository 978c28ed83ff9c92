// src/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error(
        "API endpoint not found (404) at {url}: {body}\n   Likely causes: EVALRUN_API_URL points at the wrong server, the local server is not running, or the deployment is stale"
    )]
    ApiNotFound { url: String, body: String },

    #[error("No API credential found. Set EVALRUN_API_KEY (or EVAL_API_KEY) in the environment or a .env file")]
    MissingCredential,

    #[error("Timed out after {waited_ms}ms with {pending} batch(es) still not in a terminal state")]
    Timeout { waited_ms: u64, pending: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;
