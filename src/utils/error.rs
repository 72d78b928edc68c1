use thiserror::Error;

/// Failures while talking to the open-data API. Recoverable by retrying the
/// whole run; no retry happens inside the fetcher itself.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Response body is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected response payload: {detail}")]
    UnexpectedPayload { detail: String },
}

/// Failures while repairing record shape. Not retryable: a malformed geo
/// payload needs a code or upstream-data fix, so it is surfaced rather than
/// skipped.
#[derive(Error, Debug)]
pub enum NormalizationError {
    #[error("Malformed geo payload in field '{field}': {detail}")]
    MalformedGeo { field: String, detail: String },

    #[error("Failed to serialize geo payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures while writing to the warehouse.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Warehouse operation failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Schema '{schema}' does not exist")]
    MissingSchema { schema: String },
}

/// Top-level error for a pipeline run. Stage errors pass through transparently
/// so the orchestrator sees the originating cause, not a wrapper.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Invalid configuration for '{field}' (value: '{value}'): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read config file '{path}': {reason}")]
    ConfigFile { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;
