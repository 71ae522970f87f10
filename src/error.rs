//! Error types for fleetcost
//!
//! There are two error types: `FleetError` (main error enum) and `ConfigError`
//! (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `FleetError`.
//! The binary uses `anyhow::Result<T>` for top-level error handling and adds
//! context chains. The conversion happens at the CLI boundary, and
//! `exit_codes::exit_code_for_error` downcasts back to `FleetError` to pick
//! the process exit code.
//!
//! ## When to Use Which Error
//!
//! - `ConfigError`: configuration file parsing and validation issues
//!   - Automatically converted to `FleetError::Config` via `#[from]`
//!
//! - `PriceParse`: an hourly price string that is not a finite number
//!   - The only failure attributable to the monthly price arithmetic
//!
//! - `UnknownInstanceType` / `UnknownVolumeType` / `UnknownLocation`:
//!   the pricing catalog has no entry for a descriptor attribute
//!
//! - `Validation`: malformed user input (descriptors, capacities, workload rows)
//!
//! - `Unplaceable`: a single instance does not fit on an empty server

use thiserror::Error;

/// Main error type for fleetcost
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Invalid price '{value}': {reason}")]
    PriceParse { value: String, reason: String },

    #[error("Unknown instance type: {0}")]
    UnknownInstanceType(String),

    #[error("Unknown volume type: {0}")]
    UnknownVolumeType(String),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Service '{service}' does not fit on an empty server: {resource} demand {demand} exceeds capacity {capacity}")]
    Unplaceable {
        service: String,
        resource: String,
        demand: f64,
        capacity: f64,
    },

    #[error("Workload file error: {0}")]
    Workload(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

impl From<toml::de::Error> for FleetError {
    fn from(err: toml::de::Error) -> Self {
        FleetError::Config(ConfigError::ParseError(err.to_string()))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FleetError>;

impl FleetError {
    /// Shorthand for a `Validation` error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FleetError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
