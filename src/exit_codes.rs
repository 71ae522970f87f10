//! Exit code standardization for fleetcost
//!
//! Provides consistent exit codes for different error types so scripts can
//! tell bad input apart from a broken environment.
//!
//! ## Exit Code Convention
//!
//! - `0` = Success
//! - `1` = User error (invalid input, unparseable price, unknown catalog entry)
//! - `2` = System error (I/O failure, serialization failure)
//! - `3` = Configuration error (config parse error, unsupported provider)

use crate::error::FleetError;

/// Standard exit codes for fleetcost
pub mod codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// User error (invalid input, validation failure)
    pub const USER_ERROR: i32 = 1;
    /// System error (I/O, serialization)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a FleetError to an appropriate exit code
pub fn exit_code_for_error(error: &FleetError) -> i32 {
    use FleetError::*;
    match error {
        Config(_) => codes::CONFIG_ERROR,

        Validation { .. } => codes::USER_ERROR,
        PriceParse { .. } => codes::USER_ERROR,
        UnknownInstanceType(_) => codes::USER_ERROR,
        UnknownVolumeType(_) => codes::USER_ERROR,
        UnknownLocation(_) => codes::USER_ERROR,
        Unplaceable { .. } => codes::USER_ERROR,
        // Malformed rows are the user's file, not the system
        Workload(_) => codes::USER_ERROR,

        Io(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
    }
}

/// Exit code for an error chain coming out of the CLI layer.
///
/// Walks the chain looking for a `FleetError`; anything else is a system error.
pub fn exit_code_for_anyhow(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<FleetError>())
        .map(exit_code_for_error)
        .unwrap_or(codes::SYSTEM_ERROR)
}
