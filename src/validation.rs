//! Input validation utilities
//!
//! Provides validation functions for user inputs to prevent
//! invalid data from producing meaningless estimates or plans.

use crate::error::{FleetError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn instance_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // family[generation][attributes].size, e.g. t3.micro, m7i-flex.large, u-6tb1.metal
        Regex::new(r"^[a-z][a-z0-9-]*\.[a-z0-9]+$").expect("instance type pattern is valid")
    })
}

/// Validate EC2 instance type format
///
/// Instance types are `family.size`, lowercase, e.g. `t3.medium`.
pub fn validate_instance_type(instance_type: &str) -> Result<()> {
    if !instance_type_pattern().is_match(instance_type) {
        return Err(FleetError::validation(
            "instance_type",
            format!(
                "Instance type must look like 'family.size' (e.g. t3.medium), got: {}",
                instance_type
            ),
        ));
    }
    Ok(())
}

/// Validate a resource identifier (the key of a resource map entry)
///
/// Identifiers are non-empty, at most 64 characters, alphanumeric plus `-`, `_` and `.`.
pub fn validate_resource_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(FleetError::validation(
            "resource_id",
            "Resource identifier cannot be empty",
        ));
    }

    if id.len() > 64 {
        return Err(FleetError::validation(
            "resource_id",
            format!(
                "Resource identifier must be <= 64 characters, got: {} (len: {})",
                id,
                id.len()
            ),
        ));
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(FleetError::validation(
            "resource_id",
            format!("Resource identifier can only contain alphanumeric characters, hyphens, underscores, and dots, got: {}", id),
        ));
    }

    Ok(())
}

/// Largest single EBS volume, in GB
pub const MAX_VOLUME_SIZE_GB: u32 = 16384;

/// Validate volume size (in GB)
///
/// Volume sizes must be between 1 GB and 16384 GB (16 TB).
pub fn validate_volume_size(size_gb: u32) -> Result<()> {
    if size_gb < 1 {
        return Err(FleetError::validation(
            "volume_size_gb",
            format!("Volume size must be at least 1 GB, got: {}", size_gb),
        ));
    }

    if size_gb > MAX_VOLUME_SIZE_GB {
        return Err(FleetError::validation(
            "volume_size_gb",
            format!(
                "Volume size must be at most 16384 GB (16 TB), got: {}",
                size_gb
            ),
        ));
    }

    Ok(())
}

/// Validate a per-server capacity: finite and strictly positive.
pub fn validate_capacity(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FleetError::validation(
            field,
            format!("Capacity must be a positive number, got: {}", value),
        ));
    }
    Ok(())
}

/// Validate a per-instance demand: finite and not negative.
pub fn validate_demand(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(FleetError::validation(
            field,
            format!("Demand must be a non-negative number, got: {}", value),
        ));
    }
    Ok(())
}

/// Validate path for security (prevent path traversal)
///
/// Checks that path doesn't contain ".." or null bytes.
pub fn validate_path(path: &str) -> Result<()> {
    if path.contains("..") {
        return Err(FleetError::validation(
            "path",
            "Path cannot contain '..' (path traversal not allowed)",
        ));
    }

    if path.contains('\0') {
        return Err(FleetError::validation(
            "path",
            "Path cannot contain null bytes",
        ));
    }

    Ok(())
}
