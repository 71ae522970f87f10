use crate::error::Result;
use std::path::Path;

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Format a USD amount; sub-dollar hourly rates keep four decimals.
pub fn format_usd(amount: f64) -> String {
    if amount.abs() < 1.0 && amount != 0.0 {
        format!("${:.4}", amount)
    } else {
        format!("${:.2}", amount)
    }
}

/// Percentage of `used` against `capacity`, one decimal
pub fn format_percent(used: f64, capacity: f64) -> String {
    if capacity <= 0.0 {
        return "-".to_string();
    }
    format!("{:.1}%", used / capacity * 100.0)
}
