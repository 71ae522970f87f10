//! Hourly to monthly price conversion

use crate::error::{FleetError, Result};

/// Billing hours in a month (365 × 24 / 12).
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Convert an hourly price, as produced by a pricing module, into a monthly price.
///
/// The input is treated as an opaque numeric string. Surrounding whitespace is
/// ignored; anything that does not parse as a finite real number is an error.
pub fn monthly_price(hourly: &str) -> Result<f64> {
    let trimmed = hourly.trim();
    if trimmed.is_empty() {
        return Err(FleetError::PriceParse {
            value: hourly.to_string(),
            reason: "empty string".to_string(),
        });
    }

    let value: f64 = trimmed.parse().map_err(|e: std::num::ParseFloatError| {
        FleetError::PriceParse {
            value: hourly.to_string(),
            reason: e.to_string(),
        }
    })?;

    if !value.is_finite() {
        return Err(FleetError::PriceParse {
            value: hourly.to_string(),
            reason: "not a finite number".to_string(),
        });
    }

    Ok(value * HOURS_PER_MONTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_price_examples() {
        assert_eq!(monthly_price("10.0").unwrap(), 7300.0);
        assert_eq!(monthly_price("0").unwrap(), 0.0);
        assert_eq!(monthly_price("1.5").unwrap(), 1095.0);
    }

    #[test]
    fn test_monthly_price_accepts_surrounding_whitespace() {
        assert_eq!(monthly_price("  2\n").unwrap(), 1460.0);
    }

    #[test]
    fn test_monthly_price_accepts_exponent_notation() {
        assert!((monthly_price("1e-2").unwrap() - 7.3).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_price_rejects_garbage() {
        for bad in ["", "   ", "abc", "1,5", "$1.00", "NaN", "inf", "-infinity"] {
            let err = monthly_price(bad).unwrap_err();
            assert!(
                matches!(err, FleetError::PriceParse { .. }),
                "expected PriceParse for {:?}, got {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_monthly_price_is_repeatable() {
        let first = monthly_price("0.0832").unwrap();
        let second = monthly_price("0.0832").unwrap();
        assert_eq!(first, second);
    }
}
