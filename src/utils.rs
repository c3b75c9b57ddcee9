use log::error;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a decimal stored as TEXT, falling back through f64 before giving
/// up. Rows written by this crate always round-trip exactly; the fallback
/// exists for hand-edited or vendor-imported databases.
pub fn parse_decimal_column(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(decimal_err) => match f64::from_str(value_str) {
            Ok(f_val) => match Decimal::from_f64(f_val) {
                Some(d) => d,
                None => {
                    error!(
                        "Failed to convert {} '{}' (parsed as f64: {}) to Decimal.",
                        field_name, value_str, f_val
                    );
                    Decimal::ZERO
                }
            },
            Err(float_err) => {
                error!(
                    "Failed to parse {} '{}': as Decimal (err: {}), and as f64 (err: {}). Falling back to ZERO.",
                    field_name, value_str, decimal_err, float_err
                );
                Decimal::ZERO
            }
        },
    }
}
