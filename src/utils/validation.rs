//! Validation helpers for acquisition parameters

use crate::error::{AcqError, AcqResult};

/// Reject `value` outside `[min, max]`, naming the field and the valid range
pub fn validate_range<T>(field: &'static str, value: T, min: T, max: T, unit: &str) -> AcqResult<()>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        let max = if unit.is_empty() {
            max.to_string()
        } else {
            format!("{} {}", max, unit)
        };
        return Err(AcqError::ConfigValidation {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max,
        });
    }
    Ok(())
}

/// Truncate a name to at most `max_len` bytes on a character boundary
pub fn bounded_name(name: &str, max_len: usize) -> String {
    if name.len() <= max_len {
        return name.to_string();
    }
    let mut end = max_len;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_range_inclusive() {
        assert!(validate_range("depth", 10, 10, 300, "mm").is_ok());
        assert!(validate_range("depth", 300, 10, 300, "mm").is_ok());
        assert!(validate_range("depth", 301, 10, 300, "mm").is_err());
    }

    #[test]
    fn test_validate_range_error_fields() {
        match validate_range("RX decimation", 5, 0, 2, "") {
            Err(AcqError::ConfigValidation { field, value, min, max }) => {
                assert_eq!(field, "RX decimation");
                assert_eq!(value, "5");
                assert_eq!(min, "0");
                assert_eq!(max, "2");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bounded_name() {
        assert_eq!(bounded_name("SA4-2/24", 16), "SA4-2/24");
        assert_eq!(bounded_name("ABCDEFGHIJKLMNOPQRST", 16), "ABCDEFGHIJKLMNOP");
        assert_eq!(bounded_name("µµµ", 3), "µ");
    }
}
