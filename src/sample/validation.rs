use std::fmt;

/// Validation errors for incoming samples
#[derive(Debug, Clone, PartialEq)]
pub enum SampleError {
    EmptyId,
    NonFiniteCoordinate { axis: char, value: f64 },
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::EmptyId => write!(f, "entity id is required"),
            SampleError::NonFiniteCoordinate { axis, value } => {
                write!(f, "coordinate {} must be finite, got {}", axis, value)
            }
        }
    }
}

impl std::error::Error for SampleError {}

/// Rejects empty (or all-whitespace) identifiers.
pub fn validate_id(id: &str) -> Result<(), SampleError> {
    if id.trim().is_empty() {
        return Err(SampleError::EmptyId);
    }
    Ok(())
}

/// Rejects NaN and infinite coordinates, reporting the first offending axis.
pub fn validate_coordinates(x: f64, y: f64, z: f64) -> Result<(), SampleError> {
    for (axis, value) in [('x', x), ('y', y), ('z', z)] {
        if !value.is_finite() {
            return Err(SampleError::NonFiniteCoordinate { axis, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(validate_id("AA:BB:CC:DD:EE:FF").is_ok());
        assert!(validate_id("tag-01").is_ok());
    }

    #[test]
    fn test_invalid_ids() {
        assert_eq!(validate_id(""), Err(SampleError::EmptyId));
        assert_eq!(validate_id("   "), Err(SampleError::EmptyId));
    }

    #[test]
    fn test_first_bad_axis_reported() {
        let err = validate_coordinates(1.0, f64::INFINITY, f64::NAN).unwrap_err();
        assert!(matches!(err, SampleError::NonFiniteCoordinate { axis: 'y', .. }));
    }
}
