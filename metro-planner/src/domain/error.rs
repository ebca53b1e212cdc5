//! Domain error types.
//!
//! These errors represent validation failures when constructing domain
//! values. They are distinct from network build and I/O errors.

/// Domain-level errors for validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Station identifier is empty or whitespace
    #[error("station identifier must not be empty")]
    EmptyStationId,

    /// Line name is empty or whitespace
    #[error("line name must not be empty")]
    EmptyLineName,

    /// Coordinate is not finite or outside the valid range
    #[error("{field} {value} is out of range")]
    CoordinateOutOfRange { field: &'static str, value: f64 },

    /// Station was created without any line membership
    #[error("station {0} has no line membership")]
    NoMembership(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::EmptyStationId;
        assert_eq!(err.to_string(), "station identifier must not be empty");

        let err = DomainError::EmptyLineName;
        assert_eq!(err.to_string(), "line name must not be empty");

        let err = DomainError::CoordinateOutOfRange {
            field: "latitude",
            value: 91.0,
        };
        assert_eq!(err.to_string(), "latitude 91 is out of range");

        let err = DomainError::NoMembership("S1".into());
        assert_eq!(err.to_string(), "station S1 has no line membership");
    }
}
