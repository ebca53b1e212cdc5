//! Network build error types.

use crate::domain::DomainError;

/// Errors raised while building a station registry from line data.
///
/// These are hard failures: the builder expects well-formed input and
/// does not try to recover from bad records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    /// A coordinate string could not be parsed as a number
    #[error("station {station}: {field} {value:?} is not a number")]
    InvalidCoordinate {
        station: String,
        field: &'static str,
        value: String,
    },

    /// An identifier, line name or coordinate failed validation
    #[error("line {line}: {source}")]
    InvalidRecord {
        line: String,
        #[source]
        source: DomainError,
    },
}
