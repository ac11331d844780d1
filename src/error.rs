//! # Error Module
//!
//! Failure taxonomy shared by every analyzer, plus the [`Outcome`] type that
//! carries either a computed result or a documented fallback.
//!
//! Analyzers never surface an error to their caller. Each one has a fallible
//! `try_*` core returning `Result<T, AnalysisError>` and a total wrapper that
//! turns the error into [`Outcome::Fallback`] holding the fixed default.

use serde::Serialize;
use thiserror::Error;

/// Why an analyzer could not compute a real result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Empty collection or absent top-level value.
    #[error("no input data available")]
    MissingInput,

    /// Every record in the collection was unusable.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Division by zero, non-finite statistics and similar.
    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    /// Fewer rows than the computation needs.
    #[error("insufficient rows: requested {requested}, available {available}")]
    InsufficientRows { requested: usize, available: usize },
}

/// Result of an analyzer that always produces a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The value was computed from the input.
    Computed(T),
    /// The input could not be analyzed, `value` is the documented default.
    Fallback { value: T, reason: AnalysisError },
}

impl<T> Outcome<T> {
    /// Run `compute`; on error log the reason and substitute `fallback()`.
    pub(crate) fn recover(
        component: &str,
        compute: impl FnOnce() -> Result<T, AnalysisError>,
        fallback: impl FnOnce() -> T,
    ) -> Self {
        match compute() {
            Ok(value) => Outcome::Computed(value),
            Err(reason) => {
                log::warn!("{component}: using fallback result ({reason})");
                Outcome::Fallback {
                    value: fallback(),
                    reason,
                }
            }
        }
    }

    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Outcome::Computed(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            Outcome::Computed(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }

    /// The recovery reason, if the fallback branch was taken.
    #[must_use]
    pub const fn reason(&self) -> Option<&AnalysisError> {
        match self {
            Outcome::Computed(_) => None,
            Outcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Only the value is serialized; the presentation layer never sees the reason.
impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recover_computed() {
        let outcome = Outcome::recover("test", || Ok(3), || 0);
        assert_eq!(outcome, Outcome::Computed(3));
        assert!(!outcome.is_fallback());
        assert!(outcome.reason().is_none());
    }

    #[test]
    fn test_recover_fallback_keeps_reason() {
        let outcome: Outcome<i32> =
            Outcome::recover("test", || Err(AnalysisError::MissingInput), || 7);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.reason(), Some(&AnalysisError::MissingInput));
        assert_eq!(*outcome.value(), 7);
        assert_eq!(outcome.into_value(), 7);
    }

    #[test]
    fn test_outcome_serializes_value_only() {
        let outcome: Outcome<u8> = Outcome::Fallback {
            value: 5,
            reason: AnalysisError::MissingInput,
        };
        assert_eq!(serde_json::to_string(&outcome).unwrap(), "5");
    }

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::InsufficientRows {
            requested: 3,
            available: 0,
        };
        assert_eq!(err.to_string(), "insufficient rows: requested 3, available 0");
    }
}
