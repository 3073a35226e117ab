//! Canonical error taxonomy for Roster
//!
//! Every fallible path in the service resolves to one of the variants
//! below. Each variant maps to a stable error code usable for
//! programmatic handling, testing, and HTTP status mapping.
//!
//! Not-found is deliberately NOT an error: lookups return `Option::None`
//! so that "nothing to report" stays distinguishable from failure.

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque cause carried by storage failures
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Canonical error type for all Roster operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed external identifier or missing required input.
    /// Raised before any storage access; always a client-input failure.
    #[error("invalid {what}: {reason}")]
    Validation { what: &'static str, reason: String },

    /// Metadata or column-mapping inconsistency. Indicates a programming
    /// or schema-definition defect, not a runtime data issue.
    #[error("no mapping for {subject}")]
    Mapping { subject: String },

    /// Optimistic-concurrency guard failed, or a uniqueness invariant
    /// was violated. The expected recovery (re-fetch, reapply, resubmit)
    /// belongs to the external caller.
    #[error("conflict on {entity}: {reason}")]
    Conflict { entity: &'static str, reason: String },

    /// Underlying storage failure, wrapping the original cause. The
    /// enclosing transaction has been rolled back before this is raised.
    #[error("storage failure during {op}")]
    Store {
        op: &'static str,
        #[source]
        source: BoxedCause,
    },

    /// Invalid service configuration, detected at startup
    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

impl Error {
    /// Get the stable error code for this variant
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "ERR_VALIDATION",
            Error::Mapping { .. } => "ERR_MAPPING",
            Error::Conflict { .. } => "ERR_CONFLICT",
            Error::Store { .. } => "ERR_STORE",
            Error::Config { .. } => "ERR_CONFIG",
        }
    }

    /// Check whether this is a conflict (guard loss or uniqueness breach)
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }
}

/// Create a validation error for a named input
pub fn validation_error(what: &'static str, reason: impl Into<String>) -> Error {
    Error::Validation {
        what,
        reason: reason.into(),
    }
}

/// Create a mapping error for a missing or inconsistent designation
pub fn mapping_error(subject: impl Into<String>) -> Error {
    Error::Mapping {
        subject: subject.into(),
    }
}

/// Create a conflict error for an entity
pub fn conflict_error(entity: &'static str, reason: impl Into<String>) -> Error {
    Error::Conflict {
        entity,
        reason: reason.into(),
    }
}

/// Wrap an underlying storage failure, attributing it to an operation
pub fn store_error(op: &'static str, source: impl Into<BoxedCause>) -> Error {
    Error::Store {
        op,
        source: source.into(),
    }
}

/// Create a configuration error
pub fn config_error(reason: impl Into<String>) -> Error {
    Error::Config {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_codes() {
        let cases: Vec<(Error, &str)> = vec![
            (validation_error("id", "not a token"), "ERR_VALIDATION"),
            (mapping_error("item.guid"), "ERR_MAPPING"),
            (conflict_error("name", "stale version"), "ERR_CONFLICT"),
            (
                store_error("fetch", std::io::Error::new(std::io::ErrorKind::Other, "boom")),
                "ERR_STORE",
            ),
            (config_error("bad ssl mode"), "ERR_CONFIG"),
        ];
        for (err, expected) in cases {
            assert_eq!(err.code(), expected, "wrong code for {err}");
        }
    }

    #[test]
    fn test_store_error_preserves_source() {
        let err = store_error(
            "delete",
            std::io::Error::new(std::io::ErrorKind::Other, "connection reset"),
        );
        let source = std::error::Error::source(&err).expect("source should be set");
        assert!(source.to_string().contains("connection reset"));
    }

    #[test]
    fn test_is_conflict() {
        assert!(conflict_error("item", "duplicate token").is_conflict());
        assert!(!mapping_error("anything").is_conflict());
    }

    #[test]
    fn test_display_includes_context() {
        let err = validation_error("id", "not a well-formed token");
        assert_eq!(err.to_string(), "invalid id: not a well-formed token");
    }
}
