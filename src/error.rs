use thiserror::Error;

/// Errors surfaced by authgate operations.
///
/// Authorization itself never fails with an error: a denied request is an
/// ordinary [`Response`](crate::Response). These variants cover the
/// collaborators around the gate (the session store and configuration).
#[derive(Debug, Error)]
pub enum Error {
    /// The session store backing the notification queue could not be used.
    #[error("notification queue unavailable: {reason}")]
    QueueUnavailable {
        /// Why the queue could not be reached
        reason: String,
    },

    /// Stored notifications could not be encoded or decoded.
    #[error("stored notifications are malformed: {0}")]
    Codec(#[from] serde_json::Error),

    /// Settings failed to parse or validate.
    #[error("invalid configuration: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },
}

impl Error {
    /// Creates a [`Error::QueueUnavailable`].
    pub fn queue_unavailable(reason: impl Into<String>) -> Self {
        Error::QueueUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a [`Error::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A predicate could not produce an answer.
///
/// Never escapes [`Predicate::evaluate`](crate::Predicate::evaluate): it is
/// logged and the predicate counts as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// A fallible custom predicate returned an error.
    #[error("predicate `{predicate}` failed: {message}")]
    Failed {
        /// Name of the failing predicate
        predicate: String,
        /// Error reported by the predicate
        message: String,
    },

    /// A custom predicate panicked.
    #[error("predicate `{predicate}` panicked: {message}")]
    Panicked {
        /// Name of the panicking predicate
        predicate: String,
        /// Panic payload, when it was a string
        message: String,
    },
}

impl PredicateError {
    /// Name of the predicate that failed.
    pub fn predicate(&self) -> &str {
        match self {
            PredicateError::Failed { predicate, .. }
            | PredicateError::Panicked { predicate, .. } => predicate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_unavailable_display() {
        let err = Error::queue_unavailable("store offline");
        assert_eq!(err.to_string(), "notification queue unavailable: store offline");
    }

    #[test]
    fn codec_error_converts_from_serde() {
        let parse = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let err: Error = parse.into();
        assert!(matches!(err, Error::Codec(_)));
    }

    #[test]
    fn predicate_error_names_predicate() {
        let err = PredicateError::Panicked {
            predicate: "owns_post".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.predicate(), "owns_post");
        assert_eq!(err.to_string(), "predicate `owns_post` panicked: boom");
    }
}
