//! Error types for the JMUL core library
//!
//! Every failure of the transformation engine is fatal to the top-level call
//! that raised it. Rule-table mistakes (unknown paths, ambiguous priorities,
//! subjects no rule accepts) are reported with the path and a short
//! description of the subject so they can be fixed in the configuration.

use crate::transformation::{SubjectKind, TransformationPath};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for JMUL operations
#[derive(Error, Debug)]
pub enum Error {
    /// No rules were ever registered for the requested path
    #[error("No transformation rules are registered for path {path}")]
    UnknownPath { path: TransformationPath },

    /// Rules exist for the path but none accepts the subject
    #[error("No rule known for {subject} on path {path}")]
    NoApplicableRule {
        path: TransformationPath,
        subject: String,
    },

    /// Two or more rules tie at the selected priority
    #[error(
        "Ambiguous rules for {subject} on path {path}: [{}] share priority {priority}",
        rules.join(", ")
    )]
    AmbiguousRules {
        path: TransformationPath,
        subject: String,
        priority: i32,
        rules: Vec<String>,
    },

    /// The message factory has no creator for a subject
    #[error("No message creator is applicable to a {kind} subject")]
    NoMessageCreator { kind: SubjectKind },

    /// Recursion went deeper than the engine allows
    #[error("Transformation depth limit of {limit} exceeded on path {path} at {subject}")]
    DepthExceeded {
        path: TransformationPath,
        subject: String,
        limit: usize,
    },

    /// Invalid rule table or engine configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Input that does not follow the expected structure
    #[error("Malformed input: {message}")]
    Malformed {
        message: String,
        context: Option<String>,
    },

    /// XML syntax or writer errors
    #[error("XML error: {message}")]
    Xml {
        message: String,
        /// Byte offset where the error occurred
        position: Option<u64>,
    },

    /// IO errors from the file layer
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a malformed input error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            context: None,
        }
    }

    /// Create a malformed input error with the offending subject attached
    pub fn malformed_at(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create an XML error without position information
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
            position: None,
        }
    }

    /// Whether this error points at the rule table rather than the input
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownPath { .. }
                | Self::NoApplicableRule { .. }
                | Self::AmbiguousRules { .. }
                | Self::NoMessageCreator { .. }
                | Self::Configuration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message_lists_rules() {
        let err = Error::AmbiguousRules {
            path: TransformationPath::new("A", "B"),
            subject: "integer 1".to_string(),
            priority: 3,
            rules: vec!["first".to_string(), "second".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("[first, second]"));
        assert!(message.contains("priority 3"));
        assert!(message.contains("A -> B"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(Error::UnknownPath {
            path: TransformationPath::new("A", "B")
        }
        .is_configuration_error());
        assert!(!Error::malformed("bad id").is_configuration_error());
        assert!(!Error::xml("unexpected eof").is_configuration_error());
    }
}
