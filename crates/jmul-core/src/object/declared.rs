//! Declared types
//!
//! A declared type is the statically intended type of a value, as opposed to
//! the runtime type derived from the value itself. The identity cache keys
//! its entries by it.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

const RECORD_PREFIX: &str = "record:";

/// Statically intended type of a value
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclaredType {
    /// Accepts any value
    #[default]
    Any,
    Boolean,
    Integer,
    Float,
    String,
    List,
    Map,
    /// A record with the given type name
    Record(String),
}

impl DeclaredType {
    /// Whether a value whose runtime type is `runtime` may be stored under this type
    ///
    /// Null values carry the runtime type `Any` and are accepted everywhere.
    pub fn accepts(&self, runtime: &DeclaredType) -> bool {
        matches!(self, DeclaredType::Any) || matches!(runtime, DeclaredType::Any) || self == runtime
    }

    /// Create a record type
    pub fn record(name: impl Into<String>) -> Self {
        DeclaredType::Record(name.into())
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Any => write!(f, "any"),
            DeclaredType::Boolean => write!(f, "boolean"),
            DeclaredType::Integer => write!(f, "integer"),
            DeclaredType::Float => write!(f, "float"),
            DeclaredType::String => write!(f, "string"),
            DeclaredType::List => write!(f, "list"),
            DeclaredType::Map => write!(f, "map"),
            DeclaredType::Record(name) => write!(f, "{RECORD_PREFIX}{name}"),
        }
    }
}

impl FromStr for DeclaredType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(DeclaredType::Any),
            "boolean" => Ok(DeclaredType::Boolean),
            "integer" => Ok(DeclaredType::Integer),
            "float" => Ok(DeclaredType::Float),
            "string" => Ok(DeclaredType::String),
            "list" => Ok(DeclaredType::List),
            "map" => Ok(DeclaredType::Map),
            other => match other.strip_prefix(RECORD_PREFIX) {
                Some(name) if !name.is_empty() => Ok(DeclaredType::Record(name.to_string())),
                _ => Err(Error::malformed(format!("unknown declared type '{other}'"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts() {
        assert!(DeclaredType::Any.accepts(&DeclaredType::List));
        assert!(DeclaredType::List.accepts(&DeclaredType::Any));
        assert!(DeclaredType::record("A").accepts(&DeclaredType::record("A")));
        assert!(!DeclaredType::record("A").accepts(&DeclaredType::record("B")));
        assert!(!DeclaredType::Integer.accepts(&DeclaredType::Float));
    }

    #[test]
    fn test_textual_form() {
        for declared in [
            DeclaredType::Any,
            DeclaredType::Boolean,
            DeclaredType::Integer,
            DeclaredType::Float,
            DeclaredType::String,
            DeclaredType::List,
            DeclaredType::Map,
            DeclaredType::record("Person"),
        ] {
            let parsed: DeclaredType = declared.to_string().parse().unwrap();
            assert_eq!(parsed, declared);
        }
    }

    #[test]
    fn test_rejects_unknown() {
        assert!("record:".parse::<DeclaredType>().is_err());
        assert!("tuple".parse::<DeclaredType>().is_err());
    }
}
