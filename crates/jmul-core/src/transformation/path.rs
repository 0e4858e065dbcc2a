//! Transformation paths
//!
//! A path names the family of rules that applies to a transformation, e.g.
//! "Object" -> "XML".
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use crate::error::Error;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Origin tag of the object graph representation
pub const OBJECT: &str = "Object";

/// Tag of the XML representation
pub const XML: &str = "XML";

/// Immutable (origin, destination) pair used as a rule lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TransformationPath {
    origin: String,
    destination: String,
}

impl TransformationPath {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }

    /// "Object" -> "XML"
    pub fn object_to_xml() -> Self {
        Self::new(OBJECT, XML)
    }

    /// "XML" -> "Object"
    pub fn xml_to_object() -> Self {
        Self::new(XML, OBJECT)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// The path leading back from the destination to the origin
    pub fn reversed(&self) -> Self {
        Self::new(self.destination.clone(), self.origin.clone())
    }
}

impl fmt::Display for TransformationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin, self.destination)
    }
}

impl FromStr for TransformationPath {
    type Err = Error;

    /// Accepts `Origin:Destination` and `Origin -> Destination`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (origin, destination) = s
            .split_once("->")
            .or_else(|| s.split_once(':'))
            .ok_or_else(|| {
                Error::configuration(format!(
                    "invalid transformation path '{s}', expected ORIGIN:DESTINATION"
                ))
            })?;

        let (origin, destination) = (origin.trim(), destination.trim());
        if origin.is_empty() || destination.is_empty() {
            return Err(Error::configuration(format!(
                "invalid transformation path '{s}', origin and destination must not be empty"
            )));
        }

        Ok(Self::new(origin, destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_value_identity() {
        let mut paths = HashSet::new();
        paths.insert(TransformationPath::new("Object", "XML"));
        assert!(paths.contains(&TransformationPath::object_to_xml()));
        assert!(!paths.contains(&TransformationPath::xml_to_object()));
        assert_eq!(TransformationPath::object_to_xml().reversed(), TransformationPath::xml_to_object());
    }

    #[test]
    fn test_parse() {
        let path: TransformationPath = "Object:XML".parse().unwrap();
        assert_eq!(path, TransformationPath::object_to_xml());

        let path: TransformationPath = "A -> B".parse().unwrap();
        assert_eq!(path.origin(), "A");
        assert_eq!(path.destination(), "B");
        assert_eq!(path.to_string(), "A -> B");

        assert!("Object".parse::<TransformationPath>().is_err());
        assert!(":XML".parse::<TransformationPath>().is_err());
    }
}
