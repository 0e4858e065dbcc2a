//! JMUL Core - rule-based transformation of object graphs
//!
//! This crate provides a generic transformation engine driven by
//! priority-ordered rules, and the built-in rule sets that serialize
//! (possibly cyclic) object graphs to XML and back while preserving
//! their reference topology.
//!
//! # Main Components
//!
//! - **Object Model**: Arena-backed graphs of lists, maps and records
//! - **Transformation Engine**: Rule container, filter, strategies, identity cache
//! - **XML**: Document model plus the "Object" -> "XML" and "XML" -> "Object" rules
//! - **I/O**: Reading and writing serialized graphs
//!
//! # Example
//!
//! ```
//! use jmul_core::{xml, ObjectGraph, Result, Value};
//!
//! fn example() -> Result<()> {
//!     let mut graph = ObjectGraph::new();
//!     let list = graph.add_list(vec![Value::from(1)]);
//!     graph.push_item(list.as_object().unwrap(), list.clone())?;
//!
//!     let document = xml::encode(&xml::encoder()?, &graph, &list)?;
//!     let (decoded, root) = xml::decode(&xml::decoder()?, &document)?;
//!     assert_eq!(decoded.len(), 1);
//!     assert_eq!(decoded.runtime_type(&root), jmul_core::DeclaredType::List);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod error;
pub mod io;
pub mod object;
pub mod transformation;
pub mod xml;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use object::{DeclaredType, Field, Object, ObjectGraph, ObjectId, Value};
pub use transformation::{
    RulesContainer, TransformationFactory, TransformationPath, TransformationRule,
    TransformationScheme,
};
pub use xml::{NodeId, XmlDocument};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
