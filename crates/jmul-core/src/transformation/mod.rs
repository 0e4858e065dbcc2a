//! Rule-based transformation engine
//!
//! Rules are registered per [`TransformationPath`] into a [`RulesContainer`].
//! For every step the [`TransformationFactory`] asks its
//! [`RulesApplicationStrategy`] to pick a rule among those the
//! [`RulesFilter`] found applicable. Rules recurse into nested subjects
//! through the engine, sharing the per-call state (an
//! [`ObjectIdentityCache`] while encoding, a [`ReferenceTable`] while
//! decoding).
//!
//! # Module Organization
//!
//! - [`path`] - Transformation paths
//! - [`parameters`] - Schemes and per-step parameters
//! - [`rule`] - The rule trait and closure rules
//! - [`container`] / [`builder`] - Rule registry
//! - [`filter`] - Applicable rules grouped by priority
//! - [`strategy`] - Rule selection
//! - [`cache`] - Identity cache and reference table
//! - [`message`] - Diagnostic descriptions
//! - [`factory`] - The engine
//!
//! # Examples
//!
//! ```
//! use jmul_core::transformation::{
//!     FnRule, Inspected, RulesContainer, TransformationFactory, TransformationPath,
//!     TransformationScheme,
//! };
//! use jmul_core::DeclaredType;
//!
//! struct Echo;
//!
//! impl TransformationScheme for Echo {
//!     type Subject = i64;
//!     type Source = ();
//!     type Target = ();
//!     type State = ();
//!     type Output = i64;
//!
//!     fn runtime_type(_: &i64, _: &()) -> DeclaredType {
//!         DeclaredType::Integer
//!     }
//!
//!     fn inspect<'a>(subject: &'a i64, _: &'a ()) -> Inspected<'a> {
//!         Inspected::Opaque(subject)
//!     }
//! }
//!
//! let path = TransformationPath::new("A", "B");
//! let container = RulesContainer::<Echo>::builder()
//!     .register(path.clone(), FnRule::<Echo, _, _>::new("echo", 0, |_| true, |p, _| Ok(*p.subject())))
//!     .build()
//!     .unwrap();
//!
//! let engine = TransformationFactory::new(container);
//! assert_eq!(engine.transform(&path, &(), &mut (), 7).unwrap(), 7);
//! ```
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod cache;
pub mod container;
pub mod factory;
pub mod filter;
pub mod message;
pub mod parameters;
pub mod path;
pub mod rule;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use builder::RulesContainerBuilder;
pub use cache::{CacheEntry, ObjectIdentityCache, ReferenceTable, Registration, FIRST_ID};
pub use container::{RuleSummary, RulesContainer};
pub use factory::{TransformationFactory, DEFAULT_MAX_DEPTH};
pub use filter::{PriorityGroups, RulesFilter};
pub use message::{
    DocumentMessageCreator, GenericMessageCreator, Inspected, MessageCreator, MessageFactory,
    NodeMessageCreator, SubjectKind,
};
pub use parameters::{TransformationParameters, TransformationScheme};
pub use path::TransformationPath;
pub use rule::{FnRule, TransformationRule};
pub use strategy::{
    strategy_by_name, FirstApplicableRule, HighestPriorityRuleOnly, RulesApplicationStrategy,
    FIRST_APPLICABLE, HIGHEST_PRIORITY,
};
