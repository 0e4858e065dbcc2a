//! Rules indexed by transformation path
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use super::builder::RulesContainerBuilder;
use super::parameters::TransformationScheme;
use super::path::TransformationPath;
use super::rule::TransformationRule;
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Read-only registry of rules, built once through [`RulesContainerBuilder`]
pub struct RulesContainer<S: TransformationScheme> {
    rules: HashMap<TransformationPath, Vec<Box<dyn TransformationRule<S>>>>,
}

/// Name and priority of a registered rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub path: TransformationPath,
    pub name: String,
    pub priority: i32,
}

impl<S: TransformationScheme> RulesContainer<S> {
    pub fn builder() -> RulesContainerBuilder<S> {
        RulesContainerBuilder::new()
    }

    pub(crate) fn from_rules(rules: HashMap<TransformationPath, Vec<Box<dyn TransformationRule<S>>>>) -> Self {
        Self { rules }
    }

    /// All rules of a path, in registration order
    pub fn rules(&self, path: &TransformationPath) -> Result<&[Box<dyn TransformationRule<S>>]> {
        self.rules
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownPath { path: path.clone() })
    }

    pub fn contains(&self, path: &TransformationPath) -> bool {
        self.rules.contains_key(path)
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<&TransformationPath> {
        let mut paths: Vec<_> = self.rules.keys().collect();
        paths.sort();
        paths
    }

    /// Total number of rules over all paths
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every rule, ordered by path, then priority, then registration order
    pub fn summaries(&self) -> Vec<RuleSummary> {
        self.paths()
            .into_iter()
            .flat_map(|path| {
                let mut rules: Vec<_> = self.rules[path]
                    .iter()
                    .map(|rule| RuleSummary {
                        path: path.clone(),
                        name: rule.name().to_string(),
                        priority: rule.priority(),
                    })
                    .collect();
                rules.sort_by_key(|summary| summary.priority);
                rules
            })
            .collect()
    }
}

impl<S: TransformationScheme> fmt::Debug for RulesContainer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RulesContainer")
            .field("paths", &self.paths())
            .field("rules", &self.len())
            .finish()
    }
}
