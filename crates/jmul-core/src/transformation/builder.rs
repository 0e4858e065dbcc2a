//! Builder for rule containers
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use super::container::RulesContainer;
use super::parameters::TransformationScheme;
use super::path::TransformationPath;
use super::rule::TransformationRule;
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Collects rules per path and validates them into a [`RulesContainer`]
pub struct RulesContainerBuilder<S: TransformationScheme> {
    rules: Vec<(TransformationPath, Box<dyn TransformationRule<S>>)>,
}

impl<S: TransformationScheme> Default for RulesContainerBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TransformationScheme> RulesContainerBuilder<S> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule under a path
    pub fn register(self, path: TransformationPath, rule: impl TransformationRule<S> + 'static) -> Self {
        self.register_boxed(path, Box::new(rule))
    }

    pub fn register_boxed(mut self, path: TransformationPath, rule: Box<dyn TransformationRule<S>>) -> Self {
        self.rules.push((path, rule));
        self
    }

    /// Register several rules under the same path
    pub fn register_all<I>(mut self, path: &TransformationPath, rules: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn TransformationRule<S>>>,
    {
        for rule in rules {
            self = self.register_boxed(path.clone(), rule);
        }
        self
    }

    /// Build the container; a rule name may appear only once per path
    pub fn build(self) -> Result<RulesContainer<S>> {
        let mut names: HashSet<(TransformationPath, String)> = HashSet::new();
        let mut rules: HashMap<TransformationPath, Vec<Box<dyn TransformationRule<S>>>> = HashMap::new();

        for (path, rule) in self.rules {
            if !names.insert((path.clone(), rule.name().to_string())) {
                return Err(Error::configuration(format!(
                    "rule '{}' is registered more than once for path {path}",
                    rule.name()
                )));
            }
            rules.entry(path).or_default().push(rule);
        }

        Ok(RulesContainer::from_rules(rules))
    }
}
