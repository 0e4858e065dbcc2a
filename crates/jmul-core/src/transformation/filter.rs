//! Selection of applicable rules
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use super::container::RulesContainer;
use super::message::MessageFactory;
use super::parameters::{TransformationParameters, TransformationScheme};
use super::rule::TransformationRule;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use tracing::trace;

/// Rules grouped by priority, the most preferred (lowest) priority first
pub type PriorityGroups<'c, S> = BTreeMap<i32, Vec<&'c dyn TransformationRule<S>>>;

/// Filters the rules of a path down to those accepting a subject
pub struct RulesFilter;

impl RulesFilter {
    /// Applicable rules grouped by priority
    ///
    /// Fails with [`Error::UnknownPath`] when the path has no rules at all and
    /// with [`Error::NoApplicableRule`] when none of them accepts the subject.
    pub fn filter<'c, S: TransformationScheme>(
        container: &'c RulesContainer<S>,
        params: &TransformationParameters<'_, S>,
        messages: &MessageFactory,
    ) -> Result<PriorityGroups<'c, S>> {
        let mut groups: PriorityGroups<'c, S> = BTreeMap::new();
        for rule in Self::applicable(container, params, messages)? {
            groups.entry(rule.priority()).or_default().push(rule);
        }
        Ok(groups)
    }

    /// Applicable rules in registration order
    pub fn applicable<'c, S: TransformationScheme>(
        container: &'c RulesContainer<S>,
        params: &TransformationParameters<'_, S>,
        messages: &MessageFactory,
    ) -> Result<Vec<&'c dyn TransformationRule<S>>> {
        let rules: Vec<&'c dyn TransformationRule<S>> = container
            .rules(params.path())?
            .iter()
            .map(|rule| rule.as_ref())
            .filter(|rule| rule.is_applicable(params))
            .collect();

        trace!(
            path = %params.path(),
            applicable = rules.len(),
            depth = params.depth(),
            "filtered rules"
        );

        if rules.is_empty() {
            return Err(Error::NoApplicableRule {
                path: params.path().clone(),
                subject: messages.describe(&params.inspect())?,
            });
        }
        Ok(rules)
    }
}
