//! Rule application strategies
//!
//! A strategy decides which of the applicable rules is invoked for a step.
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use super::factory::TransformationFactory;
use super::filter::RulesFilter;
use super::parameters::{TransformationParameters, TransformationScheme};
use crate::error::{Error, Result};
use tracing::debug;

/// Configuration name of [`HighestPriorityRuleOnly`]
pub const HIGHEST_PRIORITY: &str = "highest-priority";

/// Configuration name of [`FirstApplicableRule`]
pub const FIRST_APPLICABLE: &str = "first-applicable";

/// Selects and invokes rules for one transformation step
pub trait RulesApplicationStrategy<S: TransformationScheme>: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(
        &self,
        engine: &TransformationFactory<S>,
        params: &mut TransformationParameters<'_, S>,
    ) -> Result<S::Output>;
}

/// Invokes the single rule of the most preferred priority group
///
/// A tie inside that group is an error; no rule is invoked then.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestPriorityRuleOnly;

impl<S: TransformationScheme> RulesApplicationStrategy<S> for HighestPriorityRuleOnly {
    fn name(&self) -> &'static str {
        HIGHEST_PRIORITY
    }

    fn apply(
        &self,
        engine: &TransformationFactory<S>,
        params: &mut TransformationParameters<'_, S>,
    ) -> Result<S::Output> {
        let groups = RulesFilter::filter(engine.container(), params, engine.messages())?;
        let Some((priority, rules)) = groups.into_iter().next() else {
            return Err(Error::NoApplicableRule {
                path: params.path().clone(),
                subject: engine.messages().describe(&params.inspect())?,
            });
        };

        let rule = match rules.as_slice() {
            [rule] => *rule,
            _ => {
                return Err(Error::AmbiguousRules {
                    path: params.path().clone(),
                    subject: engine.messages().describe(&params.inspect())?,
                    priority,
                    rules: rules.iter().map(|rule| rule.name().to_string()).collect(),
                });
            }
        };

        debug!(
            rule = rule.name(),
            priority,
            path = %params.path(),
            depth = params.depth(),
            "applying rule"
        );
        rule.transform(params, engine)
    }
}

/// Invokes the first applicable rule in registration order, ignoring priority
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstApplicableRule;

impl<S: TransformationScheme> RulesApplicationStrategy<S> for FirstApplicableRule {
    fn name(&self) -> &'static str {
        FIRST_APPLICABLE
    }

    fn apply(
        &self,
        engine: &TransformationFactory<S>,
        params: &mut TransformationParameters<'_, S>,
    ) -> Result<S::Output> {
        let rules = RulesFilter::applicable(engine.container(), params, engine.messages())?;
        let Some(rule) = rules.first().copied() else {
            return Err(Error::NoApplicableRule {
                path: params.path().clone(),
                subject: engine.messages().describe(&params.inspect())?,
            });
        };

        debug!(
            rule = rule.name(),
            path = %params.path(),
            depth = params.depth(),
            "applying first applicable rule"
        );
        rule.transform(params, engine)
    }
}

/// Look up a strategy by its configuration name
pub fn strategy_by_name<S: TransformationScheme>(name: &str) -> Result<Box<dyn RulesApplicationStrategy<S>>> {
    match name {
        HIGHEST_PRIORITY => Ok(Box::new(HighestPriorityRuleOnly)),
        FIRST_APPLICABLE => Ok(Box::new(FirstApplicableRule)),
        other => Err(Error::configuration(format!(
            "unknown rule application strategy '{other}', expected '{HIGHEST_PRIORITY}' or '{FIRST_APPLICABLE}'"
        ))),
    }
}
