//! Transformation engine
//!
//! [`TransformationFactory`] owns a rule container, a strategy and a message
//! factory. Every top-level call gets fresh per-call state; rules recurse
//! through [`TransformationFactory::transform_nested`].
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use super::container::RulesContainer;
use super::message::MessageFactory;
use super::parameters::{TransformationParameters, TransformationScheme};
use super::path::TransformationPath;
use super::strategy::{HighestPriorityRuleOnly, RulesApplicationStrategy};
use crate::error::{Error, Result};
use crate::object::DeclaredType;
use std::fmt;
use tracing::{debug, trace};

/// Maximum nesting depth of a transformation unless configured otherwise
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Orchestrates rule selection and recursion
pub struct TransformationFactory<S: TransformationScheme> {
    container: RulesContainer<S>,
    strategy: Box<dyn RulesApplicationStrategy<S>>,
    messages: MessageFactory,
    max_depth: usize,
}

impl<S: TransformationScheme> TransformationFactory<S> {
    /// Create an engine using [`HighestPriorityRuleOnly`]
    pub fn new(container: RulesContainer<S>) -> Self {
        Self {
            container,
            strategy: Box::new(HighestPriorityRuleOnly),
            messages: MessageFactory::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_strategy(self, strategy: impl RulesApplicationStrategy<S> + 'static) -> Self {
        self.with_boxed_strategy(Box::new(strategy))
    }

    pub fn with_boxed_strategy(mut self, strategy: Box<dyn RulesApplicationStrategy<S>>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_messages(mut self, messages: MessageFactory) -> Self {
        self.messages = messages;
        self
    }

    /// Limit the nesting depth; deeper transformations fail with [`Error::DepthExceeded`]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn container(&self) -> &RulesContainer<S> {
        &self.container
    }

    pub fn messages(&self) -> &MessageFactory {
        &self.messages
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Transform a subject, declared as its runtime type
    pub fn transform(
        &self,
        path: &TransformationPath,
        source: &S::Source,
        target: &mut S::Target,
        subject: S::Subject,
    ) -> Result<S::Output> {
        let declared_type = S::runtime_type(&subject, source);
        self.transform_declared(path, source, target, subject, declared_type)
    }

    /// Transform a subject under an explicit declared type
    pub fn transform_declared(
        &self,
        path: &TransformationPath,
        source: &S::Source,
        target: &mut S::Target,
        subject: S::Subject,
        declared_type: DeclaredType,
    ) -> Result<S::Output> {
        let mut state = S::State::default();
        self.transform_with_state(path, source, target, &mut state, subject, declared_type)
    }

    /// Transform a subject with caller-provided per-call state
    pub fn transform_with_state(
        &self,
        path: &TransformationPath,
        source: &S::Source,
        target: &mut S::Target,
        state: &mut S::State,
        subject: S::Subject,
        declared_type: DeclaredType,
    ) -> Result<S::Output> {
        debug!(
            path = %path,
            declared_type = %declared_type,
            strategy = self.strategy.name(),
            "starting transformation"
        );
        let mut params = TransformationParameters::new(path.clone(), subject, declared_type, source, target, state);
        self.apply(&mut params)
    }

    /// Sub-transformation on the caller's path, sharing its target and state
    pub fn transform_nested(
        &self,
        params: &mut TransformationParameters<'_, S>,
        subject: S::Subject,
        declared_type: DeclaredType,
    ) -> Result<S::Output> {
        let mut nested = params.nested(subject, declared_type);
        self.apply(&mut nested)
    }

    /// Sub-transformation on another path, sharing the caller's target and state
    pub fn transform_nested_on(
        &self,
        params: &mut TransformationParameters<'_, S>,
        path: TransformationPath,
        subject: S::Subject,
        declared_type: DeclaredType,
    ) -> Result<S::Output> {
        let mut nested = params.nested_on(path, subject, declared_type);
        self.apply(&mut nested)
    }

    fn apply(&self, params: &mut TransformationParameters<'_, S>) -> Result<S::Output> {
        if params.depth() > self.max_depth {
            return Err(Error::DepthExceeded {
                path: params.path().clone(),
                subject: self.messages.describe_or_kind(&params.inspect()),
                limit: self.max_depth,
            });
        }
        trace!(depth = params.depth(), subject = ?params.subject(), "transforming");
        self.strategy.apply(self, params)
    }
}

impl<S: TransformationScheme> fmt::Debug for TransformationFactory<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformationFactory")
            .field("container", &self.container)
            .field("strategy", &self.strategy.name())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
