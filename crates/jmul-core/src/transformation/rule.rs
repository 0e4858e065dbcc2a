//! Transformation rules
//!
//! A rule is a predicate plus an action. Its origin and destination are the
//! path it is registered under, so the same rule type can serve several
//! paths.
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use super::factory::TransformationFactory;
use super::parameters::{TransformationParameters, TransformationScheme};
use crate::error::Result;
use std::fmt;
use std::marker::PhantomData;

/// A single predicate + action pair
///
/// Rules are registered once and must not carry mutable state. Any state a
/// transformation needs lives in [`TransformationParameters::state_mut`].
pub trait TransformationRule<S: TransformationScheme>: Send + Sync {
    /// Name used in diagnostics and for duplicate detection
    fn name(&self) -> &str;

    /// Lower values are preferred
    fn priority(&self) -> i32;

    fn is_applicable(&self, params: &TransformationParameters<'_, S>) -> bool;

    /// Perform one step; nested steps go back through `engine`
    fn transform(
        &self,
        params: &mut TransformationParameters<'_, S>,
        engine: &TransformationFactory<S>,
    ) -> Result<S::Output>;
}

/// A rule built from two closures
pub struct FnRule<S, P, T> {
    name: String,
    priority: i32,
    predicate: P,
    action: T,
    _scheme: PhantomData<fn() -> S>,
}

impl<S, P, T> FnRule<S, P, T>
where
    S: TransformationScheme,
    P: Fn(&TransformationParameters<'_, S>) -> bool + Send + Sync,
    T: Fn(&mut TransformationParameters<'_, S>, &TransformationFactory<S>) -> Result<S::Output>
        + Send
        + Sync,
{
    pub fn new(name: impl Into<String>, priority: i32, predicate: P, action: T) -> Self {
        Self {
            name: name.into(),
            priority,
            predicate,
            action,
            _scheme: PhantomData,
        }
    }
}

impl<S, P, T> TransformationRule<S> for FnRule<S, P, T>
where
    S: TransformationScheme,
    P: Fn(&TransformationParameters<'_, S>) -> bool + Send + Sync,
    T: Fn(&mut TransformationParameters<'_, S>, &TransformationFactory<S>) -> Result<S::Output>
        + Send
        + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_applicable(&self, params: &TransformationParameters<'_, S>) -> bool {
        (self.predicate)(params)
    }

    fn transform(
        &self,
        params: &mut TransformationParameters<'_, S>,
        engine: &TransformationFactory<S>,
    ) -> Result<S::Output> {
        (self.action)(params, engine)
    }
}

impl<S, P, T> fmt::Debug for FnRule<S, P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
