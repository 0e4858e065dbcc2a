//! Transformation schemes and parameters
//!
//! A [`TransformationScheme`] binds one family of transformations to concrete
//! types. [`TransformationParameters`] carries everything a rule needs for a
//! single step and is reborrowed for every nested step, so the target and
//! the per-call state are shared across the whole recursion.
//!
//! Copyright (c) 2025 JMUL Team
//! Licensed under the Apache-2.0 license

use super::message::Inspected;
use super::path::TransformationPath;
use crate::object::DeclaredType;
use std::fmt;

/// Types involved in one family of transformations
pub trait TransformationScheme: 'static {
    /// What a single rule is applied to
    type Subject: Clone + fmt::Debug;
    /// Read-only structure the subjects live in
    type Source;
    /// Structure being produced
    type Target;
    /// State shared by all steps of one top-level call
    type State: Default;
    /// Result of a single step
    type Output;

    /// The type a subject has when no declared type is given
    fn runtime_type(subject: &Self::Subject, source: &Self::Source) -> DeclaredType;

    /// View of a subject for diagnostics
    fn inspect<'a>(subject: &'a Self::Subject, source: &'a Self::Source) -> Inspected<'a>;
}

/// Inputs of one transformation step
pub struct TransformationParameters<'a, S: TransformationScheme> {
    path: TransformationPath,
    subject: S::Subject,
    declared_type: DeclaredType,
    source: &'a S::Source,
    target: &'a mut S::Target,
    state: &'a mut S::State,
    depth: usize,
}

impl<'a, S: TransformationScheme> TransformationParameters<'a, S> {
    /// Parameters of a top-level step
    pub fn new(
        path: TransformationPath,
        subject: S::Subject,
        declared_type: DeclaredType,
        source: &'a S::Source,
        target: &'a mut S::Target,
        state: &'a mut S::State,
    ) -> Self {
        Self {
            path,
            subject,
            declared_type,
            source,
            target,
            state,
            depth: 0,
        }
    }

    /// Parameters for a sub-step on the same path
    pub fn nested(&mut self, subject: S::Subject, declared_type: DeclaredType) -> TransformationParameters<'_, S> {
        let path = self.path.clone();
        self.nested_on(path, subject, declared_type)
    }

    /// Parameters for a sub-step on another path
    pub fn nested_on(
        &mut self,
        path: TransformationPath,
        subject: S::Subject,
        declared_type: DeclaredType,
    ) -> TransformationParameters<'_, S> {
        TransformationParameters {
            path,
            subject,
            declared_type,
            source: self.source,
            target: &mut *self.target,
            state: &mut *self.state,
            depth: self.depth + 1,
        }
    }

    pub fn path(&self) -> &TransformationPath {
        &self.path
    }

    pub fn subject(&self) -> &S::Subject {
        &self.subject
    }

    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared_type
    }

    /// The source, borrowed independently of these parameters
    pub fn source(&self) -> &'a S::Source {
        self.source
    }

    pub fn target(&self) -> &S::Target {
        &*self.target
    }

    pub fn target_mut(&mut self) -> &mut S::Target {
        &mut *self.target
    }

    pub fn state(&self) -> &S::State {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut S::State {
        &mut *self.state
    }

    /// Nesting depth; 0 for the top-level step
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The subject as seen by the message factory
    pub fn inspect(&self) -> Inspected<'_> {
        S::inspect(&self.subject, self.source)
    }
}

impl<S: TransformationScheme> fmt::Debug for TransformationParameters<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformationParameters")
            .field("path", &self.path)
            .field("subject", &self.subject)
            .field("declared_type", &self.declared_type)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
