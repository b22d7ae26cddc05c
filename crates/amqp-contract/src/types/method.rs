// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lifecycle hooks invoked around encoding and decoding.

use super::accessor::{ProjectFn, ProjectMutFn};
use crate::error::{Error, Result};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// When a hook fires relative to the member reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookRole {
    BeforeEncode,
    AfterEncode,
    BeforeDecode,
    AfterDecode,
}

impl HookRole {
    pub fn is_encode(self) -> bool {
        matches!(self, HookRole::BeforeEncode | HookRole::AfterEncode)
    }
}

impl fmt::Display for HookRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HookRole::BeforeEncode => "before_encode",
            HookRole::AfterEncode => "after_encode",
            HookRole::BeforeDecode => "before_decode",
            HookRole::AfterDecode => "after_decode",
        })
    }
}

/// Zero-argument callback on an instance.
///
/// Encode hooks only observe (`&self`); decode hooks may mutate.
#[derive(Clone)]
pub enum MethodAccessor {
    Observe(fn(&dyn Any) -> Result<()>),
    Mutate(fn(&mut dyn Any) -> Result<()>),
    /// Hook declared on a base type, reached through the base projection.
    Inherited {
        project: ProjectFn,
        project_mut: ProjectMutFn,
        inner: Arc<MethodAccessor>,
    },
}

impl MethodAccessor {
    pub fn invoke(&self, target: &dyn Any) -> Result<()> {
        match self {
            MethodAccessor::Observe(f) => f(target),
            MethodAccessor::Mutate(_) => Err(Error::InvalidCast {
                expected: "mutable hook target".to_string(),
            }),
            MethodAccessor::Inherited { project, inner, .. } => {
                let base = project(target).ok_or_else(|| Error::InvalidCast {
                    expected: "base projection of the hook owner".to_string(),
                })?;
                inner.invoke(base)
            }
        }
    }

    pub fn invoke_mut(&self, target: &mut dyn Any) -> Result<()> {
        match self {
            MethodAccessor::Observe(f) => f(target),
            MethodAccessor::Mutate(f) => f(target),
            MethodAccessor::Inherited {
                project_mut, inner, ..
            } => {
                let base = project_mut(target).ok_or_else(|| Error::InvalidCast {
                    expected: "base projection of the hook owner".to_string(),
                })?;
                inner.invoke_mut(base)
            }
        }
    }
}

/// A hook bound to its role.
#[derive(Clone)]
pub struct HookInfo {
    pub role: HookRole,
    pub name: &'static str,
    pub method: MethodAccessor,
}

impl HookInfo {
    pub fn before_encode(name: &'static str, f: fn(&dyn Any) -> Result<()>) -> Self {
        Self::observe(HookRole::BeforeEncode, name, f)
    }

    pub fn after_encode(name: &'static str, f: fn(&dyn Any) -> Result<()>) -> Self {
        Self::observe(HookRole::AfterEncode, name, f)
    }

    pub fn before_decode(name: &'static str, f: fn(&mut dyn Any) -> Result<()>) -> Self {
        Self::mutate(HookRole::BeforeDecode, name, f)
    }

    pub fn after_decode(name: &'static str, f: fn(&mut dyn Any) -> Result<()>) -> Self {
        Self::mutate(HookRole::AfterDecode, name, f)
    }

    fn observe(role: HookRole, name: &'static str, f: fn(&dyn Any) -> Result<()>) -> Self {
        Self {
            role,
            name,
            method: MethodAccessor::Observe(f),
        }
    }

    fn mutate(role: HookRole, name: &'static str, f: fn(&mut dyn Any) -> Result<()>) -> Self {
        Self {
            role,
            name,
            method: MethodAccessor::Mutate(f),
        }
    }

    /// Same hook, applied to a type embedding the owner as its base.
    pub(crate) fn inherited(&self, project: ProjectFn, project_mut: ProjectMutFn) -> Self {
        Self {
            role: self.role,
            name: self.name,
            method: MethodAccessor::Inherited {
                project,
                project_mut,
                inner: Arc::new(self.method.clone()),
            },
        }
    }
}

impl fmt::Debug for HookInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HookInfo({} = {})", self.role, self.name)
    }
}

/// Return types accepted from hook methods: `()` or `Result<()>`.
pub trait HookOutcome {
    fn into_result(self) -> Result<()>;
}

impl HookOutcome for () {
    fn into_result(self) -> Result<()> {
        Ok(())
    }
}

impl HookOutcome for Result<()> {
    fn into_result(self) -> Result<()> {
        self
    }
}
