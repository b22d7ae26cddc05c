// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! References from one compiled descriptor to another.
//!
//! Most references are resolved while compiling. Provided subtypes and
//! members whose type is still being compiled on the current thread get a
//! deferred reference instead: only the handle is recorded, and the target is
//! resolved through the compiler on first use, then memoized.

use super::compiler::TypeCompiler;
use super::descriptor::CompiledType;
use crate::error::Result;
use crate::types::TypeHandle;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

#[derive(Clone)]
enum Slot {
    Ready(Arc<CompiledType>),
    // Weak: the cache keeps the target alive, and recursive types would
    // otherwise form Arc cycles
    Deferred(OnceLock<Weak<CompiledType>>),
}

#[derive(Clone)]
pub struct TypeRef {
    handle: TypeHandle,
    slot: Slot,
}

impl TypeRef {
    pub(crate) fn ready(handle: TypeHandle, compiled: Arc<CompiledType>) -> Self {
        Self {
            handle,
            slot: Slot::Ready(compiled),
        }
    }

    pub(crate) fn deferred(handle: TypeHandle) -> Self {
        Self {
            handle,
            slot: Slot::Deferred(OnceLock::new()),
        }
    }

    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    /// True once the target descriptor is known.
    pub fn is_resolved(&self) -> bool {
        match &self.slot {
            Slot::Ready(_) => true,
            Slot::Deferred(cell) => cell.get().is_some_and(|w| w.strong_count() > 0),
        }
    }

    pub fn get(&self, compiler: &TypeCompiler) -> Result<Arc<CompiledType>> {
        match &self.slot {
            Slot::Ready(compiled) => Ok(Arc::clone(compiled)),
            Slot::Deferred(cell) => {
                if let Some(compiled) = cell.get().and_then(Weak::upgrade) {
                    return Ok(compiled);
                }
                let compiled = compiler.resolve(self.handle)?;
                let _ = cell.set(Arc::downgrade(&compiled));
                Ok(compiled)
            }
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.slot {
            Slot::Ready(_) => "ready",
            Slot::Deferred(_) if self.is_resolved() => "completed",
            Slot::Deferred(_) => "deferred",
        };
        write!(f, "TypeRef({}, {})", self.handle.name(), state)
    }
}
