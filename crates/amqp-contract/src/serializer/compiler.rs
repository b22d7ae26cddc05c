// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type compiler.
//!
//! Turns the [`TypeShape`] of a type into a [`CompiledType`] and caches it.
//!
//! # Resolution order
//!
//! A type with contract metadata compiles to one of the four contract
//! encodings. Otherwise the first matching rule applies:
//!
//! 1. primitive codec from the registry
//! 2. dynamic object ([`AmqpValue`](crate::AmqpValue))
//! 3. self-describing ([`AmqpSerializable`](crate::types::AmqpSerializable))
//! 4. `Option` of an enum (the enum plan, null when absent)
//! 5. `Option` of anything else (object pass-through to the inner type);
//!    `Option<Option<T>>` is rejected
//! 6. enum
//! 7. map-like, then list-like container
//!
//! No match is [`Error::UnsupportedType`].
//!
//! # Concurrency
//!
//! No lock is held while compiling. Two threads compiling the same type both
//! build a descriptor; the cache keeps the first one published.

use super::cache::{CacheStats, TypeCache};
use super::collection;
use super::descriptor::{CompiledMember, CompiledType, Composite, Hooks, KnownType, TypeKind};
use super::type_ref::TypeRef;
use crate::codec::PrimitiveRegistry;
use crate::error::{Error, Result};
use crate::types::{ContractInfo, EncodingType, NullableShape, TypeHandle, TypeShape};
use std::any::TypeId;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_COMPILER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Types being compiled on this thread, tagged with the compiler id.
    static IN_PROGRESS: RefCell<Vec<(u64, TypeId)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a type as in progress until dropped.
struct CompileGuard {
    compiler: u64,
    type_id: TypeId,
}

impl CompileGuard {
    fn enter(compiler: u64, type_id: TypeId) -> Self {
        IN_PROGRESS.with(|stack| stack.borrow_mut().push((compiler, type_id)));
        Self { compiler, type_id }
    }

    fn is_active(compiler: u64, type_id: TypeId) -> bool {
        IN_PROGRESS.with(|stack| stack.borrow().contains(&(compiler, type_id)))
    }
}

impl Drop for CompileGuard {
    fn drop(&mut self) {
        IN_PROGRESS.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack
                .iter()
                .rposition(|entry| *entry == (self.compiler, self.type_id))
            {
                stack.remove(pos);
            }
        });
    }
}

pub struct TypeCompiler {
    id: u64,
    registry: PrimitiveRegistry,
    cache: TypeCache,
}

impl TypeCompiler {
    pub fn new(registry: PrimitiveRegistry) -> Self {
        Self {
            id: NEXT_COMPILER_ID.fetch_add(1, Ordering::Relaxed),
            registry,
            cache: TypeCache::new(),
        }
    }

    pub fn registry(&self) -> &PrimitiveRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Compiled descriptor of `handle`, compiling and publishing it on first
    /// use. A failed compile publishes nothing.
    pub fn resolve(&self, handle: TypeHandle) -> Result<Arc<CompiledType>> {
        if let Some(hit) = self.cache.get(handle.id()) {
            return Ok(hit);
        }
        let compiled = self.compile(handle)?;
        Ok(self.cache.publish(compiled))
    }

    /// Already compiled descriptor of a runtime type, without compiling.
    pub fn lookup(&self, type_id: TypeId) -> Option<Arc<CompiledType>> {
        self.cache.get(type_id)
    }

    /// Reference to a member/element type; deferred when that type is being
    /// compiled on this thread (recursive type graphs).
    pub(crate) fn type_ref(&self, handle: TypeHandle) -> Result<TypeRef> {
        if CompileGuard::is_active(self.id, handle.id()) {
            log::trace!("[contract] deferring recursive reference to {}", handle.name());
            return Ok(TypeRef::deferred(handle));
        }
        Ok(TypeRef::ready(handle, self.resolve(handle)?))
    }

    fn compile(&self, handle: TypeHandle) -> Result<CompiledType> {
        let _guard = CompileGuard::enter(self.id, handle.id());
        let shape = handle.shape();
        match shape.contract {
            Some(contract) => self.compile_contract(handle, contract),
            None => self.compile_fallback(handle, shape),
        }
    }

    // ========================================================================
    // Types without contract metadata
    // ========================================================================

    fn compile_fallback(&self, handle: TypeHandle, shape: TypeShape) -> Result<CompiledType> {
        let kind = if let Some(codec) = self.registry.try_get_codec(handle.id()) {
            TypeKind::Primitive(codec)
        } else if shape.object {
            TypeKind::Object(None)
        } else if let Some(serializable) = shape.serializable {
            TypeKind::Serializable(serializable)
        } else if let Some(nullable) = shape.nullable {
            return self.compile_nullable(handle, nullable);
        } else if let Some(enumeration) = shape.enumeration {
            TypeKind::Enum {
                repr: self.resolve(enumeration.repr)?,
                shape: enumeration,
            }
        } else if let Some(kind) = collection::detect(self, &shape)? {
            kind
        } else {
            return Err(Error::UnsupportedType(handle.name().to_string()));
        };
        log::trace!("[contract] compiled {} without contract", handle.name());
        Ok(CompiledType::new(handle, kind))
    }

    fn compile_nullable(&self, handle: TypeHandle, nullable: NullableShape) -> Result<CompiledType> {
        // Some(None) and None share the null encoding
        if nullable.inner.shape().nullable.is_some() {
            log::debug!("[contract] nested optional {} rejected", handle.name());
            return Err(Error::UnsupportedType(handle.name().to_string()));
        }
        let inner = self.type_ref(nullable.inner)?;
        // a deferred inner type is a contract under construction, never an enum
        if inner.is_resolved() {
            let compiled = inner.get(self)?;
            if let TypeKind::Enum { .. } = compiled.kind() {
                let kind = compiled.kind().clone();
                return Ok(CompiledType::new(handle, kind).with_nullable(nullable));
            }
        }
        Ok(CompiledType::new(handle, TypeKind::Object(Some(inner))).with_nullable(nullable))
    }

    // ========================================================================
    // Contract types
    // ========================================================================

    fn compile_contract(&self, handle: TypeHandle, contract: ContractInfo) -> Result<CompiledType> {
        let type_name = handle.name();
        let encoding = contract.encoding;
        let descriptors = contract.descriptors();
        let create = contract.creator();

        // Ancestor members and hooks
        let mut members: Vec<CompiledMember> = Vec::new();
        let mut inherited_hooks = Hooks::default();
        if let Some(base) = &contract.base {
            if let Some(ancestor) = self.resolve_ancestor(base.handle)? {
                let parent = ancestor
                    .composite()
                    .ok_or_else(|| Error::UnsupportedType(base.handle.name().to_string()))?;
                if parent.encoding != encoding {
                    return Err(Error::IncompatibleEncoding {
                        type_name: type_name.to_string(),
                        encoding,
                        base_name: ancestor.type_name().to_string(),
                        base_encoding: parent.encoding,
                    });
                }
                members.extend(parent.members.iter().map(|m| m.inherited(base)));
                inherited_hooks = parent.hooks.inherited(base);
            }
        }

        // Own members, auto orders continue from the last merged member
        let mut last_order = members.last().map_or(0, |m| m.order);
        for info in contract.members {
            let order = info.order.unwrap_or_else(|| last_order.saturating_add(1));
            last_order = order;
            members.push(CompiledMember {
                name: info.name,
                order,
                accessor: info.accessor,
                ty: self.type_ref(info.ty)?,
            });
        }

        if encoding == EncodingType::DescribedList {
            members.sort_by_key(|m| m.order);
            if let Some(pair) = members.windows(2).find(|w| w[0].order == w[1].order) {
                return Err(Error::DuplicateMemberOrder {
                    type_name: type_name.to_string(),
                    order: pair[0].order,
                });
            }
        }

        if !encoding.is_described() && !contract.provides.is_empty() {
            return Err(Error::IllegalProvidesOnSimpleEncoding {
                type_name: type_name.to_string(),
                encoding,
            });
        }
        let known_types = contract
            .provides
            .iter()
            .map(|sub| Self::known_type(*sub))
            .collect::<Result<Vec<_>>>()?;

        let mut hooks = Hooks::default();
        for hook in &contract.hooks {
            if !hooks.accept(hook) {
                log::warn!(
                    "[contract] {} declares a second {} hook '{}', ignored",
                    type_name,
                    hook.role,
                    hook.name
                );
            }
        }
        hooks.fill_from(inherited_hooks);

        log::debug!(
            "[contract] compiled {} as {} ({} members, {} provided, {} hooks)",
            type_name,
            encoding,
            members.len(),
            known_types.len(),
            hooks.len()
        );
        Ok(CompiledType::new(
            handle,
            TypeKind::Composite(Composite {
                encoding,
                descriptors,
                create,
                members,
                known_types,
                hooks,
            }),
        ))
    }

    /// Base type in ancestor-only mode: no primitive or collection fallback;
    /// a base without contract metadata counts as absent.
    fn resolve_ancestor(&self, handle: TypeHandle) -> Result<Option<Arc<CompiledType>>> {
        if let Some(hit) = self.cache.get(handle.id()) {
            return Ok(hit.composite().is_some().then_some(hit));
        }
        if handle.shape().contract.is_none() {
            log::debug!("[contract] base {} has no contract, ignored", handle.name());
            return Ok(None);
        }
        self.resolve(handle).map(Some)
    }

    /// Provided subtype: descriptor read from its metadata now, descriptor
    /// compiled on the first decode that needs it.
    fn known_type(handle: TypeHandle) -> Result<KnownType> {
        let contract = handle
            .shape()
            .contract
            .ok_or_else(|| Error::UnsupportedType(handle.name().to_string()))?;
        let descriptors = contract.descriptors();
        if descriptors.is_empty() {
            return Err(Error::IllegalProvidesOnSimpleEncoding {
                type_name: handle.name().to_string(),
                encoding: contract.encoding,
            });
        }
        Ok(KnownType {
            descriptors,
            type_ref: TypeRef::deferred(handle),
        })
    }
}

impl std::fmt::Debug for TypeCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCompiler")
            .field("id", &self.id)
            .field("cached", &self.cache.len())
            .finish()
    }
}
