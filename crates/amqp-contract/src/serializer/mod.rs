// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime codec dispatcher.
//!
//! [`ContractSerializer`] owns a [`TypeCompiler`] (and therefore one type
//! cache) plus the decode limits. Separate instances are separate contract
//! namespaces. The free functions [`serialize`], [`deserialize`] and
//! [`deserialize_as`] use a lazily created process-wide instance configured
//! from the environment.
//!
//! Every call leaves the buffer as it found it on failure: a failed write
//! truncates what it appended, a failed read rewinds the cursor.

pub mod cache;
pub mod collection;
pub mod compiler;
pub mod descriptor;
pub mod type_ref;


pub use cache::CacheStats;
pub use compiler::TypeCompiler;
pub use descriptor::{CompiledMember, CompiledType, Variant};
pub use type_ref::TypeRef;

use crate::codec::{encoding, AmqpValue, ByteBuffer, PrimitiveRegistry};
use crate::config::{DecodeLimits, SerializerConfig};
use crate::error::{Error, Result};
use crate::types::{AmqpType, Instance, TypeHandle};
use std::any::Any;
use std::sync::{Arc, OnceLock};

pub struct ContractSerializer {
    compiler: TypeCompiler,
    config: SerializerConfig,
}

impl ContractSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self::with_registry(PrimitiveRegistry::default(), config)
    }

    /// Serializer using a custom primitive registry.
    pub fn with_registry(registry: PrimitiveRegistry, config: SerializerConfig) -> Self {
        Self {
            compiler: TypeCompiler::new(registry),
            config,
        }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.config.limits
    }

    pub fn compiler(&self) -> &TypeCompiler {
        &self.compiler
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.compiler.stats()
    }

    /// Compiled descriptor of `T`.
    pub fn resolve<T: AmqpType>(&self) -> Result<Arc<CompiledType>> {
        self.compiler.resolve(TypeHandle::of::<T>())
    }

    pub fn is_compiled<T: AmqpType>(&self) -> bool {
        self.compiler.cache().contains(std::any::TypeId::of::<T>())
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Encode `value` with the descriptor of its static type `T`.
    pub fn write_object<T: AmqpType>(&self, buf: &mut ByteBuffer, value: &T) -> Result<()> {
        log::trace!("[contract] write {}", std::any::type_name::<T>());
        rollback_write(buf, |buf| self.resolve::<T>()?.encode(self, buf, value))
    }

    /// Encode by runtime type: a dynamic [`AmqpValue`], a registered
    /// primitive or an already compiled contract type. `None` writes null.
    pub fn write_dyn(&self, buf: &mut ByteBuffer, value: Option<&dyn Any>) -> Result<()> {
        match value {
            None => {
                encoding::write_null(buf);
                Ok(())
            }
            Some(value) => rollback_write(buf, |buf| self.encode_dynamic(buf, value)),
        }
    }

    pub(crate) fn encode_dynamic(&self, buf: &mut ByteBuffer, value: &dyn Any) -> Result<()> {
        if let Some(dynamic) = value.downcast_ref::<AmqpValue>() {
            return dynamic.encode(buf);
        }
        let type_id = value.type_id();
        if let Some(codec) = self.compiler.registry().try_get_codec(type_id) {
            return codec.encode(value, buf);
        }
        match self.compiler.lookup(type_id) {
            Some(compiled) => compiled.encode(self, buf, value),
            None => Err(Error::UnsupportedType(format!(
                "runtime value of an uncompiled type ({:?})",
                type_id
            ))),
        }
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Decode a `T` (or a type `T` provides) as a type-erased instance.
    pub fn read_any<T: AmqpType>(&self, buf: &mut ByteBuffer) -> Result<Instance> {
        log::trace!("[contract] read {}", std::any::type_name::<T>());
        rollback_read(buf, |buf| self.resolve::<T>()?.decode(self, buf))
    }

    /// Decode as `T` and return the instance as `R`.
    ///
    /// `R` differs from `T` when the wire carries a subtype that `T`
    /// provides; a mismatch is [`Error::InvalidCast`].
    pub fn read_object<T: AmqpType, R: Any>(&self, buf: &mut ByteBuffer) -> Result<R> {
        rollback_read(buf, |buf| {
            let instance = self.resolve::<T>()?.decode(self, buf)?;
            instance
                .downcast::<R>()
                .map(|boxed| *boxed)
                .map_err(|_| Error::cast::<R>())
        })
    }

    pub fn read<T: AmqpType>(&self, buf: &mut ByteBuffer) -> Result<T> {
        self.read_object::<T, T>(buf)
    }
}

impl Default for ContractSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContractSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractSerializer")
            .field("compiler", &self.compiler)
            .field("limits", &self.config.limits)
            .finish()
    }
}

fn rollback_write<F>(buf: &mut ByteBuffer, write: F) -> Result<()>
where
    F: FnOnce(&mut ByteBuffer) -> Result<()>,
{
    let start = buf.len();
    let result = write(buf);
    if result.is_err() {
        buf.truncate(start);
    }
    result
}

fn rollback_read<T, F>(buf: &mut ByteBuffer, read: F) -> Result<T>
where
    F: FnOnce(&mut ByteBuffer) -> Result<T>,
{
    let (offset, depth) = (buf.offset(), buf.depth());
    let result = read(buf);
    if result.is_err() {
        buf.rewind(offset, depth);
    }
    result
}

// ============================================================================
// Process-wide serializer
// ============================================================================

static DEFAULT_SERIALIZER: OnceLock<ContractSerializer> = OnceLock::new();

/// Process-wide serializer, created on first use from
/// [`SerializerConfig::from_env`].
pub fn default_serializer() -> &'static ContractSerializer {
    DEFAULT_SERIALIZER.get_or_init(|| {
        let config = SerializerConfig::from_env().unwrap_or_else(|e| {
            log::warn!("[config] {}, using defaults", e);
            SerializerConfig::default()
        });
        ContractSerializer::with_config(config)
    })
}

pub fn serialize<T: AmqpType>(buf: &mut ByteBuffer, value: &T) -> Result<()> {
    default_serializer().write_object(buf, value)
}

pub fn deserialize<T: AmqpType>(buf: &mut ByteBuffer) -> Result<T> {
    default_serializer().read::<T>(buf)
}

pub fn deserialize_as<T: AmqpType, R: Any>(buf: &mut ByteBuffer) -> Result<R> {
    default_serializer().read_object::<T, R>(buf)
}

/// Encode `value` into a fresh byte vector.
pub fn to_bytes<T: AmqpType>(value: &T) -> Result<Vec<u8>> {
    let mut buf = ByteBuffer::new();
    serialize(&mut buf, value)?;
    Ok(buf.into_vec())
}

/// Decode a `T` from the start of `bytes`.
pub fn from_bytes<T: AmqpType>(bytes: &[u8]) -> Result<T> {
    deserialize::<T>(&mut ByteBuffer::from(bytes))
}
