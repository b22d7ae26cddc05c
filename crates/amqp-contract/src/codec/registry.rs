// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive codec registry.
//!
//! Maps the `TypeId` of a scalar type to a type-erased [`PrimitiveCodec`].
//! Built-in AMQP scalars are registered by [`PrimitiveRegistry::default`];
//! applications add their own through [`Primitive`] and
//! [`PrimitiveRegistry::register`].

use super::buffer::ByteBuffer;
use super::encoding;
use super::value::{AmqpValue, Binary, Symbol, Timestamp};
use crate::config::DecodeLimits;
use crate::error::{Error, Result};
use crate::types::{AmqpType, Instance, TypeShape};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// A scalar type with a fixed AMQP encoding.
///
/// Decoding goes through [`AmqpValue`]: the wire value is read generically and
/// then narrowed by [`Primitive::from_value`].
///
/// ```rust
/// use amqp_contract::codec::{AmqpValue, ByteBuffer, Primitive, PrimitiveRegistry};
/// use amqp_contract::{AmqpType, Error, Result};
/// use amqp_contract::types::TypeShape;
///
/// /// Port number carried as an AMQP ushort.
/// #[derive(Debug, Default, PartialEq)]
/// struct Port(u16);
///
/// impl Primitive for Port {
///     fn encode(&self, buf: &mut ByteBuffer) -> Result<()> {
///         AmqpValue::UShort(self.0).encode(buf)
///     }
///     fn from_value(value: AmqpValue) -> Result<Self> {
///         match value {
///             AmqpValue::UShort(v) => Ok(Port(v)),
///             other => Err(Error::MalformedWireData(format!("expected ushort, got {}", other.kind()))),
///         }
///     }
/// }
///
/// impl AmqpType for Port {
///     fn shape() -> TypeShape {
///         TypeShape::opaque()
///     }
/// }
///
/// let mut registry = PrimitiveRegistry::default();
/// registry.register::<Port>();
/// assert!(registry.try_get_codec(std::any::TypeId::of::<Port>()).is_some());
/// ```
pub trait Primitive: Any + Sized {
    fn encode(&self, buf: &mut ByteBuffer) -> Result<()>;

    fn from_value(value: AmqpValue) -> Result<Self>;
}

type EncodeFn = fn(&dyn Any, &mut ByteBuffer) -> Result<()>;
type FromValueFn = fn(AmqpValue) -> Result<Instance>;

/// Type-erased codec of one primitive type.
#[derive(Clone, Copy)]
pub struct PrimitiveCodec {
    type_id: TypeId,
    type_name: &'static str,
    encode: EncodeFn,
    from_value: FromValueFn,
}

impl PrimitiveCodec {
    pub fn of<P: Primitive>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: std::any::type_name::<P>(),
            encode: encode_erased::<P>,
            from_value: from_value_erased::<P>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Encode `value`, which must be of the codec's type.
    pub fn encode(&self, value: &dyn Any, buf: &mut ByteBuffer) -> Result<()> {
        (self.encode)(value, buf)
    }

    pub fn decode(&self, buf: &mut ByteBuffer, limits: &DecodeLimits) -> Result<Instance> {
        let value = AmqpValue::decode_with(buf, limits)?;
        (self.from_value)(value)
    }
}

impl fmt::Debug for PrimitiveCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveCodec")
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn encode_erased<P: Primitive>(value: &dyn Any, buf: &mut ByteBuffer) -> Result<()> {
    value
        .downcast_ref::<P>()
        .ok_or_else(Error::cast::<P>)?
        .encode(buf)
}

fn from_value_erased<P: Primitive>(value: AmqpValue) -> Result<Instance> {
    Ok(Box::new(P::from_value(value)?))
}

/// Registry of primitive codecs keyed by `TypeId`.
#[derive(Clone)]
pub struct PrimitiveRegistry {
    codecs: HashMap<TypeId, PrimitiveCodec>,
}

impl PrimitiveRegistry {
    /// Registry without any codec, not even the built-ins.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Register (or replace) the codec of `P`.
    pub fn register<P: Primitive>(&mut self) -> &mut Self {
        let codec = PrimitiveCodec::of::<P>();
        log::trace!("[registry] register {}", codec.type_name);
        self.codecs.insert(codec.type_id, codec);
        self
    }

    pub fn try_get_codec(&self, type_id: TypeId) -> Option<PrimitiveCodec> {
        self.codecs.get(&type_id).copied()
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl Default for PrimitiveRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register::<bool>()
            .register::<u8>()
            .register::<u16>()
            .register::<u32>()
            .register::<u64>()
            .register::<i8>()
            .register::<i16>()
            .register::<i32>()
            .register::<i64>()
            .register::<f32>()
            .register::<f64>()
            .register::<char>()
            .register::<String>()
            .register::<Symbol>()
            .register::<Binary>()
            .register::<Timestamp>();
        registry
    }
}

impl fmt::Debug for PrimitiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.codecs.values().map(|c| c.type_name).collect();
        names.sort_unstable();
        f.debug_struct("PrimitiveRegistry")
            .field("codecs", &names)
            .finish()
    }
}

// ============================================================================
// Built-in primitives
// ============================================================================

fn mismatch(expected: &str, found: &AmqpValue) -> Error {
    Error::malformed(format!("expected {}, found {}", expected, found.kind()))
}

/// Implement `Primitive` for a scalar: encoder plus the accepted wire variants.
///
/// Narrower wire types of the same signedness widen losslessly.
macro_rules! impl_primitive {
    ($type:ty, $amqp:literal, $write:path, [$($variant:ident),+]) => {
        impl Primitive for $type {
            fn encode(&self, buf: &mut ByteBuffer) -> Result<()> {
                $write(buf, *self);
                Ok(())
            }

            fn from_value(value: AmqpValue) -> Result<Self> {
                match value {
                    $(AmqpValue::$variant(v) => Ok(<$type>::from(v)),)+
                    other => Err(mismatch($amqp, &other)),
                }
            }
        }
    };
}

impl_primitive!(bool, "boolean", encoding::write_bool, [Bool]);
impl_primitive!(u8, "ubyte", encoding::write_ubyte, [UByte]);
impl_primitive!(u16, "ushort", encoding::write_ushort, [UByte, UShort]);
impl_primitive!(u32, "uint", encoding::write_uint, [UByte, UShort, UInt]);
impl_primitive!(u64, "ulong", encoding::write_ulong, [UByte, UShort, UInt, ULong]);
impl_primitive!(i8, "byte", encoding::write_byte, [Byte]);
impl_primitive!(i16, "short", encoding::write_short, [Byte, Short]);
impl_primitive!(i32, "int", encoding::write_int, [Byte, Short, Int]);
impl_primitive!(i64, "long", encoding::write_long, [Byte, Short, Int, Long]);
impl_primitive!(f32, "float", encoding::write_float, [Float]);
impl_primitive!(f64, "double", encoding::write_double, [Float, Double]);
impl_primitive!(char, "char", encoding::write_char, [Char]);

impl Primitive for String {
    fn encode(&self, buf: &mut ByteBuffer) -> Result<()> {
        encoding::write_string(buf, self)
    }

    fn from_value(value: AmqpValue) -> Result<Self> {
        match value {
            AmqpValue::String(v) => Ok(v),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl Primitive for Symbol {
    fn encode(&self, buf: &mut ByteBuffer) -> Result<()> {
        encoding::write_symbol(buf, &self.0)
    }

    fn from_value(value: AmqpValue) -> Result<Self> {
        match value {
            AmqpValue::Symbol(v) | AmqpValue::String(v) => Ok(Symbol(v)),
            other => Err(mismatch("symbol", &other)),
        }
    }
}

impl Primitive for Binary {
    fn encode(&self, buf: &mut ByteBuffer) -> Result<()> {
        encoding::write_binary(buf, &self.0)
    }

    fn from_value(value: AmqpValue) -> Result<Self> {
        match value {
            AmqpValue::Binary(v) => Ok(Binary(v)),
            other => Err(mismatch("binary", &other)),
        }
    }
}

impl Primitive for Timestamp {
    fn encode(&self, buf: &mut ByteBuffer) -> Result<()> {
        encoding::write_timestamp(buf, self.0);
        Ok(())
    }

    fn from_value(value: AmqpValue) -> Result<Self> {
        match value {
            AmqpValue::Timestamp(v) => Ok(Timestamp(v)),
            other => Err(mismatch("timestamp", &other)),
        }
    }
}

macro_rules! impl_opaque_type {
    ($($type:ty),* $(,)?) => {
        $(
            impl AmqpType for $type {
                fn shape() -> TypeShape {
                    TypeShape::opaque()
                }
            }
        )*
    };
}

impl_opaque_type!(
    bool, u8, u16, u32, u64, i8, i16, i32, i64, f32, f64, char, String, Symbol, Binary, Timestamp,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn decode<P: Primitive>(bytes: &[u8]) -> Result<P> {
        let codec = PrimitiveCodec::of::<P>();
        let mut buf = ByteBuffer::from(bytes);
        let boxed = codec.decode(&mut buf, &DecodeLimits::default())?;
        boxed.downcast::<P>().map(|b| *b).map_err(|_| Error::cast::<P>())
    }

    #[test]
    fn test_default_registry_has_builtins() {
        let registry = PrimitiveRegistry::default();
        assert_eq!(registry.len(), 16);
        assert!(registry.try_get_codec(TypeId::of::<u32>()).is_some());
        assert!(registry.try_get_codec(TypeId::of::<Symbol>()).is_some());
        assert!(registry.try_get_codec(TypeId::of::<usize>()).is_none());
        assert!(PrimitiveRegistry::empty().is_empty());
    }

    #[test]
    fn test_codec_encode_rejects_wrong_type() {
        let codec = PrimitiveCodec::of::<u32>();
        let mut buf = ByteBuffer::new();
        assert!(matches!(
            codec.encode(&"nope".to_string(), &mut buf),
            Err(Error::InvalidCast { .. })
        ));
        codec.encode(&9u32, &mut buf).unwrap();
        assert_eq!(decode::<u32>(buf.as_slice()).unwrap(), 9);
    }

    #[test]
    fn test_widening_accepts_narrower_wire_types() {
        let mut buf = ByteBuffer::new();
        encoding::write_ubyte(&mut buf, 200);
        assert_eq!(decode::<u64>(buf.as_slice()).unwrap(), 200);

        let mut buf = ByteBuffer::new();
        encoding::write_ulong(&mut buf, 5);
        assert!(matches!(
            decode::<u32>(buf.as_slice()),
            Err(Error::MalformedWireData(_))
        ));
    }

    #[test]
    fn test_symbol_accepts_string_on_decode() {
        let mut buf = ByteBuffer::new();
        encoding::write_string(&mut buf, "amqp:accepted").unwrap();
        assert_eq!(
            decode::<Symbol>(buf.as_slice()).unwrap(),
            Symbol::from("amqp:accepted")
        );
    }
}
