// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Capability set returned by [`AmqpType::shape`].

use super::collection::{ListShape, MapShape};
use super::contract::ContractInfo;
use super::{create_default, AmqpType, Instance, TypeHandle};
use crate::codec::{AmqpValue, ByteBuffer, Primitive};
use crate::error::{Error, Result};
use std::any::Any;
use std::fmt;

/// Capabilities a type exposes to the compiler.
///
/// A type may expose several; the compiler picks the first applicable one
/// (contract metadata always wins, then the fallback order documented on
/// [`TypeCompiler`](crate::serializer::TypeCompiler)).
#[derive(Clone, Default)]
pub struct TypeShape {
    pub contract: Option<ContractInfo>,
    /// Dynamic pass-through value ([`AmqpValue`]).
    pub object: bool,
    pub serializable: Option<SerializableShape>,
    pub nullable: Option<NullableShape>,
    pub enumeration: Option<EnumShape>,
    pub map: Option<MapShape>,
    pub list: Option<ListShape>,
}

impl TypeShape {
    /// No capability at all. Primitive types registered in the codec
    /// registry use this shape.
    pub fn opaque() -> Self {
        Self::default()
    }

    pub fn contract(info: ContractInfo) -> Self {
        Self::opaque().with_contract(info)
    }

    pub fn object() -> Self {
        Self {
            object: true,
            ..Self::default()
        }
    }

    pub fn with_contract(mut self, info: ContractInfo) -> Self {
        self.contract = Some(info);
        self
    }

    pub fn with_serializable(mut self, shape: SerializableShape) -> Self {
        self.serializable = Some(shape);
        self
    }

    pub fn with_nullable(mut self, shape: NullableShape) -> Self {
        self.nullable = Some(shape);
        self
    }

    pub fn with_enum(mut self, shape: EnumShape) -> Self {
        self.enumeration = Some(shape);
        self
    }

    pub fn with_map(mut self, shape: MapShape) -> Self {
        self.map = Some(shape);
        self
    }

    pub fn with_list(mut self, shape: ListShape) -> Self {
        self.list = Some(shape);
        self
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut caps = Vec::new();
        if let Some(contract) = &self.contract {
            caps.push(format!("contract({})", contract.encoding));
        }
        if self.object {
            caps.push("object".to_string());
        }
        if self.serializable.is_some() {
            caps.push("serializable".to_string());
        }
        if let Some(nullable) = &self.nullable {
            caps.push(format!("nullable({})", nullable.inner.name()));
        }
        if self.enumeration.is_some() {
            caps.push("enum".to_string());
        }
        if self.map.is_some() {
            caps.push("map".to_string());
        }
        if self.list.is_some() {
            caps.push("list".to_string());
        }
        f.debug_tuple("TypeShape").field(&caps).finish()
    }
}

// ============================================================================
// Nullable
// ============================================================================

type NullableGetFn = for<'a> fn(&'a dyn Any) -> Result<Option<&'a dyn Any>>;
type NullableWrapFn = fn(Option<Instance>) -> Result<Instance>;

/// `Option<T>` capability: absent values are written as the null marker.
#[derive(Clone, Copy)]
pub struct NullableShape {
    pub inner: TypeHandle,
    get: NullableGetFn,
    wrap: NullableWrapFn,
}

impl NullableShape {
    /// Shape of `Option<T>`.
    pub fn of<T: AmqpType>() -> Self {
        Self {
            inner: TypeHandle::of::<T>(),
            get: option_get::<T>,
            wrap: option_wrap::<T>,
        }
    }

    /// Inner value of an `Option<T>`, `None` when absent.
    pub fn get<'a>(&self, value: &'a dyn Any) -> Result<Option<&'a dyn Any>> {
        (self.get)(value)
    }

    /// Build an `Option<T>` from an optional decoded `T`.
    pub fn wrap(&self, inner: Option<Instance>) -> Result<Instance> {
        (self.wrap)(inner)
    }
}

fn option_get<T: Any>(value: &dyn Any) -> Result<Option<&dyn Any>> {
    let option = value
        .downcast_ref::<Option<T>>()
        .ok_or_else(Error::cast::<Option<T>>)?;
    Ok(option.as_ref().map(|inner| inner as &dyn Any))
}

fn option_wrap<T: Any>(inner: Option<Instance>) -> Result<Instance> {
    match inner {
        None => Ok(Box::new(None::<T>)),
        Some(boxed) => {
            let value = boxed.downcast::<T>().map_err(|_| Error::cast::<T>())?;
            Ok(Box::new(Some(*value)))
        }
    }
}

impl<T: AmqpType> AmqpType for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::opaque().with_nullable(NullableShape::of::<T>())
    }
}

impl AmqpType for AmqpValue {
    fn shape() -> TypeShape {
        TypeShape::object()
    }
}

// ============================================================================
// Enum
// ============================================================================

/// Enumeration carried on the wire as its underlying integer.
///
/// Usually derived: `#[derive(AmqpContract)]` on a fieldless enum uses its
/// `#[repr]` type (default `i32`).
pub trait AmqpEnum: AmqpType + Sized {
    type Repr: Primitive + AmqpType + Copy + fmt::Debug;

    fn to_repr(&self) -> Self::Repr;

    fn from_repr(repr: Self::Repr) -> Option<Self>;
}

/// Type-erased [`AmqpEnum`] capability.
#[derive(Clone, Copy)]
pub struct EnumShape {
    pub repr: TypeHandle,
    to_repr: fn(&dyn Any) -> Result<Instance>,
    from_repr: fn(Instance) -> Result<Instance>,
}

impl EnumShape {
    pub fn of<E: AmqpEnum>() -> Self {
        Self {
            repr: TypeHandle::of::<E::Repr>(),
            to_repr: enum_to_repr::<E>,
            from_repr: enum_from_repr::<E>,
        }
    }

    /// Underlying integer of an enum value.
    pub fn to_repr(&self, value: &dyn Any) -> Result<Instance> {
        (self.to_repr)(value)
    }

    /// Enum value of a decoded integer; unknown values are malformed data.
    pub fn from_repr(&self, repr: Instance) -> Result<Instance> {
        (self.from_repr)(repr)
    }
}

fn enum_to_repr<E: AmqpEnum>(value: &dyn Any) -> Result<Instance> {
    let value = value.downcast_ref::<E>().ok_or_else(Error::cast::<E>)?;
    Ok(Box::new(value.to_repr()))
}

fn enum_from_repr<E: AmqpEnum>(repr: Instance) -> Result<Instance> {
    let repr = *repr
        .downcast::<E::Repr>()
        .map_err(|_| Error::cast::<E::Repr>())?;
    match E::from_repr(repr) {
        Some(value) => Ok(Box::new(value)),
        None => Err(Error::malformed(format!(
            "{:?} is not a value of {}",
            repr,
            std::any::type_name::<E>()
        ))),
    }
}

// ============================================================================
// Self-describing
// ============================================================================

/// Type that writes and reads its own wire form.
///
/// Decoding starts from `Default::default()` and lets the instance fill
/// itself from the buffer.
pub trait AmqpSerializable: AmqpType + Default {
    fn encode(&self, buf: &mut ByteBuffer) -> Result<()>;

    fn decode(&mut self, buf: &mut ByteBuffer) -> Result<()>;
}

/// Type-erased [`AmqpSerializable`] capability.
#[derive(Clone, Copy)]
pub struct SerializableShape {
    encode: fn(&dyn Any, &mut ByteBuffer) -> Result<()>,
    create: fn() -> Instance,
    decode: fn(&mut dyn Any, &mut ByteBuffer) -> Result<()>,
}

impl SerializableShape {
    pub fn of<S: AmqpSerializable>() -> Self {
        Self {
            encode: serializable_encode::<S>,
            create: create_default::<S>,
            decode: serializable_decode::<S>,
        }
    }

    pub fn encode(&self, value: &dyn Any, buf: &mut ByteBuffer) -> Result<()> {
        (self.encode)(value, buf)
    }

    pub fn decode(&self, buf: &mut ByteBuffer) -> Result<Instance> {
        let mut instance = (self.create)();
        (self.decode)(instance.as_mut(), buf)?;
        Ok(instance)
    }
}

fn serializable_encode<S: AmqpSerializable>(value: &dyn Any, buf: &mut ByteBuffer) -> Result<()> {
    value.downcast_ref::<S>().ok_or_else(Error::cast::<S>)?.encode(buf)
}

fn serializable_decode<S: AmqpSerializable>(target: &mut dyn Any, buf: &mut ByteBuffer) -> Result<()> {
    target.downcast_mut::<S>().ok_or_else(Error::cast::<S>)?.decode(buf)
}
