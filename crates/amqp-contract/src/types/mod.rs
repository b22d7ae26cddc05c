// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type capability model.
//!
//! Every serializable type implements [`AmqpType`], which answers one
//! question: what can this type do? The answer is a [`TypeShape`] listing the
//! capabilities the compiler may use (contract metadata, nullable wrapper,
//! enum, container, self-describing, dynamic object).
//!
//! Implementations come from `#[derive(AmqpContract)]`, from the blanket
//! impls shipped for std types, or are written by hand with the builder types
//! of [`contract`].

pub mod accessor;
pub mod collection;
pub mod contract;
pub mod method;
pub mod shape;

pub use accessor::{assign, MemberAccessor};
pub use collection::{ListContainer, ListShape, MapContainer, MapShape};
pub use contract::{BaseInfo, ContractInfo, EncodingType, MemberInfo};
pub use method::{HookInfo, HookOutcome, HookRole, MethodAccessor};
pub use shape::{
    AmqpEnum, AmqpSerializable, EnumShape, NullableShape, SerializableShape, TypeShape,
};

use std::any::{Any, TypeId};
use std::fmt;

/// Type-erased, owned instance produced by decoders.
pub type Instance = Box<dyn Any>;

/// Capability query implemented by every type the serializer handles.
pub trait AmqpType: Any {
    fn shape() -> TypeShape;
}

/// Copyable reference to an [`AmqpType`]: identity plus its shape query.
#[derive(Clone, Copy)]
pub struct TypeHandle {
    id: TypeId,
    name: &'static str,
    shape: fn() -> TypeShape,
}

impl TypeHandle {
    pub fn of<T: AmqpType>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            shape: T::shape,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified Rust name of the type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> TypeShape {
        (self.shape)()
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeHandle {}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.name)
    }
}

pub(crate) fn create_default<T: Default + Any>() -> Instance {
    Box::new(T::default())
}
