// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Contract metadata: encoding kind, descriptor, members, base type,
//! provided subtypes and lifecycle hooks.
//!
//! `#[derive(AmqpContract)]` emits these builders; they can also be used
//! directly:
//!
//! ```rust
//! use amqp_contract::types::{
//!     assign, ContractInfo, EncodingType, MemberAccessor, MemberInfo, TypeShape,
//! };
//! use amqp_contract::{AmqpType, Error, Result};
//! use std::any::Any;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Credit {
//!     link: u32,
//! }
//!
//! fn get_link(target: &dyn Any) -> Option<&dyn Any> {
//!     target.downcast_ref::<Credit>().map(|c| &c.link as &dyn Any)
//! }
//!
//! fn set_link(target: &mut dyn Any, value: Box<dyn Any>) -> Result<()> {
//!     let credit = target.downcast_mut::<Credit>().ok_or_else(Error::cast::<Credit>)?;
//!     assign(&mut credit.link, value)
//! }
//!
//! impl AmqpType for Credit {
//!     fn shape() -> TypeShape {
//!         ContractInfo::new::<Credit>(EncodingType::DescribedList)
//!             .with_code(0x0000_0000_0000_0099)
//!             .member(MemberInfo::new::<u32>("link", MemberAccessor::field(get_link, set_link)))
//!             .into_shape()
//!     }
//! }
//!
//! let bytes = amqp_contract::to_bytes(&Credit { link: 7 }).unwrap();
//! assert_eq!(bytes, vec![0x00, 0x53, 0x99, 0xc0, 0x03, 0x01, 0x52, 0x07]);
//! ```

use super::accessor::{MemberAccessor, ProjectFn, ProjectMutFn};
use super::method::HookInfo;
use super::shape::TypeShape;
use super::{create_default, AmqpType, Instance, TypeHandle};
use crate::codec::Descriptor;
use std::fmt;

/// Wire layout of a contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingType {
    /// Descriptor, then members as a list ordered by member order.
    DescribedList,
    /// Descriptor, then members as a map keyed by member name.
    DescribedMap,
    /// Map keyed by member name, no descriptor.
    SimpleMap,
    /// List in declaration order, no descriptor.
    SimpleList,
}

impl EncodingType {
    pub fn is_described(self) -> bool {
        matches!(self, EncodingType::DescribedList | EncodingType::DescribedMap)
    }

    pub fn is_list(self) -> bool {
        matches!(self, EncodingType::DescribedList | EncodingType::SimpleList)
    }
}

impl fmt::Display for EncodingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncodingType::DescribedList => "described-list",
            EncodingType::DescribedMap => "described-map",
            EncodingType::SimpleMap => "simple-map",
            EncodingType::SimpleList => "simple-list",
        })
    }
}

/// Contract declared by a type.
#[derive(Clone)]
pub struct ContractInfo {
    pub encoding: EncodingType,
    /// Descriptor name; `None` falls back to the Rust type name.
    pub name: Option<String>,
    pub code: Option<u64>,
    pub base: Option<BaseInfo>,
    pub members: Vec<MemberInfo>,
    pub provides: Vec<TypeHandle>,
    pub hooks: Vec<HookInfo>,
    type_name: &'static str,
    create: fn() -> Instance,
}

impl ContractInfo {
    pub fn new<T: AmqpType + Default>(encoding: EncodingType) -> Self {
        Self {
            encoding,
            name: None,
            code: None,
            base: None,
            members: Vec::new(),
            provides: Vec::new(),
            hooks: Vec::new(),
            type_name: std::any::type_name::<T>(),
            create: create_default::<T>,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_code(mut self, code: u64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_base(mut self, base: BaseInfo) -> Self {
        self.base = Some(base);
        self
    }

    pub fn member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    /// Declare `T` as a subtype that may appear where this type is expected.
    pub fn provides<T: AmqpType>(mut self) -> Self {
        self.provides.push(TypeHandle::of::<T>());
        self
    }

    pub fn hook(mut self, hook: HookInfo) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn into_shape(self) -> TypeShape {
        TypeShape::contract(self)
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Wire descriptor: the code when set, else the name. `None` for the
    /// simple encodings.
    pub fn descriptor(&self) -> Option<Descriptor> {
        self.descriptors().into_iter().next()
    }

    /// Every descriptor identifying the type on the wire, the written one
    /// first. A type declaring both a code and a name answers to either.
    pub fn descriptors(&self) -> Vec<Descriptor> {
        if !self.encoding.is_described() {
            return Vec::new();
        }
        let mut descriptors = Vec::with_capacity(2);
        if let Some(code) = self.code {
            descriptors.push(Descriptor::Code(code));
        }
        match (&self.name, self.code) {
            (Some(name), _) => descriptors.push(Descriptor::Name(name.clone())),
            (None, None) => descriptors.push(Descriptor::Name(self.type_name.to_string())),
            (None, Some(_)) => {}
        }
        descriptors
    }

    /// Fresh default instance of the contract type.
    pub fn create(&self) -> Instance {
        (self.create)()
    }

    pub(crate) fn creator(&self) -> fn() -> Instance {
        self.create
    }
}

impl fmt::Debug for ContractInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractInfo")
            .field("type_name", &self.type_name)
            .field("encoding", &self.encoding)
            .field("descriptor", &self.descriptor())
            .field("base", &self.base.map(|b| b.handle))
            .field("members", &self.members)
            .field("provides", &self.provides)
            .finish()
    }
}

/// Base type embedded by composition, with projections to reach it.
#[derive(Clone, Copy)]
pub struct BaseInfo {
    pub handle: TypeHandle,
    pub(crate) project: ProjectFn,
    pub(crate) project_mut: ProjectMutFn,
}

impl BaseInfo {
    /// `project`/`project_mut` return the embedded `B` of a derived instance.
    pub fn new<B: AmqpType>(project: ProjectFn, project_mut: ProjectMutFn) -> Self {
        Self {
            handle: TypeHandle::of::<B>(),
            project,
            project_mut,
        }
    }
}

/// One serializable member.
#[derive(Clone)]
pub struct MemberInfo {
    pub name: String,
    pub order: Option<i32>,
    pub ty: TypeHandle,
    pub accessor: MemberAccessor,
}

impl MemberInfo {
    pub fn new<T: AmqpType>(name: impl Into<String>, accessor: MemberAccessor) -> Self {
        Self {
            name: name.into(),
            order: None,
            ty: TypeHandle::of::<T>(),
            accessor,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("ty", &self.ty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe;

    impl AmqpType for Probe {
        fn shape() -> TypeShape {
            TypeShape::opaque()
        }
    }

    #[test]
    fn test_descriptor_prefers_code_over_name() {
        let info = ContractInfo::new::<Probe>(EncodingType::DescribedMap)
            .named("test:probe")
            .with_code(0x10);
        assert_eq!(info.descriptor(), Some(Descriptor::Code(0x10)));

        let info = ContractInfo::new::<Probe>(EncodingType::DescribedMap).named("test:probe");
        assert_eq!(info.descriptor(), Some(Descriptor::Name("test:probe".into())));
    }

    #[test]
    fn test_code_and_name_are_both_descriptors() {
        let info = ContractInfo::new::<Probe>(EncodingType::DescribedList)
            .named("test:probe")
            .with_code(0x10);
        assert_eq!(
            info.descriptors(),
            vec![Descriptor::Code(0x10), Descriptor::Name("test:probe".into())]
        );

        let info = ContractInfo::new::<Probe>(EncodingType::DescribedList).with_code(0x10);
        assert_eq!(info.descriptors(), vec![Descriptor::Code(0x10)]);
        assert!(ContractInfo::new::<Probe>(EncodingType::SimpleMap)
            .named("test:probe")
            .descriptors()
            .is_empty());
    }

    #[test]
    fn test_descriptor_defaults_to_type_name() {
        let info = ContractInfo::new::<Probe>(EncodingType::DescribedList);
        match info.descriptor() {
            Some(Descriptor::Name(name)) => assert!(name.ends_with("Probe")),
            other => panic!("unexpected descriptor {:?}", other),
        }
    }

    #[test]
    fn test_simple_encodings_have_no_descriptor() {
        let info = ContractInfo::new::<Probe>(EncodingType::SimpleList).with_code(1);
        assert_eq!(info.descriptor(), None);
        assert!(EncodingType::SimpleList.is_list());
        assert!(!EncodingType::SimpleMap.is_described());
    }

    #[test]
    fn test_create_builds_default_instance() {
        let info = ContractInfo::new::<Probe>(EncodingType::SimpleMap);
        assert!(info.create().downcast_ref::<Probe>().is_some());
    }
}
