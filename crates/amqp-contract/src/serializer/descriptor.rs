// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled type descriptors: the immutable encode/decode plans stored in
//! the type cache.

use super::collection::{GenericList, GenericMap};
use super::type_ref::TypeRef;
use super::ContractSerializer;
use crate::codec::encoding;
use crate::codec::{AmqpValue, ByteBuffer, Descriptor, PrimitiveCodec};
use crate::error::{Error, Result};
use crate::types::{
    BaseInfo, EncodingType, EnumShape, HookInfo, HookRole, Instance, MemberAccessor,
    NullableShape, SerializableShape, TypeHandle,
};
use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Descriptor variant, as reported by [`CompiledType::variant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Primitive,
    Object,
    DescribedList,
    DescribedMap,
    SimpleMap,
    SimpleList,
    Enum,
    GenericMap,
    GenericList,
    AmqpSerializable,
}

impl From<EncodingType> for Variant {
    fn from(encoding: EncodingType) -> Self {
        match encoding {
            EncodingType::DescribedList => Variant::DescribedList,
            EncodingType::DescribedMap => Variant::DescribedMap,
            EncodingType::SimpleMap => Variant::SimpleMap,
            EncodingType::SimpleList => Variant::SimpleList,
        }
    }
}

#[derive(Clone)]
pub(crate) enum TypeKind {
    Primitive(PrimitiveCodec),
    /// Dynamic value (`None`) or pass-through to a declared target type.
    Object(Option<TypeRef>),
    Composite(Composite),
    Enum {
        repr: Arc<CompiledType>,
        shape: EnumShape,
    },
    GenericMap(GenericMap),
    GenericList(GenericList),
    Serializable(SerializableShape),
}

/// Compiled encode/decode plan of one type.
pub struct CompiledType {
    type_id: TypeId,
    type_name: &'static str,
    nullable: Option<NullableShape>,
    kind: TypeKind,
}

impl CompiledType {
    pub(crate) fn new(handle: TypeHandle, kind: TypeKind) -> Self {
        Self {
            type_id: handle.id(),
            type_name: handle.name(),
            nullable: None,
            kind,
        }
    }

    pub(crate) fn with_nullable(mut self, nullable: NullableShape) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn variant(&self) -> Variant {
        match &self.kind {
            TypeKind::Primitive(_) => Variant::Primitive,
            TypeKind::Object(_) => Variant::Object,
            TypeKind::Composite(c) => c.encoding.into(),
            TypeKind::Enum { .. } => Variant::Enum,
            TypeKind::GenericMap(_) => Variant::GenericMap,
            TypeKind::GenericList(_) => Variant::GenericList,
            TypeKind::Serializable(_) => Variant::AmqpSerializable,
        }
    }

    /// True for `Option<T>` descriptors.
    pub fn is_nullable(&self) -> bool {
        self.nullable.is_some()
    }

    /// Members in wire order; empty unless this is a contract type.
    pub fn members(&self) -> &[CompiledMember] {
        match self.composite() {
            Some(c) => &c.members,
            None => &[],
        }
    }

    /// Descriptor written before the members of a described contract type.
    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.composite().and_then(|c| c.descriptors.first())
    }

    /// Every descriptor accepted on decode: the written one, then the
    /// symbolic name when the type also has a code.
    pub fn descriptors(&self) -> &[Descriptor] {
        match self.composite() {
            Some(c) => &c.descriptors,
            None => &[],
        }
    }

    /// Written descriptors of the directly provided subtypes.
    pub fn provided_descriptors(&self) -> Vec<&Descriptor> {
        self.composite()
            .map(|c| {
                c.known_types
                    .iter()
                    .filter_map(|k| k.descriptors.first())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub(crate) fn composite(&self) -> Option<&Composite> {
        match &self.kind {
            TypeKind::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// True when `value` is the absence marker of this type (`None`, or a
    /// null dynamic value).
    pub(crate) fn is_absent(&self, value: &dyn Any) -> Result<bool> {
        if let Some(nullable) = &self.nullable {
            return Ok(nullable.get(value)?.is_none());
        }
        Ok(match &self.kind {
            TypeKind::Object(None) => value
                .downcast_ref::<AmqpValue>()
                .is_some_and(AmqpValue::is_null),
            _ => false,
        })
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    pub fn encode(&self, cx: &ContractSerializer, buf: &mut ByteBuffer, value: &dyn Any) -> Result<()> {
        let value = match &self.nullable {
            Some(nullable) => match nullable.get(value)? {
                Some(inner) => inner,
                None => {
                    encoding::write_null(buf);
                    return Ok(());
                }
            },
            None => value,
        };

        match &self.kind {
            TypeKind::Primitive(codec) => codec.encode(value, buf),
            TypeKind::Object(None) => cx.encode_dynamic(buf, value),
            TypeKind::Object(Some(target)) => target.get(cx.compiler())?.encode(cx, buf, value),
            TypeKind::Composite(composite) => composite.encode(cx, buf, value, self.type_name),
            TypeKind::Enum { repr, shape } => {
                let raw = shape.to_repr(value)?;
                repr.encode(cx, buf, raw.as_ref())
            }
            TypeKind::GenericMap(map) => map.encode(cx, buf, value),
            TypeKind::GenericList(list) => list.encode(cx, buf, value),
            TypeKind::Serializable(shape) => shape.encode(value, buf),
        }
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    pub fn decode(&self, cx: &ContractSerializer, buf: &mut ByteBuffer) -> Result<Instance> {
        match &self.nullable {
            Some(nullable) => {
                if encoding::peek_null(buf)? {
                    buf.read_u8()?;
                    return nullable.wrap(None);
                }
                let inner = self.decode_kind(cx, buf)?;
                nullable.wrap(Some(inner))
            }
            None => self.decode_kind(cx, buf),
        }
    }

    fn decode_kind(&self, cx: &ContractSerializer, buf: &mut ByteBuffer) -> Result<Instance> {
        match &self.kind {
            TypeKind::Primitive(codec) => codec.decode(buf, cx.limits()),
            TypeKind::Object(None) => Ok(Box::new(AmqpValue::decode_with(buf, cx.limits())?)),
            TypeKind::Object(Some(target)) => target.get(cx.compiler())?.decode(cx, buf),
            TypeKind::Composite(composite) => {
                nested(buf, cx, |buf| self.decode_composite(cx, buf, composite))
            }
            TypeKind::Enum { repr, shape } => shape.from_repr(repr.decode(cx, buf)?),
            TypeKind::GenericMap(map) => nested(buf, cx, |buf| map.decode(cx, buf)),
            TypeKind::GenericList(list) => nested(buf, cx, |buf| list.decode(cx, buf)),
            TypeKind::Serializable(shape) => shape.decode(buf),
        }
    }

    fn decode_composite(
        &self,
        cx: &ContractSerializer,
        buf: &mut ByteBuffer,
        composite: &Composite,
    ) -> Result<Instance> {
        if composite.descriptors.is_empty() {
            return composite.decode_fields(cx, buf);
        }

        let wire = encoding::read_descriptor(buf)?;
        if composite.descriptors.contains(&wire) {
            return composite.decode_fields(cx, buf);
        }

        let mut visited = HashSet::from([self.type_id]);
        let provided = composite
            .find_provided(cx, &wire, &mut visited)?
            .ok_or_else(|| {
                Error::malformed(format!(
                    "descriptor {} is neither {} nor a type it provides",
                    wire, self.type_name
                ))
            })?;
        log::trace!(
            "[contract] {} decoded as provided subtype {}",
            self.type_name,
            provided.type_name
        );
        match provided.composite() {
            Some(sub) => sub.decode_fields(cx, buf),
            None => Err(Error::malformed(format!(
                "provided subtype {} is not a contract type",
                provided.type_name
            ))),
        }
    }
}

/// Run a compound decode one nesting level deeper.
fn nested<F>(buf: &mut ByteBuffer, cx: &ContractSerializer, decode: F) -> Result<Instance>
where
    F: FnOnce(&mut ByteBuffer) -> Result<Instance>,
{
    buf.descend(cx.limits().max_depth)?;
    let result = decode(buf);
    buf.ascend();
    result
}

impl fmt::Debug for CompiledType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledType")
            .field("type_name", &self.type_name)
            .field("variant", &self.variant())
            .field("nullable", &self.is_nullable())
            .field("members", &self.members())
            .finish()
    }
}

// ============================================================================
// Contract types
// ============================================================================

/// Member of a compiled contract type, with its resolved order.
#[derive(Clone)]
pub struct CompiledMember {
    pub name: String,
    pub order: i32,
    pub(crate) accessor: MemberAccessor,
    pub(crate) ty: TypeRef,
}

impl CompiledMember {
    /// The same member seen from a type embedding its owner as base.
    pub(crate) fn inherited(&self, base: &BaseInfo) -> Self {
        Self {
            name: self.name.clone(),
            order: self.order,
            accessor: MemberAccessor::inherited(base.project, base.project_mut, self.accessor.clone()),
            ty: self.ty.clone(),
        }
    }

    pub fn type_handle(&self) -> TypeHandle {
        self.ty.handle()
    }
}

impl fmt::Debug for CompiledMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledMember")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("ty", &self.ty)
            .finish()
    }
}

/// Provided subtype recorded by its wire descriptors.
#[derive(Clone)]
pub(crate) struct KnownType {
    pub(crate) descriptors: Vec<Descriptor>,
    pub(crate) type_ref: TypeRef,
}

/// One accepted hook per role.
#[derive(Clone, Default)]
pub(crate) struct Hooks {
    before_encode: Option<HookInfo>,
    after_encode: Option<HookInfo>,
    before_decode: Option<HookInfo>,
    after_decode: Option<HookInfo>,
}

impl Hooks {
    fn slot(&mut self, role: HookRole) -> &mut Option<HookInfo> {
        match role {
            HookRole::BeforeEncode => &mut self.before_encode,
            HookRole::AfterEncode => &mut self.after_encode,
            HookRole::BeforeDecode => &mut self.before_decode,
            HookRole::AfterDecode => &mut self.after_decode,
        }
    }

    fn get(&self, role: HookRole) -> Option<&HookInfo> {
        match role {
            HookRole::BeforeEncode => self.before_encode.as_ref(),
            HookRole::AfterEncode => self.after_encode.as_ref(),
            HookRole::BeforeDecode => self.before_decode.as_ref(),
            HookRole::AfterDecode => self.after_decode.as_ref(),
        }
    }

    /// Keep `hook` unless its role is taken; returns whether it was kept.
    pub(crate) fn accept(&mut self, hook: &HookInfo) -> bool {
        let slot = self.slot(hook.role);
        if slot.is_some() {
            return false;
        }
        *slot = Some(hook.clone());
        true
    }

    /// Hooks of a base type, projected onto the derived type.
    pub(crate) fn inherited(&self, base: &BaseInfo) -> Hooks {
        let project = |hook: &Option<HookInfo>| {
            hook.as_ref()
                .map(|h| h.inherited(base.project, base.project_mut))
        };
        Hooks {
            before_encode: project(&self.before_encode),
            after_encode: project(&self.after_encode),
            before_decode: project(&self.before_decode),
            after_decode: project(&self.after_decode),
        }
    }

    /// Fill roles still empty from `other`.
    pub(crate) fn fill_from(&mut self, other: Hooks) {
        for hook in [
            other.before_encode,
            other.after_encode,
            other.before_decode,
            other.after_decode,
        ]
        .into_iter()
        .flatten()
        {
            self.accept(&hook);
        }
    }

    fn run(&self, role: HookRole, target: &dyn Any) -> Result<()> {
        match self.get(role) {
            Some(hook) => hook.method.invoke(target),
            None => Ok(()),
        }
    }

    fn run_mut(&self, role: HookRole, target: &mut dyn Any) -> Result<()> {
        match self.get(role) {
            Some(hook) => hook.method.invoke_mut(target),
            None => Ok(()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        [
            &self.before_encode,
            &self.after_encode,
            &self.before_decode,
            &self.after_decode,
        ]
        .iter()
        .filter(|h| h.is_some())
        .count()
    }
}

/// Plan of a contract type (any of the four encodings).
#[derive(Clone)]
pub(crate) struct Composite {
    pub(crate) encoding: EncodingType,
    /// Written descriptor first; empty for the simple encodings.
    pub(crate) descriptors: Vec<Descriptor>,
    pub(crate) create: fn() -> Instance,
    pub(crate) members: Vec<CompiledMember>,
    pub(crate) known_types: Vec<KnownType>,
    pub(crate) hooks: Hooks,
}

impl Composite {
    fn encode(
        &self,
        cx: &ContractSerializer,
        buf: &mut ByteBuffer,
        value: &dyn Any,
        type_name: &'static str,
    ) -> Result<()> {
        self.hooks.run(HookRole::BeforeEncode, value)?;
        if let Some(descriptor) = self.descriptors.first() {
            encoding::write_descriptor(buf, descriptor)?;
        }
        if self.encoding.is_list() {
            self.encode_list(cx, buf, value, type_name)?;
        } else {
            self.encode_map(cx, buf, value, type_name)?;
        }
        self.hooks.run(HookRole::AfterEncode, value)
    }

    fn member_value<'a>(
        member: &CompiledMember,
        value: &'a dyn Any,
        type_name: &'static str,
    ) -> Result<&'a dyn Any> {
        member.accessor.get(value).ok_or_else(|| Error::InvalidCast {
            expected: type_name.to_string(),
        })
    }

    fn encode_list(
        &self,
        cx: &ContractSerializer,
        buf: &mut ByteBuffer,
        value: &dyn Any,
        type_name: &'static str,
    ) -> Result<()> {
        let mut slots = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let member_value = Self::member_value(member, value, type_name)?;
            let ty = member.ty.get(cx.compiler())?;
            let present = !ty.is_absent(member_value)?;
            slots.push((ty, member_value, present));
        }

        // absent members are dropped from the tail only
        let count = slots
            .iter()
            .rposition(|(_, _, present)| *present)
            .map_or(0, |last| last + 1);

        let mut body = ByteBuffer::new();
        for (ty, member_value, present) in &slots[..count] {
            if *present {
                ty.encode(cx, &mut body, *member_value)?;
            } else {
                encoding::write_null(&mut body);
            }
        }
        encoding::write_list_frame(buf, count, body.as_slice())
    }

    fn encode_map(
        &self,
        cx: &ContractSerializer,
        buf: &mut ByteBuffer,
        value: &dyn Any,
        type_name: &'static str,
    ) -> Result<()> {
        let mut body = ByteBuffer::new();
        let mut count = 0;
        for member in &self.members {
            let member_value = Self::member_value(member, value, type_name)?;
            let ty = member.ty.get(cx.compiler())?;
            if ty.is_absent(member_value)? {
                continue;
            }
            encoding::write_symbol(&mut body, &member.name)?;
            ty.encode(cx, &mut body, member_value)?;
            count += 2;
        }
        encoding::write_map_frame(buf, count, body.as_slice())
    }

    /// Build an instance from the member section (descriptor already read).
    pub(crate) fn decode_fields(&self, cx: &ContractSerializer, buf: &mut ByteBuffer) -> Result<Instance> {
        let mut instance = (self.create)();
        self.hooks.run_mut(HookRole::BeforeDecode, instance.as_mut())?;
        if self.encoding.is_list() {
            self.decode_list(cx, buf, instance.as_mut())?;
        } else {
            self.decode_map(cx, buf, instance.as_mut())?;
        }
        self.hooks.run_mut(HookRole::AfterDecode, instance.as_mut())?;
        Ok(instance)
    }

    fn decode_list(&self, cx: &ContractSerializer, buf: &mut ByteBuffer, target: &mut dyn Any) -> Result<()> {
        let header = encoding::read_list_header(buf, cx.limits())?;
        for index in 0..header.count {
            match self.members.get(index) {
                Some(member) => Self::decode_member(cx, buf, member, target)?,
                None => {
                    // unknown trailing member
                    AmqpValue::decode_with(buf, cx.limits())?;
                }
            }
        }
        header.finish(buf)
    }

    fn decode_map(&self, cx: &ContractSerializer, buf: &mut ByteBuffer, target: &mut dyn Any) -> Result<()> {
        let header = encoding::read_map_header(buf, cx.limits())?;
        for _ in 0..header.count / 2 {
            let key = encoding::read_key(buf)?;
            match self.members.iter().find(|m| m.name == key) {
                Some(member) => Self::decode_member(cx, buf, member, target)?,
                None => {
                    log::trace!("[contract] skipping unknown map key {}", key);
                    AmqpValue::decode_with(buf, cx.limits())?;
                }
            }
        }
        header.finish(buf)
    }

    fn decode_member(
        cx: &ContractSerializer,
        buf: &mut ByteBuffer,
        member: &CompiledMember,
        target: &mut dyn Any,
    ) -> Result<()> {
        // explicit null keeps the default
        if encoding::peek_null(buf)? {
            buf.read_u8()?;
            return Ok(());
        }
        let value = member.ty.get(cx.compiler())?.decode(cx, buf)?;
        member.accessor.set(target, value)
    }

    /// Search provided subtypes for `wire`: direct entries first, then the
    /// subtypes' own provides. `visited` breaks provides cycles.
    pub(crate) fn find_provided(
        &self,
        cx: &ContractSerializer,
        wire: &Descriptor,
        visited: &mut HashSet<TypeId>,
    ) -> Result<Option<Arc<CompiledType>>> {
        if let Some(known) = self.known_types.iter().find(|k| k.descriptors.contains(wire)) {
            return known.type_ref.get(cx.compiler()).map(Some);
        }
        for known in &self.known_types {
            let sub = known.type_ref.get(cx.compiler())?;
            if !visited.insert(sub.type_id) {
                continue;
            }
            if let Some(composite) = sub.composite() {
                if let Some(found) = composite.find_provided(cx, wire, visited)? {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }
}
