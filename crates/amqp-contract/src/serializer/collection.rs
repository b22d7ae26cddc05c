// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collection-shape detection and the generic container plans.
//!
//! A type without contract metadata that exposes a map capability compiles to
//! a generic map (AMQP map of key/value items); one exposing a list
//! capability compiles to a generic list (AMQP list). Map is checked first.

use super::compiler::TypeCompiler;
use super::descriptor::TypeKind;
use super::type_ref::TypeRef;
use super::ContractSerializer;
use crate::codec::{encoding, ByteBuffer};
use crate::error::Result;
use crate::types::{Instance, ListShape, MapShape, TypeShape};
use std::any::Any;

/// Generic descriptor for a container shape, `None` when the type is not a
/// collection.
pub(crate) fn detect(compiler: &TypeCompiler, shape: &TypeShape) -> Result<Option<TypeKind>> {
    if let Some(map) = shape.map {
        return Ok(Some(TypeKind::GenericMap(GenericMap {
            key: compiler.type_ref(map.key)?,
            value: compiler.type_ref(map.value)?,
            shape: map,
        })));
    }
    if let Some(list) = shape.list {
        return Ok(Some(TypeKind::GenericList(GenericList {
            item: compiler.type_ref(list.item)?,
            shape: list,
        })));
    }
    Ok(None)
}

#[derive(Clone)]
pub(crate) struct GenericList {
    item: TypeRef,
    shape: ListShape,
}

impl GenericList {
    pub(crate) fn encode(&self, cx: &ContractSerializer, buf: &mut ByteBuffer, value: &dyn Any) -> Result<()> {
        let item_type = self.item.get(cx.compiler())?;
        let items = self.shape.items(value)?;
        let mut body = ByteBuffer::new();
        for item in &items {
            item_type.encode(cx, &mut body, *item)?;
        }
        encoding::write_list_frame(buf, items.len(), body.as_slice())
    }

    pub(crate) fn decode(&self, cx: &ContractSerializer, buf: &mut ByteBuffer) -> Result<Instance> {
        let header = encoding::read_list_header(buf, cx.limits())?;
        let item_type = self.item.get(cx.compiler())?;
        let mut container = self.shape.create();
        for _ in 0..header.count {
            let item = item_type.decode(cx, buf)?;
            self.shape.push(container.as_mut(), item)?;
        }
        header.finish(buf)?;
        Ok(container)
    }
}

#[derive(Clone)]
pub(crate) struct GenericMap {
    key: TypeRef,
    value: TypeRef,
    shape: MapShape,
}

impl GenericMap {
    pub(crate) fn encode(&self, cx: &ContractSerializer, buf: &mut ByteBuffer, value: &dyn Any) -> Result<()> {
        let key_type = self.key.get(cx.compiler())?;
        let value_type = self.value.get(cx.compiler())?;
        let entries = self.shape.entries(value)?;
        let mut body = ByteBuffer::new();
        for (k, v) in &entries {
            key_type.encode(cx, &mut body, *k)?;
            value_type.encode(cx, &mut body, *v)?;
        }
        encoding::write_map_frame(buf, entries.len() * 2, body.as_slice())
    }

    pub(crate) fn decode(&self, cx: &ContractSerializer, buf: &mut ByteBuffer) -> Result<Instance> {
        let header = encoding::read_map_header(buf, cx.limits())?;
        let key_type = self.key.get(cx.compiler())?;
        let value_type = self.value.get(cx.compiler())?;
        let mut container = self.shape.create();
        for _ in 0..header.count / 2 {
            let key = key_type.decode(cx, buf)?;
            let value = value_type.decode(cx, buf)?;
            self.shape.insert(container.as_mut(), key, value)?;
        }
        header.finish(buf)?;
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PrimitiveRegistry;
    use crate::types::{AmqpType, ListContainer, MapContainer};
    use std::collections::BTreeMap;

    /// Container exposing both capabilities.
    #[derive(Default)]
    struct Both(BTreeMap<String, u8>);

    impl ListContainer for Both {
        type Item = String;

        fn items(&self) -> Box<dyn Iterator<Item = &String> + '_> {
            Box::new(self.0.keys())
        }

        fn push_item(&mut self, item: String) {
            self.0.insert(item, 0);
        }
    }

    impl MapContainer for Both {
        type Key = String;
        type Value = u8;

        fn entries(&self) -> Box<dyn Iterator<Item = (&String, &u8)> + '_> {
            Box::new(self.0.iter())
        }

        fn insert_entry(&mut self, key: String, value: u8) {
            self.0.insert(key, value);
        }
    }

    impl AmqpType for Both {
        fn shape() -> TypeShape {
            TypeShape::opaque()
                .with_list(ListShape::of::<Self>())
                .with_map(MapShape::of::<Self>())
        }
    }

    #[test]
    fn test_map_capability_takes_precedence() {
        let compiler = TypeCompiler::new(PrimitiveRegistry::default());
        let kind = detect(&compiler, &Both::shape()).unwrap();
        assert!(matches!(kind, Some(TypeKind::GenericMap(_))));
    }

    #[test]
    fn test_plain_shape_is_not_a_collection() {
        let compiler = TypeCompiler::new(PrimitiveRegistry::default());
        assert!(detect(&compiler, &TypeShape::opaque()).unwrap().is_none());
    }
}
