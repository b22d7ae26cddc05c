// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Container capabilities (list-like and map-like types).
//!
//! Blanket implementations cover `Vec`, `VecDeque`, `HashSet`, `BTreeSet`,
//! `HashMap` and `BTreeMap`. Other containers implement [`ListContainer`] or
//! [`MapContainer`] and expose the matching shape from [`AmqpType::shape`].

use super::{create_default, AmqpType, Instance, TypeHandle, TypeShape};
use crate::error::{Error, Result};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Sequence of items with a one-argument insert.
pub trait ListContainer: AmqpType + Default {
    type Item: AmqpType;

    fn items(&self) -> Box<dyn Iterator<Item = &Self::Item> + '_>;

    fn push_item(&mut self, item: Self::Item);
}

/// Collection of entries with a two-argument insert.
pub trait MapContainer: AmqpType + Default {
    type Key: AmqpType;
    type Value: AmqpType;

    fn entries(&self) -> Box<dyn Iterator<Item = (&Self::Key, &Self::Value)> + '_>;

    fn insert_entry(&mut self, key: Self::Key, value: Self::Value);
}

type ItemsFn = for<'a> fn(&'a dyn Any) -> Result<Vec<&'a dyn Any>>;
type PushFn = fn(&mut dyn Any, Instance) -> Result<()>;
type EntriesFn = for<'a> fn(&'a dyn Any) -> Result<Vec<(&'a dyn Any, &'a dyn Any)>>;
type InsertFn = fn(&mut dyn Any, Instance, Instance) -> Result<()>;

/// Type-erased [`ListContainer`] capability.
#[derive(Clone, Copy)]
pub struct ListShape {
    pub item: TypeHandle,
    create: fn() -> Instance,
    items: ItemsFn,
    push: PushFn,
}

impl ListShape {
    pub fn of<L: ListContainer>() -> Self {
        Self {
            item: TypeHandle::of::<L::Item>(),
            create: create_default::<L>,
            items: list_items::<L>,
            push: list_push::<L>,
        }
    }

    pub fn create(&self) -> Instance {
        (self.create)()
    }

    pub fn items<'a>(&self, container: &'a dyn Any) -> Result<Vec<&'a dyn Any>> {
        (self.items)(container)
    }

    pub fn push(&self, container: &mut dyn Any, item: Instance) -> Result<()> {
        (self.push)(container, item)
    }
}

fn list_items<L: ListContainer>(container: &dyn Any) -> Result<Vec<&dyn Any>> {
    let list = container.downcast_ref::<L>().ok_or_else(Error::cast::<L>)?;
    Ok(list.items().map(|item| item as &dyn Any).collect())
}

fn list_push<L: ListContainer>(container: &mut dyn Any, item: Instance) -> Result<()> {
    let list = container.downcast_mut::<L>().ok_or_else(Error::cast::<L>)?;
    let item = item
        .downcast::<L::Item>()
        .map_err(|_| Error::cast::<L::Item>())?;
    list.push_item(*item);
    Ok(())
}

/// Type-erased [`MapContainer`] capability.
#[derive(Clone, Copy)]
pub struct MapShape {
    pub key: TypeHandle,
    pub value: TypeHandle,
    create: fn() -> Instance,
    entries: EntriesFn,
    insert: InsertFn,
}

impl MapShape {
    pub fn of<M: MapContainer>() -> Self {
        Self {
            key: TypeHandle::of::<M::Key>(),
            value: TypeHandle::of::<M::Value>(),
            create: create_default::<M>,
            entries: map_entries::<M>,
            insert: map_insert::<M>,
        }
    }

    pub fn create(&self) -> Instance {
        (self.create)()
    }

    pub fn entries<'a>(&self, container: &'a dyn Any) -> Result<Vec<(&'a dyn Any, &'a dyn Any)>> {
        (self.entries)(container)
    }

    pub fn insert(&self, container: &mut dyn Any, key: Instance, value: Instance) -> Result<()> {
        (self.insert)(container, key, value)
    }
}

fn map_entries<M: MapContainer>(container: &dyn Any) -> Result<Vec<(&dyn Any, &dyn Any)>> {
    let map = container.downcast_ref::<M>().ok_or_else(Error::cast::<M>)?;
    Ok(map
        .entries()
        .map(|(k, v)| (k as &dyn Any, v as &dyn Any))
        .collect())
}

fn map_insert<M: MapContainer>(container: &mut dyn Any, key: Instance, value: Instance) -> Result<()> {
    let map = container.downcast_mut::<M>().ok_or_else(Error::cast::<M>)?;
    let key = key.downcast::<M::Key>().map_err(|_| Error::cast::<M::Key>())?;
    let value = value
        .downcast::<M::Value>()
        .map_err(|_| Error::cast::<M::Value>())?;
    map.insert_entry(*key, *value);
    Ok(())
}

// ============================================================================
// std containers
// ============================================================================

/// `AmqpType` + `ListContainer` for a std sequence type.
macro_rules! impl_list_container {
    ($container:ident, $push:ident $(, $bound:path)*) => {
        impl<T: AmqpType $(+ $bound)*> ListContainer for $container<T> {
            type Item = T;

            fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
                Box::new(self.iter())
            }

            fn push_item(&mut self, item: T) {
                self.$push(item);
            }
        }

        impl<T: AmqpType $(+ $bound)*> AmqpType for $container<T> {
            fn shape() -> TypeShape {
                TypeShape::opaque().with_list(ListShape::of::<Self>())
            }
        }
    };
}

impl_list_container!(Vec, push);
impl_list_container!(VecDeque, push_back);
impl_list_container!(HashSet, insert, Eq, Hash);
impl_list_container!(BTreeSet, insert, Ord);

/// `AmqpType` + `MapContainer` for a std map type.
macro_rules! impl_map_container {
    ($container:ident $(, $bound:path)*) => {
        impl<K: AmqpType $(+ $bound)*, V: AmqpType> MapContainer for $container<K, V> {
            type Key = K;
            type Value = V;

            fn entries(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
                Box::new(self.iter())
            }

            fn insert_entry(&mut self, key: K, value: V) {
                self.insert(key, value);
            }
        }

        impl<K: AmqpType $(+ $bound)*, V: AmqpType> AmqpType for $container<K, V> {
            fn shape() -> TypeShape {
                TypeShape::opaque().with_map(MapShape::of::<Self>())
            }
        }
    };
}

impl_map_container!(HashMap, Eq, Hash);
impl_map_container!(BTreeMap, Ord);
