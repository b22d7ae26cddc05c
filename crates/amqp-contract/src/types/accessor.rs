// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-erased member access.

use super::Instance;
use crate::error::{Error, Result};
use std::any::Any;
use std::sync::Arc;

/// Borrow one field of the target.
pub type GetFn = for<'a> fn(&'a dyn Any) -> Option<&'a dyn Any>;
/// Replace one field of the target with a decoded value.
pub type SetFn = fn(&mut dyn Any, Instance) -> Result<()>;
/// Borrow the embedded base of a derived instance.
pub type ProjectFn = for<'a> fn(&'a dyn Any) -> Option<&'a dyn Any>;
pub type ProjectMutFn = for<'a> fn(&'a mut dyn Any) -> Option<&'a mut dyn Any>;

/// Reads and writes one member of a contract instance.
///
/// Members inherited from a base are reached through the base projection,
/// one `Inherited` layer per level of the chain.
#[derive(Clone)]
pub enum MemberAccessor {
    Field {
        get: GetFn,
        set: SetFn,
    },
    Inherited {
        project: ProjectFn,
        project_mut: ProjectMutFn,
        inner: Arc<MemberAccessor>,
    },
}

impl MemberAccessor {
    pub fn field(get: GetFn, set: SetFn) -> Self {
        MemberAccessor::Field { get, set }
    }

    /// Wrap the accessor of a base member so it applies to the derived type.
    pub fn inherited(project: ProjectFn, project_mut: ProjectMutFn, inner: MemberAccessor) -> Self {
        MemberAccessor::Inherited {
            project,
            project_mut,
            inner: Arc::new(inner),
        }
    }

    /// Current value of the member; `None` when `target` is not the owner.
    pub fn get<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Any> {
        match self {
            MemberAccessor::Field { get, .. } => get(target),
            MemberAccessor::Inherited { project, inner, .. } => inner.get(project(target)?),
        }
    }

    pub fn set(&self, target: &mut dyn Any, value: Instance) -> Result<()> {
        match self {
            MemberAccessor::Field { set, .. } => set(target, value),
            MemberAccessor::Inherited {
                project_mut, inner, ..
            } => {
                let base = project_mut(target).ok_or_else(|| Error::InvalidCast {
                    expected: "base projection of the member owner".to_string(),
                })?;
                inner.set(base, value)
            }
        }
    }
}

/// Move a decoded value into a typed slot.
pub fn assign<T: Any>(slot: &mut T, value: Instance) -> Result<()> {
    *slot = *value.downcast::<T>().map_err(|_| Error::cast::<T>())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Base {
        id: u32,
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
    }

    fn get_id(target: &dyn Any) -> Option<&dyn Any> {
        target.downcast_ref::<Base>().map(|b| &b.id as &dyn Any)
    }

    fn set_id(target: &mut dyn Any, value: Instance) -> Result<()> {
        let base = target.downcast_mut::<Base>().ok_or_else(Error::cast::<Base>)?;
        assign(&mut base.id, value)
    }

    fn project(target: &dyn Any) -> Option<&dyn Any> {
        target.downcast_ref::<Derived>().map(|d| &d.base as &dyn Any)
    }

    fn project_mut(target: &mut dyn Any) -> Option<&mut dyn Any> {
        target.downcast_mut::<Derived>().map(|d| &mut d.base as &mut dyn Any)
    }

    #[test]
    fn test_inherited_accessor_reaches_base_field() {
        let accessor =
            MemberAccessor::inherited(project, project_mut, MemberAccessor::field(get_id, set_id));
        let mut derived = Derived::default();

        accessor.set(&mut derived, Box::new(42u32)).unwrap();
        assert_eq!(derived.base.id, 42);

        let value = accessor.get(&derived).unwrap();
        assert_eq!(value.downcast_ref::<u32>(), Some(&42));

        // wrong owner type
        assert!(accessor.get(&Base::default()).is_none());
    }

    #[test]
    fn test_assign_rejects_wrong_type() {
        let mut slot = 0u32;
        assert!(matches!(
            assign(&mut slot, Box::new("x")),
            Err(Error::InvalidCast { .. })
        ));
        assign(&mut slot, Box::new(5u32)).unwrap();
        assert_eq!(slot, 5);
    }
}
