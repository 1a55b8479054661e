//! Component type registration and type-erased access.
//!
//! Every component type must be registered in the [`ComponentRegistry`]
//! before it can be attached to a scene object. Registration records the
//! type's [`Serializable`] schema and a small vtable of plain function
//! pointers, so the scene can snapshot, patch and clone components without
//! knowing their concrete type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use retrace_diff::schema::{FieldDescriptor, Serializable};
use retrace_diff::DiffError;
use serde_json::Value;

/// Boxed component storage.
pub(crate) type ErasedComponent = Box<dyn Any + Send + Sync>;

/// Anything that can be attached to a scene object.
pub trait Component: Serializable + Clone + Send + Sync {}

impl<T: Serializable + Clone + Send + Sync> Component for T {}

// ---------------------------------------------------------------------------
// ComponentTypeId
// ---------------------------------------------------------------------------

/// Opaque, lightweight identifier for a registered component type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub(crate) u32);

impl fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// ComponentVtable
// ---------------------------------------------------------------------------

/// Type-erased operations for one registered component type.
#[derive(Clone, Copy)]
pub(crate) struct ComponentVtable {
    pub to_value: fn(&(dyn Any + Send + Sync)) -> Result<Value, DiffError>,
    pub from_value: fn(Value) -> Result<ErasedComponent, DiffError>,
    pub clone_box: fn(&(dyn Any + Send + Sync)) -> Option<ErasedComponent>,
}

impl ComponentVtable {
    fn new<T: Component>() -> Self {
        Self {
            to_value: erased_to_value::<T>,
            from_value: erased_from_value::<T>,
            clone_box: erased_clone::<T>,
        }
    }
}

fn erased_to_value<T: Component>(value: &(dyn Any + Send + Sync)) -> Result<Value, DiffError> {
    let typed = value
        .downcast_ref::<T>()
        .ok_or_else(|| DiffError::TypeMismatch {
            expected: T::TYPE_NAME.to_owned(),
            found: "<foreign component storage>".to_owned(),
        })?;
    serde_json::to_value(typed).map_err(|e| DiffError::Serialization {
        type_name: T::TYPE_NAME.to_owned(),
        details: e.to_string(),
    })
}

fn erased_from_value<T: Component>(value: Value) -> Result<ErasedComponent, DiffError> {
    let typed: T = serde_json::from_value(value).map_err(|e| DiffError::Serialization {
        type_name: T::TYPE_NAME.to_owned(),
        details: e.to_string(),
    })?;
    Ok(Box::new(typed))
}

fn erased_clone<T: Component>(value: &(dyn Any + Send + Sync)) -> Option<ErasedComponent> {
    value
        .downcast_ref::<T>()
        .map(|typed| Box::new(typed.clone()) as ErasedComponent)
}

// ---------------------------------------------------------------------------
// ComponentInfo
// ---------------------------------------------------------------------------

/// Metadata about a registered component type.
#[derive(Clone)]
pub struct ComponentInfo {
    /// Unique ID assigned at registration time.
    pub id: ComponentTypeId,
    /// `Serializable::TYPE_NAME` of the type.
    pub name: &'static str,
    /// Declared fields, used for snapshots and path validation.
    pub fields: &'static [FieldDescriptor],
    /// Rust `TypeId` for runtime type checking.
    pub type_id: TypeId,
    pub(crate) vtable: ComponentVtable,
}

impl fmt::Debug for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// Registry mapping Rust types and type names to [`ComponentTypeId`]s.
///
/// A type can only be registered once; registering it again returns the
/// existing id.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentTypeId>,
    by_name: HashMap<&'static str, ComponentTypeId>,
    /// Indexed by ComponentTypeId.0.
    infos: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under its `TYPE_NAME`.
    ///
    /// # Panics
    ///
    /// Panics if a different type already uses the same `TYPE_NAME`.
    pub fn register<T: Component>(&mut self) -> ComponentTypeId {
        let rust_type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&rust_type_id) {
            return existing;
        }
        if self.by_name.contains_key(T::TYPE_NAME) {
            panic!(
                "component name '{}' is already registered for a different type",
                T::TYPE_NAME
            );
        }

        let id = ComponentTypeId(self.infos.len() as u32);
        self.infos.push(ComponentInfo {
            id,
            name: T::TYPE_NAME,
            fields: T::FIELDS,
            type_id: rust_type_id,
            vtable: ComponentVtable::new::<T>(),
        });
        self.by_type.insert(rust_type_id, id);
        self.by_name.insert(T::TYPE_NAME, id);
        id
    }

    pub fn lookup<T: 'static>(&self) -> Option<ComponentTypeId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<ComponentTypeId> {
        self.by_name.get(name).copied()
    }

    pub fn info(&self, id: ComponentTypeId) -> &ComponentInfo {
        &self.infos[id.0 as usize]
    }

    /// Names of all registered types, in registration order.
    pub fn registered_names(&self) -> Vec<&'static str> {
        self.infos.iter().map(|info| info.name).collect()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
