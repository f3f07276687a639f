//! Shared objects with prototype links.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::{Function, Value, WeakFunction};
use crate::error::Error;

#[derive(Default)]
struct ObjectData {
    prototype: Option<Object>,
    properties: BTreeMap<String, Value>,
    // Weak so that `function.prototype.constructor` does not form an Rc cycle.
    constructor: Option<WeakFunction>,
}

/// A shared, interior-mutable property bag with an optional prototype.
///
/// Cloning an `Object` clones the handle, not the properties.
///
/// # Thread Safety
///
/// This type is NOT thread-safe. Every adapter in this crate assumes a
/// single logical thread of control.
///
/// # Examples
///
/// ```rust
/// use fnadapt::value::{Object, Value};
///
/// let base = Object::new();
/// base.set("greeting", "hello");
///
/// let derived = Object::create(Some(base.clone()));
/// assert_eq!(derived.get("greeting"), Value::from("hello"));
/// assert!(base.is_prototype_of(&derived));
/// assert!(!derived.has_own("greeting"));
/// ```
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    /// Creates an empty object without a prototype.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty object whose prototype is `prototype`.
    pub fn create(prototype: Option<Self>) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            prototype,
            ..ObjectData::default()
        })))
    }

    /// Returns the prototype of this object.
    pub fn prototype(&self) -> Option<Self> {
        self.0.borrow().prototype.clone()
    }

    /// Replaces the prototype of this object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if the new prototype chain would contain this
    /// object.
    pub fn set_prototype(&self, prototype: Option<Self>) -> Result<(), Error> {
        if let Some(candidate) = &prototype
            && (candidate.ptr_eq(self) || self.is_prototype_of(candidate))
        {
            return Err(Error::type_error("cyclic prototype chain"));
        }
        self.0.borrow_mut().prototype = prototype;
        Ok(())
    }

    /// Reads a property, consulting the prototype chain.
    pub fn get(&self, key: &str) -> Value {
        let mut current = Some(self.clone());
        while let Some(object) = current {
            if let Some(value) = object.get_own(key) {
                return value;
            }
            current = object.prototype();
        }
        Value::Undefined
    }

    /// Reads an own property.
    pub fn get_own(&self, key: &str) -> Option<Value> {
        let data = self.0.borrow();
        if let Some(value) = data.properties.get(key) {
            return Some(value.clone());
        }
        if key == "constructor" {
            return data
                .constructor
                .as_ref()
                .and_then(WeakFunction::upgrade)
                .map(Value::Function);
        }
        None
    }

    /// Writes an own property.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.borrow_mut().properties.insert(key.into(), value.into());
    }

    /// Returns `true` if this object has an own property named `key`.
    pub fn has_own(&self, key: &str) -> bool {
        self.get_own(key).is_some()
    }

    /// Returns the names of the own properties in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().properties.keys().cloned().collect()
    }

    /// Returns the function whose `prototype` this object is, if it is
    /// still alive.
    pub fn constructor(&self) -> Option<Function> {
        self.0
            .borrow()
            .constructor
            .as_ref()
            .and_then(WeakFunction::upgrade)
    }

    pub(crate) fn link_constructor(&self, constructor: WeakFunction) {
        self.0.borrow_mut().constructor = Some(constructor);
    }

    /// Returns `true` if this object appears on `other`'s prototype chain.
    pub fn is_prototype_of(&self, other: &Self) -> bool {
        let mut current = other.prototype();
        while let Some(candidate) = current {
            if candidate.ptr_eq(self) {
                return true;
            }
            current = candidate.prototype();
        }
        false
    }

    /// Returns `true` if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Object")
            .field("keys", &self.keys())
            .field("has_prototype", &self.0.borrow().prototype.is_some())
            .finish()
    }
}
