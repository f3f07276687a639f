//! Shared callables.

use std::fmt;
use std::rc::{Rc, Weak};

use super::{Object, Value};
use crate::error::Error;

// Largest `length` an array-like argument list may declare.
const MAX_ARRAY_LIKE_LENGTH: f64 = 4_294_967_295.0;

type NativeBody = dyn Fn(&Value, &[Value]) -> Result<Value, Error>;
type ArrowBody = dyn Fn(&[Value]) -> Result<Value, Error>;

pub(crate) enum FunctionKind {
    /// Observes the receiver it is called with.
    Native(Box<NativeBody>),
    /// Never observes a receiver.
    Arrow(Box<ArrowBody>),
    /// Forwards to another function with a fixed receiver and leading arguments.
    Bound(BoundFunction),
}

pub(crate) struct BoundFunction {
    pub(crate) target: Function,
    pub(crate) this: Value,
    pub(crate) arguments: Rc<[Value]>,
}

impl BoundFunction {
    fn concat(&self, arguments: &[Value]) -> Vec<Value> {
        let mut all = Vec::with_capacity(self.arguments.len() + arguments.len());
        all.extend_from_slice(&self.arguments);
        all.extend_from_slice(arguments);
        all
    }
}

pub(crate) struct FunctionData {
    name: String,
    length: usize,
    prototype: Option<Object>,
    kind: FunctionKind,
}

#[derive(Clone)]
pub(crate) struct WeakFunction(Weak<FunctionData>);

impl WeakFunction {
    pub(crate) fn upgrade(&self) -> Option<Function> {
        self.0.upgrade().map(Function)
    }
}

/// A shared callable.
///
/// Every function carries a `name`, a `length` (its declared arity) and
/// optionally a `prototype` object. Only functions with a prototype can be
/// invoked in constructor mode.
///
/// There are three ways to build one:
///
/// | Constructor            | Observes receiver | Constructible |
/// |------------------------|-------------------|---------------|
/// | [`Function::native`]   | yes               | yes           |
/// | [`Function::method`]   | yes               | no            |
/// | [`Function::arrow`]    | no                | no            |
///
/// # Examples
///
/// ```rust
/// use fnadapt::value::{Function, Value};
///
/// let person = Function::native("Person", 1, |this, arguments| {
///     if let Some(instance) = this.as_object() {
///         instance.set("name", arguments.first().cloned().unwrap_or_default());
///     }
///     Ok(Value::Undefined)
/// });
///
/// let alice = person.construct(&[Value::from("Alice")]).unwrap();
/// assert_eq!(alice.get("name"), Value::from("Alice"));
/// assert!(alice.instance_of(&person).unwrap());
/// ```
#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

impl Function {
    /// Creates a constructible function that observes its receiver.
    ///
    /// A fresh prototype object is allocated whose `constructor` refers back
    /// to the new function.
    pub fn native<F>(name: impl Into<String>, length: usize, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, Error> + 'static,
    {
        let name = name.into();
        Self(Rc::new_cyclic(|weak| {
            let prototype = Object::new();
            prototype.link_constructor(WeakFunction(weak.clone()));
            FunctionData {
                name,
                length,
                prototype: Some(prototype),
                kind: FunctionKind::Native(Box::new(body)),
            }
        }))
    }

    /// Creates a function that observes its receiver but cannot construct.
    pub fn method<F>(name: impl Into<String>, length: usize, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, Error> + 'static,
    {
        Self::from_parts(
            name.into(),
            length,
            None,
            FunctionKind::Native(Box::new(body)),
        )
    }

    /// Creates a function that ignores any receiver and cannot construct.
    ///
    /// Whatever `this` the body needs has to be captured by the closure.
    pub fn arrow<F>(name: impl Into<String>, length: usize, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Error> + 'static,
    {
        Self::from_parts(
            name.into(),
            length,
            None,
            FunctionKind::Arrow(Box::new(body)),
        )
    }

    pub(crate) fn from_parts(
        name: String,
        length: usize,
        prototype: Option<Object>,
        kind: FunctionKind,
    ) -> Self {
        Self(Rc::new(FunctionData {
            name,
            length,
            prototype,
            kind,
        }))
    }

    /// Returns the name of this function. May be empty.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the name, or `anonymous` when it is empty.
    pub fn display_name(&self) -> &str {
        if self.0.name.is_empty() {
            "anonymous"
        } else {
            &self.0.name
        }
    }

    /// Returns the declared number of parameters.
    pub fn length(&self) -> usize {
        self.0.length
    }

    /// Returns the prototype object given to instances built by this function.
    pub fn prototype(&self) -> Option<Object> {
        self.0.prototype.clone()
    }

    /// Returns `true` if [`Function::construct`] can succeed.
    pub fn is_constructor(&self) -> bool {
        self.0.prototype.is_some()
    }

    /// Returns `true` if both handles refer to the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn kind(&self) -> &FunctionKind {
        &self.0.kind
    }

    pub(crate) fn downgrade(&self) -> WeakFunction {
        WeakFunction(Rc::downgrade(&self.0))
    }

    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.0).addr()
    }

    /// Invokes this function with `this` as receiver.
    ///
    /// # Errors
    ///
    /// Propagates whatever the function body raises.
    pub fn call(&self, this: &Value, arguments: &[Value]) -> Result<Value, Error> {
        match &self.0.kind {
            FunctionKind::Native(body) => body(this, arguments),
            FunctionKind::Arrow(body) => body(arguments),
            FunctionKind::Bound(bound) => bound.target.call(&bound.this, &bound.concat(arguments)),
        }
    }

    /// Invokes this function with an `undefined` receiver.
    ///
    /// # Errors
    ///
    /// Propagates whatever the function body raises.
    pub fn invoke(&self, arguments: &[Value]) -> Result<Value, Error> {
        self.call(&Value::Undefined, arguments)
    }

    /// Invokes this function with `this` as receiver and the elements of an
    /// array-like value as arguments.
    ///
    /// `undefined` and `null` supply no arguments. Arrays supply their
    /// elements. Objects supply `object[0..length]`, where `length` is read
    /// from the object and truncated to a non-negative integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if `arguments` is any other primitive or a
    /// function, or an object whose `length` exceeds `2^32 - 1`, otherwise
    /// whatever the function raises.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fnadapt::value::{Function, Object, Value};
    ///
    /// let sum = Function::native("calculate", 0, |this, arguments| {
    ///     let base = this.get("base").to_number();
    ///     Ok(Value::from(arguments.iter().fold(base, |total, value| total + value.to_number())))
    /// });
    ///
    /// let context = Object::new();
    /// context.set("base", 10);
    ///
    /// let array_like = Object::new();
    /// array_like.set("0", 5);
    /// array_like.set("1", 6);
    /// array_like.set("length", 2);
    ///
    /// let result = sum.apply(&Value::from(context), &Value::from(array_like)).unwrap();
    /// assert_eq!(result, Value::from(21));
    /// ```
    pub fn apply(&self, this: &Value, arguments: &Value) -> Result<Value, Error> {
        let list = match arguments {
            Value::Undefined | Value::Null => Vec::new(),
            Value::Array(elements) => elements.to_vec(),
            Value::Object(object) => {
                let length = object.get("length").to_number();
                if length > MAX_ARRAY_LIKE_LENGTH {
                    return Err(Error::type_error(format!(
                        "argument list length {length} exceeds {MAX_ARRAY_LIKE_LENGTH}"
                    )));
                }
                let length = if length > 0.0 {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let length = length.trunc() as usize;
                    length
                } else {
                    0
                };
                (0..length)
                    .map(|index| object.get(&index.to_string()))
                    .collect()
            }
            other => {
                return Err(Error::type_error(format!(
                    "argument list must be array-like, found {}",
                    other.type_name()
                )));
            }
        };
        self.call(this, &list)
    }

    /// Invokes this function in constructor mode.
    ///
    /// A new object whose prototype is [`Function::prototype`] is allocated
    /// and passed as receiver. The object is returned unless the body
    /// returns an object-like value, which is returned instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if this function has no prototype, otherwise
    /// whatever the body raises.
    pub fn construct(&self, arguments: &[Value]) -> Result<Value, Error> {
        let prototype = self.prototype().ok_or_else(|| {
            Error::type_error(format!("{} is not a constructor", self.display_name()))
        })?;
        let instance = Value::Object(Object::create(Some(prototype)));
        let result = self.call_as_constructor(&instance, arguments)?;
        Ok(if result.is_object_like() {
            result
        } else {
            instance
        })
    }

    // Bound receivers are skipped all the way down a rebind chain.
    fn call_as_constructor(&self, instance: &Value, arguments: &[Value]) -> Result<Value, Error> {
        match &self.0.kind {
            FunctionKind::Native(body) => body(instance, arguments),
            FunctionKind::Arrow(body) => body(arguments),
            FunctionKind::Bound(bound) => bound
                .target
                .call_as_constructor(instance, &bound.concat(arguments)),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Function")
            .field("name", &self.0.name)
            .field("length", &self.0.length)
            .field("constructible", &self.is_constructor())
            .finish_non_exhaustive()
    }
}
