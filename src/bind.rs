//! Context binding.
//!
//! [`bind`] fixes the receiver a function observes and optionally a run of
//! leading arguments. The result is an ordinary [`Function`], so it can be
//! called, applied, constructed, curried or bound again.
//!
//! # Semantics
//!
//! ```text
//! bind(f, ctx, a...)(b...)             = f.call(ctx, a ++ b)
//! construct(bind(f, ctx, a...), b...)  = construct(f, a ++ b)
//! bind(bind(f, c1, a...), c2, b...)    = bind(f, c1, a ++ b)
//! ```
//!
//! The first binding wins: binding an already bound function cannot change
//! its receiver, it only appends further preset arguments.
//!
//! [`BindCache`] hands out one bound function per target and context, so
//! code that binds the same handler repeatedly gets back an identical
//! function while it is still in use.
//!
//! # Examples
//!
//! ```rust
//! use fnadapt::bind::bind;
//! use fnadapt::value::{Function, Value};
//!
//! let log = Function::native("log", 2, |_, arguments| {
//!     Ok(Value::from(format!("[{}] {}", arguments[0], arguments[1])))
//! });
//!
//! let log_error = bind(&Value::from(log), Value::Null, vec![Value::from("ERROR")]).unwrap();
//! assert_eq!(log_error.name(), "bound log");
//! assert_eq!(log_error.length(), 1);
//! assert_eq!(
//!     log_error.invoke(&[Value::from("Database connection failed")]).unwrap(),
//!     Value::from("[ERROR] Database connection failed")
//! );
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::value::{BoundFunction, Function, FunctionKind, Object, Value, WeakFunction};

/// Binds `target` to `context` with `preset` leading arguments.
///
/// # Errors
///
/// Returns [`Error::Type`] if `target` is not a function. The check happens
/// here, never at call time.
pub fn bind(target: &Value, context: Value, preset: Vec<Value>) -> Result<Function, Error> {
    Ok(target.expect_function("bind")?.bind(context, preset))
}

impl Function {
    /// Binds this function to `context` with `preset` leading arguments.
    ///
    /// The bound function is named `bound <name>` and declares
    /// `length - preset.len()` parameters, never fewer than zero. When this
    /// function has a prototype, the bound function gets a fresh prototype
    /// inheriting from it, so instances constructed through the bound
    /// function are instances of this function too.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fnadapt::value::{Function, Object, Value};
    ///
    /// let show_id = Function::native("showId", 0, |this, _| Ok(this.get("id")));
    ///
    /// let first = Object::new();
    /// first.set("id", 1);
    /// let second = Object::new();
    /// second.set("id", 2);
    ///
    /// let bound_once = show_id.bind(Value::from(first), Vec::new());
    /// let bound_twice = bound_once.bind(Value::from(second), Vec::new());
    /// assert_eq!(bound_twice.invoke(&[]).unwrap(), Value::from(1));
    /// ```
    pub fn bind(&self, context: Value, preset: Vec<Value>) -> Self {
        let name = format!("bound {}", self.name());
        let length = self.length().saturating_sub(preset.len());
        let prototype = self.prototype().map(|inherited| {
            let prototype = Object::create(Some(inherited));
            prototype.link_constructor(self.downgrade());
            prototype
        });
        tracing::debug!(
            target_name = self.display_name(),
            preset = preset.len(),
            constructible = prototype.is_some(),
            "bound function created"
        );
        Self::from_parts(
            name,
            length,
            prototype,
            FunctionKind::Bound(BoundFunction {
                target: self.clone(),
                this: context,
                arguments: Rc::from(preset),
            }),
        )
    }

    /// Returns the function this one was bound from, if it is a bound function.
    pub fn bound_target(&self) -> Option<&Self> {
        match self.kind() {
            FunctionKind::Bound(bound) => Some(&bound.target),
            _ => None,
        }
    }

    /// Returns the receiver fixed by [`Function::bind`], if this is a bound
    /// function.
    pub fn bound_this(&self) -> Option<&Value> {
        match self.kind() {
            FunctionKind::Bound(bound) => Some(&bound.this),
            _ => None,
        }
    }

    /// Returns the preset arguments fixed by [`Function::bind`], if this is
    /// a bound function.
    pub fn bound_arguments(&self) -> Option<&[Value]> {
        match self.kind() {
            FunctionKind::Bound(bound) => Some(&*bound.arguments),
            _ => None,
        }
    }
}

/// A cache of bound functions keyed by target and context identity.
///
/// [`BindCache::bind`] returns the same [`Function`] for the same target and
/// context as long as some handle to that bound function is still alive.
/// The cache only holds weak references, so it never keeps a target, a
/// context or a bound function alive on its own; once every handle is
/// dropped the next lookup binds afresh.
///
/// Contexts match by strict equality: objects by identity, primitives by
/// value. A `NaN` context never matches.
///
/// # Examples
///
/// ```rust
/// use fnadapt::bind::BindCache;
/// use fnadapt::value::{Function, Object, Value};
///
/// let cache = BindCache::new();
/// let handler = Value::from(Function::native("onClick", 0, |this, _| Ok(this.get("id"))));
/// let button = Value::from(Object::new());
///
/// let first = cache.bind(&handler, button.clone()).unwrap();
/// let second = cache.bind(&handler, button).unwrap();
/// assert!(first.ptr_eq(&second));
/// ```
#[derive(Default)]
pub struct BindCache {
    // Target address -> weak bound functions. Entries are validated on
    // lookup, so a reused address cannot produce a false hit.
    entries: RefCell<HashMap<usize, Vec<WeakFunction>>>,
}

impl BindCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bound function for `target` and `context`, binding it
    /// with no preset arguments if no live one is cached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if `target` is not a function.
    pub fn bind(&self, target: &Value, context: Value) -> Result<Function, Error> {
        let target = target.expect_function("bind")?;
        let mut entries = self.entries.borrow_mut();
        let bucket = entries.entry(target.address()).or_default();

        let mut hit = None;
        bucket.retain(|weak| {
            let Some(bound) = weak.upgrade() else {
                return false;
            };
            if hit.is_none()
                && bound.bound_target().is_some_and(|inner| inner.ptr_eq(target))
                && bound.bound_this() == Some(&context)
            {
                hit = Some(bound);
            }
            true
        });
        if let Some(bound) = hit {
            tracing::trace!(target_name = target.display_name(), "bound function reused");
            return Ok(bound);
        }

        let bound = target.bind(context, Vec::new());
        bucket.push(bound.downgrade());
        Ok(bound)
    }

    /// Returns the number of cached bound functions that are still alive.
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .values()
            .flatten()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }

    /// Returns `true` if no live bound function is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops entries whose bound function is gone.
    pub fn prune(&self) {
        self.entries.borrow_mut().retain(|_, bucket| {
            bucket.retain(|weak| weak.upgrade().is_some());
            !bucket.is_empty()
        });
    }
}

impl fmt::Debug for BindCache {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("BindCache")
            .field("live", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    fn person() -> Function {
        Function::native("Person", 1, |this, arguments| {
            if let Some(instance) = this.as_object() {
                instance.set("name", arguments.first().cloned().unwrap_or_default());
            }
            Ok(Value::Undefined)
        })
    }

    fn collect_arguments() -> Function {
        Function::native("collect", 3, |this, arguments| {
            let mut all = vec![this.clone()];
            all.extend_from_slice(arguments);
            Ok(Value::from(all))
        })
    }

    #[rstest]
    #[case(Value::from(1))]
    #[case(Value::from("function"))]
    #[case(Value::Undefined)]
    #[case(Value::from(Object::new()))]
    fn test_bind_rejects_non_callable_target(#[case] target: Value) {
        let error = bind(&target, Value::Null, Vec::new()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Type);
    }

    #[rstest]
    fn test_bound_call_prepends_preset_arguments() {
        let context = Value::from(Object::new());
        let bound = collect_arguments().bind(context.clone(), vec![Value::from(1)]);
        let result = bound.invoke(&[Value::from(2), Value::from(3)]).unwrap();
        assert_eq!(result.get("0"), context);
        assert_eq!(result.get("1"), Value::from(1));
        assert_eq!(result.get("3"), Value::from(3));
        assert_eq!(result.get("length"), Value::from(4));
    }

    #[rstest]
    fn test_bound_call_ignores_call_site_receiver() {
        let bound = collect_arguments().bind(Value::from("fixed"), Vec::new());
        let result = bound.call(&Value::from("other"), &[]).unwrap();
        assert_eq!(result.get("0"), Value::from("fixed"));
    }

    #[rstest]
    #[case(0, 3)]
    #[case(2, 1)]
    #[case(5, 0)]
    fn test_bound_length_subtracts_presets(#[case] presets: usize, #[case] expected: usize) {
        let bound = collect_arguments().bind(Value::Null, vec![Value::Null; presets]);
        assert_eq!(bound.length(), expected);
    }

    #[rstest]
    fn test_rebinding_keeps_first_context_and_appends_presets() {
        let first = collect_arguments().bind(Value::from("first"), vec![Value::from(1)]);
        let second = first.bind(Value::from("second"), vec![Value::from(2)]);
        let result = second.invoke(&[Value::from(3)]).unwrap();
        assert_eq!(result.get("0"), Value::from("first"));
        assert_eq!(result.get("1"), Value::from(1));
        assert_eq!(result.get("2"), Value::from(2));
        assert_eq!(result.get("3"), Value::from(3));
        assert_eq!(second.name(), "bound bound collect");
    }

    #[rstest]
    fn test_construct_ignores_bound_context() {
        let context = Object::new();
        let create_alice = person().bind(Value::from(context.clone()), vec![Value::from("Alice")]);
        let alice = create_alice.construct(&[]).unwrap();
        assert_eq!(alice.get("name"), Value::from("Alice"));
        assert!(!context.has_own("name"));
    }

    #[rstest]
    fn test_constructed_instance_keeps_is_a_relationship() {
        let person = person();
        let create_alice = person.bind(Value::Null, vec![Value::from("Alice")]);
        let alice = create_alice.construct(&[]).unwrap();
        assert!(alice.instance_of(&person).unwrap());
        assert!(alice.instance_of(&create_alice).unwrap());
    }

    #[rstest]
    fn test_bound_prototype_points_back_to_target() {
        let person = person();
        let bound = person.bind(Value::Null, Vec::new());
        let prototype = bound.prototype().unwrap();
        assert!(prototype.constructor().unwrap().ptr_eq(&person));
        assert!(person.prototype().unwrap().is_prototype_of(&prototype));
    }

    #[rstest]
    fn test_binding_a_method_is_not_constructible() {
        let method = Function::method("greet", 0, |_, _| Ok(Value::Undefined));
        let bound = method.bind(Value::Null, Vec::new());
        assert!(!bound.is_constructor());
        assert_eq!(bound.construct(&[]).unwrap_err().kind(), ErrorKind::Type);
    }

    #[rstest]
    fn test_bound_introspection() {
        let target = collect_arguments();
        let bound = target.bind(Value::from(9), vec![Value::from(1)]);
        assert!(bound.bound_target().unwrap().ptr_eq(&target));
        assert_eq!(bound.bound_this(), Some(&Value::from(9)));
        assert_eq!(bound.bound_arguments(), Some(&[Value::from(1)][..]));
        assert!(target.bound_target().is_none());
    }

    #[rstest]
    fn test_cache_returns_same_function_for_same_pair() {
        let cache = BindCache::new();
        let target = Value::from(collect_arguments());
        let context = Value::from(Object::new());

        let first = cache.bind(&target, context.clone()).unwrap();
        let second = cache.bind(&target, context.clone()).unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(first.bound_this(), Some(&context));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    #[case(Value::from(Object::new()))]
    #[case(Value::from("other"))]
    #[case(Value::Null)]
    fn test_cache_separates_contexts(#[case] other: Value) {
        let cache = BindCache::new();
        let target = Value::from(collect_arguments());

        let first = cache.bind(&target, Value::from(Object::new())).unwrap();
        let second = cache.bind(&target, other).unwrap();
        assert!(!first.ptr_eq(&second));
        assert_eq!(cache.len(), 2);
    }

    #[rstest]
    fn test_cache_separates_targets() {
        let cache = BindCache::new();
        let context = Value::from(7);
        let first = cache.bind(&Value::from(collect_arguments()), context.clone()).unwrap();
        let second = cache.bind(&Value::from(collect_arguments()), context).unwrap();
        assert!(!first.ptr_eq(&second));
    }

    #[rstest]
    fn test_cache_does_not_keep_functions_or_contexts_alive() {
        let cache = BindCache::new();
        let target = collect_arguments();
        let context = Object::new();
        let bound = cache.bind(&Value::from(target.clone()), Value::from(context.clone())).unwrap();
        let weak_target = target.downgrade();
        let weak_bound = bound.downgrade();

        drop(bound);
        drop(target);
        assert!(weak_bound.upgrade().is_none());
        assert!(weak_target.upgrade().is_none());
        assert!(cache.is_empty());
        cache.prune();
        assert!(cache.entries.borrow().is_empty());
        drop(context);
    }

    #[rstest]
    fn test_cache_rebinds_after_release() {
        let cache = BindCache::new();
        let target = Value::from(collect_arguments());
        let context = Value::from(1);
        drop(cache.bind(&target, context.clone()).unwrap());

        let rebound = cache.bind(&target, context.clone()).unwrap();
        assert_eq!(rebound.invoke(&[]).unwrap().get("0"), context);
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn test_cache_rejects_non_callable_target() {
        let cache = BindCache::new();
        assert_eq!(cache.bind(&Value::from(1), Value::Null).unwrap_err().kind(), ErrorKind::Type);
        assert!(cache.entries.borrow().is_empty());
    }
}
