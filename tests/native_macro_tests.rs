//! Integration tests for the `native!` macro.

#![cfg(feature = "derive")]

use fnadapt::curry::curry;
use fnadapt::native;
use fnadapt::value::{Object, Value};
use fnadapt::{Error, ErrorKind};
use rstest::rstest;

// =============================================================================
// Arity Inference
// =============================================================================

#[rstest]
fn arity_counts_parameters_after_receiver() {
    let none = native!("none", |_this| Ok(Value::Undefined));
    let two = native!("two", |_this, _a, _b| Ok(Value::Undefined));
    let four = native!(|_this, _a, _b, _c, _d| Ok(Value::Undefined));

    assert_eq!(none.length(), 0);
    assert_eq!(two.length(), 2);
    assert_eq!(four.length(), 4);
    assert_eq!(four.name(), "");
    assert_eq!(four.display_name(), "anonymous");
}

#[rstest]
fn missing_arguments_are_undefined() {
    let pair = native!("pair", |_this, first, second| Ok(Value::from(vec![first, second])));
    let result = pair.invoke(&[Value::from(1)]).unwrap();
    assert_eq!(result.get("1"), Value::Undefined);
    assert_eq!(result.get("length"), Value::from(2));
}

#[rstest]
fn receiver_binding_observes_this() {
    let read = native!("read", |this, key| Ok(this.get(key.as_str().unwrap_or_default())));
    let context = Object::new();
    context.set("answer", 42);
    assert_eq!(
        read.call(&Value::from(context), &[Value::from("answer")]).unwrap(),
        Value::from(42)
    );
}

#[rstest]
fn typed_parameters_and_return_type() {
    let add = native!("add", |_this: &Value, a: Value, b: Value| -> Result<Value, Error> {
        Ok(Value::from(a.to_number() + b.to_number()))
    });
    assert_eq!(add.invoke(&[Value::from(2), Value::from(3)]).unwrap(), Value::from(5));
}

#[rstest]
fn question_mark_propagates_from_body() {
    let checked = native!("checked", |_this, callback| {
        let function = callback.expect_function("checked")?;
        function.invoke(&[])
    });
    let error = checked.invoke(&[Value::from(1)]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Type);
}

// =============================================================================
// Integration with Adapters
// =============================================================================

#[rstest]
fn inferred_arity_drives_curry() {
    let volume = native!("volume", |_this, width, height, depth| {
        Ok(Value::from(width.to_number() * height.to_number() * depth.to_number()))
    });
    let curried = curry(&Value::from(volume)).unwrap();
    let result = curried
        .invoke(&[Value::from(2)])
        .and_then(|step| step.invoke(&[Value::from(3)]))
        .and_then(|step| step.invoke(&[Value::from(4)]))
        .unwrap();
    assert_eq!(result, Value::from(24));
}

#[rstest]
fn macro_functions_are_constructible() {
    let point = native!("Point", |this, x, y| {
        if let Some(instance) = this.as_object() {
            instance.set("x", x);
            instance.set("y", y);
        }
        Ok(Value::Undefined)
    });
    let origin = point.construct(&[Value::from(0), Value::from(0)]).unwrap();
    assert!(origin.instance_of(&point).unwrap());
    assert_eq!(origin.get("x"), Value::from(0));
}
