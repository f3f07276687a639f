//! A small, single-threaded dynamic value model.
//!
//! The adapters in this crate operate on callables that observe a receiver,
//! can be invoked in constructor mode, and declare an arity. This module
//! supplies exactly that much of a scripting host:
//!
//! - [`Value`]: the dynamically typed value passed around as receivers,
//!   arguments and results
//! - [`Object`]: a shared property bag with a prototype link
//! - [`Function`]: a shared callable carrying `name`, `length` and an
//!   optional `prototype`
//!
//! # Examples
//!
//! ```rust
//! use fnadapt::value::{Function, Object, Value};
//!
//! let introduce = Function::native("introduce", 2, |this, arguments| {
//!     let name = this.get("name");
//!     Ok(Value::from(format!("{name} is a {} from {}", arguments[0], arguments[1])))
//! });
//!
//! let person = Object::new();
//! person.set("name", "Alice");
//!
//! let sentence = introduce
//!     .call(&Value::from(person), &[Value::from("developer"), Value::from("USA")])
//!     .unwrap();
//! assert_eq!(sentence, Value::from("Alice is a developer from USA"));
//! ```

mod function;
mod object;

pub use function::Function;
pub use object::Object;

pub(crate) use function::{BoundFunction, FunctionKind, WeakFunction};

use std::fmt;
use std::rc::Rc;

use crate::error::Error;

/// A dynamically typed value.
///
/// Equality follows strict-equality rules: primitives compare by value,
/// arrays, objects and functions compare by identity. `NaN` is not equal
/// to itself.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The absent value.
    #[default]
    Undefined,
    /// The explicit empty value.
    Null,
    /// A boolean.
    Boolean(bool),
    /// A double precision number.
    Number(f64),
    /// An immutable string.
    String(Rc<str>),
    /// An immutable, shared list of values.
    Array(Rc<[Value]>),
    /// A shared object.
    Object(Object),
    /// A shared function.
    Function(Function),
}

impl Value {
    /// Returns the name of this value's type as used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
        }
    }

    /// Returns `true` for arrays, objects and functions.
    ///
    /// A constructor-mode invocation returns the target's result instead of
    /// the freshly allocated instance exactly when the result is object-like.
    pub const fn is_object_like(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_) | Self::Function(_))
    }

    /// Returns `true` if this value is `undefined` or `null`.
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Returns the number if this value is one.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the string slice if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(string) => Some(string),
            _ => None,
        }
    }

    /// Returns the object if this value is one.
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the function if this value is one.
    pub const fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Loosely converts this value to a number.
    ///
    /// `undefined` becomes `NaN`, `null` becomes `0`, booleans become `0` or
    /// `1`, numeric strings are parsed and everything else is `NaN`.
    ///
    /// Strings are read as a script console reads them: decimal literals
    /// with an optional exponent, `Infinity` with an optional sign, and
    /// unsigned `0x`/`0o`/`0b` integers. Spellings such as `inf` or `nan`
    /// are not numbers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fnadapt::value::Value;
    ///
    /// assert_eq!(Value::from(" 12 ").to_number(), 12.0);
    /// assert_eq!(Value::Null.to_number(), 0.0);
    /// assert!(Value::Undefined.to_number().is_nan());
    /// assert!(Value::from("nan").to_number().is_nan());
    /// assert_eq!(Value::from("0x1f").to_number(), 31.0);
    /// ```
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Boolean(flag) => f64::from(u8::from(*flag)),
            Self::Number(number) => *number,
            Self::String(string) => {
                let trimmed = string.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    parse_numeric(trimmed)
                }
            }
            Self::Undefined | Self::Array(_) | Self::Object(_) | Self::Function(_) => f64::NAN,
        }
    }

    /// Reads a property.
    ///
    /// Objects consult their prototype chain. Functions expose `name`,
    /// `length` and `prototype`; arrays expose `length` and their indices.
    /// Anything else reads as `undefined`.
    pub fn get(&self, key: &str) -> Self {
        match self {
            Self::Object(object) => object.get(key),
            Self::Function(function) => match key {
                "name" => Self::from(function.name()),
                "length" => Self::from(function.length()),
                "prototype" => function.prototype().map_or(Self::Undefined, Self::Object),
                _ => Self::Undefined,
            },
            Self::Array(elements) => {
                if key == "length" {
                    return Self::from(elements.len());
                }
                key.parse::<usize>()
                    .ok()
                    .and_then(|index| elements.get(index).cloned())
                    .unwrap_or_default()
            }
            _ => Self::Undefined,
        }
    }

    /// Returns the function this value holds, or a type error naming the
    /// operation that required a callable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if this value is not a function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fnadapt::value::Value;
    ///
    /// let error = Value::from(1).expect_function("once").unwrap_err();
    /// assert_eq!(
    ///     error.to_string(),
    ///     "TypeError: once target must be callable, found number"
    /// );
    /// ```
    pub fn expect_function(&self, operation: &str) -> Result<&Function, Error> {
        self.as_function().ok_or_else(|| {
            Error::type_error(format!(
                "{operation} target must be callable, found {}",
                self.type_name()
            ))
        })
    }

    /// Calls this value as a function with the given receiver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if this value is not a function, otherwise
    /// whatever the function raises.
    pub fn call(&self, this: &Self, arguments: &[Self]) -> Result<Self, Error> {
        self.expect_function("call")?.call(this, arguments)
    }

    /// Calls this value as a function with an `undefined` receiver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if this value is not a function, otherwise
    /// whatever the function raises.
    pub fn invoke(&self, arguments: &[Self]) -> Result<Self, Error> {
        self.call(&Self::Undefined, arguments)
    }

    /// Checks whether `constructor.prototype` appears on this value's
    /// prototype chain.
    ///
    /// Primitives, arrays and functions are never instances.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if `constructor` has no prototype.
    pub fn instance_of(&self, constructor: &Function) -> Result<bool, Error> {
        let prototype = constructor.prototype().ok_or_else(|| {
            Error::type_error(format!(
                "{} has no prototype to check instances against",
                constructor.display_name()
            ))
        })?;
        Ok(match self {
            Self::Object(object) => prototype.is_prototype_of(object),
            _ => false,
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(left), Self::Boolean(right)) => left == right,
            #[allow(clippy::float_cmp)]
            (Self::Number(left), Self::Number(right)) => left == right,
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Array(left), Self::Array(right)) => Rc::ptr_eq(left, right),
            (Self::Object(left), Self::Object(right)) => left.ptr_eq(right),
            (Self::Function(left), Self::Function(right)) => left.ptr_eq(right),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => formatter.write_str("undefined"),
            Self::Null => formatter.write_str("null"),
            Self::Boolean(flag) => write!(formatter, "{flag}"),
            Self::Number(number) => format_number(*number, formatter),
            Self::String(string) => formatter.write_str(string),
            Self::Array(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        formatter.write_str(",")?;
                    }
                    if !element.is_nullish() {
                        write!(formatter, "{element}")?;
                    }
                }
                Ok(())
            }
            Self::Object(_) => formatter.write_str("[object Object]"),
            Self::Function(function) => {
                write!(formatter, "function {}() {{ [native code] }}", function.name())
            }
        }
    }
}

fn format_number(number: f64, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
    if number.is_nan() {
        formatter.write_str("NaN")
    } else if number.is_infinite() {
        formatter.write_str(if number > 0.0 { "Infinity" } else { "-Infinity" })
    } else if number == 0.0 {
        formatter.write_str("0")
    } else if number.fract() == 0.0 && number.abs() < 1e21 {
        write!(formatter, "{number:.0}")
    } else {
        write!(formatter, "{number}")
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Boolean(flag)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Self::Number(f64::from(number))
    }
}

impl From<u32> for Value {
    fn from(number: u32) -> Self {
        Self::Number(f64::from(number))
    }
}

impl From<usize> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(number: usize) -> Self {
        Self::Number(number as f64)
    }
}

impl From<&str> for Value {
    fn from(string: &str) -> Self {
        Self::String(Rc::from(string))
    }
}

impl From<String> for Value {
    fn from(string: String) -> Self {
        Self::String(Rc::from(string))
    }
}

impl From<Vec<Self>> for Value {
    fn from(elements: Vec<Self>) -> Self {
        Self::Array(Rc::from(elements))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

fn parse_numeric(text: &str) -> f64 {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &text[2..];
        if digits.is_empty() || !digits.chars().all(|digit| digit.is_digit(radix)) {
            return f64::NAN;
        }
        return digits.chars().fold(0.0, |total, digit| {
            total * f64::from(radix) + f64::from(digit.to_digit(radix).unwrap_or(0))
        });
    }

    let decimal = unsigned
        .chars()
        .all(|character| character.is_ascii_digit() || matches!(character, '.' | 'e' | 'E' | '+' | '-'));
    if decimal {
        text.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::from(1), "1")]
    #[case(Value::from(1.5), "1.5")]
    #[case(Value::from(-0.0), "0")]
    #[case(Value::from(f64::NAN), "NaN")]
    #[case(Value::from(f64::NEG_INFINITY), "-Infinity")]
    #[case(Value::Undefined, "undefined")]
    #[case(Value::Null, "null")]
    #[case(Value::from(vec![Value::from("a"), Value::Null, Value::from(2)]), "a,,2")]
    #[case(Value::from(Object::new()), "[object Object]")]
    fn test_display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[rstest]
    #[case("42", 42.0)]
    #[case("  -1.5e2 ", -150.0)]
    #[case(".5", 0.5)]
    #[case("", 0.0)]
    #[case("0b101", 5.0)]
    #[case("0o17", 15.0)]
    #[case("0XfF", 255.0)]
    #[case("Infinity", f64::INFINITY)]
    #[case("-Infinity", f64::NEG_INFINITY)]
    fn test_numeric_strings_convert(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(Value::from(text).to_number(), expected);
    }

    #[rstest]
    #[case("inf")]
    #[case("infinity")]
    #[case("NaN")]
    #[case("-nan")]
    #[case("12px")]
    #[case("0x")]
    #[case("-0x10")]
    #[case("1_000")]
    fn test_non_numeric_strings_are_nan(#[case] text: &str) {
        assert!(Value::from(text).to_number().is_nan());
    }

    #[test]
    fn test_nan_is_not_equal_to_itself() {
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
    }

    #[test]
    fn test_objects_compare_by_identity() {
        let object = Object::new();
        assert_eq!(Value::from(object.clone()), Value::from(object));
        assert_ne!(Value::from(Object::new()), Value::from(Object::new()));
    }

    #[test]
    fn test_array_reads_length_and_indices() {
        let array = Value::from(vec![Value::from(4), Value::from(5)]);
        assert_eq!(array.get("length"), Value::from(2));
        assert_eq!(array.get("1"), Value::from(5));
        assert_eq!(array.get("7"), Value::Undefined);
    }

    #[test]
    fn test_expect_function_reports_type() {
        let error = Value::Null.expect_function("bind").unwrap_err();
        assert_eq!(
            error,
            Error::type_error("bind target must be callable, found null")
        );
    }
}
