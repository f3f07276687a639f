//! Error types shared by every adapter.
//!
//! Adapters raise exactly one error of their own, [`Error::Type`], when a
//! value handed to a constructor cannot be invoked. Everything a wrapped
//! target raises travels back to the caller untouched.

use crate::value::Value;

/// Discriminates the two ways an adapted call can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value was used as a function or constructor but is not one.
    Type,
    /// A target raised a value of its own.
    Thrown,
}

/// Represents a failure raised while adapting or invoking a function.
///
/// # Examples
///
/// ```rust
/// use fnadapt::{Error, ErrorKind};
/// use fnadapt::value::Value;
///
/// let error = Error::type_error("bind target must be callable, found number");
/// assert_eq!(error.kind(), ErrorKind::Type);
/// assert_eq!(
///     format!("{error}"),
///     "TypeError: bind target must be callable, found number"
/// );
///
/// let thrown = Error::Thrown(Value::from("boom"));
/// assert_eq!(format!("{thrown}"), "Uncaught boom");
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A value was used as a function or constructor but is not one.
    #[error("TypeError: {message}")]
    Type {
        /// Human readable description of the offending use.
        message: String,
    },
    /// A target raised a value of its own.
    #[error("Uncaught {0}")]
    Thrown(Value),
}

impl Error {
    /// Creates a [`Error::Type`] with the given message.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    /// Creates a [`Error::Thrown`] carrying the raised value.
    pub fn thrown(value: impl Into<Value>) -> Self {
        Self::Thrown(value.into())
    }

    /// Returns the kind of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Type { .. } => ErrorKind::Type,
            Self::Thrown(_) => ErrorKind::Thrown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_display() {
        let error = Error::type_error("curry target must be callable, found string");
        assert_eq!(
            format!("{error}"),
            "TypeError: curry target must be callable, found string"
        );
        assert_eq!(error.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_thrown_display_uses_value_rendering() {
        let error = Error::thrown(42);
        assert_eq!(format!("{error}"), "Uncaught 42");
        assert_eq!(error.kind(), ErrorKind::Thrown);
    }
}
