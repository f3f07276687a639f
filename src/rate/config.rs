//! Declarative rate-limit settings.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{debounce, leading_throttle, throttle};
use crate::error::Error;
use crate::timer::Scheduler;
use crate::value::{Function, Value};

/// Which edge of the window a throttle runs its target on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Edge {
    /// Run immediately, then ignore calls for the window.
    Leading,
    /// Run once at the end of the window.
    #[default]
    Trailing,
}

/// A delay plus an edge policy, loadable from configuration.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use fnadapt::rate::{Edge, RateLimit};
///
/// let limit = RateLimit::new(Duration::from_millis(250)).leading();
/// assert_eq!(limit.delay(), Duration::from_millis(250));
/// assert_eq!(limit.edge, Edge::Leading);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RateLimit {
    /// Window length in milliseconds.
    pub delay_ms: u64,
    /// Edge policy used by [`RateLimit::throttle`].
    pub edge: Edge,
}

impl RateLimit {
    /// Creates a trailing-edge limit with the given window.
    ///
    /// Sub-millisecond precision is truncated; windows beyond `u64::MAX`
    /// milliseconds saturate.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            edge: Edge::Trailing,
        }
    }

    /// Switches the limit to the leading edge.
    #[must_use]
    pub const fn leading(mut self) -> Self {
        self.edge = Edge::Leading;
        self
    }

    /// Returns the window as a [`Duration`].
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Throttles `target` according to this limit's edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if `target` is not a function.
    pub fn throttle<S>(&self, target: &Value, scheduler: S) -> Result<Function, Error>
    where
        S: Scheduler + 'static,
    {
        match self.edge {
            Edge::Leading => leading_throttle(target, self.delay(), scheduler),
            Edge::Trailing => throttle(target, self.delay(), scheduler),
        }
    }

    /// Debounces `target` with this limit's window. The edge is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if `target` is not a function.
    pub fn debounce<S>(&self, target: &Value, scheduler: S) -> Result<Function, Error>
    where
        S: Scheduler + 'static,
    {
        debounce(target, self.delay(), scheduler)
    }
}
