//! Typeahead sample application.
//!
//! Simulates a user typing into a search box. Searches are debounced,
//! draft saves are throttled and a hint is shown once, all through fnadapt
//! adapters driven by either the tokio runtime or a virtual clock.

#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod session;
