//! Common utilities shared by services

/// Reactive property system for fine-grained state updates
pub mod property;
#[macro_use]
mod macros;

pub use property::Property;
