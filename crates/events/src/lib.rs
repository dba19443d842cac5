//! Domain events emitted by marketplace aggregates.

pub mod event;

pub use event::{Event, EventName};
