//! Concurrency primitives used by the node orchestrator and the scenario engine.

pub mod group;
pub mod poll;
pub mod testonly;

#[cfg(test)]
mod tests;

pub use group::{Group, Joined};
pub use poll::{poll, Timeout};
