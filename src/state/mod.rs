//! Observable state: engine snapshots and change events.

pub mod events;
pub mod timer;
