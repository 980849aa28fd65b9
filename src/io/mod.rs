//! Host-side input/output: persistence, signals and command input.

pub mod input;
pub mod signals;
pub mod store;
