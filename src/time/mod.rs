//! Clock collaborators.
//!
//! The engine never reads the system clock directly; it asks the
//! [`TimeSource`](source::TimeSource) it was constructed with.

pub mod source;
