//! Collaborator interfaces
//!
//! These traits define the boundary between the core logic and the
//! transport hardware the firmware wires in.

pub mod link;

pub use link::{LinkBusy, TelemetryLink};
