//! Board-agnostic core logic for the espresso controller firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Physical simulation of the boiler/pump plant
//! - Control state and host command application
//! - Double-buffered telemetry handoff and the transmit pump
//! - Transport collaborator trait
//!
//! Everything here runs on the host for testing; the firmware crate
//! wires it to the RP2040 peripherals.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod model;
pub mod state;
pub mod telemetry;
pub mod traits;
