//! Host Link Protocol
//!
//! This crate defines the USB CDC protocol between the controller and the
//! host (logging/profiling application): fixed-layout binary telemetry
//! out, short ASCII commands in.
//!
//! # Telemetry (controller → host)
//!
//! One packet every [`SAMPLES_PER_PACKET`] milliseconds:
//! ```text
//! ┌─────┬──────────┬──────────┬─────┬──────────┐
//! │ TAG │ SAMPLE 0 │ SAMPLE 1 │ ... │ SAMPLE N │
//! │ 'ES'│ 20B      │ 20B      │     │ 20B      │
//! └─────┴──────────┴──────────┴─────┴──────────┘
//! ```
//! Each sample is five little-endian `f32` values in the order
//! {pressure, flow, weight, boiler temp, group temp}. The layout is a
//! build-time contract: a host decoder must agree on [`SAMPLES_PER_PACKET`]
//! and the record width exactly.
//!
//! # Commands (host → controller)
//!
//! ASCII text, one command per CDC message, either a bare keyword
//! (`POWER_ON`) or keyword plus decimal float (`SET_P:6.0`). Commands are
//! never acknowledged; unknown input is ignored by the receiver.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod packet;

pub use command::HostCommand;
pub use packet::{
    Measurement, PacketError, TelemetryPacket, MEASUREMENT_LEN, PACKET_LEN, PACKET_TAG,
    SAMPLES_PER_PACKET,
};
