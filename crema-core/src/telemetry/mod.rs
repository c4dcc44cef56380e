//! Double-buffered telemetry handoff
//!
//! Two statically-owned packet buffers alternate between a fill role
//! (written by the sampling tick) and a send role (drained by the
//! transmit path). Ownership transfers through a single atomic word so
//! readiness and buffer identity are always published together.

mod exchange;
mod pump;

pub use exchange::{PacketConsumer, PacketExchange, PushOutcome, SampleProducer};
pub use pump::{pump_once, PumpOutcome};
