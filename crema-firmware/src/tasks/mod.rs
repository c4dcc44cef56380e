//! Embassy task definitions
//!
//! One task per concern:
//! - `sampler` - the fixed-rate control/sampling tick
//! - `telemetry_tx` - drains published packets to the host
//! - `command_rx` - applies host commands to the control state

mod command_rx;
mod sampler;
mod telemetry_tx;

pub use command_rx::command_rx_task;
pub use sampler::sampler_task;
pub use telemetry_tx::telemetry_tx_task;
