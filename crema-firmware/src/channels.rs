//! Cross-task shared state
//!
//! The command task is the sole writer of the control state; the sampler
//! takes whole-value snapshots. Sharing a `Copy` record behind a blocking
//! mutex means `control_mode` and `target_value` can never be observed
//! independently stale.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use portable_atomic::AtomicBool;

use crema_core::state::ControlState;

/// The setpoint/mode record driving the physical model
pub static CONTROL: Mutex<CriticalSectionRawMutex, Cell<ControlState>> =
    Mutex::new(Cell::new(ControlState::standby()));

/// Weight-reset request, set by the command task and consumed (swapped
/// back to false) by the sampler, which owns the weight accumulator
pub static TARE_REQUEST: AtomicBool = AtomicBool::new(false);
