//! Control state and host command application

mod control;

pub use control::{CommandEffect, ControlMode, ControlState, BREW_READY_C};
