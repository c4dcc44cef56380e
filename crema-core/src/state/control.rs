//! The setpoint/mode record driving the physical model.
//!
//! Written only by the command path, read (as a whole-value snapshot) by
//! the sampling tick. The firmware shares it behind a blocking mutex so
//! `control_mode` and `target_value` always change as one pair.

use crema_protocol::HostCommand;

use crate::model::AMBIENT_C;

/// Temperature both targets are reset to on power-up (°C)
pub const BREW_READY_C: f32 = 93.0;

/// Which process variable the pump loop regulates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMode {
    /// Regulate brew pressure (bar)
    Pressure,
    /// Regulate flow (ml/s)
    Flow,
}

/// Side effect a command requests outside this record.
///
/// Accumulated weight is owned by the sampling tick, so a TARE cannot be
/// applied here; the caller forwards it to the tick context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandEffect {
    None,
    /// Zero the accumulated weight in the simulation state
    TareWeight,
}

/// Machine control state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    /// false = standby: pump off, temperatures fall to ambient
    pub powered: bool,
    /// Target for the active control mode (bar or ml/s)
    pub target_value: f32,
    pub control_mode: ControlMode,
    /// Boiler setpoint (°C); overridden while steam is active
    pub target_temp_boiler: f32,
    /// Group-head setpoint (°C)
    pub target_temp_group: f32,
    /// Force the boiler toward the steam setpoint regardless of
    /// `target_temp_boiler`
    pub steam_override: bool,
}

impl ControlState {
    /// Startup state: unpowered, ambient temperature targets
    pub const fn standby() -> Self {
        Self {
            powered: false,
            target_value: 0.0,
            control_mode: ControlMode::Pressure,
            target_temp_boiler: AMBIENT_C,
            target_temp_group: AMBIENT_C,
            steam_override: false,
        }
    }

    /// Apply one host command.
    ///
    /// Commands apply regardless of power state; an unpowered machine
    /// simply keeps the pump at zero until POWER_ON.
    pub fn apply(&mut self, command: HostCommand) -> CommandEffect {
        match command {
            HostCommand::PowerOn => {
                self.powered = true;
                self.target_temp_boiler = BREW_READY_C;
                self.target_temp_group = BREW_READY_C;
            }
            HostCommand::PowerOff => {
                self.powered = false;
                self.target_value = 0.0;
                self.steam_override = false;
            }
            HostCommand::Stop => {
                self.target_value = 0.0;
            }
            HostCommand::Tare => return CommandEffect::TareWeight,
            HostCommand::SteamOn => {
                self.steam_override = true;
            }
            HostCommand::SteamOff => {
                self.steam_override = false;
            }
            HostCommand::SetPressure(value) => {
                self.control_mode = ControlMode::Pressure;
                self.target_value = value;
            }
            HostCommand::SetFlow(value) => {
                self.control_mode = ControlMode::Flow;
                self.target_value = value;
            }
            HostCommand::SetBoilerTemp(value) => {
                self.target_temp_boiler = value;
            }
            HostCommand::SetGroupTemp(value) => {
                self.target_temp_group = value;
            }
        }
        CommandEffect::None
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::standby()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_resets_temperature_targets() {
        let mut state = ControlState::standby();
        state.apply(HostCommand::SetBoilerTemp(80.0));
        state.apply(HostCommand::SetGroupTemp(85.0));

        state.apply(HostCommand::PowerOn);
        assert!(state.powered);
        assert_eq!(state.target_temp_boiler, BREW_READY_C);
        assert_eq!(state.target_temp_group, BREW_READY_C);
    }

    #[test]
    fn test_power_off_clears_target_and_steam() {
        let mut state = ControlState::standby();
        state.apply(HostCommand::PowerOn);
        state.apply(HostCommand::SetFlow(2.0));
        state.apply(HostCommand::SteamOn);

        state.apply(HostCommand::PowerOff);
        assert!(!state.powered);
        assert_eq!(state.target_value, 0.0);
        assert!(!state.steam_override);
        // Mode and temperature targets are kept
        assert_eq!(state.control_mode, ControlMode::Flow);
        assert_eq!(state.target_temp_boiler, BREW_READY_C);
    }

    #[test]
    fn test_stop_zeroes_target_only() {
        let mut state = ControlState::standby();
        state.apply(HostCommand::PowerOn);
        state.apply(HostCommand::SetPressure(9.0));

        state.apply(HostCommand::Stop);
        assert!(state.powered);
        assert_eq!(state.target_value, 0.0);
        assert_eq!(state.control_mode, ControlMode::Pressure);
    }

    #[test]
    fn test_set_commands_update_mode_and_value_together() {
        let mut state = ControlState::standby();
        state.apply(HostCommand::SetPressure(6.0));
        assert_eq!(state.control_mode, ControlMode::Pressure);
        assert_eq!(state.target_value, 6.0);

        state.apply(HostCommand::SetFlow(2.5));
        assert_eq!(state.control_mode, ControlMode::Flow);
        assert_eq!(state.target_value, 2.5);
    }

    #[test]
    fn test_steam_toggles_override_only() {
        let mut state = ControlState::standby();
        state.apply(HostCommand::PowerOn);
        state.apply(HostCommand::SetBoilerTemp(91.0));

        state.apply(HostCommand::SteamOn);
        assert!(state.steam_override);
        assert_eq!(state.target_temp_boiler, 91.0);

        state.apply(HostCommand::SteamOff);
        assert!(!state.steam_override);
        assert_eq!(state.target_temp_boiler, 91.0);
    }

    #[test]
    fn test_tare_has_no_state_change() {
        let mut state = ControlState::standby();
        state.apply(HostCommand::PowerOn);
        state.apply(HostCommand::SetPressure(9.0));
        let before = state;

        let effect = state.apply(HostCommand::Tare);
        assert_eq!(effect, CommandEffect::TareWeight);
        assert_eq!(state, before);
    }
}
