//! Physical simulation of the boiler/pump plant.
//!
//! Stands in for the real sensors: one call per tick advances pressure,
//! flow, accumulated weight and both temperatures by a fixed time step
//! and yields the sample that goes into the telemetry stream. Pure
//! computation over bounded inputs; no error paths.

use crema_protocol::Measurement;

use crate::state::{ControlMode, ControlState};

/// Baseline everything cools toward when unpowered (°C)
pub const AMBIENT_C: f32 = 20.0;

/// Tunable parameter set for the plant simulation.
///
/// The rates model thermal lag, not a physical PDE. Heating is faster
/// than passive cooling, and none of these values is part of a wire or
/// host contract.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModelConfig {
    /// Unpowered temperature baseline (°C)
    pub ambient_c: f32,
    /// Boiler setpoint while steam is active (°C)
    pub steam_c: f32,
    /// Boiler heating slew (°C/s)
    pub boiler_heat_rate: f32,
    /// Boiler cooling slew (°C/s)
    pub boiler_cool_rate: f32,
    /// Group-head heating slew (°C/s)
    pub group_heat_rate: f32,
    /// Group-head cooling slew (°C/s)
    pub group_cool_rate: f32,
    /// Pump-loop integral gain (duty per unit error per second)
    pub pump_gain: f32,
    /// Upper clamp of the pump-duty accumulator (bar equivalent)
    pub max_pump_duty: f32,
    /// Hydraulic resistance relating pressure to flow (bar per ml/s)
    pub flow_resistance: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            ambient_c: AMBIENT_C,
            steam_c: 140.0,
            boiler_heat_rate: 2.0,
            boiler_cool_rate: 0.5,
            group_heat_rate: 0.5,
            group_cool_rate: 0.1,
            pump_gain: 5.0,
            max_pump_duty: 12.0,
            flow_resistance: 1.5,
        }
    }
}

/// Simulation state, owned exclusively by the sampling tick.
#[derive(Debug, Clone)]
pub struct MachineModel {
    config: ModelConfig,
    pressure_bar: f32,
    flow_ml_s: f32,
    weight_g: f32,
    temp_boiler_c: f32,
    temp_group_c: f32,
    pump_duty: f32,
}

impl MachineModel {
    /// Create the model at rest: ambient temperatures, nothing flowing
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            pressure_bar: 0.0,
            flow_ml_s: 0.0,
            weight_g: 0.0,
            temp_boiler_c: config.ambient_c,
            temp_group_c: config.ambient_c,
            pump_duty: 0.0,
        }
    }

    /// Zero the accumulated weight.
    ///
    /// Weight is the one piece of state that survives power-off; this is
    /// its only reset path.
    pub fn tare(&mut self) {
        self.weight_g = 0.0;
    }

    /// Advance the plant by one tick of `dt_s` seconds and sample it.
    pub fn step(&mut self, control: &ControlState, dt_s: f32) -> Measurement {
        // Effective temperature targets
        let boiler_target = if control.powered {
            if control.steam_override {
                self.config.steam_c
            } else {
                control.target_temp_boiler
            }
        } else {
            self.config.ambient_c
        };
        let group_target = if control.powered {
            control.target_temp_group
        } else {
            self.config.ambient_c
        };

        // Thermal lag
        self.temp_boiler_c = slew(
            self.temp_boiler_c,
            boiler_target,
            self.config.boiler_heat_rate,
            self.config.boiler_cool_rate,
            dt_s,
        );
        self.temp_group_c = slew(
            self.temp_group_c,
            group_target,
            self.config.group_heat_rate,
            self.config.group_cool_rate,
            dt_s,
        );

        // Hydraulics
        if control.powered {
            let process_value = match control.control_mode {
                ControlMode::Pressure => self.pressure_bar,
                ControlMode::Flow => self.flow_ml_s,
            };
            let error = control.target_value - process_value;
            self.pump_duty = (self.pump_duty + error * self.config.pump_gain * dt_s)
                .clamp(0.0, self.config.max_pump_duty);

            self.pressure_bar = self.pump_duty;
            self.flow_ml_s = (self.pressure_bar / self.config.flow_resistance).max(0.0);
            self.weight_g += self.flow_ml_s * dt_s;
        } else {
            // Power cut: depressurize in the same tick, no ramp-down.
            // Weight is NOT reset here; it persists until TARE.
            self.pump_duty = 0.0;
            self.pressure_bar = 0.0;
            self.flow_ml_s = 0.0;
        }

        Measurement {
            pressure_bar: self.pressure_bar,
            flow_ml_s: self.flow_ml_s,
            weight_g: self.weight_g,
            temp_boiler_c: self.temp_boiler_c,
            temp_group_c: self.temp_group_c,
        }
    }

    /// Current pump-duty accumulator
    pub fn pump_duty(&self) -> f32 {
        self.pump_duty
    }

    /// Accumulated weight (g)
    pub fn weight_g(&self) -> f32 {
        self.weight_g
    }

    /// Current boiler temperature (°C)
    pub fn temp_boiler_c(&self) -> f32 {
        self.temp_boiler_c
    }

    /// Current group-head temperature (°C)
    pub fn temp_group_c(&self) -> f32 {
        self.temp_group_c
    }
}

/// Move `current` toward `target` at the applicable rate, without
/// overshooting within a single step
fn slew(current: f32, target: f32, heat_rate: f32, cool_rate: f32, dt_s: f32) -> f32 {
    if current < target {
        (current + heat_rate * dt_s).min(target)
    } else {
        (current - cool_rate * dt_s).max(target)
    }
}
