//! Host command grammar and parser.
//!
//! Commands arrive as short ASCII messages, one per CDC transfer, either a
//! bare keyword or `KEYWORD:FLOAT`. Keywords are case-sensitive and must
//! match exactly; anything else parses to `None` and is dropped by the
//! receiver without a reply.

/// A command from the host, as a closed enumeration.
///
/// The apply site matches exhaustively, so adding a command here is a
/// compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand {
    /// Power up; resets both temperature targets to brew-ready
    PowerOn,
    /// Power down; zeroes the pump target and cancels steam
    PowerOff,
    /// Zero the pump target, keeping power and mode
    Stop,
    /// Zero the accumulated weight
    Tare,
    /// Force the boiler toward the steam setpoint
    SteamOn,
    /// Return the boiler to its configured target
    SteamOff,
    /// Pressure-control mode with the given target (bar)
    SetPressure(f32),
    /// Flow-control mode with the given target (ml/s)
    SetFlow(f32),
    /// Boiler temperature target (°C)
    SetBoilerTemp(f32),
    /// Group-head temperature target (°C)
    SetGroupTemp(f32),
}

impl HostCommand {
    /// Parse one host message.
    ///
    /// The slice is the exact message received; nothing beyond its length
    /// is examined. Trailing CR/LF/NUL from line-oriented hosts is
    /// tolerated. Returns `None` for anything that is not a well-formed
    /// command.
    pub fn parse(message: &[u8]) -> Option<Self> {
        let text = core::str::from_utf8(trim_message(message)).ok()?;

        match text.split_once(':') {
            None => match text {
                "POWER_ON" => Some(Self::PowerOn),
                "POWER_OFF" => Some(Self::PowerOff),
                "STOP" => Some(Self::Stop),
                "TARE" => Some(Self::Tare),
                "STEAM_ON" => Some(Self::SteamOn),
                "STEAM_OFF" => Some(Self::SteamOff),
                _ => None,
            },
            Some((keyword, value)) => {
                let value: f32 = value.trim().parse().ok()?;
                if !value.is_finite() {
                    return None;
                }
                match keyword {
                    "SET_P" => Some(Self::SetPressure(value)),
                    "SET_F" => Some(Self::SetFlow(value)),
                    "SET_TW" => Some(Self::SetBoilerTemp(value)),
                    "SET_TG" => Some(Self::SetGroupTemp(value)),
                    _ => None,
                }
            }
        }
    }
}

/// Strip surrounding whitespace and NUL padding from a message
fn trim_message(mut message: &[u8]) -> &[u8] {
    fn is_padding(byte: u8) -> bool {
        matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | 0)
    }

    while let [first, rest @ ..] = message {
        if !is_padding(*first) {
            break;
        }
        message = rest;
    }
    while let [rest @ .., last] = message {
        if !is_padding(*last) {
            break;
        }
        message = rest;
    }
    message
}
