/// Hardware profile for supported units.
///
/// Each profile states which sensors and controls are fitted, selected at
/// compile time via feature flags. Pin wiring belongs to the firmware.
use serde::Serialize;

#[cfg(feature = "board-downstairs")]
mod hw {
    pub const HAS_SONAR: bool = true;
    pub const HAS_MOTION: bool = true;
    pub const HAS_LIGHT: bool = true;
    pub const HAS_ROTARY_KNOB: bool = true;
    pub const HAS_LCD: bool = true;
    pub const BOARD_NAME: &str = "observer_downstairs";
}

#[cfg(feature = "board-upstairs")]
mod hw {
    pub const HAS_SONAR: bool = true;
    pub const HAS_MOTION: bool = true;
    pub const HAS_LIGHT: bool = false;
    pub const HAS_ROTARY_KNOB: bool = false;
    pub const HAS_LCD: bool = false;
    pub const BOARD_NAME: &str = "observer_upstairs";
}

#[cfg(feature = "board-hub")]
mod hw {
    pub const HAS_SONAR: bool = false;
    pub const HAS_MOTION: bool = false;
    pub const HAS_LIGHT: bool = false;
    pub const HAS_ROTARY_KNOB: bool = false;
    pub const HAS_LCD: bool = true;
    pub const BOARD_NAME: &str = "observer_hub";
}

#[cfg(not(any(
    feature = "board-downstairs",
    feature = "board-upstairs",
    feature = "board-hub"
)))]
mod hw {
    pub const HAS_SONAR: bool = false;
    pub const HAS_MOTION: bool = false;
    pub const HAS_LIGHT: bool = false;
    pub const HAS_ROTARY_KNOB: bool = false;
    pub const HAS_LCD: bool = false;
    pub const BOARD_NAME: &str = "unknown";
}

pub use hw::*;

/// Whether light readings take part in occupancy fusion on this board.
///
/// Light is advisory on every current profile: a lamp left on in an empty
/// room must not hold the room occupied.
pub const LIGHT_IN_FUSION: bool = false;

/// What this unit has fitted, reported in its console status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub sonar: bool,
    pub motion: bool,
    pub light: bool,
    /// Rotary knob and LCD both present, so the configuration menu is usable
    pub menu: bool,
}

/// Capabilities of the board selected at build time.
pub const CAPABILITIES: Capabilities = Capabilities {
    sonar: HAS_SONAR,
    motion: HAS_MOTION,
    light: HAS_LIGHT,
    menu: HAS_ROTARY_KNOB && HAS_LCD,
};
