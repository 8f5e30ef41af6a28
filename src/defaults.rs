/// Compiled-in deployment data: the sender roster, settings bounds and
/// defaults, persistence layout and radio timing.
///
/// Everything here is fixed at build time. Runtime-tunable values live in
/// [`crate::settings::Settings`] and are bounded by the ranges below.

/// A sender's fixed identity within one deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderIdentity {
    /// 4-bit wire identity (0–15)
    pub id: u8,
    /// 40-bit nRF24 pipe address, stored in the low bits
    pub pipe_address: u64,
    /// Room name shown by the hub
    pub display_name: &'static str,
}

/// The five-room roster. Index in this table is the value stored in
/// `Settings::my_sender_index`.
pub static SENDERS: &[SenderIdentity] = &[
    SenderIdentity {
        id: 0,
        pipe_address: 0xF0F0_F0F0_E1,
        display_name: "Downstairs",
    },
    SenderIdentity {
        id: 1,
        pipe_address: 0xF0F0_F0F0_D2,
        display_name: "Upstairs",
    },
    SenderIdentity {
        id: 2,
        pipe_address: 0xF0F0_F0F0_F2,
        display_name: "Room 3",
    },
    SenderIdentity {
        id: 3,
        pipe_address: 0xF0F0_F0F0_A2,
        display_name: "Room 4",
    },
    SenderIdentity {
        id: 4,
        pipe_address: 0xF0F0_F0F0_C2,
        display_name: "Room 5",
    },
];

/// Upper bound on roster size: one slot per 4-bit identity.
pub const MAX_SENDERS: usize = 16;

/// Inclusive range and factory default of one settings field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBounds {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl FieldBounds {
    /// Clamp a signed candidate value into `[min, max]`.
    pub const fn clamp(&self, value: i64) -> u32 {
        if value < self.min as i64 {
            self.min
        } else if value > self.max as i64 {
            self.max
        } else {
            value as u32
        }
    }
}

/// Raw photocell reading above which the lights count as on.
pub const LIGHT_THRESHOLD: FieldBounds = FieldBounds {
    min: 0,
    max: 1023,
    default: 400,
};

/// Milliseconds a motion sensor must read LOW before motion is considered over.
pub const MOTION_TOLERANCE_MS: FieldBounds = FieldBounds {
    min: 100,
    max: 30_000,
    default: 5_000,
};

/// Sonar distance (cm) under which an echo counts as presence.
pub const SONAR_THRESHOLD_CM: FieldBounds = FieldBounds {
    min: 10,
    max: 500,
    default: 80,
};

/// Seconds of continuous all-negative readings before a room is vacant.
pub const OCCUPANCY_GRACE_S: FieldBounds = FieldBounds {
    min: 1,
    max: 60,
    default: 15,
};

/// Index into [`SENDERS`] this node transmits as.
pub const SENDER_INDEX: FieldBounds = FieldBounds {
    min: 0,
    max: 4,
    default: 0,
};

/// MOTION mode step per encoder detent, in milliseconds
pub const MOTION_STEP_MS: i64 = 100;

/// GRACE mode switches from unit steps to 1:1 steps at this value
pub const GRACE_FINE_STEP_BELOW: u32 = 10;

// ── Persistence layout ──────────────────────────────────────────────

/// Marker written ahead of the settings; anything else means "never saved".
pub const GUARD_WORD: u32 = 0x1998_FFAC;

/// Byte offset of the guard word in the store
pub const GUARD_OFFSET: usize = 0;

/// Byte offset of the encoded settings in the store
pub const SETTINGS_OFFSET: usize = 8;

// ── Radio ───────────────────────────────────────────────────────────

/// Hardware auto-retransmit count configured on the transceiver
pub const RADIO_RETRY_COUNT: u8 = 15;

/// Hardware auto-retransmit delay (units of 250µs) configured on the transceiver
pub const RADIO_RETRY_DELAY: u8 = 15;

/// Fixed payload size: one 64-bit word
pub const RADIO_PAYLOAD_SIZE: u8 = 8;

/// A node re-sends its current state at least this often (ms)
pub const TRANSMIT_INTERVAL_MS: u32 = 5_000;

/// The hub marks a sender disconnected after this much silence (ms).
/// Six transmit intervals.
pub const LIVENESS_TIMEOUT_MS: u32 = 6 * TRANSMIT_INTERVAL_MS;

// ── Sensors ─────────────────────────────────────────────────────────

/// Minimum interval between sonar pings (ms); reads in between reuse the last echo
pub const SONAR_MIN_INTERVAL_MS: u32 = 30;

/// PIR warm-up before its output is trusted (ms)
pub const MOTION_CALIBRATION_MS: u32 = 10_000;

/// Full-scale raw light reading (10-bit ADC)
pub const LIGHT_RAW_MAX: u16 = 1023;
