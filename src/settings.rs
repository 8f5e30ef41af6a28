/// Node settings: bounded fields, persistence layout and load/save.
///
/// Fields are private and every setter clamps, so a `Settings` value is
/// always within the ranges in [`crate::defaults`]. The configuration menu
/// is the only writer; fusion and transmission read.
use serde::Serialize;

use crate::defaults::{
    GUARD_OFFSET, GUARD_WORD, LIGHT_THRESHOLD, MOTION_TOLERANCE_MS,
    OCCUPANCY_GRACE_S, SENDER_INDEX, SETTINGS_OFFSET, SONAR_THRESHOLD_CM,
};
use crate::storage::ByteStore;

/// Size of the encoded settings block
pub const ENCODED_LEN: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    light_threshold: u16,
    motion_tolerance_ms: u32,
    sonar_threshold_cm: u16,
    occupancy_grace_s: u32,
    my_sender_index: u8,
}

impl Settings {
    /// Factory defaults.
    pub const fn new() -> Self {
        Self {
            light_threshold: LIGHT_THRESHOLD.default as u16,
            motion_tolerance_ms: MOTION_TOLERANCE_MS.default,
            sonar_threshold_cm: SONAR_THRESHOLD_CM.default as u16,
            occupancy_grace_s: OCCUPANCY_GRACE_S.default,
            my_sender_index: SENDER_INDEX.default as u8,
        }
    }

    pub fn light_threshold(&self) -> u16 {
        self.light_threshold
    }

    pub fn motion_tolerance_ms(&self) -> u32 {
        self.motion_tolerance_ms
    }

    pub fn sonar_threshold_cm(&self) -> u16 {
        self.sonar_threshold_cm
    }

    pub fn occupancy_grace_s(&self) -> u32 {
        self.occupancy_grace_s
    }

    /// Grace period in milliseconds, the unit of fusion timestamps.
    pub fn grace_period_ms(&self) -> u32 {
        self.occupancy_grace_s * 1000
    }

    pub fn my_sender_index(&self) -> u8 {
        self.my_sender_index
    }

    pub fn set_light_threshold(&mut self, value: i64) {
        self.light_threshold = LIGHT_THRESHOLD.clamp(value) as u16;
    }

    pub fn set_motion_tolerance_ms(&mut self, value: i64) {
        self.motion_tolerance_ms = MOTION_TOLERANCE_MS.clamp(value);
    }

    pub fn set_sonar_threshold_cm(&mut self, value: i64) {
        self.sonar_threshold_cm = SONAR_THRESHOLD_CM.clamp(value) as u16;
    }

    pub fn set_occupancy_grace_s(&mut self, value: i64) {
        self.occupancy_grace_s = OCCUPANCY_GRACE_S.clamp(value);
    }

    pub fn set_my_sender_index(&mut self, value: i64) {
        self.my_sender_index = SENDER_INDEX.clamp(value) as u8;
    }

    /// Pull every field back into range.
    fn clamped(self) -> Self {
        let mut s = self;
        s.set_light_threshold(self.light_threshold as i64);
        s.set_motion_tolerance_ms(self.motion_tolerance_ms as i64);
        s.set_sonar_threshold_cm(self.sonar_threshold_cm as i64);
        s.set_occupancy_grace_s(self.occupancy_grace_s as i64);
        s.set_my_sender_index(self.my_sender_index as i64);
        s
    }

    // ── Encoding ────────────────────────────────────────────────────

    /// Little-endian layout: light u16, motion u32, sonar u16, grace u32, index u8.
    pub fn to_bytes(&self) -> [u8; ENCODED_LEN] {
        let mut out = [0u8; ENCODED_LEN];
        out[0..2].copy_from_slice(&self.light_threshold.to_le_bytes());
        out[2..6].copy_from_slice(&self.motion_tolerance_ms.to_le_bytes());
        out[6..8].copy_from_slice(&self.sonar_threshold_cm.to_le_bytes());
        out[8..12].copy_from_slice(&self.occupancy_grace_s.to_le_bytes());
        out[12] = self.my_sender_index;
        out
    }

    /// Decode a settings block; out-of-range values are clamped.
    pub fn from_bytes(bytes: &[u8; ENCODED_LEN]) -> Self {
        Self {
            light_threshold: u16::from_le_bytes([bytes[0], bytes[1]]),
            motion_tolerance_ms: u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
            sonar_threshold_cm: u16::from_le_bytes([bytes[6], bytes[7]]),
            occupancy_grace_s: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            my_sender_index: bytes[12],
        }
        .clamped()
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Read saved settings. `None` when the guard word is absent (never
    /// saved) or the store cannot be read.
    pub fn load<S: ByteStore>(store: &S) -> Option<Self> {
        let mut guard = [0u8; 4];
        if let Err(e) = store.read(GUARD_OFFSET, &mut guard) {
            log::warn!("Settings guard read failed: {:?}", e);
            return None;
        }
        if u32::from_le_bytes(guard) != GUARD_WORD {
            return None;
        }

        let mut block = [0u8; ENCODED_LEN];
        if let Err(e) = store.read(SETTINGS_OFFSET, &mut block) {
            log::warn!("Settings read failed: {:?}", e);
            return None;
        }
        Some(Self::from_bytes(&block))
    }

    /// Saved settings, or factory defaults for an uninitialized store.
    pub fn load_or_default<S: ByteStore>(store: &S) -> Self {
        match Self::load(store) {
            Some(settings) => {
                log::info!("Settings loaded: {:?}", settings);
                settings
            }
            None => {
                log::info!("No saved settings, using defaults");
                Self::new()
            }
        }
    }

    /// Write the guard word and the settings block.
    pub fn save<S: ByteStore>(&self, store: &mut S) -> Result<(), S::Error> {
        store.write(GUARD_OFFSET, &GUARD_WORD.to_le_bytes())?;
        store.write(SETTINGS_OFFSET, &self.to_bytes())?;
        log::info!("Settings saved: {:?}", self);
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}
