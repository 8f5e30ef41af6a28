/// Per-sensor interpretation of raw samples.
///
/// Raw sampling (GPIO levels, ADC counts, echo timing) happens in the
/// firmware; this module turns those samples into presence readings.
use crate::defaults::{LIGHT_RAW_MAX, SONAR_MIN_INTERVAL_MS};

/// Outcome of interpreting one sensor sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// Sensor reports presence
    Positive,
    /// Sensor reports absence
    Negative,
    /// Sensor could not tell (e.g. no sonar echo)
    Inconclusive,
}

impl Reading {
    pub fn from_bool(present: bool) -> Self {
        if present {
            Reading::Positive
        } else {
            Reading::Negative
        }
    }
}

// ── Sonar ───────────────────────────────────────────────────────────

/// Classify a sonar distance against the presence threshold.
///
/// A distance of 0 means no echo came back and says nothing about the room.
pub fn classify_distance(distance_cm: u16, threshold_cm: u16) -> Reading {
    if distance_cm == 0 {
        Reading::Inconclusive
    } else {
        Reading::from_bool(distance_cm < threshold_cm)
    }
}

/// Rate limiter for an ultrasonic ranger: pings at most once per
/// [`SONAR_MIN_INTERVAL_MS`] and serves the cached distance in between.
#[derive(Debug, Clone, Copy)]
pub struct Sonar {
    last_ping_at: Option<u32>,
    last_distance_cm: u16,
}

impl Sonar {
    pub const fn new() -> Self {
        Self {
            last_ping_at: None,
            last_distance_cm: 0,
        }
    }

    /// Whether a fresh ping is allowed at `now` (ms uptime).
    pub fn ping_due(&self, now: u32) -> bool {
        match self.last_ping_at {
            None => true,
            Some(at) => now.wrapping_sub(at) > SONAR_MIN_INTERVAL_MS,
        }
    }

    /// Distance in cm, pinging through `ping` only when one is due.
    pub fn distance<F: FnOnce() -> u16>(&mut self, now: u32, ping: F) -> u16 {
        if self.ping_due(now) {
            self.last_ping_at = Some(now);
            self.last_distance_cm = ping();
        }
        self.last_distance_cm
    }

    pub fn last_distance(&self) -> u16 {
        self.last_distance_cm
    }
}

impl Default for Sonar {
    fn default() -> Self {
        Self::new()
    }
}

// ── Light ───────────────────────────────────────────────────────────

/// Whether a raw photocell reading counts as lights on.
pub fn lights_on(raw: u16, threshold: u16) -> bool {
    raw.min(LIGHT_RAW_MAX) > threshold
}

// ── Motion ──────────────────────────────────────────────────────────

/// How a PIR output is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionMode {
    /// Raw pin level is the reading
    Retriggering,
    /// A HIGH edge latches detection until the pin has stayed LOW for the
    /// motion tolerance; HIGH pulses during that window do not start a new
    /// detection.
    NonRetriggering,
}

/// Non-retriggering detector state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    /// No motion; the next HIGH starts a new detection
    Armed,
    /// Pin is HIGH and detection is latched
    Triggered,
    /// Pin went LOW at `low_since`; detection holds until the tolerance
    /// expires and HIGH pulses meanwhile continue the same sequence
    LockedLow { low_since: u32 },
}

/// Interprets one PIR input. One instance per physical sensor.
#[derive(Debug, Clone, Copy)]
pub struct MotionDetector {
    mode: MotionMode,
    state: MotionState,
    detections: u32,
}

impl MotionDetector {
    pub const fn new(mode: MotionMode) -> Self {
        Self {
            mode,
            state: MotionState::Armed,
            detections: 0,
        }
    }

    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Number of motion sequences started since power-up.
    pub fn detections(&self) -> u32 {
        self.detections
    }

    /// Feed the current pin level; returns whether motion is detected.
    ///
    /// `tolerance_ms` is the LOW time that ends a motion sequence and is read
    /// fresh each call so settings changes take effect immediately.
    pub fn update(&mut self, high: bool, now: u32, tolerance_ms: u32) -> bool {
        if self.mode == MotionMode::Retriggering {
            if high && self.state != MotionState::Triggered {
                self.detections = self.detections.wrapping_add(1);
            }
            self.state = if high {
                MotionState::Triggered
            } else {
                MotionState::Armed
            };
            return high;
        }

        self.state = match (self.state, high) {
            (MotionState::Armed, true) => {
                self.detections = self.detections.wrapping_add(1);
                log::debug!("Motion sequence started");
                MotionState::Triggered
            }
            (MotionState::Armed, false) => MotionState::Armed,
            (MotionState::Triggered, true) => MotionState::Triggered,
            (MotionState::Triggered, false) => MotionState::LockedLow { low_since: now },
            // HIGH inside the tolerance window continues the same sequence
            (MotionState::LockedLow { .. }, true) => MotionState::Triggered,
            (MotionState::LockedLow { low_since }, false) => {
                if now.wrapping_sub(low_since) > tolerance_ms {
                    log::debug!("Motion sequence ended");
                    MotionState::Armed
                } else {
                    MotionState::LockedLow { low_since }
                }
            }
        };
        self.detected()
    }

    /// Current detection without feeding a new sample.
    pub fn detected(&self) -> bool {
        self.state != MotionState::Armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Sonar ───────────────────────────────────────────────────────

    #[test]
    fn zero_distance_is_inconclusive() {
        assert_eq!(classify_distance(0, 80), Reading::Inconclusive);
    }

    #[test]
    fn distance_below_threshold_is_positive() {
        assert_eq!(classify_distance(1, 80), Reading::Positive);
        assert_eq!(classify_distance(79, 80), Reading::Positive);
    }

    #[test]
    fn distance_at_or_above_threshold_is_negative() {
        assert_eq!(classify_distance(80, 80), Reading::Negative);
        assert_eq!(classify_distance(400, 80), Reading::Negative);
    }

    #[test]
    fn sonar_reuses_echo_within_min_interval() {
        let mut sonar = Sonar::new();
        assert_eq!(sonar.distance(1000, || 42), 42);
        assert_eq!(sonar.distance(1010, || 99), 42);
        assert_eq!(sonar.distance(1030, || 99), 42);
        assert_eq!(sonar.distance(1031, || 99), 99);
        assert_eq!(sonar.last_distance(), 99);
    }

    #[test]
    fn sonar_interval_survives_clock_wrap() {
        let mut sonar = Sonar::new();
        sonar.distance(u32::MAX - 5, || 10);
        assert!(!sonar.ping_due(10));
        assert!(sonar.ping_due(30));
    }

    // ── Light ───────────────────────────────────────────────────────

    #[test]
    fn light_strictly_above_threshold() {
        assert!(lights_on(501, 500));
        assert!(!lights_on(500, 500));
        assert!(!lights_on(0, 0));
    }

    #[test]
    fn light_raw_clamped_to_adc_range() {
        assert!(!lights_on(5000, 1023));
    }

    // ── Motion ──────────────────────────────────────────────────────

    #[test]
    fn retriggering_follows_pin() {
        let mut pir = MotionDetector::new(MotionMode::Retriggering);
        assert!(pir.update(true, 0, 1000));
        assert!(!pir.update(false, 10, 1000));
        assert!(pir.update(true, 20, 1000));
        assert_eq!(pir.detections(), 2);
    }

    #[test]
    fn non_retriggering_latches_through_short_lows() {
        let mut pir = MotionDetector::new(MotionMode::NonRetriggering);
        assert!(!pir.update(false, 0, 1000));
        assert!(pir.update(true, 100, 1000));
        assert_eq!(pir.state(), MotionState::Triggered);

        assert!(pir.update(false, 200, 1000));
        assert_eq!(pir.state(), MotionState::LockedLow { low_since: 200 });
        assert!(pir.update(false, 1200, 1000));

        // Pulse during continuous motion is not a new detection
        assert!(pir.update(true, 1250, 1000));
        assert_eq!(pir.detections(), 1);
    }

    #[test]
    fn non_retriggering_releases_after_tolerance() {
        let mut pir = MotionDetector::new(MotionMode::NonRetriggering);
        pir.update(true, 0, 500);
        pir.update(false, 100, 500);
        assert!(pir.update(false, 600, 500));
        assert!(!pir.update(false, 601, 500));
        assert_eq!(pir.state(), MotionState::Armed);
    }

    #[test]
    fn held_high_is_one_detection() {
        let mut pir = MotionDetector::new(MotionMode::NonRetriggering);
        for t in 0..50 {
            assert!(pir.update(true, t * 10, 500));
        }
        assert_eq!(pir.detections(), 1);
    }

    #[test]
    fn new_edge_after_release_counts() {
        let mut pir = MotionDetector::new(MotionMode::NonRetriggering);
        pir.update(true, 0, 100);
        pir.update(false, 10, 100);
        pir.update(false, 200, 100);
        assert!(!pir.detected());
        assert!(pir.update(true, 300, 100));
        assert_eq!(pir.detections(), 2);
    }
}
