/// Multi-sensor occupancy fusion with grace-period debounce.
///
/// Any positive reading marks the room occupied. The room goes vacant only
/// after every contributing sensor has read negative for the whole grace
/// period; each positive reading restarts that window. Inconclusive
/// readings (no sonar echo, advisory light) neither start nor stop it.
use crate::board;
use crate::sensors::{classify_distance, lights_on, MotionDetector, MotionMode, Reading};
use crate::settings::Settings;

/// Number of PIR inputs a node can fuse
pub const MAX_MOTION_INPUTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Vacant,
    Occupied,
}

impl Occupancy {
    pub fn is_occupied(self) -> bool {
        self == Occupancy::Occupied
    }
}

/// One raw sample taken during an evaluation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorSample {
    /// Sonar echo distance in cm (0 = no echo)
    Sonar { distance_cm: u16 },
    /// PIR pin level for motion input `input`
    Motion { input: usize, high: bool },
    /// Raw photocell ADC count
    Light { raw: u16 },
}

/// Static fusion options for a node
#[derive(Debug, Clone, Copy)]
pub struct FusionConfig {
    /// Whether lights-on counts as presence
    pub include_light: bool,
    /// Interpretation of every PIR input
    pub motion_mode: MotionMode,
}

impl FusionConfig {
    pub const fn new() -> Self {
        Self {
            include_light: board::HAS_LIGHT && board::LIGHT_IN_FUSION,
            motion_mode: MotionMode::NonRetriggering,
        }
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct OccupancyFusion {
    config: FusionConfig,
    motion: [MotionDetector; MAX_MOTION_INPUTS],
    state: Occupancy,
    last_positive_at: Option<u32>,
    lights_on: Option<bool>,
}

impl OccupancyFusion {
    pub const fn new(config: FusionConfig) -> Self {
        Self {
            config,
            motion: [MotionDetector::new(config.motion_mode); MAX_MOTION_INPUTS],
            state: Occupancy::Vacant,
            last_positive_at: None,
            lights_on: None,
        }
    }

    /// Fold one tick's samples into the occupancy state.
    ///
    /// `now` is uptime in ms; the grace period is read from `settings` on
    /// every call.
    pub fn evaluate(
        &mut self,
        now: u32,
        samples: &[SensorSample],
        settings: &Settings,
    ) -> Occupancy {
        let mut positive = false;
        let mut negative = false;

        for sample in samples {
            match self.interpret(sample, now, settings) {
                Reading::Positive => positive = true,
                Reading::Negative => negative = true,
                Reading::Inconclusive => {}
            }
        }

        if positive {
            if self.state == Occupancy::Vacant {
                log::info!("Room occupied");
            }
            self.state = Occupancy::Occupied;
            self.last_positive_at = Some(now);
        } else if negative && self.state == Occupancy::Occupied {
            let quiet_ms = self
                .last_positive_at
                .map_or(u32::MAX, |at| now.wrapping_sub(at));
            if quiet_ms >= settings.grace_period_ms() {
                log::info!("Room vacant after {} ms without presence", quiet_ms);
                self.state = Occupancy::Vacant;
            }
        }

        self.state
    }

    fn interpret(&mut self, sample: &SensorSample, now: u32, settings: &Settings) -> Reading {
        match *sample {
            SensorSample::Sonar { distance_cm } => {
                classify_distance(distance_cm, settings.sonar_threshold_cm())
            }
            SensorSample::Motion { input, high } => match self.motion.get_mut(input) {
                Some(detector) => {
                    Reading::from_bool(detector.update(high, now, settings.motion_tolerance_ms()))
                }
                None => {
                    log::debug!("Ignoring sample for unknown motion input {}", input);
                    Reading::Inconclusive
                }
            },
            SensorSample::Light { raw } => {
                let on = lights_on(raw, settings.light_threshold());
                self.lights_on = Some(on);
                if self.config.include_light {
                    Reading::from_bool(on)
                } else {
                    Reading::Inconclusive
                }
            }
        }
    }

    /// Current state; repeated reads without new samples agree.
    pub fn state(&self) -> Occupancy {
        self.state
    }

    pub fn occupied(&self) -> bool {
        self.state.is_occupied()
    }

    /// Most recent light reading, even when light is advisory only.
    pub fn lights_on(&self) -> Option<bool> {
        self.lights_on
    }

    pub fn motion(&self, input: usize) -> Option<&MotionDetector> {
        self.motion.get(input)
    }
}

impl Default for OccupancyFusion {
    fn default() -> Self {
        Self::new(FusionConfig::new())
    }
}
