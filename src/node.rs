/// Node main-loop step: fuse sensors, transmit, apply menu outcomes.
///
/// Firmware calls [`Node::tick`] once per loop iteration with the samples
/// it just took. The node transmits whenever its occupancy or identity
/// changes, and otherwise every [`TRANSMIT_INTERVAL_MS`] as a heartbeat for
/// the hub's liveness check.
use crate::comm::{self, Radio};
use crate::config::SessionOutcome;
use crate::defaults::TRANSMIT_INTERVAL_MS;
use crate::fusion::{FusionConfig, Occupancy, OccupancyFusion, SensorSample};
use crate::packet::Roster;
use crate::protocol::DeviceMessage;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LastAttempt {
    at: u32,
    sender_id: u8,
    occupied: bool,
    delivered: bool,
}

pub struct Node {
    roster: Roster,
    fusion: OccupancyFusion,
    radio_running: bool,
    last_attempt: Option<LastAttempt>,
}

impl Node {
    pub fn new(roster: Roster, fusion: FusionConfig) -> Self {
        Self {
            roster,
            fusion: OccupancyFusion::new(fusion),
            radio_running: false,
            last_attempt: None,
        }
    }

    /// Power the radio and schedule an immediate first transmission.
    pub fn start<R: Radio>(&mut self, radio: &mut R, settings: &Settings) {
        radio.set_powered(true);
        self.radio_running = true;
        self.last_attempt = None;
        match self.roster.by_index(settings.my_sender_index() as usize) {
            Some(sender) => log::info!(
                "Node started as sender {} ({})",
                sender.id,
                sender.display_name
            ),
            None => log::warn!(
                "Sender index {} not in roster; node will not transmit",
                settings.my_sender_index()
            ),
        }
    }

    /// One loop iteration. Returns the fused occupancy.
    pub fn tick<R: Radio>(
        &mut self,
        now: u32,
        samples: &[SensorSample],
        settings: &Settings,
        radio: &mut R,
    ) -> Occupancy {
        let state = self.fusion.evaluate(now, samples, settings);
        if !self.radio_running {
            return state;
        }

        let Some(sender) = self.roster.by_index(settings.my_sender_index() as usize) else {
            return state;
        };
        let occupied = state.is_occupied();

        let due = match self.last_attempt {
            None => true,
            Some(last) => {
                last.sender_id != sender.id
                    || last.occupied != occupied
                    || now.wrapping_sub(last.at) >= TRANSMIT_INTERVAL_MS
            }
        };
        if due {
            let delivered = comm::transmit(radio, sender.id, occupied);
            self.last_attempt = Some(LastAttempt {
                at: now,
                sender_id: sender.id,
                occupied,
                delivered,
            });
        }
        state
    }

    /// Act on a closed configuration session.
    pub fn apply_session<R: Radio>(&mut self, outcome: &SessionOutcome, radio: &mut R) {
        if !outcome.toggle_radio {
            return;
        }
        self.radio_running = !self.radio_running;
        radio.set_powered(self.radio_running);
        self.last_attempt = None;
        log::info!(
            "Radio {}",
            if self.radio_running { "started" } else { "stopped" }
        );
    }

    pub fn is_radio_running(&self) -> bool {
        self.radio_running
    }

    pub fn occupied(&self) -> bool {
        self.fusion.occupied()
    }

    /// Whether the most recent transmission was acknowledged.
    pub fn last_delivered(&self) -> Option<bool> {
        self.last_attempt.map(|a| a.delivered)
    }

    pub fn fusion(&self) -> &OccupancyFusion {
        &self.fusion
    }

    /// Console status line for the current state.
    pub fn status<'a>(&self, settings: &'a Settings) -> DeviceMessage<'a> {
        DeviceMessage::node(self.occupied(), self.radio_running, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::tests::LoopbackRadio;
    use crate::packet::decode;
    use crate::sensors::MotionMode;

    fn node() -> Node {
        Node::new(
            Roster::deployment().unwrap(),
            FusionConfig {
                include_light: false,
                motion_mode: MotionMode::Retriggering,
            },
        )
    }

    fn near() -> [SensorSample; 1] {
        [SensorSample::Sonar { distance_cm: 20 }]
    }

    fn far() -> [SensorSample; 1] {
        [SensorSample::Sonar { distance_cm: 400 }]
    }

    fn started() -> (Node, LoopbackRadio, Settings) {
        let mut n = node();
        let mut radio = LoopbackRadio::default();
        let settings = Settings::new();
        n.start(&mut radio, &settings);
        (n, radio, settings)
    }

    #[test]
    fn silent_until_started() {
        let mut n = node();
        let mut radio = LoopbackRadio::default();
        n.tick(0, &near(), &Settings::new(), &mut radio);
        assert!(radio.sent.is_empty());
        assert!(n.occupied());
    }

    #[test]
    fn first_tick_transmits() {
        let (mut n, mut radio, s) = started();
        n.tick(0, &far(), &s, &mut radio);
        assert_eq!(radio.sent.len(), 1);
        assert_eq!(decode(radio.sent[0]), (0, 0));
        assert_eq!(n.last_delivered(), Some(true));
    }

    #[test]
    fn state_change_transmits_immediately() {
        let (mut n, mut radio, s) = started();
        n.tick(0, &far(), &s, &mut radio);
        n.tick(100, &far(), &s, &mut radio);
        assert_eq!(radio.sent.len(), 1);
        n.tick(200, &near(), &s, &mut radio);
        assert_eq!(radio.sent.len(), 2);
        assert_eq!(decode(radio.sent[1]), (0, 1));
    }

    #[test]
    fn heartbeat_every_interval() {
        let (mut n, mut radio, s) = started();
        n.tick(0, &far(), &s, &mut radio);
        n.tick(TRANSMIT_INTERVAL_MS - 1, &far(), &s, &mut radio);
        assert_eq!(radio.sent.len(), 1);
        n.tick(TRANSMIT_INTERVAL_MS, &far(), &s, &mut radio);
        assert_eq!(radio.sent.len(), 2);
    }

    #[test]
    fn failed_send_waits_for_interval() {
        let (mut n, mut radio, s) = started();
        radio.fail_sends = true;
        n.tick(0, &near(), &s, &mut radio);
        assert_eq!(n.last_delivered(), Some(false));
        radio.fail_sends = false;
        n.tick(10, &near(), &s, &mut radio);
        assert!(radio.sent.is_empty());
        n.tick(TRANSMIT_INTERVAL_MS, &near(), &s, &mut radio);
        assert_eq!(radio.sent.len(), 1);
    }

    #[test]
    fn sender_change_transmits_with_new_id() {
        let (mut n, mut radio, mut s) = started();
        n.tick(0, &far(), &s, &mut radio);
        s.set_my_sender_index(3);
        n.tick(10, &far(), &s, &mut radio);
        assert_eq!(decode(radio.sent[1]).0, 3);
    }

    #[test]
    fn radio_toggle_from_session() {
        let (mut n, mut radio, s) = started();
        let toggle = SessionOutcome {
            settings_changed: true,
            saved: false,
            toggle_radio: true,
        };
        n.apply_session(&toggle, &mut radio);
        assert!(!n.is_radio_running());
        assert!(!radio.powered);
        n.tick(0, &near(), &s, &mut radio);
        assert!(radio.sent.is_empty());

        n.apply_session(&toggle, &mut radio);
        assert!(n.is_radio_running());
        n.tick(10, &near(), &s, &mut radio);
        assert_eq!(radio.sent.len(), 1);
    }

    #[test]
    fn status_reports_occupancy_and_radio() {
        let (mut n, mut radio, s) = started();
        n.tick(0, &near(), &s, &mut radio);
        match n.status(&s) {
            DeviceMessage::Node {
                board,
                occupied,
                radio,
                ..
            } => {
                assert_eq!(board, crate::board::BOARD_NAME);
                assert!(occupied);
                assert!(radio);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn session_without_toggle_leaves_radio() {
        let (mut n, mut radio, _) = started();
        let keep = SessionOutcome {
            settings_changed: true,
            saved: true,
            toggle_radio: false,
        };
        n.apply_session(&keep, &mut radio);
        assert!(n.is_radio_running());
        assert!(radio.powered);
    }
}
