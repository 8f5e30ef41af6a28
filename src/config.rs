/// Rotary-encoder configuration menu.
///
/// A click in `Normal` opens a session at `Room`; each further click moves
/// to the next mode and the click in `RadioToggle` closes the session. While
/// open, encoder rotation edits the field owned by the current mode. Closing
/// with "save" selected writes the settings to the byte store.
///
/// [`ConfigMenu::handle`] takes one input event and returns immediately, so
/// a main loop can keep sensing between events. [`ConfigMenu::configure`]
/// runs the whole session in a blocking loop instead; nothing else runs
/// until the user has clicked through every mode.
use core::fmt::Write;

use heapless::String;

use crate::defaults::{GRACE_FINE_STEP_BELOW, MOTION_STEP_MS};
use crate::packet::Roster;
use crate::settings::Settings;
use crate::storage::ByteStore;

/// Menu modes, in click order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Room,
    Light,
    Motion,
    Sonar,
    Grace,
    Saving,
    RadioToggle,
}

impl Mode {
    /// Final mode; a click here closes the session.
    pub const LAST: Mode = Mode::RadioToggle;

    pub fn next(self) -> Self {
        match self {
            Mode::Normal => Mode::Room,
            Mode::Room => Mode::Light,
            Mode::Light => Mode::Motion,
            Mode::Motion => Mode::Sonar,
            Mode::Sonar => Mode::Grace,
            Mode::Grace => Mode::Saving,
            Mode::Saving => Mode::RadioToggle,
            Mode::RadioToggle => Mode::Normal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "Observer",
            Mode::Room => "Room",
            Mode::Light => "Light threshold",
            Mode::Motion => "Motion pause",
            Mode::Sonar => "Sonar distance",
            Mode::Grace => "Grace period",
            Mode::Saving => "Save settings?",
            Mode::RadioToggle => "Radio",
        }
    }
}

/// Per-session flags; reset every time the menu opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigSession {
    /// Any nonzero rotation happened this session
    pub settings_changed: bool,
    /// Write settings to the store on close
    pub should_save_settings: bool,
    /// Flip the radio on close
    pub should_toggle_radio_state: bool,
    /// Radio state when the session opened
    pub is_radio_running: bool,
}

impl ConfigSession {
    pub fn new(is_radio_running: bool) -> Self {
        Self {
            is_radio_running,
            ..Self::default()
        }
    }
}

/// One encoder event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    /// Encoder push-button click
    Click,
    /// Signed detent count since the last poll
    Rotate(i32),
}

/// Result of a closed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub settings_changed: bool,
    /// Settings were written to the store
    pub saved: bool,
    /// Caller should flip the radio
    pub toggle_radio: bool,
}

/// Encoder source polled by the blocking session loop
pub trait MenuInput {
    /// Signed detents since the previous call
    fn rotary_delta(&mut self) -> i32;
    /// Whether the button was clicked since the previous call
    fn button_clicked(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigMenu {
    mode: Mode,
    session: ConfigSession,
}

impl ConfigMenu {
    pub const fn new() -> Self {
        Self {
            mode: Mode::Normal,
            session: ConfigSession {
                settings_changed: false,
                should_save_settings: false,
                should_toggle_radio_state: false,
                is_radio_running: false,
            },
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Flags of the open session; `None` once the menu is back in `Normal`.
    pub fn session(&self) -> Option<&ConfigSession> {
        if self.is_open() {
            Some(&self.session)
        } else {
            None
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode != Mode::Normal
    }

    /// Apply one event. Returns the outcome when this event closed the session.
    ///
    /// `notify` runs synchronously after every mode change and every edit.
    /// `is_radio_running` is only read when a click opens a session.
    pub fn handle<S, F>(
        &mut self,
        event: MenuEvent,
        settings: &mut Settings,
        is_radio_running: bool,
        store: &mut S,
        notify: &mut F,
    ) -> Option<SessionOutcome>
    where
        S: ByteStore,
        F: FnMut(Mode, &Settings, &ConfigSession),
    {
        match event {
            MenuEvent::Rotate(0) => None,
            MenuEvent::Rotate(delta) => {
                if self.is_open() {
                    self.apply_delta(delta, settings);
                    notify(self.mode, settings, &self.session);
                }
                None
            }
            MenuEvent::Click => {
                if self.mode == Mode::Normal {
                    self.session = ConfigSession::new(is_radio_running);
                    self.mode = Mode::Room;
                    log::info!("Configuration menu opened");
                    notify(self.mode, settings, &self.session);
                    None
                } else if self.mode == Mode::LAST {
                    self.mode = Mode::Normal;
                    let outcome = self.close(settings, store);
                    notify(self.mode, settings, &self.session);
                    Some(outcome)
                } else {
                    self.mode = self.mode.next();
                    log::debug!("Menu mode {:?}", self.mode);
                    notify(self.mode, settings, &self.session);
                    None
                }
            }
        }
    }

    /// Open and run a full session if the button was clicked.
    ///
    /// Blocks until the session closes; returns `None` when no click was
    /// pending or the menu was already open.
    pub fn configure<I, S, F>(
        &mut self,
        input: &mut I,
        settings: &mut Settings,
        is_radio_running: bool,
        store: &mut S,
        notify: &mut F,
    ) -> Option<SessionOutcome>
    where
        I: MenuInput,
        S: ByteStore,
        F: FnMut(Mode, &Settings, &ConfigSession),
    {
        if self.is_open() || !input.button_clicked() {
            return None;
        }
        self.handle(MenuEvent::Click, settings, is_radio_running, store, notify);

        loop {
            let delta = input.rotary_delta();
            if delta != 0 {
                log::debug!("Encoder delta {}", delta);
                self.handle(MenuEvent::Rotate(delta), settings, is_radio_running, store, notify);
            }
            if input.button_clicked() {
                if let Some(outcome) =
                    self.handle(MenuEvent::Click, settings, is_radio_running, store, notify)
                {
                    return Some(outcome);
                }
            }
        }
    }

    fn apply_delta(&mut self, delta: i32, settings: &mut Settings) {
        let d = delta as i64;
        let step = d.signum();
        match self.mode {
            Mode::Normal => return,
            Mode::Room => {
                settings.set_my_sender_index(settings.my_sender_index() as i64 + step)
            }
            Mode::Light => settings.set_light_threshold(settings.light_threshold() as i64 + d),
            Mode::Motion => {
                let current = settings.motion_tolerance_ms() as i64;
                settings.set_motion_tolerance_ms(current + MOTION_STEP_MS * d)
            }
            Mode::Sonar => {
                settings.set_sonar_threshold_cm(settings.sonar_threshold_cm() as i64 + d)
            }
            Mode::Grace => {
                let current = settings.occupancy_grace_s();
                let step = if current < GRACE_FINE_STEP_BELOW { step } else { d };
                settings.set_occupancy_grace_s(current as i64 + step);
            }
            Mode::Saving => self.session.should_save_settings = delta > 0,
            Mode::RadioToggle => {
                // Only a request that changes the radio state is kept
                self.session.should_toggle_radio_state = if delta > 0 {
                    !self.session.is_radio_running
                } else {
                    self.session.is_radio_running
                };
            }
        }
        self.session.settings_changed = true;
    }

    fn close<S: ByteStore>(&mut self, settings: &Settings, store: &mut S) -> SessionOutcome {
        let saved = if self.session.should_save_settings {
            match settings.save(store) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Settings save failed: {:?}", e);
                    false
                }
            }
        } else {
            false
        };
        log::info!(
            "Configuration menu closed (changed: {}, saved: {})",
            self.session.settings_changed,
            saved
        );
        SessionOutcome {
            settings_changed: self.session.settings_changed,
            saved,
            toggle_radio: self.session.should_toggle_radio_state,
        }
    }
}

impl Default for ConfigMenu {
    fn default() -> Self {
        Self::new()
    }
}

/// Width of one character-LCD line
pub const LCD_WIDTH: usize = 16;

/// Two-line LCD text for the current menu state. Room names come from
/// the roster the node runs with.
pub fn menu_lines(
    mode: Mode,
    settings: &Settings,
    session: &ConfigSession,
    roster: &Roster,
) -> (String<LCD_WIDTH>, String<LCD_WIDTH>) {
    let mut top = String::new();
    let mut bottom = String::new();
    let _ = top.push_str(mode.label());

    match mode {
        Mode::Normal => {
            let _ = bottom.push_str("Ready");
        }
        Mode::Room => {
            let index = settings.my_sender_index();
            let _ = match roster.by_index(index as usize) {
                Some(sender) => write!(bottom, "{}:{}", index, sender.display_name),
                None => write!(bottom, "{}:?", index),
            };
        }
        Mode::Light => {
            let _ = write!(bottom, "{}", settings.light_threshold());
        }
        Mode::Motion => {
            let _ = write!(bottom, "{} ms", settings.motion_tolerance_ms());
        }
        Mode::Sonar => {
            let _ = write!(bottom, "{} cm", settings.sonar_threshold_cm());
        }
        Mode::Grace => {
            let _ = write!(bottom, "{} s", settings.occupancy_grace_s());
        }
        Mode::Saving => {
            let _ = bottom.push_str(if session.should_save_settings { "Yes" } else { "No" });
        }
        Mode::RadioToggle => {
            let _ = bottom.push_str(
                match (session.is_radio_running, session.should_toggle_radio_state) {
                    (true, false) => "On",
                    (true, true) => "On -> Off",
                    (false, false) => "Off",
                    (false, true) => "Off -> On",
                },
            );
        }
    }
    (top, bottom)
}
