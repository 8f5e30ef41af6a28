/// Radio transport boundary and the two network roles.
///
/// The transceiver driver (nRF24L01 over SPI) lives in firmware behind the
/// [`Radio`] trait. A node uses [`transmit`] to send its occupancy; the hub
/// uses [`receive`] to drain everything heard since the last poll into the
/// registry. Both roles share the packet format in [`crate::packet`].
use heapless::Vec;

use crate::defaults::{
    SenderIdentity, RADIO_PAYLOAD_SIZE, RADIO_RETRY_COUNT, RADIO_RETRY_DELAY,
};
use crate::packet::{self, Roster};
use crate::registry::ObserverRegistry;

/// Most words a single [`Radio::poll`] may yield
pub const RX_BATCH: usize = 8;

/// Hub reading pipes start here; pipe 0 is reserved for transmit acks
pub const FIRST_READING_PIPE: u8 = 1;

/// Transceiver primitives. Retries happen inside the radio according to
/// [`RadioConfig`]; callers never retry on top.
pub trait Radio {
    /// Send one word; `false` if no ack arrived after the hardware retries.
    fn send(&mut self, word: u64) -> bool;

    /// Append words received since the previous poll to `out`. Never blocks.
    fn poll(&mut self, out: &mut Vec<u64, RX_BATCH>);

    /// Power the transceiver up or down.
    fn set_powered(&mut self, on: bool);
}

/// Transceiver setup applied by firmware at start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioConfig {
    pub retry_count: u8,
    pub retry_delay: u8,
    pub payload_size: u8,
    /// Pipe a node writes to
    pub writing_pipe: Option<u64>,
    /// `(pipe number, address)` pairs the hub listens on
    pub reading_pipes: Vec<(u8, u64), 5>,
}

impl RadioConfig {
    fn base() -> Self {
        Self {
            retry_count: RADIO_RETRY_COUNT,
            retry_delay: RADIO_RETRY_DELAY,
            payload_size: RADIO_PAYLOAD_SIZE,
            writing_pipe: None,
            reading_pipes: Vec::new(),
        }
    }

    /// Setup for a node transmitting as `sender`.
    pub fn node(sender: &SenderIdentity) -> Self {
        Self {
            writing_pipe: Some(sender.pipe_address),
            ..Self::base()
        }
    }

    /// Setup for the hub: one reading pipe per roster entry, as many as the
    /// transceiver has (five).
    pub fn hub(roster: &Roster) -> Self {
        let mut config = Self::base();
        for (pipe, sender) in (FIRST_READING_PIPE..).zip(roster.iter()) {
            if config.reading_pipes.push((pipe, sender.pipe_address)).is_err() {
                log::warn!(
                    "No reading pipe left for sender {} ({})",
                    sender.id,
                    sender.display_name
                );
            }
        }
        config
    }
}

/// Node role: send the current occupancy as `sender_id`.
///
/// Returns `false` on an invalid id or when the radio reports failure.
pub fn transmit<R: Radio>(radio: &mut R, sender_id: u8, occupied: bool) -> bool {
    let word = match packet::encode(sender_id, packet::occupancy_payload(occupied)) {
        Ok(word) => word,
        Err(e) => {
            log::warn!("Not transmitting: {}", e);
            return false;
        }
    };
    let sent = radio.send(word);
    if sent {
        log::debug!("Sent {:#x} as sender {}", word, sender_id);
    } else {
        log::warn!("Transmit failed for sender {}", sender_id);
    }
    sent
}

/// Hub role: decode every pending word into the registry.
///
/// Returns how many packets came from known senders.
pub fn receive<R: Radio>(radio: &mut R, registry: &mut ObserverRegistry, now: u32) -> usize {
    let mut words: Vec<u64, RX_BATCH> = Vec::new();
    radio.poll(&mut words);

    let mut accepted = 0;
    for word in words {
        let (id, payload) = packet::decode(word);
        if registry.on_packet_received(id, payload, now) {
            accepted += 1;
        }
    }
    accepted
}
