/// Hub-side table of per-sender liveness and occupancy.
///
/// One record per roster entry, created at start and never removed.
/// Packets from ids outside the roster are dropped without touching any
/// record. The reporting side only ever sees copies via [`ObserverRegistry::snapshot`].
use heapless::Vec;

use crate::defaults::{SenderIdentity, MAX_SENDERS};
use crate::packet::{payload_occupied, Roster};

/// What the hub knows about one sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObserverRecord {
    /// Heard from within the liveness timeout
    pub connected: bool,
    /// Last reported occupancy; kept when the sender goes silent
    pub status: bool,
    /// Uptime (ms) of the most recent packet
    pub last_transmission_at: u32,
    /// Uptime (ms) when `status` last flipped
    pub last_state_change_at: u32,
}

/// Point-in-time copy of every record, in roster order
pub type Snapshot = Vec<(SenderIdentity, ObserverRecord), MAX_SENDERS>;

pub struct ObserverRegistry {
    roster: Roster,
    records: Vec<ObserverRecord, MAX_SENDERS>,
}

impl ObserverRegistry {
    pub fn new(roster: Roster) -> Self {
        let mut records = Vec::new();
        for _ in roster.iter() {
            // Roster size is capped at MAX_SENDERS
            let _ = records.push(ObserverRecord::default());
        }
        Self { roster, records }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Apply one decoded packet received at `now`.
    ///
    /// Returns `false` (and changes nothing) for ids outside the roster.
    pub fn on_packet_received(&mut self, id: u8, payload: u64, now: u32) -> bool {
        let Some(slot) = self.roster.position(id) else {
            log::debug!("Dropping packet from unknown sender {}", id);
            return false;
        };
        let Some(record) = self.records.get_mut(slot) else {
            return false;
        };

        if !record.connected {
            log::info!("Sender {} connected", id);
        }
        record.connected = true;
        record.last_transmission_at = now;

        let occupied = payload_occupied(payload);
        if occupied != record.status {
            log::info!(
                "Sender {} now {}",
                id,
                if occupied { "occupied" } else { "vacant" }
            );
            record.status = occupied;
            record.last_state_change_at = now;
        }
        true
    }

    /// Mark senders silent for longer than `timeout_ms` as disconnected.
    /// Their last status is kept. Returns how many were newly marked.
    pub fn sweep_liveness(&mut self, now: u32, timeout_ms: u32) -> usize {
        let mut dropped = 0;
        for (sender, record) in self.roster.iter().zip(self.records.iter_mut()) {
            if record.connected && now.wrapping_sub(record.last_transmission_at) > timeout_ms {
                log::warn!(
                    "Sender {} ({}) silent for {} ms, marking disconnected",
                    sender.id,
                    sender.display_name,
                    now.wrapping_sub(record.last_transmission_at)
                );
                record.connected = false;
                dropped += 1;
            }
        }
        dropped
    }

    /// Copy of every record, paired with its identity, in roster order.
    pub fn snapshot(&self) -> Snapshot {
        let mut out = Snapshot::new();
        for (sender, record) in self.roster.iter().zip(self.records.iter()) {
            let _ = out.push((*sender, *record));
        }
        out
    }

    pub fn record(&self, id: u8) -> Option<&ObserverRecord> {
        self.roster.position(id).and_then(|slot| self.records.get(slot))
    }

    /// Number of senders currently connected and reporting occupied.
    pub fn occupied_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.connected && r.status)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::LIVENESS_TIMEOUT_MS;
    use crate::packet::occupancy_payload;

    fn registry() -> ObserverRegistry {
        ObserverRegistry::new(Roster::deployment().unwrap())
    }

    // ── Creation ────────────────────────────────────────────────────

    #[test]
    fn one_record_per_roster_entry() {
        let reg = registry();
        let snap = reg.snapshot();
        assert_eq!(snap.len(), 5);
        assert_eq!(snap[0].0.display_name, "Downstairs");
        assert!(snap.iter().all(|(_, r)| *r == ObserverRecord::default()));
    }

    // ── Packets ─────────────────────────────────────────────────────

    #[test]
    fn packet_connects_and_sets_status() {
        let mut reg = registry();
        assert!(reg.on_packet_received(1, occupancy_payload(true), 1000));
        let r = reg.record(1).unwrap();
        assert!(r.connected);
        assert!(r.status);
        assert_eq!(r.last_transmission_at, 1000);
        assert_eq!(r.last_state_change_at, 1000);
        assert_eq!(reg.occupied_count(), 1);
    }

    #[test]
    fn unknown_sender_dropped() {
        let mut reg = registry();
        let before = reg.snapshot();
        assert!(!reg.on_packet_received(15, occupancy_payload(true), 1000));
        assert_eq!(reg.snapshot(), before);
        assert!(reg.record(15).is_none());
    }

    #[test]
    fn repeated_status_does_not_touch_change_time() {
        let mut reg = registry();
        reg.on_packet_received(2, occupancy_payload(true), 1000);
        reg.on_packet_received(2, occupancy_payload(true), 6000);
        reg.on_packet_received(2, occupancy_payload(true), 11_000);
        let r = reg.record(2).unwrap();
        assert_eq!(r.last_transmission_at, 11_000);
        assert_eq!(r.last_state_change_at, 1000);
    }

    #[test]
    fn flip_updates_change_time() {
        let mut reg = registry();
        reg.on_packet_received(0, occupancy_payload(true), 1000);
        reg.on_packet_received(0, occupancy_payload(false), 4000);
        let r = reg.record(0).unwrap();
        assert!(!r.status);
        assert_eq!(r.last_state_change_at, 4000);
    }

    #[test]
    fn first_vacant_packet_is_not_a_change() {
        let mut reg = registry();
        reg.on_packet_received(3, occupancy_payload(false), 2500);
        let r = reg.record(3).unwrap();
        assert!(r.connected);
        assert_eq!(r.last_state_change_at, 0);
    }

    #[test]
    fn reserved_payload_bits_ignored() {
        let mut reg = registry();
        reg.on_packet_received(4, 0xF0, 100);
        assert!(!reg.record(4).unwrap().status);
    }

    // ── Liveness ────────────────────────────────────────────────────

    #[test]
    fn silent_sender_disconnects_but_keeps_status() {
        let mut reg = registry();
        reg.on_packet_received(1, occupancy_payload(true), 1000);
        assert_eq!(reg.sweep_liveness(1000 + LIVENESS_TIMEOUT_MS, LIVENESS_TIMEOUT_MS), 0);
        assert!(reg.record(1).unwrap().connected);

        assert_eq!(reg.sweep_liveness(1001 + LIVENESS_TIMEOUT_MS, LIVENESS_TIMEOUT_MS), 1);
        let r = reg.record(1).unwrap();
        assert!(!r.connected);
        assert!(r.status);
        assert_eq!(reg.occupied_count(), 0);
    }

    #[test]
    fn sweep_counts_only_new_disconnects() {
        let mut reg = registry();
        reg.on_packet_received(0, 0, 0);
        reg.on_packet_received(1, 0, 0);
        assert_eq!(reg.sweep_liveness(100, 50), 2);
        assert_eq!(reg.sweep_liveness(200, 50), 0);
    }

    #[test]
    fn reconnect_after_timeout() {
        let mut reg = registry();
        reg.on_packet_received(0, occupancy_payload(true), 0);
        reg.sweep_liveness(100, 50);
        reg.on_packet_received(0, occupancy_payload(true), 150);
        let r = reg.record(0).unwrap();
        assert!(r.connected);
        assert_eq!(r.last_state_change_at, 0);
    }

    #[test]
    fn liveness_survives_clock_wrap() {
        let mut reg = registry();
        reg.on_packet_received(0, 0, u32::MAX - 10);
        assert_eq!(reg.sweep_liveness(20, 50), 0);
        assert_eq!(reg.sweep_liveness(40, 50), 1);
    }

    // ── Snapshot ────────────────────────────────────────────────────

    #[test]
    fn snapshot_is_a_copy() {
        let mut reg = registry();
        reg.on_packet_received(0, occupancy_payload(true), 10);
        let snap = reg.snapshot();
        reg.on_packet_received(0, occupancy_payload(false), 20);
        assert!(snap[0].1.status);
        assert!(!reg.snapshot()[0].1.status);
    }
}
