/// Wireless packet format and sender roster.
///
/// Every transmission is a single 64-bit word: the low 4 bits carry the
/// sender id and the remaining 60 bits carry the payload. Only bit 0 of the
/// payload is currently used (occupied / vacant); the rest are reserved and
/// sent as zero.
use core::fmt;

use heapless::Vec;

use crate::defaults::{SenderIdentity, MAX_SENDERS};

/// Mask selecting the sender id bits of a packet word
pub const ID_MASK: u64 = 0xF;

/// Number of bits taken by the sender id
pub const ID_BITS: u32 = 4;

/// Highest valid sender id
pub const MAX_SENDER_ID: u8 = 15;

/// Mask selecting the 60 usable payload bits
pub const PAYLOAD_MASK: u64 = (1 << (64 - ID_BITS)) - 1;

/// Payload bit carrying the occupancy flag
const OCCUPIED_BIT: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// Sender id does not fit in 4 bits
    InvalidSenderId(u8),
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketError::InvalidSenderId(id) => write!(f, "sender id {} exceeds 15", id),
        }
    }
}

/// Pack a sender id and payload into one wire word.
///
/// Payload bits above bit 59 are dropped.
pub fn encode(id: u8, payload: u64) -> Result<u64, PacketError> {
    if id > MAX_SENDER_ID {
        return Err(PacketError::InvalidSenderId(id));
    }
    Ok(((payload & PAYLOAD_MASK) << ID_BITS) | id as u64)
}

/// Split a wire word into `(id, payload)`. Every word decodes.
pub fn decode(word: u64) -> (u8, u64) {
    ((word & ID_MASK) as u8, word >> ID_BITS)
}

/// Payload announcing the node's current occupancy.
pub fn occupancy_payload(occupied: bool) -> u64 {
    if occupied {
        OCCUPIED_BIT
    } else {
        0
    }
}

/// Read the occupancy flag from a payload, ignoring reserved bits.
pub fn payload_occupied(payload: u64) -> bool {
    payload & OCCUPIED_BIT != 0
}

// ── Roster ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterError {
    /// Roster is empty or has more entries than there are ids
    BadSize(usize),
    /// Entry id does not fit in 4 bits
    InvalidId(u8),
    /// Two entries share an id
    DuplicateId(u8),
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::BadSize(n) => write!(f, "roster must hold 1..=16 senders, got {}", n),
            RosterError::InvalidId(id) => write!(f, "roster id {} exceeds 15", id),
            RosterError::DuplicateId(id) => write!(f, "roster id {} appears twice", id),
        }
    }
}

/// Validated, immutable sender table addressed by small integer index.
#[derive(Debug, Clone, Copy)]
pub struct Roster {
    senders: &'static [SenderIdentity],
}

impl Roster {
    /// Validate a sender table: 1–16 entries, ids in 0–15, no duplicates.
    pub fn new(senders: &'static [SenderIdentity]) -> Result<Self, RosterError> {
        if senders.is_empty() || senders.len() > MAX_SENDERS {
            return Err(RosterError::BadSize(senders.len()));
        }
        let mut seen: Vec<u8, MAX_SENDERS> = Vec::new();
        for sender in senders {
            if sender.id > MAX_SENDER_ID {
                return Err(RosterError::InvalidId(sender.id));
            }
            if seen.contains(&sender.id) {
                return Err(RosterError::DuplicateId(sender.id));
            }
            // Capacity equals MAX_SENDERS, checked above
            let _ = seen.push(sender.id);
        }
        Ok(Self { senders })
    }

    /// The compiled-in deployment roster.
    pub fn deployment() -> Result<Self, RosterError> {
        Self::new(crate::defaults::SENDERS)
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Sender at a roster index (the value a node stores as its sender index).
    pub fn by_index(&self, index: usize) -> Option<&SenderIdentity> {
        self.senders.get(index)
    }

    /// Roster slot of a wire id, if the id belongs to this deployment.
    pub fn position(&self, id: u8) -> Option<usize> {
        self.senders.iter().position(|s| s.id == id)
    }

    pub fn get(&self, id: u8) -> Option<&SenderIdentity> {
        self.position(id).map(|i| &self.senders[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SenderIdentity> {
        self.senders.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── encode / decode ─────────────────────────────────────────────

    #[test]
    fn id_occupies_low_nibble() {
        let word = encode(5, 1).unwrap();
        assert_eq!(word & 0xF, 5);
        assert_eq!(word >> 4, 1);
    }

    #[test]
    fn round_trip_extremes() {
        for id in 0..=MAX_SENDER_ID {
            for &payload in &[0, 1, 0x0123_4567_89AB_CDE, PAYLOAD_MASK] {
                let word = encode(id, payload).unwrap();
                assert_eq!(decode(word), (id, payload));
            }
        }
    }

    #[test]
    fn oversized_payload_truncated_to_60_bits() {
        let word = encode(3, u64::MAX).unwrap();
        assert_eq!(decode(word), (3, PAYLOAD_MASK));

        let word = encode(3, (1 << 60) | 0b101).unwrap();
        assert_eq!(decode(word), (3, 0b101));
    }

    #[test]
    fn id_above_15_rejected() {
        assert_eq!(encode(16, 0), Err(PacketError::InvalidSenderId(16)));
        assert_eq!(encode(255, 1), Err(PacketError::InvalidSenderId(255)));
    }

    #[test]
    fn any_word_decodes() {
        assert_eq!(decode(0), (0, 0));
        assert_eq!(decode(u64::MAX), (15, PAYLOAD_MASK));
    }

    // ── Occupancy payload ───────────────────────────────────────────

    #[test]
    fn occupancy_uses_bit_zero() {
        assert_eq!(occupancy_payload(true), 1);
        assert_eq!(occupancy_payload(false), 0);
        assert!(payload_occupied(1));
        assert!(!payload_occupied(0));
    }

    #[test]
    fn reserved_bits_ignored() {
        assert!(payload_occupied(0xFF00_0001));
        assert!(!payload_occupied(0xFF00_0000));
    }

    // ── Roster ──────────────────────────────────────────────────────

    #[test]
    fn deployment_roster_is_valid() {
        let roster = Roster::deployment().unwrap();
        assert_eq!(roster.len(), 5);
        assert_eq!(roster.by_index(0).unwrap().display_name, "Downstairs");
        assert_eq!(roster.get(4).unwrap().display_name, "Room 5");
        assert!(roster.get(15).is_none());
        assert_eq!(roster.position(2), Some(2));
    }

    static DUPLICATE: &[SenderIdentity] = &[
        SenderIdentity {
            id: 1,
            pipe_address: 0xA1,
            display_name: "A",
        },
        SenderIdentity {
            id: 1,
            pipe_address: 0xA2,
            display_name: "B",
        },
    ];

    static OUT_OF_RANGE: &[SenderIdentity] = &[SenderIdentity {
        id: 16,
        pipe_address: 0xA1,
        display_name: "A",
    }];

    static SPARSE: &[SenderIdentity] = &[
        SenderIdentity {
            id: 9,
            pipe_address: 0xA9,
            display_name: "Attic",
        },
        SenderIdentity {
            id: 2,
            pipe_address: 0xA2,
            display_name: "Cellar",
        },
    ];

    #[test]
    fn roster_rejects_duplicates() {
        assert_eq!(Roster::new(DUPLICATE).unwrap_err(), RosterError::DuplicateId(1));
    }

    #[test]
    fn roster_rejects_wide_ids() {
        assert_eq!(Roster::new(OUT_OF_RANGE).unwrap_err(), RosterError::InvalidId(16));
    }

    #[test]
    fn roster_rejects_empty() {
        assert_eq!(Roster::new(&[]).unwrap_err(), RosterError::BadSize(0));
    }

    #[test]
    fn sparse_ids_resolve_by_position() {
        let roster = Roster::new(SPARSE).unwrap();
        assert_eq!(roster.position(9), Some(0));
        assert_eq!(roster.position(2), Some(1));
        assert_eq!(roster.get(2).unwrap().display_name, "Cellar");
        assert!(roster.get(0).is_none());
    }
}
