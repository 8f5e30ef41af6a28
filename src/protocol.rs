/// JSON messages for the reporting side: the hub's per-room status listing
/// and newline-delimited status lines on the serial console.
///
/// Uses `heapless` types and `serde-json-core` for no_std/no-alloc operation.
use heapless::Vec;
use serde::Serialize;

use crate::board::{self, Capabilities};
use crate::defaults::MAX_SENDERS;
use crate::registry::Snapshot;
use crate::settings::Settings;

/// One room in the status listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub id: u8,
    pub sender_name: &'static str,
    pub seconds_since_last_change: u32,
    pub connected: bool,
    /// Last reported occupancy; stale when `connected` is false
    pub occupied: bool,
}

/// Status listing for every roster entry, in roster order
pub type Report = Vec<StatusEntry, MAX_SENDERS>;

/// Messages written to the serial console, one JSON object per line
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage<'a> {
    /// Hub room listing
    #[serde(rename = "observers")]
    Observers {
        /// Uptime in seconds
        uptime: u32,
        observers: &'a [StatusEntry],
    },
    /// Node state
    #[serde(rename = "node")]
    Node {
        board: &'static str,
        version: &'static str,
        capabilities: Capabilities,
        occupied: bool,
        radio: bool,
        settings: &'a Settings,
    },
}

impl<'a> DeviceMessage<'a> {
    /// Status line for this node, stamped with the build's board and version.
    pub fn node(occupied: bool, radio: bool, settings: &'a Settings) -> Self {
        DeviceMessage::Node {
            board: board::BOARD_NAME,
            version: VERSION,
            capabilities: board::CAPABILITIES,
            occupied,
            radio,
            settings,
        }
    }
}

/// Firmware version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized report or message
pub const MAX_MSG_LEN: usize = 1024;

/// Buffer type for serialized JSON
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;

/// Build the status listing from a registry snapshot taken at `now` (ms).
pub fn build_report(snapshot: &Snapshot, now: u32) -> Report {
    let mut report = Report::new();
    for (sender, record) in snapshot {
        let _ = report.push(StatusEntry {
            id: sender.id,
            sender_name: sender.display_name,
            seconds_since_last_change: now.wrapping_sub(record.last_state_change_at) / 1000,
            connected: record.connected,
            occupied: record.status,
        });
    }
    report
}

/// Serialize the listing as a JSON array into `buf`.
/// Returns the number of bytes written, or None if it does not fit.
pub fn serialize_report(report: &[StatusEntry], buf: &mut [u8]) -> Option<usize> {
    serde_json_core::to_slice(&report, buf).ok()
}

/// Serialize a DeviceMessage followed by a newline.
/// Returns the number of bytes written, or None if serialization failed.
pub fn serialize_message(msg: &DeviceMessage, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(msg, buf) {
        Ok(len) if len < buf.len() => {
            buf[len] = b'\n';
            Some(len + 1)
        }
        Ok(len) => Some(len),
        Err(_) => None,
    }
}
