//! Observer library: portable occupancy sensing for a small radio network.
//!
//! Each room has a node that fuses sonar, motion and light readings into an
//! occupied/vacant decision and sends it to the hub as a single 64-bit radio
//! word. The hub keeps a registry of every node's last report and liveness
//! and publishes it as JSON. Nodes are tuned on site through a two-control
//! menu (rotary knob + button) and persist their settings to EEPROM.
//!
//! Everything here is `no_std` with no allocator and testable on any host
//! with `cargo test`. Firmware binaries are thin consumers that provide the
//! pins, the transceiver behind [`comm::Radio`], the EEPROM behind
//! [`storage::ByteStore`] and the menu controls behind [`config::MenuInput`].
//!
//! - Wire format: `packet`, `comm`
//! - Node: `sensors`, `fusion`, `node`
//! - Hub: `registry`, `protocol`
//! - Tuning: `config`, `settings`, `storage`
//! - Build-time data: `defaults`, `board`

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod comm;
pub mod config;
pub mod defaults;
pub mod fusion;
pub mod node;
pub mod packet;
pub mod protocol;
pub mod registry;
pub mod sensors;
pub mod settings;
pub mod storage;
