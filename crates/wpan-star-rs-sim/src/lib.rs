//! A simulated MAC engine for the `wpan-star-rs` core.
//!
//! Several nodes share a [`VirtualAir`]; each node's [`SimMacEngine`] turns
//! the core's requests into confirmations and indications with simplified
//! MAC semantics (no timing, no losses), and [`SimTimers`] runs the timer
//! slots against a virtual clock. [`NodeHarness`] is the polling-loop shell
//! that pumps everything, mirroring what a firmware main loop would do
//! around a real engine.

pub mod air;
pub mod engine;
pub mod harness;
pub mod timers;

pub use air::{DeliveredDatagram, VirtualAir};
pub use engine::SimMacEngine;
pub use harness::NodeHarness;
pub use timers::{SimClock, SimTimers};
