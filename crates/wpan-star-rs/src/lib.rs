#![cfg_attr(not(feature = "std"), no_std)]

// 'alloc' is used for dynamic allocation (e.g., Vec<u8> payloads and scan result lists)
extern crate alloc;

// --- Foundation Modules ---
pub mod types;
pub mod hal;
pub mod config;
pub mod primitives;

// --- Protocol ---
pub mod assoc;
pub mod node;

// --- Top-level Exports ---
pub use assoc::{AssociatedDevice, DeviceTable};
pub use config::NetworkConfig;
pub use hal::{MacEngine, TimerService, WpanError};
pub use node::{NodeAction, NodeState, Role, StarNode, TimerId};
pub use primitives::{MacEvent, MacRequest};
