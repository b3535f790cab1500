//! Application boundary: port traits and outbound events.
//!
//! Task bodies never touch hardware directly. Everything they read or drive
//! goes through the **port traits** in [`ports`], so the whole task graph
//! runs on the host against mock adapters.

pub mod events;
pub mod ports;
