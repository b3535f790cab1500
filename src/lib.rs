//! Sensor-monitor firmware library.
//!
//! Periodic sampling, filtering and alarm tasks over a shared scalar store,
//! overwrite channels and a notification broadcast, dispatched either by a
//! cyclic executive or as a preemptive task set. Exposes everything for
//! integration testing; ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod pins;
pub mod scheduler;
pub mod sync;
pub mod tasks;
pub mod timing;

pub mod adapters;
pub mod drivers;

pub use error::{Error, Result};
