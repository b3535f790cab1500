//! Hardware initialisation and thread placement helpers.

pub mod hw_init;
pub mod task_pin;
