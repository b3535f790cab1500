//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                   |
//! |------------|--------------|-------------------------------|
//! | `hardware` | SensorPort   | ESP32 GPIO, ADC, pulse timing |
//! |            | ActuatorPort | ESP32 GPIO, ROM delay         |
//! | `log_sink` | LogSink      | Serial log output             |
//! | `time`     | -            | ESP32 high-resolution timer   |

pub mod hardware;
pub mod log_sink;
pub mod time;
