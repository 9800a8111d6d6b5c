//! Hardware-independent core library for the gale weather station
//!
//! This crate contains the platform-agnostic logic of the station: converting
//! the anemometer's ADC reading into wind speed, publishing readings to a
//! remote feed store, and the poll loop that ties sampling, display updates
//! and uploads together.
//!
//! Every piece of hardware (sensors, display, Wi-Fi, the telemetry service) is
//! reached through a trait so the same loop runs on the board and on a desktop
//! host (for the simulator and tests).
//!
//! It is `#![no_std]` with `extern crate alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod display;
pub mod network;
pub mod sensors;
pub mod station;
pub mod telemetry;

#[cfg(test)]
mod testing;
