//! DHT11/DHT22 Pulse-Train Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for the DHT11 and DHT22
//! (AM2302) temperature and humidity sensors, built on top of the
//! [`embedded-hal`] traits.
//!
//! Instead of timing each bit against a microsecond clock, the driver records
//! the sensor's whole transmission by polling the data line, then decodes the
//! recording in stages: a small state machine extracts the widths of the 40
//! data pulses, an adaptive threshold splits them into bits, and the packed
//! frame is checksum-validated before the bytes are interpreted for the
//! configured sensor family. The adaptive threshold makes the decode tolerant
//! of sampling-rate differences between hosts.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments (`heapless` buffers, no alloc)
//! - Single deterministic capture per call; retry policy stays with the caller
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`InputPin`] and [`OutputPin`] for GPIO access
//! - [`DelayNs`] for handshake and pacing delays
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` for logging support
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod dht;
pub mod error;
pub mod frame;
pub mod pulse;

pub use dht::Dht;
pub use error::DhtError;
pub use frame::{Reading, SensorKind};
