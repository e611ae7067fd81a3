// lib.rs

pub use std::time::Duration;

pub use anyhow::bail;
pub use embedded_hal::delay::DelayNs;
pub use log::*;
pub use serde::{Deserialize, Serialize};

mod config;
pub use config::*;

mod point;
pub use point::*;

mod influx;
pub use influx::*;

mod sensor;
pub use sensor::*;

pub mod network;
pub use network::Network;

mod schedule;
pub use schedule::*;

mod publisher;
pub use publisher::*;

mod station;
pub use station::*;

#[cfg(target_os = "espidf")]
mod onewire;
#[cfg(target_os = "espidf")]
pub use onewire::*;

#[cfg(target_os = "espidf")]
mod wifi;
#[cfg(target_os = "espidf")]
pub use wifi::*;

#[cfg(target_os = "espidf")]
mod http;
#[cfg(target_os = "espidf")]
pub use http::*;

pub const FW_VERSION: &str = env!("CARGO_PKG_VERSION");

// EOF
