//! Wire-level client for Oasis kinetic sand-art devices
//!
//! This crate owns the device wire contract: the fixed status/error code
//! tables, the semicolon-delimited status line, the query-parameter command
//! encoding, and the HTTP clients for the device and the optional vendor
//! cloud. It carries no session state and no policy; the `oasis-state` and
//! `oasis-sdk` crates build those on top.

mod client;
mod cloud;
mod command;
mod error;
mod status;

pub use client::{ClientConfig, DeviceClient, DeviceTransport};
pub use cloud::{CloudApi, CloudClient, TrackMetadata, CLOUD_BASE_URL};
pub use command::{
    Command, BALL_SPEED_MAX, BALL_SPEED_MIN, LED_SPEED_MAX, LED_SPEED_MIN,
};
pub use error::{ApiError, Result};
pub use status::{
    led_effect_name, DeviceStatus, ErrorCode, StatusUpdate, AUTOPLAY_OPTIONS, LED_EFFECTS,
};
