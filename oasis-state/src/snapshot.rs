//! Immutable device snapshot
//!
//! One `DeviceSnapshot` is built per successful poll and published whole; it
//! is never mutated in place, so readers can never observe a partial update.

use oasis_api::{DeviceStatus, ErrorCode, StatusUpdate};
use serde::{Deserialize, Serialize};

/// LED state as last reported by the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedState {
    pub effect: u8,
    pub color: Option<String>,
    pub speed: i16,
    pub brightness: u16,
    pub max_brightness: u16,
}

/// The last-known operating state of one device
///
/// `error` is only meaningful while `status` is [`DeviceStatus::Error`].
/// `busy` is derived: the raw busy bit, or any status in the busy set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub status: DeviceStatus,
    pub error: ErrorCode,
    pub busy: bool,
    /// Track ids loaded on the device, in play order (duplicates allowed)
    pub queue: Vec<u32>,
    /// Index of the current entry within `queue`
    pub queue_index: usize,
    /// Draw progress within the current track
    pub progress: u32,
    /// Download progress, 0-100
    pub download_progress: u8,
    pub ball_speed: u16,
    pub led: LedState,
    pub repeat_queue: bool,
    /// Raw autoplay (wait-after) option code
    pub autoplay: String,
    pub wifi_connected: bool,
    pub autoclean: bool,
}

impl DeviceSnapshot {
    /// Id of the currently loaded track
    ///
    /// An index at or past the end of the queue falls back to the first
    /// entry, matching device behavior after a queue rewrite.
    pub fn current_track(&self) -> Option<u32> {
        self.queue
            .get(self.queue_index)
            .or_else(|| self.queue.first())
            .copied()
    }
}

impl From<StatusUpdate> for DeviceSnapshot {
    fn from(update: StatusUpdate) -> Self {
        let status = update.status();
        Self {
            status,
            error: update.error(),
            busy: update.busy || status.is_busy(),
            queue: update.playlist,
            queue_index: update.playlist_index,
            progress: update.progress,
            download_progress: update.download_progress,
            ball_speed: update.ball_speed,
            led: LedState {
                effect: update.led_effect,
                color: update.color,
                speed: update.led_speed,
                brightness: update.brightness,
                max_brightness: update.max_brightness,
            },
            repeat_queue: update.repeat_playlist,
            autoplay: update.autoplay,
            wifi_connected: update.wifi_connected,
            autoclean: update.autoclean,
        }
    }
}
