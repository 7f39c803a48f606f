//! Session state for Oasis devices
//!
//! Owns everything the rest of the SDK reads: the immutable
//! [`DeviceSnapshot`], the static [`TrackCatalog`], the
//! [`Connectivity`] state machine, and the background [`Synchronizer`]
//! that keeps one snapshot per device fresh through a `watch` channel.

mod catalog;
mod connectivity;
mod error;
mod snapshot;
mod synchronizer;

pub use catalog::{Track, TrackCatalog};
pub use connectivity::{ConnectionTracker, Connectivity, Transition};
pub use error::StateError;
pub use snapshot::{DeviceSnapshot, LedState};
pub use synchronizer::{
    DeviceIdentity, SessionState, SyncConfig, SyncHandle, Synchronizer,
};
