//! Session SDK for Oasis kinetic sand-art devices
//!
//! A [`Session`] owns one device: it keeps a continuously synchronized
//! snapshot of the device's operating state, busy-gates and serializes every
//! mutating command, resolves heterogeneous playback requests (ids, names,
//! mixed lists) into ordered command plans, and optionally enriches results
//! with cloud metadata.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use oasis_api::DeviceClient;
//! use oasis_state::{SyncConfig, TrackCatalog};
//! use oasis_sdk::{EnqueueMode, QueueRequest, Session};
//!
//! let transport = Arc::new(DeviceClient::new("192.168.1.50")?);
//! let catalog = Arc::new(TrackCatalog::from_file("tracks.json")?);
//! let session = Session::new("Living room", transport, catalog, None, SyncConfig::default());
//!
//! let request = QueueRequest::tracks(["63", "Turtle"], EnqueueMode::Replace);
//! let tracks = session.play_media(request).await?;
//! ```

mod enrich;
mod error;
pub mod logging;
mod queue;
mod session;

pub use enrich::{Enricher, ResolvedTrack};
pub use error::{Result, SdkError};
pub use queue::{
    resolve, CommandPlan, EnqueueMode, MediaRequest, QueuePrimitive, QueueRequest,
};
pub use session::{LedSettings, Session};

// Commonly needed lower-layer types
pub use oasis_api::{
    ApiError, ClientConfig, CloudApi, CloudClient, Command, DeviceClient, DeviceStatus,
    DeviceTransport, ErrorCode, StatusUpdate, TrackMetadata,
};
pub use oasis_state::{
    Connectivity, DeviceSnapshot, SessionState, SyncConfig, Track, TrackCatalog,
};
