//! Queue request resolution
//!
//! Turns a user media request (track ids, names, or a mix) into an ordered
//! [`CommandPlan`] of queue primitives. Resolution is all-or-nothing: one
//! unresolvable token fails the whole request and nothing reaches the device.

use oasis_state::TrackCatalog;

use crate::error::{Result, SdkError};

/// How newly requested tracks enter the device queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueMode {
    /// Clear the device queue, then insert
    Replace,
    /// Append to the end of the queue
    Add,
    /// Insert immediately after the currently playing track
    Next,
}

/// What the caller asked to play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRequest {
    /// Ordered tokens, each a numeric track id or a track name
    Tracks(Vec<String>),
    /// A named playlist construct
    Playlist(String),
}

/// One playback request, resolved into a plan and then discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRequest {
    pub media: MediaRequest,
    pub mode: EnqueueMode,
}

impl QueueRequest {
    /// Request for a list of track tokens
    pub fn tracks(
        tokens: impl IntoIterator<Item = impl Into<String>>,
        mode: EnqueueMode,
    ) -> Self {
        Self {
            media: MediaRequest::Tracks(tokens.into_iter().map(Into::into).collect()),
            mode,
        }
    }

    /// Request for a named playlist
    pub fn playlist(name: impl Into<String>, mode: EnqueueMode) -> Self {
        Self {
            media: MediaRequest::Playlist(name.into()),
            mode,
        }
    }
}

/// One device-bound queue operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueuePrimitive {
    /// Replace the whole queue with these ids
    SetQueue(Vec<u32>),
    /// Append one id to the end of the queue
    Append(u32),
    /// Insert one id immediately after the current track
    InsertNext(u32),
}

/// Ordered primitives for one request, executed without interleaving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    primitives: Vec<QueuePrimitive>,
    ids: Vec<u32>,
}

impl CommandPlan {
    /// The primitives, in execution order
    pub fn primitives(&self) -> &[QueuePrimitive] {
        &self.primitives
    }

    /// The resolved track ids, in request order (duplicates preserved)
    pub fn track_ids(&self) -> &[u32] {
        &self.ids
    }
}

/// Resolve a request against the catalog into a command plan
///
/// Numeric tokens are taken as track ids verbatim; the device is the
/// authority on whether they exist. Name tokens resolve case-insensitively
/// against the catalog. Input order and duplicates are preserved.
pub fn resolve(request: &QueueRequest, catalog: &TrackCatalog) -> Result<CommandPlan> {
    let tokens = match &request.media {
        MediaRequest::Playlist(_) => return Err(SdkError::PlaylistsUnsupported),
        MediaRequest::Tracks(tokens) => tokens,
    };
    if tokens.is_empty() {
        return Err(SdkError::InvalidMedia {
            token: String::new(),
        });
    }

    let mut ids = Vec::with_capacity(tokens.len());
    for token in tokens {
        match catalog.resolve_token(token) {
            Some(id) => ids.push(id),
            None => {
                return Err(SdkError::InvalidMedia {
                    token: token.clone(),
                })
            }
        }
    }

    let primitives = match request.mode {
        EnqueueMode::Replace => vec![QueuePrimitive::SetQueue(ids.clone())],
        EnqueueMode::Add => ids.iter().copied().map(QueuePrimitive::Append).collect(),
        EnqueueMode::Next => ids
            .iter()
            .copied()
            .map(QueuePrimitive::InsertNext)
            .collect(),
    };
    Ok(CommandPlan { primitives, ids })
}
