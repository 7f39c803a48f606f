use thiserror::Error;

/// Caller-facing errors for session commands
#[derive(Debug, Error)]
pub enum SdkError {
    /// The device reported a busy state; the command was not sent
    ///
    /// Never retried automatically. The caller decides whether to wait for
    /// the next snapshot and try again.
    #[error("Device '{device}' is busy and cannot accept commands right now")]
    DeviceBusy { device: String },

    /// A queue request token resolved to nothing
    #[error("Unable to resolve media token '{token}'")]
    InvalidMedia { token: String },

    /// The request named a playlist, which this device does not support
    #[error("Playlists are not supported by this device")]
    PlaylistsUnsupported,

    /// A track index outside the current queue
    #[error("Track index {index} is out of range")]
    InvalidIndex { index: usize },

    #[error(transparent)]
    Api(#[from] oasis_api::ApiError),

    #[error("State error: {0}")]
    State(#[from] oasis_state::StateError),
}

/// Type alias for results that can return an SdkError
pub type Result<T> = std::result::Result<T, SdkError>;
