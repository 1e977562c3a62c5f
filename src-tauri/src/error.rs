//! Error taxonomy for the capture → prompt → relay flow.
//!
//! Capture-path errors abort the in-progress capture and tear down the
//! overlay. Transport errors never escape the relay as `Err` — they are
//! turned into a terminal `Failed` event for the response panel.

use thiserror::Error;

/// Failures on the capture path (resolve → scale → pick → crop → encode).
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Zero-area selection. Treated as cancellation, not a failure.
    #[error("selection has zero area")]
    InvalidSelection,

    /// The windowing layer and the capture backend disagree about which
    /// displays exist. Never substitute another display's source.
    #[error("no capture source for display {display_id}")]
    SourceNotFound { display_id: u32 },

    /// The platform capture backend failed (permissions, enumeration, grab).
    #[error("capture backend failed: {0}")]
    Backend(String),

    #[error("PNG encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

impl CaptureError {
    /// True when the error means "the user backed out", not "something broke".
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CaptureError::InvalidSelection)
    }
}

/// Failures talking to the inference service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no API key configured — set GROQ_API_KEY or save a key in Settings")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("stream interrupted: {0}")]
    Stream(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Failures of relay operations themselves (not of a single run).
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("nothing to replay — capture a region first")]
    NothingToReplay,
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },

    #[error("keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}
