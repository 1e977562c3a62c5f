//! Inference client trait — the seam between the relay and the network.
//!
//! The relay only ever talks to `dyn InferenceClient`; the Groq client is
//! the production implementation and tests substitute scripted fakes.

use crate::capture::CapturedImage;
use crate::error::TransportError;
use async_trait::async_trait;
use std::sync::Arc;

/// One question about one screenshot. Cheap to clone: the image is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub prompt: String,
    pub image: Arc<CapturedImage>,
}

impl InferenceRequest {
    pub fn new(image: Arc<CapturedImage>, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image,
        }
    }
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Stream the answer, calling `on_fragment` once per non-empty text
    /// delta in arrival order. Returns when the service ends the stream.
    ///
    /// Dropping the returned future aborts the request; no fragment is
    /// delivered after that.
    async fn stream(
        &self,
        request: &InferenceRequest,
        on_fragment: &mut (dyn FnMut(String) + Send),
    ) -> Result<(), TransportError>;

    /// Fetch the whole answer in one response.
    async fn complete(&self, request: &InferenceRequest) -> Result<String, TransportError>;
}
