//! Streaming Relay — issues inference requests and forwards fragments.
//!
//! Owns the replay session and the active request's cancellation token.
//! One request is active at a time: starting a new one (capture or replay)
//! cancels the previous one.
//!
//! The desktop shell calls [`StreamingRelay::begin`] on the command thread
//! (so replacement happens immediately) and drives [`StreamingRelay::run`]
//! on a spawned task.

mod events;

pub use events::{RelayEvent, RelayState, ResponseSink, Transcript};

use crate::capture::CapturedImage;
use crate::error::RelayError;
use crate::llm::{InferenceClient, InferenceRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// The last request issued, kept for `replay_last`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySession {
    pub request: InferenceRequest,
}

/// A request that has been registered but not yet run.
#[derive(Debug)]
pub struct PreparedRun {
    id: u64,
    request: InferenceRequest,
    cancel: CancellationToken,
    replay: bool,
}

impl PreparedRun {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_replay(&self) -> bool {
        self.replay
    }

    pub fn request(&self) -> &InferenceRequest {
        &self.request
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

struct ActiveRequest {
    id: u64,
    cancel: CancellationToken,
}

pub struct StreamingRelay {
    client: Arc<dyn InferenceClient>,
    session: Mutex<Option<ReplaySession>>,
    active: Mutex<Option<ActiveRequest>>,
    /// (request id, state). Only the active request may move it.
    state: Mutex<(u64, RelayState)>,
    next_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl StreamingRelay {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            client,
            session: Mutex::new(None),
            active: Mutex::new(None),
            state: Mutex::new((0, RelayState::Idle)),
            next_id: AtomicU64::new(1),
        }
    }

    /// State of the most recently started request.
    pub fn state(&self) -> RelayState {
        lock(&self.state).1
    }

    pub fn last_session(&self) -> Option<ReplaySession> {
        lock(&self.session).clone()
    }

    /// Id of the request currently in flight, if any.
    pub fn active_request(&self) -> Option<u64> {
        lock(&self.active).as_ref().map(|a| a.id)
    }

    /// Register a fresh request and make it the replay session.
    pub fn begin(&self, image: Arc<CapturedImage>, prompt: impl Into<String>) -> PreparedRun {
        let request = InferenceRequest::new(image, prompt);
        *lock(&self.session) = Some(ReplaySession {
            request: request.clone(),
        });
        self.activate(request, false)
    }

    /// Register a re-issue of the stored session. The session is unchanged.
    pub fn begin_replay(&self) -> Result<PreparedRun, RelayError> {
        let session = lock(&self.session).clone().ok_or(RelayError::NothingToReplay)?;
        log::info!("[RELAY] Replaying last request");
        Ok(self.activate(session.request, true))
    }

    fn activate(&self, request: InferenceRequest, replay: bool) -> PreparedRun {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        let previous = lock(&self.active).replace(ActiveRequest {
            id,
            cancel: cancel.clone(),
        });
        if let Some(previous) = previous {
            log::info!("[RELAY] Request {} superseded by {}", previous.id, id);
            previous.cancel.cancel();
        }
        *lock(&self.state) = (id, RelayState::Requesting);

        PreparedRun {
            id,
            request,
            cancel,
            replay,
        }
    }

    /// Cancel the request in flight. Returns false when there was none.
    pub fn cancel_active(&self) -> bool {
        match lock(&self.active).take() {
            Some(active) => {
                log::info!("[RELAY] Cancelling request {}", active.id);
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    fn set_state(&self, id: u64, state: RelayState) {
        let mut current = lock(&self.state);
        if current.0 == id {
            current.1 = state;
        }
    }

    fn finish(&self, id: u64, state: RelayState) {
        self.set_state(id, state);
        let mut active = lock(&self.active);
        if active.as_ref().map(|a| a.id) == Some(id) {
            *active = None;
        }
    }

    /// Drive one prepared request to its terminal event.
    ///
    /// Fragments go to `sink` in arrival order, unbuffered. Exactly one of
    /// `Completed`, `Failed` or `Cancelled` is delivered last, and its
    /// state is returned.
    pub async fn run(&self, run: PreparedRun, sink: &dyn ResponseSink) -> RelayState {
        let PreparedRun {
            id,
            request,
            cancel,
            replay,
        } = run;
        let start = std::time::Instant::now();
        log::info!(
            "[RELAY] Request {} started (replay: {}, prompt: {} chars)",
            id,
            replay,
            request.prompt.len()
        );
        sink.deliver(RelayEvent::Started {
            request_id: id,
            replay,
        });

        let outcome = if cancel.is_cancelled() {
            None
        } else {
            let mut index = 0usize;
            let mut on_fragment = |text: String| {
                if index == 0 {
                    self.set_state(id, RelayState::Streaming);
                }
                sink.deliver(RelayEvent::Fragment {
                    request_id: id,
                    index,
                    text,
                });
                index += 1;
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.client.stream(&request, &mut on_fragment) => Some(result),
            }
        };

        let (event, state) = match outcome {
            None => {
                log::info!(
                    "[RELAY] Request {} cancelled after {}ms",
                    id,
                    start.elapsed().as_millis()
                );
                (RelayEvent::Cancelled { request_id: id }, RelayState::Cancelled)
            }
            Some(Ok(())) => {
                log::info!(
                    "[RELAY] Request {} completed in {}ms",
                    id,
                    start.elapsed().as_millis()
                );
                (RelayEvent::Completed { request_id: id }, RelayState::Completed)
            }
            Some(Err(e)) => {
                log::error!("[RELAY] Request {} failed: {}", id, e);
                (
                    RelayEvent::Failed {
                        request_id: id,
                        message: e.to_string(),
                    },
                    RelayState::Failed,
                )
            }
        };
        self.finish(id, state);
        sink.deliver(event);
        state
    }

    /// `begin` + `run`.
    pub async fn relay(
        &self,
        image: Arc<CapturedImage>,
        prompt: impl Into<String>,
        sink: &dyn ResponseSink,
    ) -> RelayState {
        let run = self.begin(image, prompt);
        self.run(run, sink).await
    }

    /// Re-issue the last request with the same image and prompt.
    pub async fn replay_last(&self, sink: &dyn ResponseSink) -> Result<RelayState, RelayError> {
        let run = self.begin_replay()?;
        Ok(self.run(run, sink).await)
    }
}
