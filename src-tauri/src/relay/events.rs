//! What the response surface sees: relay events, relay states, and a
//! transcript for windows that open after the stream has started.

use serde::Serialize;

/// One step of one request. A run emits `Started`, zero or more
/// `Fragment`s, then exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RelayEvent {
    Started { request_id: u64, replay: bool },
    /// `index` counts fragments from 0 within the request.
    Fragment { request_id: u64, index: usize, text: String },
    Completed { request_id: u64 },
    Failed { request_id: u64, message: String },
    Cancelled { request_id: u64 },
}

impl RelayEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            RelayEvent::Started { request_id, .. }
            | RelayEvent::Fragment { request_id, .. }
            | RelayEvent::Completed { request_id }
            | RelayEvent::Failed { request_id, .. }
            | RelayEvent::Cancelled { request_id } => *request_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RelayEvent::Completed { .. } | RelayEvent::Failed { .. } | RelayEvent::Cancelled { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelayState {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl RelayState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RelayState::Completed | RelayState::Failed | RelayState::Cancelled)
    }
}

/// Where relay events go. Called from the relay task, one event at a time.
pub trait ResponseSink: Send + Sync {
    fn deliver(&self, event: RelayEvent);
}

/// Text of the latest request so far. A response window that opens late
/// fetches this, then applies live fragments whose index it has not seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub request_id: Option<u64>,
    pub text: String,
    pub fragments: usize,
    pub terminal: Option<RelayEvent>,
}

impl Transcript {
    /// Fold one event in. Events of an older request are ignored; a
    /// `Started` for a newer one resets the transcript.
    pub fn apply(&mut self, event: &RelayEvent) {
        let id = event.request_id();
        if let Some(current) = self.request_id {
            if id < current {
                return;
            }
        }
        match event {
            RelayEvent::Started { .. } => {
                *self = Transcript {
                    request_id: Some(id),
                    ..Transcript::default()
                };
            }
            _ if self.request_id != Some(id) => {}
            RelayEvent::Fragment { text, .. } => {
                self.text.push_str(text);
                self.fragments += 1;
            }
            terminal => self.terminal = Some(terminal.clone()),
        }
    }
}
