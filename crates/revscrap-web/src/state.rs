use revscrap_core::ErrorKind;
use std::fmt;
use tracing::{debug, warn};

/// Where one form submission is in its life.
///
/// The download handler walks a fresh instance through every request; the
/// page script mirrors the same transitions in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Fetching,
    Ready,
    Error(ErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Submit,
    UrlRejected,
    TargetFound,
    CsvReady,
    FetchFailed(ErrorKind),
    InputChanged,
}

impl FormState {
    /// Next state for `event`, or `None` when the event makes no sense here
    pub fn transition(self, event: FormEvent) -> Option<FormState> {
        use FormEvent::*;
        use FormState::*;

        match (self, event) {
            (Idle, Submit) => Some(Validating),
            (Validating, UrlRejected) => Some(Error(ErrorKind::InvalidUrl)),
            (Validating, TargetFound) => Some(Fetching),
            (Fetching, CsvReady) => Some(Ready),
            (Fetching, FetchFailed(kind)) => Some(Error(kind)),
            (Error(_) | Ready, InputChanged) => Some(Idle),
            (Idle, InputChanged) => Some(Idle),
            _ => None,
        }
    }

    /// Short text shown under the input, if any
    pub fn message(&self) -> Option<&'static str> {
        match self {
            FormState::Error(kind) => Some(kind.message()),
            FormState::Ready => Some("Reviews downloaded."),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, FormState::Validating | FormState::Fetching)
    }
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormState::Idle => write!(f, "idle"),
            FormState::Validating => write!(f, "validating"),
            FormState::Fetching => write!(f, "fetching"),
            FormState::Ready => write!(f, "ready"),
            FormState::Error(_) => write!(f, "error"),
        }
    }
}

/// Tracks one submission through the state machine
#[derive(Debug)]
pub struct Submission {
    state: FormState,
}

impl Submission {
    pub fn new() -> Self {
        Self {
            state: FormState::Idle,
        }
    }

    pub fn apply(&mut self, event: FormEvent) -> FormState {
        match self.state.transition(event) {
            Some(next) => {
                debug!(from = %self.state, to = %next, "Form transition");
                self.state = next;
            }
            None => warn!(state = %self.state, event = ?event, "Ignoring unexpected form event"),
        }
        self.state
    }

    pub fn state(&self) -> FormState {
        self.state
    }
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}
