//! Upload state machine states and per-attempt progress.

/// Controller state.
///
/// `Failed` and `Complete` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Idle,
    /// Verifying a previously created upload at `url`.
    ResolvingResume { url: String },
    Creating,
    PatchingChunk,
    Complete,
    Failed,
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Complete | State::Failed)
    }
}

/// Mutable progress of one attempt, owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadState {
    pub fingerprint: String,
    /// Absolute upload URL, set once created or resumed.
    pub url: Option<String>,
    /// Last offset acknowledged by the server.
    pub offset: u64,
    /// Total length, known once the upload is created or resumed.
    pub length: Option<u64>,
    /// Whether the server has been told the length (false while deferred).
    pub length_declared: bool,
}

impl UploadState {
    pub(crate) fn new(fingerprint: String) -> Self {
        Self {
            fingerprint,
            url: None,
            offset: 0,
            length: None,
            length_declared: false,
        }
    }

    /// True once every byte has been acknowledged and the length declared.
    pub fn is_finished(&self) -> bool {
        self.length_declared && self.length.is_some_and(|len| self.offset >= len)
    }
}
