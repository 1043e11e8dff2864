//! Upload state machine phases and the legal transitions between them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Initiating,
    Uploading,
    Paused,
    Completing,
    Done,
    Aborting,
    Aborted,
    Failed,
}

impl UploadPhase {
    /// Done, Aborted and Failed end a run; only `select_file` leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadPhase::Done | UploadPhase::Aborted | UploadPhase::Failed)
    }

    pub fn can_transition_to(self, to: UploadPhase) -> bool {
        use UploadPhase::*;
        match (self, to) {
            (Idle, Initiating) => true,
            (Initiating, Uploading) => true,
            (Uploading, Paused) | (Paused, Uploading) => true,
            (Uploading, Completing) | (Completing, Done) => true,
            (Initiating | Uploading | Completing, Failed) => true,
            (Aborting, Aborted) => true,
            (from, Aborting) => !from.is_terminal() && from != Aborting,
            // A new file resets a finished run.
            (from, Idle) => from.is_terminal() || from == Idle,
            _ => false,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            UploadPhase::Idle => "idle",
            UploadPhase::Initiating => "initiating",
            UploadPhase::Uploading => "uploading",
            UploadPhase::Paused => "paused",
            UploadPhase::Completing => "completing",
            UploadPhase::Done => "done",
            UploadPhase::Aborting => "aborting",
            UploadPhase::Aborted => "aborted",
            UploadPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
