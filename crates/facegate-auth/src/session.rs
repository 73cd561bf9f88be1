//! Live authentication session state and the decision gate.

use chrono::{DateTime, Utc};
use facegate_core::RegisteredIdentity;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraStatus {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// Face count classification of the latest presence sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceCount {
    #[default]
    None,
    One,
    Multiple,
}

impl FaceCount {
    pub fn from_detections(n: usize) -> Self {
        match n {
            0 => FaceCount::None,
            1 => FaceCount::One,
            _ => FaceCount::Multiple,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatcherStatus {
    #[default]
    Empty,
    Loading,
    Ready,
}

/// Outcome of the last authenticate attempt that reached the matching step.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResult {
    pub identity: Arc<RegisteredIdentity>,
    pub success: bool,
    pub at: DateTime<Utc>,
}

/// Why the gate is closed. Reported for the first failing condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateBlock {
    InvalidIdentity,
    NoLinkedIdentity,
    Authenticating,
    CameraNotGranted(CameraStatus),
    FaceCount(FaceCount),
    MatcherNotReady(MatcherStatus),
}

impl fmt::Display for GateBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateBlock::InvalidIdentity => write!(f, "identity number is not valid"),
            GateBlock::NoLinkedIdentity => write!(f, "no identity linked"),
            GateBlock::Authenticating => write!(f, "an authentication attempt is in progress"),
            GateBlock::CameraNotGranted(status) => write!(f, "camera not granted ({status:?})"),
            GateBlock::FaceCount(count) => write!(f, "exactly one face required ({count:?})"),
            GateBlock::MatcherNotReady(status) => write!(f, "face matcher not ready ({status:?})"),
        }
    }
}

/// Everything the orchestrator knows about the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthenticationSession {
    /// Digits-only form of the typed identity number.
    pub id_input_raw: String,
    /// Display form, digits grouped by four.
    pub id_input_formatted: String,
    pub id_valid: bool,
    /// Set exactly when `id_valid` is true.
    pub linked_identity: Option<Arc<RegisteredIdentity>>,
    pub camera_status: CameraStatus,
    pub face_count: FaceCount,
    pub matcher_status: MatcherStatus,
    pub authenticating: bool,
    pub last_result: Option<AuthResult>,
}

impl AuthenticationSession {
    /// Evaluate the gate against the current fields.
    pub fn gate(&self) -> Result<(), GateBlock> {
        if !self.id_valid {
            return Err(GateBlock::InvalidIdentity);
        }
        if self.linked_identity.is_none() {
            return Err(GateBlock::NoLinkedIdentity);
        }
        if self.authenticating {
            return Err(GateBlock::Authenticating);
        }
        if self.camera_status != CameraStatus::Granted {
            return Err(GateBlock::CameraNotGranted(self.camera_status));
        }
        if self.face_count != FaceCount::One {
            return Err(GateBlock::FaceCount(self.face_count));
        }
        if self.matcher_status != MatcherStatus::Ready {
            return Err(GateBlock::MatcherNotReady(self.matcher_status));
        }
        Ok(())
    }

    /// Whether the authenticate action is enabled.
    pub fn can_authenticate(&self) -> bool {
        self.gate().is_ok()
    }
}
