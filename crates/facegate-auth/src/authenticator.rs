//! One-shot authenticate: capture, extract, match, decide.

use crate::error::AuthError;
use crate::events::Notice;
use crate::orchestrator::Shared;
use crate::session::{AuthResult, GateBlock};
use chrono::Utc;
use facegate_core::{BestMatch, FaceDescription};

/// What an authenticate attempt concluded.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// The captured face matched the linked identity.
    Authenticated { display_name: String, distance: f32 },
    /// A face was found but did not match the linked identity. `best_match`
    /// is `None` when no match index was available at match time.
    Rejected { best_match: Option<BestMatch> },
    /// No face could be detected or described in the captured frame.
    NoFace,
}

/// Clears `authenticating` for its attempt on every exit path, including
/// cancellation of the authenticate future.
struct AttemptGuard<'a> {
    shared: &'a Shared,
    attempt: u64,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        self.shared.end_attempt(self.attempt);
    }
}

fn labels_equal(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

pub(crate) async fn authenticate(shared: &Shared) -> Result<AuthOutcome, AuthError> {
    // Gate re-check and claim happen under one lock.
    let (attempt, identity) = shared
        .update(|state| {
            state.session.gate()?;
            let identity = state
                .session
                .linked_identity
                .clone()
                .ok_or(GateBlock::NoLinkedIdentity)?;
            state.attempt += 1;
            state.session.authenticating = true;
            Ok::<_, GateBlock>((state.attempt, identity))
        })
        .ok_or(AuthError::Cancelled)?
        .map_err(AuthError::GateClosed)?;

    let _guard = AttemptGuard { shared, attempt };
    tracing::info!(
        session_id = %shared.session_id,
        attempt,
        identity = %identity.display_name,
        "authenticate attempt started"
    );

    let Some(face) = capture_face(shared).await else {
        shared
            .update(|state| state.session.last_result = None)
            .ok_or(AuthError::Cancelled)?;
        tracing::info!(attempt, "authenticate: no face detected");
        shared.events.notice(Notice::NoFaceDetected);
        return Ok(AuthOutcome::NoFace);
    };

    let index = shared.read(|state| state.index.clone());
    let best_match = index.map(|index| index.best_match(&face.descriptor));
    let success = best_match
        .as_ref()
        .and_then(BestMatch::matched_label)
        .is_some_and(|label| labels_equal(label, &identity.display_name));

    let result = AuthResult {
        identity: identity.clone(),
        success,
        at: Utc::now(),
    };
    shared
        .update(|state| state.session.last_result = Some(result))
        .ok_or(AuthError::Cancelled)?;

    match best_match {
        Some(m) if success => {
            tracing::info!(attempt, distance = m.distance, "authenticate: accepted");
            shared.events.authenticated(&identity.display_name);
            Ok(AuthOutcome::Authenticated {
                display_name: identity.display_name.clone(),
                distance: m.distance,
            })
        }
        best_match => {
            tracing::info!(
                attempt,
                best_label = best_match.as_ref().map(|m| m.label.as_str()),
                distance = best_match.as_ref().map(|m| m.distance),
                "authenticate: rejected"
            );
            shared.events.notice(Notice::AuthenticationFailed);
            Ok(AuthOutcome::Rejected { best_match })
        }
    }
}

/// Capture one still and extract the face descriptor. Any failure along the
/// way reads as "no face".
async fn capture_face(shared: &Shared) -> Option<FaceDescription> {
    let frame = match shared.video.current_frame().await {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(error = %err, "authenticate: frame capture failed");
            return None;
        }
    };

    match shared.engine.detect_single_with_descriptor(&frame).await {
        Ok(face) => face,
        Err(err) => {
            tracing::warn!(error = %err, "authenticate: descriptor extraction failed");
            None
        }
    }
}
