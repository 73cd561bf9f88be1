//! Presence monitor: a one-time camera access check, then a fixed-cadence
//! face count poll over the video stream.

use crate::orchestrator::Shared;
use crate::session::{CameraStatus, FaceCount};
use facegate_core::CameraAccess;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Session task body. Runs until the camera is denied, the orchestrator
/// shuts down, or the task is aborted.
pub(crate) async fn run(shared: Arc<Shared>) {
    let access = shared.video.request_access().await;
    let status = match access {
        CameraAccess::Granted => CameraStatus::Granted,
        CameraAccess::Denied => CameraStatus::Denied,
    };
    if shared
        .update(|state| state.session.camera_status = status)
        .is_none()
    {
        return;
    }

    if access == CameraAccess::Denied {
        tracing::warn!(
            session_id = %shared.session_id,
            "camera access denied; authentication unavailable for this session"
        );
        return;
    }
    tracing::info!(session_id = %shared.session_id, "camera access granted");

    // A detection that outlives the period swallows the ticks it missed,
    // so at most one detection call is ever outstanding.
    let period = shared.config.poll_interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let count = sample(&shared).await;
        let changed = shared.update(|state| {
            let previous = std::mem::replace(&mut state.session.face_count, count);
            previous != count
        });
        match changed {
            None => break,
            Some(true) => tracing::debug!(?count, "face count changed"),
            Some(false) => {}
        }
    }

    tracing::debug!(session_id = %shared.session_id, "presence monitor stopped");
}

/// One tick: grab the current frame and count faces. Failures count as no face.
async fn sample(shared: &Shared) -> FaceCount {
    let frame = match shared.video.current_frame().await {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(error = %err, "presence: frame capture failed");
            return FaceCount::None;
        }
    };

    match shared.engine.detect_all(&frame).await {
        Ok(faces) => FaceCount::from_detections(faces.len()),
        Err(err) => {
            tracing::warn!(error = %err, "presence: face detection failed");
            FaceCount::None
        }
    }
}
