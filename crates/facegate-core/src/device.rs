//! Seams to the external collaborators: the video capture device and the
//! face detection/recognition engine.

use crate::frame::{Frame, FrameError};
use crate::matcher::{EuclideanMatchIndex, MatchError, MatchIndex};
use crate::types::{FaceDescription, FaceRegion, LabeledDescriptors};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Outcome of asking the user/platform for camera access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAccess {
    Granted,
    Denied,
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("frame: {0}")]
    Frame(#[from] FrameError),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("detection failed: {0}")]
    DetectionFailed(String),
    #[error("descriptor extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("match index: {0}")]
    Index(#[from] MatchError),
}

/// A continuous stream of frames from a camera the user has to grant.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Ask for access to the device. Callers invoke this once per session.
    async fn request_access(&self) -> CameraAccess;

    /// The most recent frame of the stream.
    async fn current_frame(&self) -> Result<Frame, CaptureError>;
}

/// Face detection and recognition engine.
#[async_trait]
pub trait FaceEngine: Send + Sync {
    /// Detect every face region in the frame.
    async fn detect_all(&self, frame: &Frame) -> Result<Vec<FaceRegion>, EngineError>;

    /// Detect the most prominent face and extract its descriptor.
    ///
    /// Returns `Ok(None)` when the frame has no face.
    async fn detect_single_with_descriptor(
        &self,
        frame: &Frame,
    ) -> Result<Option<FaceDescription>, EngineError>;

    /// Build a match index over a labeled gallery.
    ///
    /// The default is the Euclidean mean-distance index.
    async fn build_match_index(
        &self,
        gallery: Vec<LabeledDescriptors>,
        threshold: f32,
    ) -> Result<Arc<dyn MatchIndex>, EngineError> {
        let index: Arc<dyn MatchIndex> = Arc::new(EuclideanMatchIndex::build(gallery, threshold)?);
        Ok(index)
    }
}
