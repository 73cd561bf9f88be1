//! facegate-core: Face data model, collaborator seams, and descriptor matching.
//!
//! The camera and the detection/recognition engine are external; this crate
//! defines the traits they are consumed through, plus the reference
//! Euclidean match index and identity directory loading.

pub mod device;
pub mod directory;
pub mod frame;
pub mod matcher;
pub mod types;

pub use device::{CameraAccess, CaptureError, EngineError, FaceEngine, VideoSource};
pub use frame::{Frame, FrameError};
pub use matcher::{EuclideanMatchIndex, MatchError, MatchIndex, DEFAULT_MATCH_THRESHOLD, UNKNOWN_LABEL};
pub use types::{BestMatch, Descriptor, FaceDescription, FaceRegion, LabeledDescriptors, RegisteredIdentity};
