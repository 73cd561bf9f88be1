//! facegate-auth: Face authentication orchestrator.
//!
//! Gates an authenticate action on four signals: a valid identity number
//! linked to a registered identity, a granted camera, exactly one face in
//! view, and a ready face matcher. When the gate is open, one authenticate
//! call captures a still, extracts a descriptor, and accepts only if the
//! best match is the linked identity.

pub mod authenticator;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod lifecycle;
pub mod orchestrator;
mod presence;
pub mod session;

#[cfg(test)]
mod testing;

pub use authenticator::AuthOutcome;
pub use config::AuthConfig;
pub use error::AuthError;
pub use events::{LogEvents, Notice, SessionEvent, SessionEvents};
pub use orchestrator::Orchestrator;
pub use session::{
    AuthResult, AuthenticationSession, CameraStatus, FaceCount, GateBlock, MatcherStatus,
};
