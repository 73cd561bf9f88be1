//! Outbound notices and the authenticated notification.

use std::fmt;
use tokio::sync::mpsc;

/// Transient, user-facing notice. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    IdentityNotFound { identity_number: String },
    NoFaceDetected,
    AuthenticationFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::IdentityNotFound { .. } => {
                write!(f, "Identity number not found in the directory.")
            }
            Notice::NoFaceDetected => write!(f, "No face detected."),
            Notice::AuthenticationFailed => {
                write!(f, "Face authentication failed. Please try again.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Notice(Notice),
    Authenticated { display_name: String },
}

/// Sink for everything the orchestrator tells the outside world.
pub trait SessionEvents: Send + Sync {
    fn notice(&self, notice: Notice);

    /// Called exactly once per successful authenticate call.
    fn authenticated(&self, display_name: &str);
}

/// Sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEvents;

impl SessionEvents for LogEvents {
    fn notice(&self, notice: Notice) {
        tracing::info!(?notice, "{notice}");
    }

    fn authenticated(&self, display_name: &str) {
        tracing::info!(display_name, "authenticated");
    }
}

impl SessionEvents for mpsc::UnboundedSender<SessionEvent> {
    fn notice(&self, notice: Notice) {
        if self.send(SessionEvent::Notice(notice)).is_err() {
            tracing::debug!("session event receiver dropped");
        }
    }

    fn authenticated(&self, display_name: &str) {
        let event = SessionEvent::Authenticated {
            display_name: display_name.to_string(),
        };
        if self.send(event).is_err() {
            tracing::debug!("session event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_delivers_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.notice(Notice::NoFaceDetected);
        tx.authenticated("Asha");

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Notice(Notice::NoFaceDetected)
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Authenticated {
                display_name: "Asha".into()
            }
        );
    }

    #[test]
    fn test_channel_sink_tolerates_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<SessionEvent>();
        drop(rx);
        tx.notice(Notice::AuthenticationFailed);
        tx.authenticated("Asha");
    }

    #[test]
    fn test_notice_text() {
        let notice = Notice::IdentityNotFound {
            identity_number: "123456789012".into(),
        };
        assert_eq!(notice.to_string(), "Identity number not found in the directory.");
    }
}
