//! The authentication orchestrator: owns the session, the presence monitor
//! task, and the match index built from the current directory.

use crate::authenticator::{self, AuthOutcome};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::events::{Notice, SessionEvents};
use crate::identity::{self, InputChange};
use crate::lifecycle;
use crate::presence;
use crate::session::AuthenticationSession;
use facegate_core::{FaceEngine, MatchIndex, RegisteredIdentity, VideoSource};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Mutable orchestrator state. Guarded by one lock that is never held
/// across an await point.
pub(crate) struct State {
    pub(crate) session: AuthenticationSession,
    pub(crate) directory: Vec<Arc<RegisteredIdentity>>,
    /// Bumped on every directory change; an index built for an older
    /// generation is never installed.
    pub(crate) generation: u64,
    pub(crate) index: Option<Arc<dyn MatchIndex>>,
    /// Bumped on every authenticate attempt.
    pub(crate) attempt: u64,
    closed: bool,
}

pub(crate) struct Shared {
    pub(crate) session_id: Uuid,
    pub(crate) config: AuthConfig,
    pub(crate) video: Arc<dyn VideoSource>,
    pub(crate) engine: Arc<dyn FaceEngine>,
    pub(crate) events: Arc<dyn SessionEvents>,
    state: Mutex<State>,
    updates: watch::Sender<AuthenticationSession>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate state, then publish the session if it changed.
    ///
    /// Returns `None` without touching anything once the orchestrator is
    /// shut down, which is how late results are discarded.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut State) -> R) -> Option<R> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        let result = f(&mut *state);
        self.publish(&state.session);
        Some(result)
    }

    fn publish(&self, session: &AuthenticationSession) {
        self.updates.send_if_modified(|current| {
            if *current == *session {
                false
            } else {
                *current = session.clone();
                true
            }
        });
    }

    /// Clear `authenticating` if `attempt` is still the latest one.
    ///
    /// Unlike [`Shared::update`] this also runs after shutdown, so the final
    /// snapshot never shows an attempt in progress.
    pub(crate) fn end_attempt(&self, attempt: u64) {
        let mut state = self.lock();
        if state.attempt != attempt {
            return;
        }
        state.session.authenticating = false;
        if !state.closed {
            self.publish(&state.session);
        }
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let state = self.lock();
        f(&*state)
    }

    /// Mark closed. Returns false if it already was.
    fn close(&self) -> bool {
        let mut state = self.lock();
        !std::mem::replace(&mut state.closed, true)
    }
}

/// Owns the session task; aborting it on drop cancels the presence monitor
/// and any detection call it has in flight.
struct MonitorHandle(JoinHandle<()>);

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Single authentication orchestrator shared by any number of presentation
/// layers.
///
/// Dropping it tears the session down.
pub struct Orchestrator {
    shared: Arc<Shared>,
    monitor: Mutex<Option<MonitorHandle>>,
}

impl Orchestrator {
    /// Create the session and spawn its task: one camera access request,
    /// then the presence monitor.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        config: AuthConfig,
        video: Arc<dyn VideoSource>,
        engine: Arc<dyn FaceEngine>,
        events: Arc<dyn SessionEvents>,
    ) -> Self {
        let (updates, _) = watch::channel(AuthenticationSession::default());
        let shared = Arc::new(Shared {
            session_id: Uuid::new_v4(),
            config,
            video,
            engine,
            events,
            state: Mutex::new(State {
                session: AuthenticationSession::default(),
                directory: Vec::new(),
                generation: 0,
                index: None,
                attempt: 0,
                closed: false,
            }),
            updates,
        });

        tracing::info!(
            session_id = %shared.session_id,
            poll_interval_ms = shared.config.poll_interval.as_millis() as u64,
            match_threshold = shared.config.match_threshold,
            "orchestrator started"
        );

        let task = tokio::spawn(presence::run(Arc::clone(&shared)));

        Self {
            shared,
            monitor: Mutex::new(Some(MonitorHandle(task))),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.shared.session_id
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> AuthenticationSession {
        self.shared.read(|state| state.session.clone())
    }

    /// Receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<AuthenticationSession> {
        self.shared.updates.subscribe()
    }

    /// Whether the authenticate action is enabled right now.
    pub fn can_authenticate(&self) -> bool {
        self.shared.read(|state| state.session.can_authenticate())
    }

    /// Handle an edit of the identity number field.
    pub fn on_identity_input(&self, raw: &str) {
        let change = self.shared.update(|state| {
            identity::apply_input(&mut state.session, &state.directory, raw)
        });

        match change {
            Some(InputChange::NotFound(identity_number)) => {
                tracing::info!(
                    session_id = %self.shared.session_id,
                    "identity number not found in directory"
                );
                self.shared
                    .events
                    .notice(Notice::IdentityNotFound { identity_number });
            }
            Some(InputChange::Ignored) => {
                tracing::debug!("identity input rejected");
            }
            Some(InputChange::Updated) | None => {}
        }
    }

    /// Replace the registered-identity directory and rebuild the match index.
    ///
    /// When this returns, the matcher is `ready` for this directory (or
    /// `empty`), unless a newer directory arrived in the meantime.
    pub async fn on_directory_changed(&self, identities: Vec<RegisteredIdentity>) {
        lifecycle::rebuild(&self.shared, identities).await;
    }

    /// Run one authenticate attempt. Rejected unless the gate is open at
    /// call time.
    pub async fn authenticate(&self) -> Result<AuthOutcome, AuthError> {
        authenticator::authenticate(&self.shared).await
    }

    /// Tear the session down: cancel the monitor and discard every late
    /// result. Idempotent.
    pub fn shutdown(&self) {
        if self.shared.close() {
            tracing::info!(session_id = %self.shared.session_id, "orchestrator shut down");
        }
        let handle = self
            .monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(handle);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.read(|state| state.closed)
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
