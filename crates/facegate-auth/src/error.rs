use crate::session::GateBlock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authenticate rejected: {0}")]
    GateClosed(GateBlock),
    #[error("orchestrator shut down; result discarded")]
    Cancelled,
}
