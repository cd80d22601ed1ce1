//! Unified error types surfaced by the runtime API.
use std::fmt;

use thiserror::Error;
use tokio::sync::oneshot;

use battle_core::TurnError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires a battle setup before building")]
    MissingSetup,

    #[error("battle worker command channel closed")]
    CommandChannelClosed,

    #[error("battle worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("battle worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("{kind} action provider failed: {message}")]
    Provider { kind: ProviderKind, message: String },

    #[error(transparent)]
    Turn(#[from] TurnError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Player,
    Enemy,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Player => "player",
            ProviderKind::Enemy => "enemy",
        };
        write!(f, "{}", label)
    }
}

impl From<battle_core::Team> for ProviderKind {
    fn from(team: battle_core::Team) -> Self {
        match team {
            battle_core::Team::Player => ProviderKind::Player,
            battle_core::Team::Enemy => ProviderKind::Enemy,
        }
    }
}
