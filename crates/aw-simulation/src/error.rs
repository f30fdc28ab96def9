use aw_core::{ActorId, CoreError};
use aw_mechanics::MechError;

use crate::session::GameOutcome;

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while building or ticking a session.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A world-model operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A combat operation failed.
    #[error(transparent)]
    Mech(#[from] MechError),

    /// An encounter was started while another one is still active. This is
    /// an internal consistency failure and the session should not continue.
    #[error("encounter with {active} is still active, cannot start one with {requested}")]
    EncounterAlreadyActive {
        /// Enemy of the encounter in progress.
        active: ActorId,
        /// Enemy of the rejected encounter.
        requested: ActorId,
    },

    /// The session already ended.
    #[error("session is over: {0}")]
    SessionOver(GameOutcome),

    /// A scenario description is inconsistent.
    #[error("scenario error: {0}")]
    Scenario(String),

    /// An input token could not be parsed.
    #[error("invalid input \"{0}\"")]
    InvalidInput(String),

    /// Reading a scenario file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario or snapshot JSON was malformed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
