use thiserror::Error;

use crate::{
    api::messages::Intent,
    game::GameState,
    ledger::ContestantId,
};

/// Everything the engine can refuse to do.
///
/// None of these leave the session half-mutated: an operation that fails
/// returns before touching the catalog or the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The source could not be read, or yielded nothing usable.
    #[error("malformed source{}: {reason}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    MalformedSource { line: Option<usize>, reason: String },

    #[error("clue {category_index}/{row} was already played")]
    AlreadyConsumed { category_index: usize, row: usize },

    #[error("no clue at category {category_index}, row {row}")]
    UnknownClue { category_index: usize, row: usize },

    #[error("no contestant at index {0}")]
    UnknownContestant(ContestantId),

    #[error("contestant {0} already attempted this clue")]
    AlreadyAttempted(ContestantId),

    #[error("it is contestant {expected}'s turn, not {got}")]
    OutOfTurn { expected: ContestantId, got: ContestantId },

    #[error("no final round clue was loaded")]
    NoFinalClue,

    #[error("the final round has already been played")]
    FinalRoundPlayed,

    #[error("contestant names cannot be blank")]
    BlankName,

    #[error("{intent:?} is not allowed while in {state:?}")]
    InvalidTransition { state: GameState, intent: Intent },
}

impl GameError {
    pub fn malformed(line: Option<usize>, reason: impl Into<String>) -> Self {
        Self::MalformedSource {
            line,
            reason: reason.into(),
        }
    }
}
