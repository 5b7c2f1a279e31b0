use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    game::{GameState, Verdict, session::GameId},
    ledger::{Contestant, ContestantId, Standing},
};

/// Host intents, as sent by the presentation layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum HostCommand {
    LoadSource {
        text: String,
    },
    LoadFile {
        path: PathBuf,
    },
    ResetGame,
    SetContestantName {
        contestant: ContestantId,
        name: String,
    },
    AdjustScore {
        contestant: ContestantId,
        score: i64,
    },
    OpenClue {
        #[serde(rename = "categoryIndex")]
        category_index: usize,
        row: usize,
    },
    SubmitBonusWager {
        contestant: ContestantId,
        wager: String,
    },
    CancelBonus,
    Buzz {
        contestant: ContestantId,
    },
    NoBuzz,
    Judge {
        verdict: Verdict,
    },
    Pass,
    AcknowledgeAnswer,
    RequestFinalRound,
    FinalReady,
    SubmitFinalWager {
        contestant: ContestantId,
        wager: String,
    },
    SubmitFinalJudgment {
        contestant: ContestantId,
        verdict: Verdict,
    },
}

/// The kind of a [`HostCommand`], without its payload.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    LoadSource,
    LoadFile,
    ResetGame,
    SetContestantName,
    AdjustScore,
    OpenClue,
    SubmitBonusWager,
    CancelBonus,
    Buzz,
    NoBuzz,
    Judge,
    Pass,
    AcknowledgeAnswer,
    RequestFinalRound,
    FinalReady,
    SubmitFinalWager,
    SubmitFinalJudgment,
}

impl HostCommand {
    pub fn intent(&self) -> Intent {
        match self {
            Self::LoadSource { .. } => Intent::LoadSource,
            Self::LoadFile { .. } => Intent::LoadFile,
            Self::ResetGame => Intent::ResetGame,
            Self::SetContestantName { .. } => Intent::SetContestantName,
            Self::AdjustScore { .. } => Intent::AdjustScore,
            Self::OpenClue { .. } => Intent::OpenClue,
            Self::SubmitBonusWager { .. } => Intent::SubmitBonusWager,
            Self::CancelBonus => Intent::CancelBonus,
            Self::Buzz { .. } => Intent::Buzz,
            Self::NoBuzz => Intent::NoBuzz,
            Self::Judge { .. } => Intent::Judge,
            Self::Pass => Intent::Pass,
            Self::AcknowledgeAnswer => Intent::AcknowledgeAnswer,
            Self::RequestFinalRound => Intent::RequestFinalRound,
            Self::FinalReady => Intent::FinalReady,
            Self::SubmitFinalWager { .. } => Intent::SubmitFinalWager,
            Self::SubmitFinalJudgment { .. } => Intent::SubmitFinalJudgment,
        }
    }
}

/// Notifications for the presentation layer.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum GameEvent {
    StateChanged(Box<DisplayState>),
    ScoresChanged {
        roster: Vec<Contestant>,
    },
    LoadFailed {
        reason: String,
    },
    /// Dismissable information for the host.
    Notice {
        message: String,
    },
    /// An intent the engine refused. Nothing changed.
    Rejected {
        intent: Intent,
        reason: String,
    },
}

/// Everything needed to draw the current screen.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DisplayState {
    #[serde(rename = "gameId")]
    pub game_id: Option<GameId>,
    pub state: GameState,
    pub board: Vec<BoardColumn>,
    pub contestants: Vec<Contestant>,
    #[serde(rename = "activeClue")]
    pub active_clue: Option<ActiveClueView>,
    #[serde(rename = "finalRound")]
    pub final_round: Option<FinalRoundView>,
    pub standing: Option<Standing>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BoardColumn {
    pub title: String,
    pub cells: Vec<BoardCell>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BoardCell {
    pub value: i64,
    pub consumed: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ActiveClueView {
    pub category: String,
    pub value: i64,
    pub question: String,
    /// Only filled once the answer is revealed.
    pub answer: Option<String>,
    #[serde(rename = "isBonus")]
    pub is_bonus: bool,
    /// Contestant currently being judged.
    pub responder: Option<ContestantId>,
    /// Contestants who already missed this clue.
    pub attempted: Vec<ContestantId>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FinalRoundView {
    pub category: String,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub order: Vec<ContestantId>,
    pub current: Option<ContestantId>,
    pub wagers: Vec<Option<i64>>,
    pub skipped: Vec<ContestantId>,
    /// Descending by score, once results are in.
    pub ranking: Option<Vec<ContestantId>>,
}
