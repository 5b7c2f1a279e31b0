use serde::{Deserialize, Serialize};

use crate::api::messages::GameEvent;

pub mod bonus;
pub mod catalog;
pub mod final_round;
pub mod parser;
pub mod session;

/// Position of a clue in the flat, source-ordered clue list.
pub type ClueId = usize;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clue {
    pub category: String,
    pub value: i64,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub consumed: bool,
    #[serde(default, rename = "isBonus")]
    pub is_bonus: bool,
}

impl Clue {
    pub fn new(category: String, value: i64, question: String, answer: String) -> Self {
        Self {
            category,
            value,
            question,
            answer,
            consumed: false,
            is_bonus: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalClue {
    pub category: String,
    pub question: String,
    pub answer: String,
}

/// A board column. Holds ids into the flat clue list, sorted by ascending value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    pub clues: Vec<ClueId>,
}

/// Host ruling on a contestant's response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Deserialize, Serialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum GameState {
    #[default]
    Board,
    BonusWagerPending,
    BuzzPending,
    JudgmentPending,
    AnswerReveal,
    GameOver,
    FinalCategoryReveal,
    FinalQuestionReveal,
    FinalWagerCollection,
    FinalJudgmentPending,
    FinalResults,
}

/// Outbound notifications produced by one host intent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionResponse {
    pub events: Vec<GameEvent>,
}

impl SessionResponse {
    pub fn new() -> Self {
        Self { events: vec![] }
    }

    pub fn single(event: GameEvent) -> Self {
        Self {
            events: vec![event],
        }
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn merge(mut self, other: SessionResponse) -> Self {
        self.events.extend(other.events);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Parses a wager the way the host typed it. Anything that is not an integer is a zero wager.
pub fn parse_wager(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(amount) => amount,
        Err(e) => {
            tracing::debug!(input = raw, error = %e, "Unreadable wager, treating as 0");
            0
        }
    }
}

/// `clamp(parse_wager(raw), 0, ceiling)`; a negative ceiling means the only legal wager is 0.
pub fn clamp_wager(raw: &str, ceiling: i64) -> i64 {
    parse_wager(raw).clamp(0, ceiling.max(0))
}
