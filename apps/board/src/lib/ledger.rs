use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Index into the roster.
pub type ContestantId = usize;

/// The roster size is part of the game, not the data.
pub const ROSTER_SIZE: usize = 3;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Contestant {
    pub id: ContestantId,
    pub name: String,
    pub score: i64,
}

impl Contestant {
    pub fn new(id: ContestantId) -> Self {
        Self {
            id,
            name: placeholder_name(id),
            score: 0,
        }
    }
}

fn placeholder_name(id: ContestantId) -> String {
    format!("Contestant {}", id + 1)
}

/// Who came out on top.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Standing {
    Winner { id: ContestantId, score: i64 },
    /// Everyone sharing the top score, in roster order.
    Tie { ids: Vec<ContestantId>, score: i64 },
}

impl Standing {
    pub fn winner(&self) -> Option<ContestantId> {
        match self {
            Self::Winner { id, .. } => Some(*id),
            Self::Tie { .. } => None,
        }
    }
}

/// Names and running scores for the fixed roster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    contestants: [Contestant; ROSTER_SIZE],
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            contestants: std::array::from_fn(Contestant::new),
        }
    }

    pub fn contestants(&self) -> &[Contestant] {
        &self.contestants
    }

    pub fn get(&self, id: ContestantId) -> Result<&Contestant, GameError> {
        self.contestants
            .get(id)
            .ok_or(GameError::UnknownContestant(id))
    }

    fn get_mut(&mut self, id: ContestantId) -> Result<&mut Contestant, GameError> {
        self.contestants
            .get_mut(id)
            .ok_or(GameError::UnknownContestant(id))
    }

    pub fn score(&self, id: ContestantId) -> Result<i64, GameError> {
        Ok(self.get(id)?.score)
    }

    pub fn set_name(&mut self, id: ContestantId, name: &str) -> Result<(), GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::BlankName);
        }
        self.get_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Overwrites a score. No bounds.
    pub fn set_score(&mut self, id: ContestantId, score: i64) -> Result<(), GameError> {
        self.get_mut(id)?.score = score;
        Ok(())
    }

    /// Adds a signed delta and returns the new score. Saturates at the i64 limits.
    pub fn adjust(&mut self, id: ContestantId, delta: i64) -> Result<i64, GameError> {
        let contestant = self.get_mut(id)?;
        contestant.score = contestant.score.saturating_add(delta);
        tracing::info!(
            contestant = id,
            name = %contestant.name,
            delta,
            score = contestant.score,
            "Score adjusted"
        );
        Ok(contestant.score)
    }

    pub fn reset_scores(&mut self) {
        for contestant in &mut self.contestants {
            contestant.score = 0;
        }
    }

    /// Back to placeholder names and zero scores.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Lowest score first; equal scores keep roster order.
    pub fn ascending(&self) -> Vec<ContestantId> {
        let mut order: Vec<ContestantId> = (0..ROSTER_SIZE).collect();
        order.sort_by_key(|&id| self.contestants[id].score);
        order
    }

    /// Highest score first; equal scores keep roster order.
    pub fn ranking(&self) -> Vec<ContestantId> {
        let mut order: Vec<ContestantId> = (0..ROSTER_SIZE).collect();
        order.sort_by_key(|&id| std::cmp::Reverse(self.contestants[id].score));
        order
    }

    pub fn standing(&self) -> Standing {
        let max_score = self
            .contestants
            .iter()
            .map(|c| c.score)
            .max()
            .unwrap_or(0);

        let leaders: Vec<ContestantId> = self
            .contestants
            .iter()
            .filter(|c| c.score == max_score)
            .map(|c| c.id)
            .collect();

        if leaders.len() == 1 {
            Standing::Winner {
                id: leaders[0],
                score: max_score,
            }
        } else {
            Standing::Tie {
                ids: leaders,
                score: max_score,
            }
        }
    }
}
