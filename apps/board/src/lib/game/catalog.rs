use std::fmt;

use crate::{
    error::GameError,
    game::{
        Category, Clue, ClueId, FinalClue,
        bonus::IndexPicker,
        parser::ParsedSource,
    },
};

/// The loaded board: categories, every clue, and the optional final clue.
#[derive(Clone, Default, PartialEq)]
pub struct Catalog {
    categories: Vec<Category>,
    clues: Vec<Clue>,
    final_clue: Option<FinalClue>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("category count", &self.categories.len())
            .field("clue count", &self.clues.len())
            .field("remaining", &self.remaining())
            .field("has final", &self.final_clue.is_some())
            .finish()
    }
}

impl From<ParsedSource> for Catalog {
    fn from(parsed: ParsedSource) -> Self {
        Self {
            categories: parsed.categories,
            clues: parsed.clues,
            final_clue: parsed.final_clue,
        }
    }
}

impl Catalog {
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    pub fn final_clue(&self) -> Option<&FinalClue> {
        self.final_clue.as_ref()
    }

    pub fn clue(&self, id: ClueId) -> Option<&Clue> {
        self.clues.get(id)
    }

    pub fn clue_mut(&mut self, id: ClueId) -> Option<&mut Clue> {
        self.clues.get_mut(id)
    }

    /// Resolves a board cell to its clue id. `row` counts in display (ascending value) order.
    pub fn locate(&self, category_index: usize, row: usize) -> Result<ClueId, GameError> {
        self.categories
            .get(category_index)
            .and_then(|cat| cat.clues.get(row))
            .copied()
            .ok_or(GameError::UnknownClue {
                category_index,
                row,
            })
    }

    /// Marks the clue at a board cell as played. A clue can only be consumed once.
    pub fn consume(&mut self, category_index: usize, row: usize) -> Result<ClueId, GameError> {
        let id = self.locate(category_index, row)?;
        let clue = &mut self.clues[id];
        if clue.consumed {
            return Err(GameError::AlreadyConsumed {
                category_index,
                row,
            });
        }
        clue.consumed = true;
        Ok(id)
    }

    /// Flags one clue as the bonus clue. Returns its id, or `None` for an empty board.
    pub fn assign_bonus(&mut self, picker: &mut dyn IndexPicker) -> Option<ClueId> {
        if self.clues.is_empty() {
            return None;
        }
        for clue in &mut self.clues {
            clue.is_bonus = false;
        }
        let id = picker.pick(self.clues.len());
        self.clues[id].is_bonus = true;
        tracing::debug!(clue_id = id, category = %self.clues[id].category, "Bonus clue assigned");
        Some(id)
    }

    pub fn bonus_clue(&self) -> Option<ClueId> {
        self.clues.iter().position(|c| c.is_bonus)
    }

    pub fn remaining(&self) -> usize {
        self.clues.iter().filter(|c| !c.consumed).count()
    }

    pub fn all_consumed(&self) -> bool {
        self.clues.iter().all(|c| c.consumed)
    }
}
