use crate::{
    api::messages::{FinalRoundView, Intent},
    error::GameError,
    game::{FinalClue, GameState, Verdict, clamp_wager},
    ledger::{ContestantId, Ledger, ROSTER_SIZE},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    CategoryReveal,
    QuestionReveal,
    Wager,
    Judgment,
    Results,
}

/// Progress through the wagered final round.
///
/// Contestants go one at a time, lowest score first. Each result is applied
/// before the next contestant wagers.
#[derive(Clone, Debug)]
pub struct FinalRound {
    clue: FinalClue,
    step: Step,
    order: Vec<ContestantId>,
    cursor: usize,
    wagers: [Option<i64>; ROSTER_SIZE],
    skipped: Vec<ContestantId>,
    ranking: Option<Vec<ContestantId>>,
}

impl FinalRound {
    pub fn new(clue: FinalClue) -> Self {
        Self {
            clue,
            step: Step::CategoryReveal,
            order: Vec::new(),
            cursor: 0,
            wagers: [None; ROSTER_SIZE],
            skipped: Vec::new(),
            ranking: None,
        }
    }

    pub fn state(&self) -> GameState {
        match self.step {
            Step::CategoryReveal => GameState::FinalCategoryReveal,
            Step::QuestionReveal => GameState::FinalQuestionReveal,
            Step::Wager => GameState::FinalWagerCollection,
            Step::Judgment => GameState::FinalJudgmentPending,
            Step::Results => GameState::FinalResults,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.step == Step::Results
    }

    pub fn current(&self) -> Option<ContestantId> {
        match self.step {
            Step::Wager | Step::Judgment => self.order.get(self.cursor).copied(),
            _ => None,
        }
    }

    pub fn wager(&self, id: ContestantId) -> Option<i64> {
        self.wagers.get(id).copied().flatten()
    }

    pub fn order(&self) -> &[ContestantId] {
        &self.order
    }

    pub fn skipped(&self) -> &[ContestantId] {
        &self.skipped
    }

    fn invalid(&self, intent: Intent) -> GameError {
        GameError::InvalidTransition {
            state: self.state(),
            intent,
        }
    }

    fn check_turn(&self, id: ContestantId) -> Result<(), GameError> {
        match self.current() {
            Some(expected) if expected == id => Ok(()),
            Some(expected) => Err(GameError::OutOfTurn { expected, got: id }),
            None => Err(GameError::UnknownContestant(id)),
        }
    }

    /// The host's "ready" button: category → question → wagers.
    /// Returns notices for contestants who sit out the wager.
    pub fn ready(&mut self, ledger: &Ledger) -> Result<Vec<String>, GameError> {
        match self.step {
            Step::CategoryReveal => {
                self.step = Step::QuestionReveal;
                Ok(vec![])
            }
            Step::QuestionReveal => {
                self.order = ledger.ascending();
                self.cursor = 0;
                tracing::info!(order = ?self.order, "Final round wagers begin");
                Ok(self.seek_next_wagerer(ledger))
            }
            _ => Err(self.invalid(Intent::FinalReady)),
        }
    }

    pub fn submit_wager(
        &mut self,
        ledger: &Ledger,
        id: ContestantId,
        raw: &str,
    ) -> Result<i64, GameError> {
        if self.step != Step::Wager {
            return Err(self.invalid(Intent::SubmitFinalWager));
        }
        ledger.get(id)?;
        self.check_turn(id)?;

        let wager = clamp_wager(raw, ledger.score(id)?);
        self.wagers[id] = Some(wager);
        self.step = Step::Judgment;
        tracing::info!(contestant = id, wager, "Final wager locked in");
        Ok(wager)
    }

    /// Applies the wager for the current contestant and moves on.
    pub fn submit_judgment(
        &mut self,
        ledger: &mut Ledger,
        id: ContestantId,
        verdict: Verdict,
    ) -> Result<Vec<String>, GameError> {
        if self.step != Step::Judgment {
            return Err(self.invalid(Intent::SubmitFinalJudgment));
        }
        ledger.get(id)?;
        self.check_turn(id)?;

        let wager = self.wagers[id].unwrap_or(0);
        let delta = match verdict {
            Verdict::Correct => wager,
            Verdict::Incorrect => -wager,
        };
        ledger.adjust(id, delta)?;

        self.cursor += 1;
        Ok(self.seek_next_wagerer(ledger))
    }

    /// Skips anyone with nothing to wager, then waits on the next contestant or finishes.
    fn seek_next_wagerer(&mut self, ledger: &Ledger) -> Vec<String> {
        let mut notices = Vec::new();

        while let Some(&id) = self.order.get(self.cursor) {
            let contestant = &ledger.contestants()[id];
            if contestant.score > 0 {
                self.step = Step::Wager;
                return notices;
            }
            tracing::info!(contestant = id, score = contestant.score, "Sitting out final wager");
            self.wagers[id] = Some(0);
            self.skipped.push(id);
            notices.push(format!(
                "{} has a non-positive score and cannot wager in the final round.",
                contestant.name
            ));
            self.cursor += 1;
        }

        self.step = Step::Results;
        self.ranking = Some(ledger.ranking());
        notices
    }

    pub fn view(&self) -> FinalRoundView {
        let question_shown = self.step != Step::CategoryReveal;
        let answer_shown = matches!(self.step, Step::Judgment | Step::Results);
        FinalRoundView {
            category: self.clue.category.clone(),
            question: question_shown.then(|| self.clue.question.clone()),
            answer: answer_shown.then(|| self.clue.answer.clone()),
            order: self.order.clone(),
            current: self.current(),
            wagers: self.wagers.to_vec(),
            skipped: self.skipped.clone(),
            ranking: self.ranking.clone(),
        }
    }
}
