use std::{
    fmt::{self, Display},
    path::Path,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::messages::{
        ActiveClueView, BoardCell, BoardColumn, DisplayState, GameEvent, HostCommand, Intent,
    },
    config::GameConfig,
    error::GameError,
    game::{
        ClueId, GameState, SessionResponse, Verdict,
        bonus::{IndexPicker, ThreadRngPicker},
        catalog::Catalog,
        clamp_wager,
        final_round::FinalRound,
        parser::{parse_source, read_source_file},
    },
    ledger::{ContestantId, Ledger, ROSTER_SIZE, Standing},
};

/// Identifies one loaded board. Regenerated on every successful load or reset.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GameId(Uuid);

impl GameId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The clue currently on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ActiveClue {
    id: ClueId,
    bonus: bool,
    responder: Option<ContestantId>,
    attempted: Vec<ContestantId>,
}

/// One game at the podium: the board, the roster, and where the host is in a round.
pub struct Session {
    config: GameConfig,
    game_id: Option<GameId>,
    state: GameState,
    catalog: Catalog,
    ledger: Ledger,
    active: Option<ActiveClue>,
    final_round: Option<FinalRound>,
    final_played: bool,
    standing: Option<Standing>,
    source: Option<String>,
    picker: Box<dyn IndexPicker>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("game_id", &self.game_id)
            .field("state", &self.state)
            .field("catalog", &self.catalog)
            .field("ledger", &self.ledger)
            .field("active", &self.active)
            .field("final played", &self.final_played)
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Self::with_picker(config, Box::new(ThreadRngPicker))
    }

    pub fn with_picker(config: GameConfig, picker: Box<dyn IndexPicker>) -> Self {
        Self {
            config,
            game_id: None,
            state: GameState::default(),
            catalog: Catalog::default(),
            ledger: Ledger::new(),
            active: None,
            final_round: None,
            final_played: false,
            standing: None,
            source: None,
            picker,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn game_id(&self) -> Option<GameId> {
        self.game_id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn final_round(&self) -> Option<&FinalRound> {
        self.final_round.as_ref()
    }

    pub fn standing(&self) -> Option<&Standing> {
        self.standing.as_ref()
    }

    pub fn winner(&self) -> Option<ContestantId> {
        self.standing.as_ref().and_then(Standing::winner)
    }

    /// Contestants who already missed the clue on screen.
    pub fn attempted(&self) -> &[ContestantId] {
        self.active
            .as_ref()
            .map(|a| a.attempted.as_slice())
            .unwrap_or_default()
    }

    fn require(&self, intent: Intent, allowed: &[GameState]) -> Result<(), GameError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(GameError::InvalidTransition {
                state: self.state,
                intent,
            })
        }
    }

    fn transition(&mut self, next: GameState) {
        tracing::debug!(game_id = ?self.game_id, from = ?self.state, to = ?next, "State transition");
        self.state = next;
    }
}

// Loading and roster management
impl Session {
    /// Replaces the board with a freshly parsed source. On failure nothing changes.
    pub fn load_source(&mut self, text: &str) -> Result<SessionResponse, GameError> {
        let parsed = parse_source(text)?;
        self.install(Catalog::from(parsed));
        self.source = Some(text.to_string());
        self.ledger.reset_scores();

        tracing::info!(
            game_id = ?self.game_id,
            categories = self.catalog.categories().len(),
            clues = self.catalog.clues().len(),
            has_final = self.catalog.final_clue().is_some(),
            "Game loaded"
        );

        Ok(self.scores_changed().merge(self.state_changed()))
    }

    pub fn load_source_file(&mut self, path: impl AsRef<Path>) -> Result<SessionResponse, GameError> {
        let text = read_source_file(path)?;
        self.load_source(&text)
    }

    /// Deals the last loaded source again with a blank roster.
    pub fn reset_game(&mut self) -> Result<SessionResponse, GameError> {
        let catalog = match self.source.as_deref() {
            Some(text) => Some(Catalog::from(parse_source(text)?)),
            None => None,
        };
        self.ledger.reset();
        match catalog {
            Some(catalog) => self.install(catalog),
            None => {
                self.clear_round();
                self.transition(GameState::Board);
            }
        }
        tracing::info!(game_id = ?self.game_id, "Game reset");
        Ok(self.scores_changed().merge(self.state_changed()))
    }

    fn install(&mut self, mut catalog: Catalog) {
        catalog.assign_bonus(self.picker.as_mut());
        self.catalog = catalog;
        self.game_id = Some(GameId::generate());
        self.final_played = false;
        self.clear_round();
        self.transition(GameState::Board);
    }

    fn clear_round(&mut self) {
        self.active = None;
        self.final_round = None;
        self.standing = None;
    }

    pub fn set_contestant_name(
        &mut self,
        id: ContestantId,
        name: &str,
    ) -> Result<SessionResponse, GameError> {
        self.ledger.set_name(id, name)?;
        Ok(self.scores_changed().merge(self.state_changed()))
    }

    /// Host override of a score. Any state, any value.
    pub fn adjust_score(&mut self, id: ContestantId, score: i64) -> Result<SessionResponse, GameError> {
        self.ledger.set_score(id, score)?;
        tracing::info!(contestant = id, score, "Score set by host");
        Ok(self.scores_changed().merge(self.state_changed()))
    }
}

// The clue round
impl Session {
    pub fn open_clue(
        &mut self,
        category_index: usize,
        row: usize,
    ) -> Result<SessionResponse, GameError> {
        self.require(Intent::OpenClue, &[GameState::Board])?;
        let id = self.catalog.consume(category_index, row)?;
        let bonus = self.catalog.clues()[id].is_bonus;

        tracing::info!(
            game_id = ?self.game_id,
            category_index,
            row,
            bonus,
            "Clue opened"
        );

        self.active = Some(ActiveClue {
            id,
            bonus,
            responder: None,
            attempted: Vec::new(),
        });
        self.transition(if bonus {
            GameState::BonusWagerPending
        } else {
            GameState::BuzzPending
        });
        Ok(self.state_changed())
    }

    fn active_mut(&mut self, intent: Intent) -> Result<&mut ActiveClue, GameError> {
        let state = self.state;
        self.active
            .as_mut()
            .ok_or(GameError::InvalidTransition { state, intent })
    }

    /// Locks in the bonus wager for the contestant who found the bonus clue.
    pub fn submit_bonus_wager(
        &mut self,
        contestant: ContestantId,
        raw: &str,
    ) -> Result<SessionResponse, GameError> {
        self.require(Intent::SubmitBonusWager, &[GameState::BonusWagerPending])?;
        let score = self.ledger.score(contestant)?;
        let wager = clamp_wager(raw, score.max(self.config.bonus_wager_floor));

        let active = self.active_mut(Intent::SubmitBonusWager)?;
        active.responder = Some(contestant);
        let id = active.id;
        if let Some(clue) = self.catalog.clue_mut(id) {
            clue.value = wager;
        }

        tracing::info!(contestant, wager, input = raw, "Bonus wager set");
        self.transition(GameState::JudgmentPending);
        Ok(self.state_changed())
    }

    /// Backs out of a bonus clue without scoring. The clue stays played.
    pub fn cancel_bonus(&mut self) -> Result<SessionResponse, GameError> {
        self.require(Intent::CancelBonus, &[GameState::BonusWagerPending])?;
        tracing::info!("Bonus clue cancelled");
        self.transition(GameState::AnswerReveal);
        Ok(self.state_changed())
    }

    pub fn buzz(&mut self, contestant: ContestantId) -> Result<SessionResponse, GameError> {
        self.require(Intent::Buzz, &[GameState::BuzzPending])?;
        let name = self.ledger.get(contestant)?.name.clone();

        let active = self.active_mut(Intent::Buzz)?;
        if active.attempted.contains(&contestant) {
            return Err(GameError::AlreadyAttempted(contestant));
        }
        active.responder = Some(contestant);

        tracing::info!(contestant, name = %name, "Contestant buzzed in");
        self.transition(GameState::JudgmentPending);
        Ok(self.state_changed())
    }

    pub fn no_buzz(&mut self) -> Result<SessionResponse, GameError> {
        self.require(Intent::NoBuzz, &[GameState::BuzzPending])?;
        tracing::info!("Nobody buzzed");
        self.transition(GameState::AnswerReveal);
        Ok(self.state_changed())
    }

    pub fn judge(&mut self, verdict: Verdict) -> Result<SessionResponse, GameError> {
        self.require(Intent::Judge, &[GameState::JudgmentPending])?;
        let state = self.state;
        let active = self.active_mut(Intent::Judge)?;
        let responder = active.responder.ok_or(GameError::InvalidTransition {
            state,
            intent: Intent::Judge,
        })?;
        let bonus = active.bonus;
        let id = active.id;
        let value = self.catalog.clue(id).map(|c| c.value).unwrap_or(0);

        let delta = match verdict {
            Verdict::Correct => value,
            Verdict::Incorrect => -value,
        };
        self.ledger.adjust(responder, delta)?;

        let next = match verdict {
            Verdict::Correct => GameState::AnswerReveal,
            Verdict::Incorrect if bonus => GameState::AnswerReveal,
            Verdict::Incorrect => {
                let active = self.active_mut(Intent::Judge)?;
                active.responder = None;
                active.attempted.push(responder);
                if active.attempted.len() >= ROSTER_SIZE {
                    tracing::debug!("Every contestant has missed, revealing answer");
                    GameState::AnswerReveal
                } else {
                    GameState::BuzzPending
                }
            }
        };

        tracing::info!(contestant = responder, ?verdict, value, "Response judged");
        self.transition(next);
        Ok(self.scores_changed().merge(self.state_changed()))
    }

    /// Drops the current responder without scoring so someone else can buzz.
    pub fn pass(&mut self) -> Result<SessionResponse, GameError> {
        self.require(Intent::Pass, &[GameState::JudgmentPending])?;
        let state = self.state;
        let active = self.active_mut(Intent::Pass)?;
        if active.bonus {
            return Err(GameError::InvalidTransition {
                state,
                intent: Intent::Pass,
            });
        }
        active.responder = None;
        self.transition(GameState::BuzzPending);
        Ok(self.state_changed())
    }

    /// Leaves the answer screen or the final results.
    pub fn acknowledge_answer(&mut self) -> Result<SessionResponse, GameError> {
        self.require(
            Intent::AcknowledgeAnswer,
            &[GameState::AnswerReveal, GameState::FinalResults],
        )?;
        self.active = None;
        self.final_round = None;

        if self.catalog.all_consumed() {
            self.determine_standing();
            self.transition(GameState::GameOver);
        } else {
            if self.state == GameState::AnswerReveal {
                self.standing = None;
            }
            self.transition(GameState::Board);
        }
        Ok(self.state_changed())
    }

    fn determine_standing(&mut self) {
        let standing = self.ledger.standing();
        match &standing {
            Standing::Winner { id, score } => tracing::info!(
                game_id = ?self.game_id,
                contestant = id,
                name = %self.ledger.contestants()[*id].name,
                score,
                "Winner determined"
            ),
            Standing::Tie { ids, score } => tracing::info!(
                game_id = ?self.game_id,
                tie = ?ids,
                score,
                "Game ended in a tie"
            ),
        }
        self.standing = Some(standing);
    }
}

// The final round
impl Session {
    pub fn request_final_round(&mut self) -> Result<SessionResponse, GameError> {
        self.require(
            Intent::RequestFinalRound,
            &[GameState::Board, GameState::GameOver],
        )?;
        let clue = self.catalog.final_clue().cloned().ok_or(GameError::NoFinalClue)?;
        if self.final_played {
            return Err(GameError::FinalRoundPlayed);
        }

        tracing::info!(game_id = ?self.game_id, category = %clue.category, "Final round started");
        let round = FinalRound::new(clue);
        self.transition(round.state());
        self.final_round = Some(round);
        Ok(self.state_changed())
    }

    pub fn final_ready(&mut self) -> Result<SessionResponse, GameError> {
        let ledger = &self.ledger;
        let state = self.state;
        let round = self
            .final_round
            .as_mut()
            .ok_or(GameError::InvalidTransition {
                state,
                intent: Intent::FinalReady,
            })?;
        let notices = round.ready(ledger)?;
        Ok(self.after_final_step(notices))
    }

    pub fn submit_final_wager(
        &mut self,
        contestant: ContestantId,
        raw: &str,
    ) -> Result<SessionResponse, GameError> {
        let ledger = &self.ledger;
        let state = self.state;
        let round = self
            .final_round
            .as_mut()
            .ok_or(GameError::InvalidTransition {
                state,
                intent: Intent::SubmitFinalWager,
            })?;
        round.submit_wager(ledger, contestant, raw)?;
        Ok(self.after_final_step(vec![]))
    }

    pub fn submit_final_judgment(
        &mut self,
        contestant: ContestantId,
        verdict: Verdict,
    ) -> Result<SessionResponse, GameError> {
        let state = self.state;
        let round = self
            .final_round
            .as_mut()
            .ok_or(GameError::InvalidTransition {
                state,
                intent: Intent::SubmitFinalJudgment,
            })?;
        let notices = round.submit_judgment(&mut self.ledger, contestant, verdict)?;
        Ok(self.scores_changed().merge(self.after_final_step(notices)))
    }

    fn after_final_step(&mut self, notices: Vec<String>) -> SessionResponse {
        let Some(round) = self.final_round.as_ref() else {
            return self.state_changed();
        };
        let next = round.state();
        let finished = round.is_finished();

        if finished {
            self.final_played = true;
            self.determine_standing();
        }
        self.transition(next);

        let mut response = SessionResponse::new();
        for message in notices {
            response.push(GameEvent::Notice { message });
        }
        response.merge(self.state_changed())
    }
}

// Host command dispatch and display
impl Session {
    /// Applies one host intent. Refusals become events instead of errors.
    pub fn handle_command(&mut self, cmd: &HostCommand) -> SessionResponse {
        let result = match cmd {
            HostCommand::LoadSource { text } => self.load_source(text),
            HostCommand::LoadFile { path } => self.load_source_file(path),
            HostCommand::ResetGame => self.reset_game(),
            HostCommand::SetContestantName { contestant, name } => {
                self.set_contestant_name(*contestant, name)
            }
            HostCommand::AdjustScore { contestant, score } => {
                self.adjust_score(*contestant, *score)
            }
            HostCommand::OpenClue {
                category_index,
                row,
            } => self.open_clue(*category_index, *row),
            HostCommand::SubmitBonusWager { contestant, wager } => {
                self.submit_bonus_wager(*contestant, wager)
            }
            HostCommand::CancelBonus => self.cancel_bonus(),
            HostCommand::Buzz { contestant } => self.buzz(*contestant),
            HostCommand::NoBuzz => self.no_buzz(),
            HostCommand::Judge { verdict } => self.judge(*verdict),
            HostCommand::Pass => self.pass(),
            HostCommand::AcknowledgeAnswer => self.acknowledge_answer(),
            HostCommand::RequestFinalRound => self.request_final_round(),
            HostCommand::FinalReady => self.final_ready(),
            HostCommand::SubmitFinalWager { contestant, wager } => {
                self.submit_final_wager(*contestant, wager)
            }
            HostCommand::SubmitFinalJudgment {
                contestant,
                verdict,
            } => self.submit_final_judgment(*contestant, *verdict),
        };

        match result {
            Ok(response) => response,
            Err(e) => self.refusal(cmd.intent(), e),
        }
    }

    fn refusal(&self, intent: Intent, error: GameError) -> SessionResponse {
        tracing::warn!(?intent, state = ?self.state, error = %error, "Host intent refused");
        let event = match error {
            GameError::MalformedSource { .. } => GameEvent::LoadFailed {
                reason: error.to_string(),
            },
            GameError::NoFinalClue | GameError::FinalRoundPlayed => GameEvent::Notice {
                message: error.to_string(),
            },
            _ => GameEvent::Rejected {
                intent,
                reason: error.to_string(),
            },
        };
        SessionResponse::single(event)
    }

    pub fn state_changed(&self) -> SessionResponse {
        SessionResponse::single(GameEvent::StateChanged(Box::new(self.display_state())))
    }

    pub fn scores_changed(&self) -> SessionResponse {
        SessionResponse::single(GameEvent::ScoresChanged {
            roster: self.ledger.contestants().to_vec(),
        })
    }

    pub fn display_state(&self) -> DisplayState {
        let board = self
            .catalog
            .categories()
            .iter()
            .map(|cat| BoardColumn {
                title: cat.title.clone(),
                cells: cat
                    .clues
                    .iter()
                    .filter_map(|&id| self.catalog.clue(id))
                    .map(|clue| BoardCell {
                        value: clue.value,
                        consumed: clue.consumed,
                    })
                    .collect(),
            })
            .collect();

        let active_clue = self.active.as_ref().and_then(|active| {
            let clue = self.catalog.clue(active.id)?;
            let revealed = self.state == GameState::AnswerReveal;
            Some(ActiveClueView {
                category: clue.category.clone(),
                value: clue.value,
                question: clue.question.clone(),
                answer: revealed.then(|| clue.answer.clone()),
                is_bonus: clue.is_bonus,
                responder: active.responder,
                attempted: active.attempted.clone(),
            })
        });

        DisplayState {
            game_id: self.game_id,
            state: self.state,
            board,
            contestants: self.ledger.contestants().to_vec(),
            active_clue,
            final_round: self.final_round.as_ref().map(FinalRound::view),
            standing: self.standing.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::bonus::FixedPicker;

    // Flat ids: 0 SCIENCE/400, 1 SCIENCE/200, 2 HISTORY/100.
    // Display rows: SCIENCE [200, 400], HISTORY [100].
    const SHEET: &str = "\
Category,Value,Question,Answer
SCIENCE,400,What gas do plants absorb?,Carbon dioxide
SCIENCE,200,\"What planet is red?\",Mars
HISTORY,100,Who crossed the Delaware?,Washington
# FinalJeopardy
HISTORY,,Who was first?,Washington
";

    /// Bonus lands on flat id 2 (HISTORY, row 0).
    fn create_test_session() -> Session {
        let mut session = Session::with_picker(
            GameConfig::default().with_reveal_delay(None),
            Box::new(FixedPicker(2)),
        );
        session.load_source(SHEET).expect("valid sheet");
        session
    }

    fn set_scores(session: &mut Session, scores: [i64; ROSTER_SIZE]) {
        for (id, score) in scores.into_iter().enumerate() {
            session.adjust_score(id, score).expect("in roster");
        }
    }

    fn score(session: &Session, id: ContestantId) -> i64 {
        session.ledger().score(id).expect("in roster")
    }

    #[test]
    fn test_load_assigns_one_bonus() {
        let session = create_test_session();
        assert_eq!(session.state(), GameState::Board);
        assert!(session.game_id().is_some());
        assert_eq!(session.catalog().bonus_clue(), Some(2));
        assert_eq!(
            session.catalog().clues().iter().filter(|c| c.is_bonus).count(),
            1
        );
    }

    #[test]
    fn test_failed_load_leaves_session_untouched() {
        let mut session = create_test_session();
        session.open_clue(0, 0).expect("unplayed");
        let before = session.game_id();

        let response = session.handle_command(&HostCommand::LoadSource {
            text: "nothing useful here".to_string(),
        });

        assert!(matches!(
            response.events.as_slice(),
            [GameEvent::LoadFailed { .. }]
        ));
        assert_eq!(session.game_id(), before);
        assert_eq!(session.state(), GameState::BuzzPending);
        assert!(session.catalog().clues()[1].consumed);
    }

    #[test]
    fn test_reload_zeroes_scores_and_keeps_names() {
        let mut session = create_test_session();
        session.set_contestant_name(0, "Ana").expect("valid name");
        set_scores(&mut session, [500, 200, -100]);
        let first = session.game_id();

        session.load_source(SHEET).expect("valid sheet");

        assert_ne!(session.game_id(), first);
        assert_eq!(session.ledger().contestants()[0].name, "Ana");
        assert!(session.ledger().contestants().iter().all(|c| c.score == 0));
        assert!(session.catalog().clues().iter().all(|c| !c.consumed));
    }

    #[test]
    fn test_reset_game_redeals_and_clears_roster() {
        let mut session = create_test_session();
        session.set_contestant_name(1, "Ben").expect("valid name");
        session.adjust_score(1, 800).expect("in roster");
        session.open_clue(0, 0).expect("unplayed");

        session.reset_game().expect("reset");

        assert_eq!(session.state(), GameState::Board);
        assert_eq!(session.ledger(), &Ledger::new());
        assert!(session.catalog().clues().iter().all(|c| !c.consumed));
        assert_eq!(session.catalog().bonus_clue(), Some(2));
    }

    #[test]
    fn test_reset_without_source() {
        let mut session = Session::with_picker(GameConfig::default(), Box::new(FixedPicker(0)));
        session.adjust_score(0, 300).expect("in roster");
        session.reset_game().expect("reset");
        assert_eq!(session.ledger(), &Ledger::new());
        assert_eq!(session.game_id(), None);
        assert!(session.catalog().clues().is_empty());
    }

    #[test]
    fn test_correct_answer_example() {
        let mut session = create_test_session();
        session.set_contestant_name(0, "Ana").expect("valid name");
        session.adjust_score(0, 1000).expect("in roster");
        // bump the 200 clue to 400 so the numbers match the example
        session.catalog.clue_mut(1).expect("clue").value = 400;

        session.open_clue(0, 0).expect("unplayed");
        session.buzz(0).expect("buzz");
        session.judge(Verdict::Correct).expect("judged");

        assert_eq!(score(&session, 0), 1400);
        assert_eq!(session.state(), GameState::AnswerReveal);
    }

    #[test]
    fn test_game_state_transitions() {
        struct TestCase {
            name: &'static str,
            setup: fn(&mut Session),
            command: HostCommand,
            expected_state: GameState,
            assertions: fn(&Session),
        }

        let test_cases = vec![
            TestCase {
                name: "OpenClue on a regular clue waits for a buzz",
                setup: |_| {},
                command: HostCommand::OpenClue {
                    category_index: 0,
                    row: 0,
                },
                expected_state: GameState::BuzzPending,
                assertions: |s| {
                    assert!(s.catalog().clues()[1].consumed);
                },
            },
            TestCase {
                name: "OpenClue on the bonus clue asks for a wager",
                setup: |_| {},
                command: HostCommand::OpenClue {
                    category_index: 1,
                    row: 0,
                },
                expected_state: GameState::BonusWagerPending,
                assertions: |s| {
                    assert!(s.catalog().clues()[2].consumed);
                },
            },
            TestCase {
                name: "Buzz binds the responder",
                setup: |s| {
                    s.open_clue(0, 0).expect("unplayed");
                },
                command: HostCommand::Buzz { contestant: 1 },
                expected_state: GameState::JudgmentPending,
                assertions: |s| {
                    let view = s.display_state().active_clue.expect("active clue");
                    assert_eq!(view.responder, Some(1));
                    assert_eq!(view.answer, None);
                },
            },
            TestCase {
                name: "NoBuzz reveals the answer without scoring",
                setup: |s| {
                    s.open_clue(0, 0).expect("unplayed");
                },
                command: HostCommand::NoBuzz,
                expected_state: GameState::AnswerReveal,
                assertions: |s| {
                    assert!(s.ledger().contestants().iter().all(|c| c.score == 0));
                    let view = s.display_state().active_clue.expect("active clue");
                    assert_eq!(view.answer.as_deref(), Some("Mars"));
                },
            },
            TestCase {
                name: "Pass returns to buzzing without scoring",
                setup: |s| {
                    s.open_clue(0, 0).expect("unplayed");
                    s.buzz(2).expect("buzz");
                },
                command: HostCommand::Pass,
                expected_state: GameState::BuzzPending,
                assertions: |s| {
                    assert_eq!(s.ledger().score(2), Ok(0));
                    assert!(s.attempted().is_empty());
                },
            },
            TestCase {
                name: "Acknowledge returns to the board",
                setup: |s| {
                    s.open_clue(0, 0).expect("unplayed");
                    s.no_buzz().expect("no buzz");
                },
                command: HostCommand::AcknowledgeAnswer,
                expected_state: GameState::Board,
                assertions: |s| {
                    assert!(s.display_state().active_clue.is_none());
                },
            },
            TestCase {
                name: "CancelBonus reveals without scoring",
                setup: |s| {
                    s.open_clue(1, 0).expect("unplayed");
                },
                command: HostCommand::CancelBonus,
                expected_state: GameState::AnswerReveal,
                assertions: |s| {
                    assert!(s.ledger().contestants().iter().all(|c| c.score == 0));
                },
            },
            TestCase {
                name: "Buzz is refused on the board",
                setup: |_| {},
                command: HostCommand::Buzz { contestant: 0 },
                expected_state: GameState::Board,
                assertions: |_| {},
            },
            TestCase {
                name: "Opening a clue mid-round is refused",
                setup: |s| {
                    s.open_clue(0, 0).expect("unplayed");
                },
                command: HostCommand::OpenClue {
                    category_index: 0,
                    row: 1,
                },
                expected_state: GameState::BuzzPending,
                assertions: |s| {
                    assert!(!s.catalog().clues()[0].consumed);
                },
            },
        ];

        for tc in test_cases {
            let mut session = create_test_session();
            (tc.setup)(&mut session);

            session.handle_command(&tc.command);

            assert_eq!(
                session.state(),
                tc.expected_state,
                "Test case failed: {}",
                tc.name
            );
            (tc.assertions)(&session)
        }
    }

    #[test]
    fn test_scoring() {
        struct TestCase {
            name: &'static str,
            setup: fn(&mut Session),
            verdict: Verdict,
            responder: ContestantId,
            expected_score: i64,
            expected_state: GameState,
        }

        let test_cases = vec![
            TestCase {
                name: "Correct answer awards the value",
                setup: |s| {
                    s.open_clue(0, 1).expect("unplayed");
                    s.buzz(0).expect("buzz");
                },
                verdict: Verdict::Correct,
                responder: 0,
                expected_score: 400,
                expected_state: GameState::AnswerReveal,
            },
            TestCase {
                name: "Incorrect answer deducts and reopens buzzing",
                setup: |s| {
                    s.open_clue(0, 0).expect("unplayed");
                    s.buzz(1).expect("buzz");
                },
                verdict: Verdict::Incorrect,
                responder: 1,
                expected_score: -200,
                expected_state: GameState::BuzzPending,
            },
            TestCase {
                name: "Last contestant missing reveals the answer",
                setup: |s| {
                    s.open_clue(0, 0).expect("unplayed");
                    for id in 0..2 {
                        s.buzz(id).expect("buzz");
                        s.judge(Verdict::Incorrect).expect("judged");
                    }
                    s.buzz(2).expect("buzz");
                },
                verdict: Verdict::Incorrect,
                responder: 2,
                expected_score: -200,
                expected_state: GameState::AnswerReveal,
            },
            TestCase {
                name: "Bonus clue scores the wager",
                setup: |s| {
                    s.adjust_score(2, 300).expect("in roster");
                    s.open_clue(1, 0).expect("unplayed");
                    s.submit_bonus_wager(2, "800").expect("wager");
                },
                verdict: Verdict::Correct,
                responder: 2,
                expected_score: 1100,
                expected_state: GameState::AnswerReveal,
            },
            TestCase {
                name: "Missed bonus clue ends the clue",
                setup: |s| {
                    s.open_clue(1, 0).expect("unplayed");
                    s.submit_bonus_wager(0, "1000").expect("wager");
                },
                verdict: Verdict::Incorrect,
                responder: 0,
                expected_score: -1000,
                expected_state: GameState::AnswerReveal,
            },
        ];

        for tc in test_cases {
            let mut session = create_test_session();
            (tc.setup)(&mut session);

            session.judge(tc.verdict).expect("judged");

            assert_eq!(
                score(&session, tc.responder),
                tc.expected_score,
                "Test case failed (score): {}",
                tc.name
            );
            assert_eq!(
                session.state(),
                tc.expected_state,
                "Test case failed (state): {}",
                tc.name
            );
        }
    }

    #[test]
    fn test_bonus_wager_clamping() {
        struct TestCase {
            score: i64,
            raw: &'static str,
            expected: i64,
        }

        let test_cases = vec![
            TestCase { score: 0, raw: "5000", expected: 1000 },
            TestCase { score: 2500, raw: "5000", expected: 2500 },
            TestCase { score: -400, raw: "700", expected: 700 },
            TestCase { score: 2500, raw: "-1", expected: 0 },
            TestCase { score: 2500, raw: "a lot", expected: 0 },
        ];

        for tc in test_cases {
            let mut session = create_test_session();
            session.adjust_score(0, tc.score).expect("in roster");
            session.open_clue(1, 0).expect("unplayed");
            session.submit_bonus_wager(0, tc.raw).expect("wager");
            assert_eq!(
                session.catalog().clues()[2].value,
                tc.expected,
                "score {} wager {:?}",
                tc.score,
                tc.raw
            );
        }
    }

    #[test]
    fn test_pass_refused_on_bonus_clue() {
        let mut session = create_test_session();
        session.open_clue(1, 0).expect("unplayed");
        session.submit_bonus_wager(0, "100").expect("wager");
        assert!(matches!(
            session.pass(),
            Err(GameError::InvalidTransition {
                state: GameState::JudgmentPending,
                intent: Intent::Pass,
            })
        ));
        assert_eq!(session.state(), GameState::JudgmentPending);
    }

    #[test]
    fn test_missed_contestant_cannot_buzz_again() {
        let mut session = create_test_session();
        session.open_clue(0, 0).expect("unplayed");
        session.buzz(0).expect("buzz");
        session.judge(Verdict::Incorrect).expect("judged");

        assert_eq!(session.buzz(0), Err(GameError::AlreadyAttempted(0)));
        assert_eq!(session.attempted(), &[0]);
        session.buzz(1).expect("someone else may try");
    }

    #[test]
    fn test_clue_cannot_be_reopened() {
        let mut session = create_test_session();
        session.open_clue(0, 0).expect("unplayed");
        session.no_buzz().expect("no buzz");
        session.acknowledge_answer().expect("ack");

        assert_eq!(
            session.open_clue(0, 0),
            Err(GameError::AlreadyConsumed {
                category_index: 0,
                row: 0
            })
        );
        assert_eq!(session.state(), GameState::Board);
    }

    #[test]
    fn test_unknown_refs_are_refused() {
        let mut session = create_test_session();
        assert_eq!(
            session.open_clue(3, 0),
            Err(GameError::UnknownClue {
                category_index: 3,
                row: 0
            })
        );
        session.open_clue(0, 0).expect("unplayed");
        assert_eq!(session.buzz(7), Err(GameError::UnknownContestant(7)));
        assert_eq!(session.state(), GameState::BuzzPending);
    }

    #[test]
    fn test_game_over_only_when_board_is_clear() {
        let mut session = create_test_session();
        set_scores(&mut session, [0, 600, 100]);

        for (category_index, row) in [(0, 0), (0, 1)] {
            session.open_clue(category_index, row).expect("unplayed");
            session.no_buzz().expect("no buzz");
            session.acknowledge_answer().expect("ack");
            assert_eq!(session.state(), GameState::Board);
            assert_eq!(session.standing(), None);
        }

        session.open_clue(1, 0).expect("unplayed");
        session.cancel_bonus().expect("cancel");
        session.acknowledge_answer().expect("ack");

        assert_eq!(session.state(), GameState::GameOver);
        assert_eq!(session.winner(), Some(1));
        assert!(matches!(
            session.open_clue(0, 0),
            Err(GameError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_tie_reported_at_game_over() {
        let mut session = create_test_session();
        set_scores(&mut session, [700, 700, 100]);
        for (category_index, row) in [(0, 0), (0, 1), (1, 0)] {
            session.open_clue(category_index, row).expect("unplayed");
            if session.state() == GameState::BonusWagerPending {
                session.cancel_bonus().expect("cancel");
            } else {
                session.no_buzz().expect("no buzz");
            }
            session.acknowledge_answer().expect("ack");
        }

        assert_eq!(session.state(), GameState::GameOver);
        assert_eq!(session.winner(), None);
        assert_eq!(
            session.standing(),
            Some(&Standing::Tie {
                ids: vec![0, 1],
                score: 700
            })
        );
    }

    #[test]
    fn test_final_round_flow() {
        let mut session = create_test_session();
        set_scores(&mut session, [100, 500, -50]);

        session.request_final_round().expect("final clue loaded");
        assert_eq!(session.state(), GameState::FinalCategoryReveal);
        session.final_ready().expect("ready");
        assert_eq!(session.state(), GameState::FinalQuestionReveal);

        let response = session.final_ready().expect("ready");
        assert_eq!(session.state(), GameState::FinalWagerCollection);
        assert!(
            response
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::Notice { .. })),
            "skipped contestant should be announced"
        );
        let view = session.display_state().final_round.expect("final round");
        assert_eq!(view.order, vec![2, 0, 1]);
        assert_eq!(view.current, Some(0));

        session.submit_final_wager(0, "100").expect("wager");
        assert_eq!(session.state(), GameState::FinalJudgmentPending);
        session
            .submit_final_judgment(0, Verdict::Correct)
            .expect("judged");
        assert_eq!(score(&session, 0), 200);

        session.submit_final_wager(1, "600").expect("wager");
        session
            .submit_final_judgment(1, Verdict::Incorrect)
            .expect("judged");
        assert_eq!(score(&session, 1), 0);

        assert_eq!(session.state(), GameState::FinalResults);
        assert_eq!(session.winner(), Some(0));
        let view = session.display_state().final_round.expect("final round");
        assert_eq!(view.ranking, Some(vec![0, 1, 2]));

        session.acknowledge_answer().expect("ack");
        assert_eq!(session.state(), GameState::Board);
        assert_eq!(
            session.request_final_round(),
            Err(GameError::FinalRoundPlayed)
        );
    }

    #[test]
    fn test_final_round_needs_final_clue() {
        let mut session = Session::with_picker(GameConfig::default(), Box::new(FixedPicker(0)));
        session.load_source("ART,100,q,a").expect("valid sheet");

        let response = session.handle_command(&HostCommand::RequestFinalRound);

        assert!(matches!(
            response.events.as_slice(),
            [GameEvent::Notice { .. }]
        ));
        assert_eq!(session.state(), GameState::Board);
    }

    #[test]
    fn test_final_round_refused_mid_clue() {
        let mut session = create_test_session();
        session.open_clue(0, 0).expect("unplayed");
        assert!(matches!(
            session.request_final_round(),
            Err(GameError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_rejections_become_events() {
        let mut session = create_test_session();
        let response = session.handle_command(&HostCommand::Judge {
            verdict: Verdict::Correct,
        });
        assert!(matches!(
            response.events.as_slice(),
            [GameEvent::Rejected {
                intent: Intent::Judge,
                ..
            }]
        ));
    }
}
