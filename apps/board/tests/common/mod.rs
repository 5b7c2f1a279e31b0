#![allow(dead_code)]

use std::time::Duration;

use buzzboard::{
    GameConfig, GameState, PresentationHandle, Session,
    api::messages::{DisplayState, GameEvent, HostCommand},
    game::bonus::FixedPicker,
    run_session,
};
use tokio::{sync::mpsc, task::JoinHandle, time::timeout};

pub const SHEET: &str = "\
Category,Value,Question,Answer
SCIENCE,400,What gas do plants absorb?,Carbon dioxide
SCIENCE,200,What planet is red?,Mars
HISTORY,100,Who crossed the Delaware?,Washington
# FinalJeopardy
HISTORY,,Who was first?,Washington
";

/// Long enough that only a stuck driver ever hits it.
const RECV_TIMEOUT: Duration = Duration::from_secs(600);

pub struct TestBoard {
    pub intents: mpsc::Sender<HostCommand>,
    pub events: tokio_mpmc::Receiver<GameEvent>,
    pub driver: JoinHandle<anyhow::Result<Session>>,
}

/// Spawns a driver whose bonus clue is flat id `bonus`, and drains the initial snapshot.
pub async fn start_test_board(config: GameConfig, bonus: usize) -> TestBoard {
    let (intents, intent_rx) = mpsc::channel(32);
    let (event_tx, events) = tokio_mpmc::channel(256);
    let session = Session::with_picker(config, Box::new(FixedPicker(bonus)));
    let driver = tokio::spawn(run_session(
        session,
        intent_rx,
        PresentationHandle::new(event_tx),
    ));

    let board = TestBoard {
        intents,
        events,
        driver,
    };
    board.until_state(GameState::Board).await;
    board
}

/// A board with [`SHEET`] loaded and the bonus on HISTORY/100.
pub async fn start_loaded_board(config: GameConfig) -> TestBoard {
    let board = start_test_board(config, 2).await;
    board
        .send(HostCommand::LoadSource {
            text: SHEET.to_string(),
        })
        .await;
    board.until_state(GameState::Board).await;
    board
}

impl TestBoard {
    pub async fn send(&self, cmd: HostCommand) {
        self.intents.send(cmd).await.expect("driver stopped");
    }

    pub async fn next_event(&self) -> GameEvent {
        timeout(RECV_TIMEOUT, self.events.recv())
            .await
            .expect("Timed out waiting for an event")
            .expect("Event channel failed")
            .expect("Event channel closed")
    }

    /// Collects events until a snapshot in `state` arrives. Returns the events before it and the snapshot.
    pub async fn until_state(&self, state: GameState) -> (Vec<GameEvent>, DisplayState) {
        let mut seen = vec![];
        loop {
            match self.next_event().await {
                GameEvent::StateChanged(display) if display.state == state => {
                    return (seen, *display);
                }
                other => seen.push(other),
            }
        }
    }

    /// Sends a command and returns the events it produced, up to its snapshot.
    pub async fn act(&self, cmd: HostCommand, expect: GameState) -> (Vec<GameEvent>, DisplayState) {
        self.send(cmd).await;
        self.until_state(expect).await
    }

    /// Closes the intent channel and hands back the session the driver ended with.
    pub async fn finish(self) -> Session {
        drop(self.intents);
        self.driver
            .await
            .expect("driver panicked")
            .expect("driver failed")
    }
}

pub fn no_reveal_delay() -> GameConfig {
    GameConfig::default().with_reveal_delay(None)
}
