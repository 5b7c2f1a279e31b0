//! Buzzboard
//!
//! The engine behind a host-operated trivia board: three contestants, a grid
//! of categories and dollar values, one hidden bonus clue, and an optional
//! wagered final round.
//!
//! # Game Flow
//!
//! 1. **Loading**: The host loads a comma-delimited clue sheet
//! 2. **Board**: The host opens a clue; the bonus clue asks for a wager first
//! 3. **Buzzing**: The host records who buzzed and judges each response
//! 4. **Scoring**: Values are added or deducted; a miss lets the others try
//! 5. **Final round**: Contestants wager lowest score first, then a champion is named
//!
//! # Modules
//!
//! - [`api`] - Host intents and presentation events
//! - [`game`] - Parsing, the board, and the round state machine
//! - [`ledger`] - Contestants and scores
//! - [`driver`] - Async loop feeding intents to a session
//! - [`host`] - Outbound channel to the presentation layer

pub mod api;
pub mod config;
pub mod driver;
pub mod error;
pub mod game;
pub mod host;
pub mod ledger;

pub use config::GameConfig;
pub use driver::run_session;
pub use error::GameError;
pub use game::{GameState, Verdict, session::Session};
pub use host::PresentationHandle;
pub use ledger::{Contestant, ContestantId, ROSTER_SIZE, Standing};
