use std::time::Duration;

pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_BONUS_WAGER_FLOOR: i64 = 1000;

const REVEAL_DELAY_VAR: &str = "BUZZBOARD_REVEAL_DELAY_MS";
const BONUS_FLOOR_VAR: &str = "BUZZBOARD_BONUS_WAGER_FLOOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// How long the answer stays up before returning to the board. `None` waits for the host.
    pub answer_reveal_delay: Option<Duration>,
    /// Bonus wagers may go up to this amount even when the contestant's score is lower.
    pub bonus_wager_floor: i64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            answer_reveal_delay: Some(DEFAULT_REVEAL_DELAY),
            bonus_wager_floor: DEFAULT_BONUS_WAGER_FLOOR,
        }
    }

    /// Defaults, overridden by `BUZZBOARD_*` environment variables.
    /// A reveal delay of `0` disables the automatic return to the board.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        if let Some(raw) = lookup(REVEAL_DELAY_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.answer_reveal_delay = None,
                Ok(ms) => config.answer_reveal_delay = Some(Duration::from_millis(ms)),
                Err(e) => tracing::warn!(var = REVEAL_DELAY_VAR, value = %raw, error = %e, "Ignoring invalid setting"),
            }
        }

        if let Some(raw) = lookup(BONUS_FLOOR_VAR) {
            match raw.trim().parse::<i64>() {
                Ok(floor) if floor >= 0 => config.bonus_wager_floor = floor,
                _ => tracing::warn!(var = BONUS_FLOOR_VAR, value = %raw, "Ignoring invalid setting"),
            }
        }

        config
    }

    pub fn with_reveal_delay(mut self, delay: Option<Duration>) -> Self {
        self.answer_reveal_delay = delay;
        self
    }

    pub fn with_bonus_wager_floor(mut self, floor: i64) -> Self {
        self.bonus_wager_floor = floor;
        self
    }
}
