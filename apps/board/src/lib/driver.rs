use tokio::{
    sync::mpsc,
    time::{Instant, sleep_until},
};

use crate::{
    api::messages::HostCommand,
    game::{GameState, session::Session},
    host::PresentationHandle,
};

/// Runs a session on the current task until the intent channel closes.
///
/// Host intents are applied one at a time. While the answer is on screen a
/// deadline is armed to return to the board; any host intent disarms it before
/// it is applied, and it is re-armed only if the session is still showing an
/// answer afterwards.
#[tracing::instrument(name = "session_driver", skip_all)]
pub async fn run_session(
    mut session: Session,
    mut intents: mpsc::Receiver<HostCommand>,
    presenter: PresentationHandle,
) -> anyhow::Result<Session> {
    let reveal_delay = session.config().answer_reveal_delay;
    let mut reveal_deadline: Option<Instant> = None;

    presenter.dispatch(session.scores_changed()).await?;
    presenter.dispatch(session.state_changed()).await?;

    loop {
        tokio::select! {
            cmd = intents.recv() => {
                let Some(cmd) = cmd else { break };
                if reveal_deadline.take().is_some() {
                    tracing::trace!(intent = ?cmd.intent(), "Host acted, auto-advance cancelled");
                }
                tracing::debug!(intent = ?cmd.intent(), state = ?session.state(), "Host intent");

                let response = session.handle_command(&cmd);
                if !response.is_empty() {
                    presenter.dispatch(response).await?;
                }
            }
            _ = sleep_until(reveal_deadline.unwrap_or_else(Instant::now)), if reveal_deadline.is_some() => {
                reveal_deadline = None;
                if session.state() == GameState::AnswerReveal {
                    tracing::debug!("Answer reveal elapsed, returning to board");
                    let response = session.handle_command(&HostCommand::AcknowledgeAnswer);
                    presenter.dispatch(response).await?;
                }
            }
        }

        if let Some(delay) = reveal_delay {
            if reveal_deadline.is_none() && session.state() == GameState::AnswerReveal {
                reveal_deadline = Some(Instant::now() + delay);
            }
        }
    }

    tracing::info!(game_id = ?session.game_id(), "Intent channel closed, session ending");
    Ok(session)
}
