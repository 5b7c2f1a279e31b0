use std::fmt;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_mpmc::{Receiver, Sender};

use crate::{api::messages::GameEvent, game::SessionResponse};

/// Outbound side of the presentation layer. Clones share one queue.
#[derive(Clone)]
pub struct PresentationHandle {
    pub sender: Sender<GameEvent>,
}

impl fmt::Debug for PresentationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationHandle")
            .field("sender len", &self.sender.len())
            .finish()
    }
}

impl PresentationHandle {
    pub fn new(sender: Sender<GameEvent>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: GameEvent) -> anyhow::Result<()> {
        self.sender.send(event).await?;
        Ok(())
    }

    /// Closes the queue for every clone. Events already queued are still delivered.
    pub fn close(&self) {
        self.sender.close();
    }

    /// Sends every event of a response, in order.
    pub async fn dispatch(&self, response: SessionResponse) -> anyhow::Result<()> {
        for event in response.events {
            self.send(event).await?;
        }
        Ok(())
    }
}

/// Writes each event as one JSON line until the queue is closed and drained.
/// Returns the number of lines written.
pub async fn write_event_lines<W>(events: &Receiver<GameEvent>, out: &mut W) -> anyhow::Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(event) = events.recv().await? {
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        written += 1;
    }
    tracing::debug!(written, "Event queue closed");
    Ok(written)
}
