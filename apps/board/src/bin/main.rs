//! Line-oriented presentation adapter: JSON host intents on stdin, JSON events on stdout.

use std::path::PathBuf;

use anyhow::Result;
use buzzboard::{
    GameConfig, PresentationHandle, Session, api::messages::HostCommand, host::write_event_lines,
    run_session,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "buzzboard=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GameConfig::from_env();
    tracing::info!(?config, "Starting buzzboard");

    let (intent_tx, intent_rx) = mpsc::channel::<HostCommand>(32);
    let (event_tx, event_rx) = tokio_mpmc::channel(64);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        write_event_lines(&event_rx, &mut stdout).await
    });

    let presenter = PresentationHandle::new(event_tx);
    let driver = tokio::spawn(run_session(
        Session::new(config),
        intent_rx,
        presenter.clone(),
    ));

    if let Some(path) = std::env::args().nth(1) {
        tracing::info!(%path, "Loading clue sheet");
        intent_tx
            .send(HostCommand::LoadFile {
                path: PathBuf::from(path),
            })
            .await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<HostCommand>(line) {
            Ok(cmd) => intent_tx.send(cmd).await?,
            Err(e) => tracing::warn!(error = %e, input = line, "Failed to parse HostCommand"),
        }
    }

    drop(intent_tx);
    let session = driver.await??;
    tracing::info!(state = ?session.state(), "Host input closed");

    // the driver's handle is gone; closing ours lets the writer drain and stop
    presenter.close();
    let written = writer.await??;
    tracing::info!(written, "Presentation output flushed");
    Ok(())
}
