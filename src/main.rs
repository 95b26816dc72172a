//! Agent Mirror - line-delimited JSON driver
//!
//! Reads server frames from stdin, writes client frames to stdout.

use agent_mirror::config::MirrorConfig;
use agent_mirror::runtime::{
    FileSettingsStore, StoreNotification, SyncHandle, SyncRuntime, Transport, TransportError,
};
use agent_mirror::sync::Event;
use agent_mirror::wire::{ClientMessage, ServerMessage};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Writes one JSON frame per line to stdout
struct StdoutTransport {
    out: Mutex<tokio::io::Stdout>,
}

#[async_trait]
impl Transport for StdoutTransport {
    async fn send(&self, message: ClientMessage) -> Result<(), TransportError> {
        let mut frame = message.to_frame()?;
        frame.push('\n');
        let mut out = self.out.lock().await;
        out.write_all(frame.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries frames, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agent_mirror=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = MirrorConfig::from_env();
    tracing::info!(path = %config.settings_path.display(), "Using settings file");

    let transport = StdoutTransport {
        out: Mutex::new(tokio::io::stdout()),
    };
    let (runtime, handle) = SyncRuntime::bootstrap(
        transport,
        FileSettingsStore::new(config.settings_path.clone()),
        config.auto_confirm,
        config.channel_capacity,
    )
    .await?;

    let cancel = CancellationToken::new();
    let runtime_task = tokio::spawn(runtime.run(cancel.clone()));

    let mut notifications = BroadcastStream::new(handle.subscribe());
    tokio::spawn(async move {
        while let Some(notification) = notifications.next().await {
            match notification {
                Ok(StoreNotification::Reset) => tracing::info!("Mirror reset"),
                Ok(notification) => tracing::debug!(?notification, "Store changed"),
                Err(e) => tracing::warn!(error = %e, "Notification stream lagged"),
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            cancel.cancel();
        }
        forwarded = forward_frames(BufReader::new(tokio::io::stdin()), &handle) => {
            let forwarded = forwarded?;
            tracing::info!(forwarded, "Server stream closed");
        }
    }

    // Closing the channel lets the runtime apply everything already queued
    drop(handle);
    runtime_task.await?;
    Ok(())
}

/// Feed server frames from `reader` to the runtime until EOF. Lines that
/// are not UTF-8 or not a known frame are skipped; other read errors end
/// the stream. Returns the number of frames forwarded.
async fn forward_frames<R>(
    reader: R,
    handle: &SyncHandle,
) -> Result<usize, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(forwarded),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(error = %e, "Ignoring non-UTF-8 frame");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        match ServerMessage::parse(&line) {
            Ok(message) => {
                handle.send(Event::from(message)).await?;
                forwarded += 1;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring malformed frame"),
        }
    }
}
