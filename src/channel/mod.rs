use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::Result;
use crate::workflow::{StepId, StepStatus, StepUpdate};

/// Event delivered by the update channel.
///
/// Step updates and connection lifecycle are kept apart: only `Update` ever
/// reaches the step store, the rest is observational.
#[derive(Debug)]
pub enum ChannelEvent {
    /// The connection is up and frames may follow.
    Opened,
    /// A decoded step update, in arrival order.
    Update(StepUpdate),
    /// The transport failed. The channel ends after this event.
    TransportError(String),
    /// The backend closed the connection normally.
    Closed,
}

/// Single inbound stream of update frames from a live connection.
///
/// Wraps one reader, decodes newline-delimited JSON frames, and delivers
/// events in strict arrival order to whoever holds the channel. Frames that
/// fail to decode are logged and skipped; the connection stays up. There is
/// no retry or reconnect at this layer - dropping the channel ends delivery.
pub struct UpdateChannel {
    rx: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl UpdateChannel {
    /// Connect to the provisioning backend at `addr`.
    pub async fn connect(addr: &str) -> Result<Self> {
        info!("Connecting to provisioning backend at {}", addr);
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::from_reader(stream))
    }

    /// Channel reading frames from an already-established stream.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            if tx.send(ChannelEvent::Opened).is_err() {
                return;
            }

            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        match StepUpdate::decode(line) {
                            Ok(update) => {
                                if tx.send(ChannelEvent::Update(update)).is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Dropping undecodable frame: {}", e);
                            }
                        }
                    }
                    Ok(None) => {
                        info!("Backend closed the connection");
                        let _ = tx.send(ChannelEvent::Closed);
                        break;
                    }
                    Err(e) => {
                        warn!("Transport error: {}", e);
                        let _ = tx.send(ChannelEvent::TransportError(e.to_string()));
                        break;
                    }
                }
            }
        });

        Self { rx }
    }

    /// Channel replaying a scripted provisioning run, no backend needed.
    pub fn demo() -> Self {
        info!("Running in demo mode");
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let pace = Duration::from_millis(700);
            let _ = tx.send(ChannelEvent::Opened);

            for id in StepId::ALL {
                tokio::time::sleep(pace).await;
                if tx
                    .send(ChannelEvent::Update(StepUpdate::single(
                        id,
                        StepStatus::Active,
                        None,
                    )))
                    .is_err()
                {
                    return;
                }

                tokio::time::sleep(pace).await;
                let update = if id == StepId::Secret {
                    // One scripted failure to show the reason override.
                    StepUpdate::single(
                        id,
                        StepStatus::Failed,
                        Some("secret engine 'kv/' is already enabled"),
                    )
                } else {
                    StepUpdate::single(id, StepStatus::Finished, None)
                };
                if tx.send(ChannelEvent::Update(update)).is_err() {
                    return;
                }
            }

            tokio::time::sleep(pace).await;
            let _ = tx.send(ChannelEvent::Closed);
        });

        Self { rx }
    }

    /// Next event, in arrival order. `None` once the channel is drained.
    pub async fn next(&mut self) -> Option<ChannelEvent> {
        self.rx.recv().await
    }
}
