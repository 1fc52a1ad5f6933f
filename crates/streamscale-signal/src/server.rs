//! The operator-facing message server.
//!
//! Listens on a fixed TCP port for newline-delimited commands and
//! applies them to the shared [`SignalMailbox`]:
//!
//! ```text
//! scale-out
//! scale-in
//! rebalance on
//! rebalance off
//! ```
//!
//! Unknown lines are logged and dropped. Connections are handled
//! concurrently; there is no response protocol.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::mailbox::{ScaleSignal, SignalMailbox};

/// Port the original control client expects.
pub const DEFAULT_SIGNAL_PORT: u16 = 5001;

/// Effect of one protocol line on the mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Signal(ScaleSignal),
    Rebalance(bool),
}

/// Parse one protocol line. Returns `None` for unknown input.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "scale-out" => Some(Command::Signal(ScaleSignal::ScaleOut)),
        "scale-in" => Some(Command::Signal(ScaleSignal::ScaleIn)),
        "rebalance on" => Some(Command::Rebalance(true)),
        "rebalance off" => Some(Command::Rebalance(false)),
        "" => None,
        _ => None,
    }
}

/// TCP listener feeding the signal mailbox.
pub struct SignalServer {
    listener: TcpListener,
    mailbox: SignalMailbox,
}

impl SignalServer {
    /// Bind the server on the given port.
    pub async fn bind(port: u16, mailbox: SignalMailbox) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        info!(port, "signal server listening");
        Ok(Self { listener, mailbox })
    }

    /// Local address the server bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the shutdown channel fires.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!(%peer, "control client connected");
                            let mailbox = self.mailbox.clone();
                            tokio::spawn(async move {
                                handle_client(stream, mailbox).await;
                            });
                        }
                        Err(e) => warn!(error = %e, "accept failed"),
                    }
                }
                _ = shutdown.changed() => {
                    info!("signal server shutting down");
                    break;
                }
            }
        }
    }
}

async fn handle_client(stream: tokio::net::TcpStream, mailbox: SignalMailbox) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Some(Command::Signal(signal)) => {
                    info!(?signal, "scale signal received");
                    mailbox.post(signal);
                }
                Some(Command::Rebalance(active)) => {
                    info!(active, "rebalance request flag changed");
                    mailbox.set_rebalance(active);
                }
                None => {
                    if !line.trim().is_empty() {
                        warn!(line = %line.trim(), "unknown control command");
                    }
                }
            },
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "control connection error");
                break;
            }
        }
    }
}
