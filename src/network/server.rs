//! The socket server (§4.3): accepts inbound connections on `host:port`, frames and verifies each
//! message, and pushes decoded envelopes onto an inbound queue for the actor system to dispatch.
//! Concurrent connection handlers are bounded by `max_threads`; each connection is one frame,
//! read once, then closed.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::timeout;

// Layer 3: Internal module imports
use crate::config::SystemConfig;
use crate::message::{codec, Envelope};
use crate::observability::{Signal, SignalSink};

/// A running socket server. Dropping or calling [`ServerHandle::shutdown`] stops the acceptor
/// within the configured grace period.
pub struct ServerHandle {
    task: JoinHandle<()>,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl ServerHandle {
    /// Signal the acceptor to stop and wait for it, up to `server_shutdown_grace`.
    pub async fn shutdown(self, grace: std::time::Duration) {
        let _ = self.shutdown_tx.send(());
        let _ = timeout(grace, self.task).await;
    }
}

/// Start listening on `config.host:config.port`. Returns the handle to the acceptor task and the
/// receiving half of the inbound-envelope queue.
pub async fn start(
    config: Arc<SystemConfig>,
    signals: SignalSink,
) -> std::io::Result<(ServerHandle, std::net::SocketAddr, mpsc::Receiver<Envelope>)> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let local_addr = listener.local_addr()?;
    let (inbound_tx, inbound_rx) = mpsc::channel(config.default_mailbox_capacity);
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    let semaphore = Arc::new(Semaphore::new(config.max_threads));
    let mut terminate = termination_signals()?;

    signals.publish(Signal::ServerStarted {
        host: config.host.clone(),
        port: config.port,
    });

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = terminate.wait() => break,
                accepted = listener.accept() => {
                    let Ok((socket, peer)) = accepted else { continue };
                    let permit = semaphore.clone().acquire_owned().await;
                    let Ok(permit) = permit else { continue };
                    let config = config.clone();
                    let signals = signals.clone();
                    let inbound_tx = inbound_tx.clone();
                    tokio::spawn(async move {
                        let _permit = permit;
                        handle_connection(socket, peer.to_string(), config, signals, inbound_tx).await;
                    });
                }
            }
        }
        signals.publish(Signal::ServerStopped {
            host: config.host.clone(),
            port: config.port,
        });
    });

    Ok((ServerHandle { task, shutdown_tx }, local_addr, inbound_rx))
}

/// The process-termination signals the acceptor listens for (§4.3 "Lifecycle", §6 "Signals"):
/// `SIGINT|SIGTERM|SIGQUIT` on unix, `Ctrl-C` elsewhere. `tokio::signal` covers this without
/// reaching for a platform-specific signal crate.
struct TerminationSignals {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigquit: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    async fn wait(&mut self) {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.sigint.recv() => {}
                _ = self.sigterm.recv() => {}
                _ = self.sigquit.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

fn termination_signals() -> std::io::Result<TerminationSignals> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(TerminationSignals {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }
    #[cfg(not(unix))]
    {
        Ok(TerminationSignals {})
    }
}

async fn handle_connection(
    mut socket: TcpStream,
    peer: String,
    config: Arc<SystemConfig>,
    signals: SignalSink,
    inbound_tx: mpsc::Sender<Envelope>,
) {
    let result = timeout(config.read_timeout, read_frame(&mut socket, config.security.buffer_size)).await;
    let frame = match result {
        Ok(Ok(frame)) => frame,
        Ok(Err(detail)) => {
            signals.publish(Signal::ProtocolError { peer, detail });
            return;
        }
        Err(_) => {
            signals.publish(Signal::ProtocolError {
                peer,
                detail: "read timed out".into(),
            });
            return;
        }
    };

    match codec::decode(&frame, &config.security) {
        Ok(envelope) => {
            let _ = inbound_tx.send(envelope).await;
        }
        Err(e) => {
            use crate::error::CodecError;
            if matches!(e, CodecError::SignatureMismatch) {
                signals.publish(Signal::SignatureInvalid { peer });
            } else {
                signals.publish(Signal::ProtocolError {
                    peer,
                    detail: e.to_string(),
                });
            }
        }
    }

    let _ = socket.shutdown().await;
}

/// Read the `magic ":::" sig ":::" length ":::"` header followed by exactly `length` body
/// bytes, rejecting as soon as a declared length would exceed `buffer_limit` — the connection is
/// dropped before the oversized body is read to completion.
async fn read_frame(socket: &mut TcpStream, buffer_limit: usize) -> Result<Vec<u8>, String> {
    let mut header = Vec::new();
    let mut separators_seen = 0u8;
    let mut byte = [0u8; 1];
    while separators_seen < 3 {
        let n = socket
            .read(&mut byte)
            .await
            .map_err(|e| format!("read error while framing header: {e}"))?;
        if n == 0 {
            return Err("connection closed before frame header completed".into());
        }
        header.push(byte[0]);
        if header.ends_with(b":::") {
            separators_seen += 1;
        }
    }

    let header_text = std::str::from_utf8(&header)
        .map_err(|e| format!("frame header is not valid UTF-8: {e}"))?;
    let length_field = header_text
        .split(":::")
        .nth(2)
        .ok_or_else(|| "frame header missing length field".to_string())?;
    let declared_len: usize = length_field
        .parse()
        .map_err(|_| format!("declared length {length_field:?} is not numeric"))?;

    if declared_len > buffer_limit {
        return Err(format!(
            "declared length {declared_len} exceeds buffer limit {buffer_limit}"
        ));
    }

    let mut body = vec![0u8; declared_len];
    if declared_len > 0 {
        socket
            .read_exact(&mut body)
            .await
            .map_err(|e| format!("short read of frame body: {e}"))?;
    }

    let mut frame = header;
    frame.extend_from_slice(&body);
    Ok(frame)
}
