//! In-process signal queue (§4.3, §4.12) plus the structured `tracing` fields every lifecycle
//! transition and error path attaches. This is deliberately a separate, dependency-free seam from
//! `tracing`: a host program with no tracing subscriber installed can still drain signals.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use crate::address::Address;

/// A best-effort, lightweight event describing something the socket server, the dispatcher, or
/// supervision noticed. Signals are informational: nothing in the runtime blocks on a signal
/// being consumed, and a full queue silently drops the oldest-pending send attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Signal {
    ServerStarted { host: String, port: u16 },
    ServerStopped { host: String, port: u16 },
    ProtocolError { peer: String, detail: String },
    SignatureInvalid { peer: String },
    DeliveryFailed { target: Address, reason: String },
    SupervisionTimeout { child: Address },
}

/// The sending half of the signal queue, cloned into every component that may need to publish.
#[derive(Debug, Clone)]
pub struct SignalSink {
    tx: mpsc::Sender<Signal>,
}

impl SignalSink {
    /// Publish a signal. Never blocks indefinitely: if the queue is full the signal is dropped
    /// and a `tracing` warning is emitted in its place, so observability never stalls the
    /// runtime it is observing.
    pub fn publish(&self, signal: Signal) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.tx.try_send(signal) {
            tracing::warn!("signal queue full; dropping signal");
        }
    }
}

/// The receiving half, held by whatever host-program component wants to observe the runtime.
pub struct SignalQueue {
    rx: mpsc::Receiver<Signal>,
}

impl SignalQueue {
    /// Create a bounded signal queue and its publishing handle.
    pub fn new(capacity: usize) -> (SignalSink, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (SignalSink { tx }, Self { rx })
    }

    /// Await the next published signal, or `None` once every sink has been dropped.
    pub async fn recv(&mut self) -> Option<Signal> {
        self.rx.recv().await
    }

    /// Drain whatever signals are already queued without waiting.
    pub fn drain(&mut self) -> Vec<Signal> {
        let mut out = Vec::new();
        while let Ok(signal) = self.rx.try_recv() {
            out.push(signal);
        }
        out
    }
}
