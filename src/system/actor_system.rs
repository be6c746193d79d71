//! The actor system (§4.8): a specialization of the actor core that additionally owns the socket
//! server and the convention-leader/global-actor/remote-system tables. Inbound frames decoded by
//! the socket server are bridged straight into the root actor's own mailbox, so remote and local
//! dispatch share one code path (§4.7, §4.8 "dispatches incoming (remote) messages identically to
//! local ones").

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::timeout;

// Layer 3: Internal module imports
use crate::actor::core::{self, ActorBehavior, ActorContext, ActorHandle};
use crate::address::Address;
use crate::config::SystemConfig;
use crate::error::SystemError;
use crate::mailbox::MailboxSender;
use crate::message::{EncodedPayload, Envelope, EnvelopeKind};
use crate::network::server::{self, ServerHandle};
use crate::observability::{Signal, SignalQueue, SignalSink};

/// The root actor's own behavior. It never runs user `receive` logic directly — nothing calls
/// `Tell`/`Ask` on the system address itself — but it still participates in the same dispatch
/// table, since `SetActorStatus`, the global-actor table, and supervision all flow through it.
struct RootBehavior;

#[async_trait]
impl ActorBehavior for RootBehavior {
    async fn receive(
        &mut self,
        _payload: EncodedPayload,
        _sender: Address,
        _ctx: &mut ActorContext,
    ) -> Option<EncodedPayload> {
        None
    }
}

/// A running actor system: the root actor's task and mailbox, the socket server, and the bridge
/// task that feeds decoded remote envelopes into the root actor's mailbox.
pub struct ActorSystem {
    pub address: Address,
    config: Arc<SystemConfig>,
    signals: SignalSink,
    mailbox: MailboxSender,
    task: JoinHandle<()>,
    server: ServerHandle,
    bridge: JoinHandle<()>,
}

impl ActorSystem {
    /// Start the root actor and its socket server (§4.3, §4.8). Convention leadership is
    /// self-declared unless `config.convention_leader` names an existing leader to adopt.
    pub async fn start(config: SystemConfig) -> Result<(Self, SignalQueue), SystemError> {
        config.validate().map_err(SystemError::Configuration)?;
        let config = Arc::new(config);
        let security = Arc::new(config.security.clone());

        let (signal_sink, signal_queue) = SignalQueue::new(config.signal_queue_capacity);

        let address = Address::new_root(config.host.clone(), config.port);
        let handle: ActorHandle = core::spawn_system(
            RootBehavior,
            address.clone(),
            security,
            signal_sink.clone(),
            config.connect_timeout,
            config.child_join_timeout,
            config.default_mailbox_capacity,
            config.convention_leader.clone(),
        );

        let (server_handle, _local_addr, mut inbound_rx) = server::start(config.clone(), signal_sink.clone())
            .await
            .map_err(|e| SystemError::Configuration(format!("socket server failed to bind: {e}")))?;

        let bridge_mailbox = handle.mailbox.clone();
        let bridge_signals = signal_sink.clone();
        let bridge = tokio::spawn(async move {
            while let Some(envelope) = inbound_rx.recv().await {
                if bridge_mailbox.put(envelope).is_err() {
                    bridge_signals.publish(Signal::ProtocolError {
                        peer: "inbound-bridge".into(),
                        detail: "root actor mailbox closed".into(),
                    });
                    break;
                }
            }
        });

        Ok((
            Self {
                address,
                config,
                signals: signal_sink,
                mailbox: handle.mailbox,
                task: handle.task,
                server: server_handle,
                bridge,
            },
            signal_queue,
        ))
    }

    /// The system's configuration, as supplied to [`ActorSystem::start`].
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// The signal sink every actor and the socket server publish to (§4.12). A façade clones this
    /// to wire signals from actors it creates directly into the same queue.
    pub fn signals(&self) -> SignalSink {
        self.signals.clone()
    }

    /// The mailbox a façade uses to enqueue messages addressed to (or routed through) the root
    /// actor.
    pub fn mailbox(&self) -> MailboxSender {
        self.mailbox.clone()
    }

    /// Stop the root actor and the socket server (§4.9 "shutdown"). Children are stopped by the
    /// root actor's own supervision protocol as part of its loop exit, in insertion order, each
    /// bounded by `child_join_timeout`.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        let stop = Envelope::new(self.address.clone(), Some(self.address.clone()), EnvelopeKind::StopActor);
        let _ = self.mailbox.put(stop);

        let grace = self.config.system_shutdown_grace;
        if timeout(grace, self.task).await.is_err() {
            return Err(SystemError::ShutdownTimeout(grace));
        }

        self.server.shutdown(self.config.server_shutdown_grace).await;
        let _ = timeout(Duration::from_secs(1), self.bridge).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;

    fn config() -> SystemConfig {
        SystemConfig::new("127.0.0.1", 0, SecurityConfig::new(b"test-key".to_vec()))
    }

    #[tokio::test]
    async fn start_then_shutdown_completes_within_grace() {
        let (system, _signals) = ActorSystem::start(config()).await.unwrap();
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn server_started_signal_is_published_on_start() {
        let (system, mut signals) = ActorSystem::start(config()).await.unwrap();
        let received = timeout(Duration::from_secs(1), signals.recv()).await.unwrap();
        assert!(matches!(received, Some(Signal::ServerStarted { .. })));
        system.shutdown().await.unwrap();
    }
}
