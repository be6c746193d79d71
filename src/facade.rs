//! The handler façade (§4.9): the public entry point a hosting program uses to start a system,
//! create top-level actors, and send them messages, without touching the actor core's internal
//! `ActorContext` plumbing directly.
//!
//! Routing a `tell`/`ask` to an actor nested several levels deep reuses the same source-routed
//! [`EnvelopeKind::Forward`] the actor core already implements (§4.7): the façade only tracks the
//! actors it created directly (its own children of the system root); anything deeper is reached
//! by resolving the target's `parent_chain` down to the nearest façade-known ancestor and
//! forwarding the remaining hops.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::RwLock;
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use crate::actor::core::{self, ActorBehavior, ActorContext};
use crate::address::Address;
use crate::config::SystemConfig;
use crate::error::{AskError, DeliveryError, SystemError};
use crate::mailbox::MailboxSender;
use crate::message::{EncodedPayload, Envelope, EnvelopeKind};
use crate::observability::{Signal, SignalQueue};
use crate::registry::{Registry, RegistryEntry};
use crate::system::ActorSystem;

/// A behavior that stores the first payload it receives into a one-shot channel, used as the
/// ephemeral reply address for [`Facade::ask`].
struct ReplyBehavior {
    tx: Option<oneshot::Sender<EncodedPayload>>,
}

#[async_trait::async_trait]
impl ActorBehavior for ReplyBehavior {
    async fn receive(
        &mut self,
        payload: EncodedPayload,
        _sender: Address,
        _ctx: &mut ActorContext,
    ) -> Option<EncodedPayload> {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(payload);
        }
        None
    }
}

/// The public handler façade. Owns the actor system and every top-level actor created through it.
pub struct Facade {
    system: ActorSystem,
    top_level: RwLock<Registry>,
    /// Shared with every top-level actor's [`ActorContext::peers`] so siblings — e.g. an `Ask`'s
    /// ephemeral reply actor — can reach each other directly (§4.7 "Send semantics").
    peers: Arc<dashmap::DashMap<String, MailboxSender>>,
}

impl Facade {
    /// Start a new actor system and return the façade for it, plus the signal queue a host
    /// program can poll for server/delivery/supervision events (§4.12).
    pub async fn start_system(config: SystemConfig) -> Result<(Self, SignalQueue), SystemError> {
        let (system, signal_queue) = ActorSystem::start(config).await?;
        let facade = Self {
            system,
            top_level: RwLock::new(Registry::new()),
            peers: Arc::new(dashmap::DashMap::new()),
        };
        Ok((facade, signal_queue))
    }

    /// The root address of the system this façade manages.
    pub fn system_address(&self) -> Address {
        self.system.address.clone()
    }

    /// Create a new top-level actor as a child of the system root (§4.7 "CreateActor"). Returns
    /// its address.
    pub fn create_actor<B: ActorBehavior>(
        &self,
        behavior: B,
        mailbox_capacity: usize,
    ) -> Result<Address, SystemError> {
        let config = self.system.config();
        let address = Address::child(&self.system.address);
        let handle = core::spawn(
            behavior,
            address.clone(),
            Some(self.system.address.clone()),
            Some(self.system.mailbox()),
            Some(self.peers.clone()),
            Arc::new(config.security.clone()),
            self.system.signals(),
            config.connect_timeout,
            config.child_join_timeout,
            mailbox_capacity,
        );
        self.peers.insert(address.id().to_string(), handle.mailbox.clone());
        self.top_level.write().add(RegistryEntry {
            address: address.clone(),
            status: crate::config::Status::Running,
            mailbox: handle.mailbox,
            task: handle.task,
        })?;
        Ok(address)
    }

    /// Deliver `kind`, sent as `from`, to `target`, resolving the nearest façade-known ancestor
    /// and forwarding the remaining hops when `target` is not itself a top-level actor.
    fn deliver_from(&self, from: &Address, target: &Address, kind: EnvelopeKind) -> Result<(), SystemError> {
        let top_level = self.top_level.read();

        if let Some(entry) = top_level.get(target.id()) {
            let envelope = Envelope::new(from.clone(), Some(target.clone()), kind);
            return entry
                .mailbox
                .put(envelope)
                .map_err(|_| SystemError::Delivery(DeliveryError::MailboxClosed(target.clone())));
        }

        let chain = target.parent_chain();
        if chain.len() > 1 {
            if let Some(entry) = top_level.get(&chain[1]) {
                let payload = match kind {
                    EnvelopeKind::Tell(p) | EnvelopeKind::Ask(p) | EnvelopeKind::Broadcast(p) => p,
                    _ => return Err(SystemError::Delivery(DeliveryError::MailboxClosed(target.clone()))),
                };
                let mut remaining: Vec<String> = chain[2..].to_vec();
                remaining.push(target.id().to_string());
                let envelope = Envelope::new(
                    from.clone(),
                    Some(entry.address.clone()),
                    EnvelopeKind::Forward {
                        payload,
                        address_chain: remaining,
                    },
                );
                return entry
                    .mailbox
                    .put(envelope)
                    .map_err(|_| SystemError::Delivery(DeliveryError::MailboxClosed(target.clone())));
            }
        }
        drop(top_level);

        if !target.same_system(&self.system.address) {
            let security = self.system.config().security.clone();
            let connect_timeout = self.system.config().connect_timeout;
            let envelope = Envelope::new(from.clone(), Some(target.clone()), kind);
            let signal_target = target.clone();
            let signals = self.system.signals();
            tokio::spawn(async move {
                if let Err(e) = crate::network::sender::send(&envelope, &signal_target, &security, connect_timeout).await {
                    signals.publish(Signal::DeliveryFailed {
                        target: signal_target,
                        reason: e.to_string(),
                    });
                }
            });
            return Ok(());
        }

        Err(SystemError::Delivery(DeliveryError::MailboxClosed(target.clone())))
    }

    fn deliver(&self, target: &Address, kind: EnvelopeKind) -> Result<(), SystemError> {
        let system_address = self.system.address.clone();
        self.deliver_from(&system_address, target, kind)
    }

    /// Fire-and-forget delivery (§4.7 "Tell").
    pub fn tell(&self, target: &Address, payload: EncodedPayload) -> Result<(), SystemError> {
        self.deliver(target, EnvelopeKind::Tell(payload))
    }

    /// Broadcast to `target` and its children (§4.7 "Broadcast").
    pub fn broadcast(&self, target: &Address, payload: EncodedPayload) -> Result<(), SystemError> {
        self.deliver(target, EnvelopeKind::Broadcast(payload))
    }

    /// Request-reply (§4.7 "Ask"): creates a short-lived reply actor, sends `payload` as an
    /// `Ask`, and waits up to `timeout` for the `ReturnMessage` reply.
    pub async fn ask(
        &self,
        target: &Address,
        payload: EncodedPayload,
        timeout: Duration,
    ) -> Result<EncodedPayload, SystemError> {
        let (tx, rx) = oneshot::channel();
        let reply_address = self.create_actor(ReplyBehavior { tx: Some(tx) }, 1)?;

        self.deliver_from(&reply_address, target, EnvelopeKind::Ask(payload))?;

        let result = tokio::time::timeout(timeout, rx).await;
        self.stop_actor(&reply_address);

        match result {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(SystemError::Ask(AskError::ReplyChannelClosed {
                target: target.clone(),
            })),
            Err(_) => Err(SystemError::Ask(AskError::Timeout {
                target: target.clone(),
                timeout,
            })),
        }
    }

    /// Stop one top-level actor (§4.9). Supervision handles its own descendants.
    pub fn stop_actor(&self, target: &Address) {
        self.peers.remove(target.id());
        if let Some(entry) = self.top_level.write().remove(target.id()) {
            let stop = Envelope::new(self.system.address.clone(), Some(target.clone()), EnvelopeKind::StopActor);
            let _ = entry.mailbox.put(stop);
        }
    }

    /// Gracefully stop every top-level actor, then the system itself (§4.9: up to
    /// `system_shutdown_grace`, 120s by default).
    pub async fn shutdown(self) -> Result<(), SystemError> {
        let targets: Vec<Address> = {
            let registry = self.top_level.read();
            registry
                .keys()
                .iter()
                .filter_map(|id| registry.get(id).map(|e| e.address.clone()))
                .collect()
        };
        for target in &targets {
            self.stop_actor(target);
        }
        self.system.shutdown().await
    }
}
