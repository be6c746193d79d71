//! The actor core (§4.7): the receive loop, the internal dispatcher, the forwarding algorithm,
//! and the supervision/cleanup protocol. Every actor in the system — including the system actor
//! itself (§4.8) — is built from this same loop; the system actor differs only in the extra
//! maintenance variants it intercepts before falling through to this dispatch table.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::timeout;

// Layer 3: Internal module imports
use crate::address::Address;
use crate::config::{SecurityConfig, Status};
use crate::error::{DeliveryError, SupervisionError};
use crate::mailbox::{mailbox, MailboxError, MailboxReceiver, MailboxSender};
use crate::message::{EncodedPayload, Envelope, EnvelopeKind};
use crate::network::sender as outbound;
use crate::observability::{Signal, SignalSink};
use crate::registry::{Registry, RegistryEntry};

/// User-supplied actor logic. The default lifecycle hooks are all no-ops, matching the
/// reference runtime's "override only what you need" ergonomics.
#[async_trait]
pub trait ActorBehavior: Send + 'static {
    /// Handle one user (non-maintenance) message. Returning `Some(payload)` from a handler
    /// invoked for an `Ask` causes that payload to be sent back to the sender wrapped in
    /// `ReturnMessage` (§4.7 dispatch table, "Ask").
    async fn receive(
        &mut self,
        payload: EncodedPayload,
        sender: Address,
        ctx: &mut ActorContext,
    ) -> Option<EncodedPayload>;

    async fn setup(&mut self, _ctx: &mut ActorContext) {}
    async fn post_start(&mut self, _ctx: &mut ActorContext) {}
    async fn post_stop(&mut self, _ctx: &mut ActorContext) {}
    async fn cleanup(&mut self, _ctx: &mut ActorContext) {}
}

/// Everything a running actor needs to dispatch, forward, and supervise, bundled so
/// [`ActorBehavior`] implementations can call `ctx.send(...)` / `ctx.create_child(...)` without
/// threading half a dozen parameters through every call site.
pub struct ActorContext {
    pub self_address: Address,
    pub system_address: Option<Address>,
    /// The system actor's own mailbox, carried down through every `create_child` alongside
    /// `system_address` (§4.7 "if a system address is known, emit SetActorStatus(self, STOPPED)
    /// to it"). `route` falls back to it for a same-system target that is neither self nor a
    /// registry child, so a status report or a reply can reach upward instead of being dropped.
    pub system_mailbox: Option<MailboxSender>,
    /// `Some` only for a façade-created top-level actor: the shared directory of every other
    /// top-level actor's mailbox, keyed by id (mirrors the façade's own bookkeeping). Lets one
    /// top-level actor reach a sibling — e.g. an `Ask`'s ephemeral reply actor — without routing
    /// through the system.
    pub peers: Option<Arc<dashmap::DashMap<String, MailboxSender>>>,
    pub security: Arc<SecurityConfig>,
    pub signals: SignalSink,
    pub connect_timeout: std::time::Duration,
    pub child_join_timeout: std::time::Duration,
    pub registry: Registry,
    /// This actor's own status, as reported by `GetActorStatus` (§3 "Status"). Transitions to
    /// `Stopped` when a `StopActor` envelope is dispatched.
    pub status: Status,
    /// `Some` only for the system actor (§4.8): name → address, populated by
    /// `RegisterGlobalActor`/`UnRegisterGlobalActor`.
    pub global_actors: Option<Arc<dashmap::DashMap<String, Address>>>,
    /// `Some` only for the system actor (§4.8): known peer systems.
    pub remote_systems: Option<Arc<dashmap::DashMap<String, Address>>>,
    /// `Some` only for the system actor (§4.8): the current convention leader pointer.
    pub convention_leader: Option<Address>,
}

impl ActorContext {
    /// Send semantics (§4.7 "Send semantics"): route to a local child without opening a socket,
    /// otherwise hand off to the outbound sender. Returns `Ok(true)` on handoff,
    /// `Ok(false)` if the target could not be reached.
    pub async fn send(&mut self, target: Address, kind: EnvelopeKind) -> bool {
        let envelope = Envelope::new(self.self_address.clone(), Some(target.clone()), kind);
        self.route(envelope, &target).await
    }

    async fn route(&mut self, envelope: Envelope, target: &Address) -> bool {
        if let Some(entry) = self.registry.get(target.id()) {
            return entry.mailbox.put(envelope).is_ok();
        }
        if let Some(peers) = &self.peers {
            if let Some(mailbox) = peers.get(target.id()) {
                return mailbox.put(envelope).is_ok();
            }
        }
        if !target.same_system(&self.self_address) {
            return outbound::send(&envelope, target, &self.security, self.connect_timeout)
                .await
                .map_err(|e| {
                    self.signals.publish(Signal::DeliveryFailed {
                        target: target.clone(),
                        reason: e.to_string(),
                    });
                    e
                })
                .is_ok();
        }
        if let Some(system_mailbox) = &self.system_mailbox {
            return system_mailbox.put(envelope).is_ok();
        }
        false
    }

    /// Spawn a new actor as a child of this one and register it (§4.7 "CreateActor").
    pub fn create_child<B: ActorBehavior>(
        &mut self,
        behavior: B,
        mailbox_capacity: usize,
    ) -> Address {
        let child_address = Address::child(&self.self_address);
        let handle = spawn(
            behavior,
            child_address.clone(),
            self.system_address.clone(),
            self.system_mailbox.clone(),
            self.peers.clone(),
            self.security.clone(),
            self.signals.clone(),
            self.connect_timeout,
            self.child_join_timeout,
            mailbox_capacity,
        );
        let _ = self.registry.add(RegistryEntry {
            address: child_address.clone(),
            status: Status::Running,
            mailbox: handle.mailbox,
            task: handle.task,
        });
        child_address
    }
}

/// A handle to a spawned actor, held by whoever created it (its parent, or the facade for the
/// system actor).
pub struct ActorHandle {
    pub address: Address,
    pub mailbox: MailboxSender,
    pub task: JoinHandle<()>,
}

/// Spawn `behavior` as a dedicated task implementing the receive loop (§5 "Execution substrate":
/// this crate realizes one actor per `tokio` task).
#[allow(clippy::too_many_arguments)]
pub fn spawn<B: ActorBehavior>(
    behavior: B,
    self_address: Address,
    system_address: Option<Address>,
    system_mailbox: Option<MailboxSender>,
    peers: Option<Arc<dashmap::DashMap<String, MailboxSender>>>,
    security: Arc<SecurityConfig>,
    signals: SignalSink,
    connect_timeout: std::time::Duration,
    child_join_timeout: std::time::Duration,
    mailbox_capacity: usize,
) -> ActorHandle {
    spawn_inner(
        behavior,
        self_address,
        system_address,
        system_mailbox,
        peers,
        security,
        signals,
        connect_timeout,
        child_join_timeout,
        mailbox_capacity,
        None,
    )
}

/// Spawn the system actor (§4.8): same loop as [`spawn`], but with the global-actor and
/// remote-system tables populated, and the convention-leader pointer initialized — either to the
/// supplied leader, or, absent one, self-declared (no automatic election).
#[allow(clippy::too_many_arguments)]
pub fn spawn_system<B: ActorBehavior>(
    behavior: B,
    self_address: Address,
    security: Arc<SecurityConfig>,
    signals: SignalSink,
    connect_timeout: std::time::Duration,
    child_join_timeout: std::time::Duration,
    mailbox_capacity: usize,
    convention_leader: Option<Address>,
) -> ActorHandle {
    let leader = convention_leader.unwrap_or_else(|| self_address.clone());
    spawn_inner(
        behavior,
        self_address,
        None,
        None,
        None,
        security,
        signals,
        connect_timeout,
        child_join_timeout,
        mailbox_capacity,
        Some(leader),
    )
}

#[allow(clippy::too_many_arguments)]
fn spawn_inner<B: ActorBehavior>(
    mut behavior: B,
    self_address: Address,
    system_address: Option<Address>,
    system_mailbox: Option<MailboxSender>,
    peers: Option<Arc<dashmap::DashMap<String, MailboxSender>>>,
    security: Arc<SecurityConfig>,
    signals: SignalSink,
    connect_timeout: std::time::Duration,
    child_join_timeout: std::time::Duration,
    mailbox_capacity: usize,
    system_tables: Option<Address>,
) -> ActorHandle {
    let (mailbox_tx, mailbox_rx) = mailbox(mailbox_capacity);
    let loop_mailbox = mailbox_tx.clone();
    let loop_address = self_address.clone();
    let is_system = system_tables.is_some();

    let task = tokio::spawn(async move {
        let mut ctx = ActorContext {
            self_address: loop_address,
            system_address,
            system_mailbox,
            peers,
            security,
            signals,
            connect_timeout,
            child_join_timeout,
            registry: Registry::new(),
            status: Status::Setup,
            global_actors: is_system.then(|| Arc::new(dashmap::DashMap::new())),
            remote_systems: is_system.then(|| Arc::new(dashmap::DashMap::new())),
            convention_leader: system_tables,
        };
        behavior.setup(&mut ctx).await;
        ctx.status = Status::Running;
        behavior.post_start(&mut ctx).await;
        run_loop(&mut behavior, &mut ctx, mailbox_rx).await;
        ctx.status = Status::Stopped;
        behavior.post_stop(&mut ctx).await;
        supervise_shutdown(&mut ctx).await;
        behavior.cleanup(&mut ctx).await;
        if let Some(system) = ctx.system_address.clone() {
            ctx.send(
                system,
                EnvelopeKind::SetActorStatus {
                    addr: ctx.self_address.clone(),
                    status: Status::Stopped,
                },
            )
            .await;
        }
    });

    ActorHandle {
        address: self_address,
        mailbox: loop_mailbox,
        task,
    }
}

/// The receive loop (§4.7): dequeue strictly FIFO; `Poison` exits the loop without further
/// dispatch; any other envelope goes through forwarding then the dispatch table.
async fn run_loop<B: ActorBehavior>(
    behavior: &mut B,
    ctx: &mut ActorContext,
    mut inbox: MailboxReceiver,
) {
    while let Some(envelope) = inbox.get().await {
        if matches!(envelope.kind, EnvelopeKind::Poison) {
            break;
        }
        if let Some(stop) = dispatch(behavior, ctx, envelope).await {
            if stop {
                break;
            }
        }
    }
}

/// Apply the forwarding algorithm, then the dispatch table, to one envelope. Returns
/// `Some(true)` when the actor should stop its loop (a `StopActor` was processed).
async fn dispatch<B: ActorBehavior>(
    behavior: &mut B,
    ctx: &mut ActorContext,
    envelope: Envelope,
) -> Option<bool> {
    let Envelope { sender, target, kind } = envelope;

    if let EnvelopeKind::Forward {
        payload,
        mut address_chain,
    } = kind
    {
        if address_chain.is_empty() {
            behavior.receive(payload, sender, ctx).await;
            return Some(false);
        }
        let head = address_chain.remove(0);
        if head == ctx.self_address.id() {
            behavior.receive(payload, sender, ctx).await;
            return Some(false);
        }
        if let Some(entry) = ctx.registry.get(&head) {
            let forwarded = Envelope::new(
                sender,
                target,
                EnvelopeKind::Forward { payload, address_chain },
            );
            let _ = entry.mailbox.put(forwarded);
            return Some(false);
        }
        // Head doesn't match a known child and isn't self: logged and dropped (§9 Open
        // Question 3), not silently ignored.
        ctx.signals.publish(Signal::DeliveryFailed {
            target: Address::from_parts(head, ctx.self_address.host(), ctx.self_address.port()),
            reason: "forward chain head unknown to this actor".into(),
        });
        return Some(false);
    }

    // General forwarding (§4.7): route by `target` before touching the dispatch table.
    if let Some(target_addr) = target.clone() {
        if target_addr.id() != ctx.self_address.id() {
            let envelope = Envelope::new(sender, Some(target_addr.clone()), kind);
            if !ctx.route(envelope, &target_addr).await {
                ctx.signals.publish(Signal::DeliveryFailed {
                    target: target_addr,
                    reason: "target is neither this actor, a known child/peer, nor reachable via the system".into(),
                });
            }
            return Some(false);
        }
    }

    dispatch_local(behavior, ctx, sender, kind).await
}

/// The dispatch table proper (§4.7), invoked once forwarding has confirmed the message is for
/// this actor.
async fn dispatch_local<B: ActorBehavior>(
    behavior: &mut B,
    ctx: &mut ActorContext,
    sender: Address,
    kind: EnvelopeKind,
) -> Option<bool> {
    match kind {
        EnvelopeKind::Broadcast(payload) => {
            for child_id in ctx.registry.keys().to_vec() {
                if let Some(entry) = ctx.registry.get(&child_id) {
                    let forwarded = Envelope::new(
                        sender.clone(),
                        Some(entry.address.clone()),
                        EnvelopeKind::Tell(payload.clone()),
                    );
                    let _ = entry.mailbox.put(forwarded);
                }
            }
            behavior.receive(payload, sender, ctx).await;
            Some(false)
        }
        EnvelopeKind::Tell(payload) => {
            behavior.receive(payload, sender, ctx).await;
            Some(false)
        }
        EnvelopeKind::Ask(payload) => {
            let reply = behavior.receive(payload, sender.clone(), ctx).await;
            if let Some(reply_payload) = reply {
                ctx.send(sender, EnvelopeKind::ReturnMessage(reply_payload))
                    .await;
            }
            Some(false)
        }
        EnvelopeKind::ReturnMessage(payload) => {
            behavior.receive(payload, sender, ctx).await;
            Some(false)
        }
        EnvelopeKind::CreateActor { .. } => {
            // Constructing the named `class` dynamically requires a registry the hosting
            // program supplies; that seam lives in the handler façade, not in the generic core.
            Some(false)
        }
        EnvelopeKind::RemoveActor { addr } => {
            if let Some(entry) = ctx.registry.get(addr.id()) {
                let _ = entry.mailbox.put(Envelope::new(
                    ctx.self_address.clone(),
                    Some(addr.clone()),
                    EnvelopeKind::StopActor,
                ));
            }
            ctx.registry.remove(addr.id());
            Some(false)
        }
        EnvelopeKind::StopActor => Some(true),
        EnvelopeKind::SetActorStatus { addr, status } => {
            let _ = ctx.registry.set_status(addr.id(), status);
            Some(false)
        }
        EnvelopeKind::GetActorStatus => {
            ctx.send(
                sender,
                EnvelopeKind::ActorStatusResponse { status: ctx.status },
            )
            .await;
            Some(false)
        }
        EnvelopeKind::ActorStatusResponse { .. } => Some(false),
        EnvelopeKind::RegisterGlobalActor { name, addr } => {
            if let Some(table) = &ctx.global_actors {
                table.insert(name, addr);
            }
            Some(false)
        }
        EnvelopeKind::UnRegisterGlobalActor { name, addr } => {
            if let Some(table) = &ctx.global_actors {
                table.remove_if(&name, |_, existing| existing == &addr);
            }
            Some(false)
        }
        EnvelopeKind::SetConventionLeader { addr } => {
            // Always update the pointer on receipt (§9 Open Question 4: conflict resolution is
            // deferred; last writer wins).
            ctx.convention_leader = Some(addr);
            Some(false)
        }
        EnvelopeKind::RegisterRemoteSystem { addr } => {
            if let Some(table) = &ctx.remote_systems {
                table.insert(addr.to_string(), addr);
            }
            Some(false)
        }
        EnvelopeKind::UnRegisterRemoteSystem { addr } => {
            if let Some(table) = &ctx.remote_systems {
                table.remove(&addr.to_string());
            }
            Some(false)
        }
        EnvelopeKind::Forward { .. } | EnvelopeKind::Poison => unreachable!(
            "Forward is intercepted in dispatch() and Poison exits run_loop before dispatch()"
        ),
    }
}

/// Supervision/cleanup protocol (§4.7): stop every child in insertion order, forcibly
/// terminating any that miss the join timeout.
async fn supervise_shutdown(ctx: &mut ActorContext) {
    for child_id in ctx.registry.keys().to_vec() {
        let Some(entry) = ctx.registry.get(&child_id) else {
            continue;
        };
        let stop = Envelope::new(
            ctx.self_address.clone(),
            Some(entry.address.clone()),
            EnvelopeKind::StopActor,
        );
        let _ = entry.mailbox.put(stop);
    }
    for child_id in ctx.registry.keys().to_vec() {
        if let Some(entry) = ctx.registry.remove(&child_id) {
            let child_join_timeout = ctx.child_join_timeout;
            if timeout(child_join_timeout, entry.task).await.is_err() {
                ctx.signals.publish(Signal::SupervisionTimeout {
                    child: entry.address,
                });
            }
        }
    }
}

/// Enqueue a `Poison` sentinel, never blocking the caller (§4.6).
pub fn poison(mailbox: &MailboxSender, from: Address, target: Address) -> Result<(), MailboxError> {
    mailbox.put(Envelope::poison(from, target))
}

/// The (currently bounded) failure surface for supervision escalation, retained for callers that
/// want to distinguish a timeout from other `SystemError` variants without matching on strings.
pub fn supervision_timeout(child: Address, timeout: std::time::Duration) -> SupervisionError {
    SupervisionError::ChildJoinTimeout { child, timeout }
}

/// Re-exported so callers constructing a `DeliveryError` manually (e.g. tests) don't need to
/// import `crate::error` directly just for this one type.
pub type DeliveryFailure = DeliveryError;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::message::Payload;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize)]
    struct Ping;
    impl Payload for Ping {
        const TYPE_TAG: &'static str = "core.ping";
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Pong;
    impl Payload for Pong {
        const TYPE_TAG: &'static str = "core.pong";
    }

    struct Echo {
        received: Arc<AtomicU32>,
    }

    #[async_trait]
    impl ActorBehavior for Echo {
        async fn receive(
            &mut self,
            payload: EncodedPayload,
            _sender: Address,
            _ctx: &mut ActorContext,
        ) -> Option<EncodedPayload> {
            self.received.fetch_add(1, Ordering::SeqCst);
            Some(payload)
        }
    }

    fn harness() -> (Arc<SecurityConfig>, SignalSink) {
        let security = Arc::new(SecurityConfig::new(b"test-key".to_vec()));
        let (sink, _queue) = crate::observability::SignalQueue::new(16);
        (security, sink)
    }

    #[tokio::test]
    async fn tell_invokes_receive_exactly_once() {
        let (security, signals) = harness();
        let root = Address::new_root("127.0.0.1", 9100);
        let received = Arc::new(AtomicU32::new(0));
        let handle = spawn(
            Echo {
                received: received.clone(),
            },
            Address::child(&root),
            None,
            None,
            None,
            security,
            signals,
            Duration::from_secs(1),
            Duration::from_secs(1),
            8,
        );

        let payload = EncodedPayload::encode(&Ping).unwrap();
        let envelope = Envelope::tell(root.clone(), handle.address.clone(), payload);
        handle.mailbox.put(envelope).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(received.load(Ordering::SeqCst), 1);

        poison(&handle.mailbox, root, handle.address).unwrap();
        let _ = handle.task.await;
    }

    #[tokio::test]
    async fn poison_stops_loop_without_processing_trailing_messages() {
        let (security, signals) = harness();
        let root = Address::new_root("127.0.0.1", 9101);
        let received = Arc::new(AtomicU32::new(0));
        let handle = spawn(
            Echo {
                received: received.clone(),
            },
            Address::child(&root),
            None,
            None,
            None,
            security,
            signals,
            Duration::from_secs(1),
            Duration::from_secs(1),
            8,
        );

        poison(&handle.mailbox, root.clone(), handle.address.clone()).unwrap();
        let payload = EncodedPayload::encode(&Ping).unwrap();
        let _ = handle
            .mailbox
            .put(Envelope::tell(root, handle.address.clone(), payload));

        let _ = handle.task.await;
        assert_eq!(received.load(Ordering::SeqCst), 0);
    }
}
