//! The message envelope: a sender, an optional target, and a routing or maintenance variant
//! (§3 "Message Envelope"). Local dispatch and remote (wire) dispatch both operate on this same
//! type, so a forwarded message looks identical whether it crossed a process boundary or not.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::address::Address;
use crate::config::{ActorConfig, Status};
use crate::message::payload::EncodedPayload;

/// The routing or maintenance operation an envelope carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnvelopeKind {
    /// Fire-and-forget delivery to `target`.
    Tell(EncodedPayload),
    /// Request-reply: the recipient's return value comes back as `ReturnMessage`.
    Ask(EncodedPayload),
    /// Fan out to every child of `target` and also invoke `target`'s own `receive`.
    Broadcast(EncodedPayload),
    /// Source-routed delivery: `address_chain` names the remaining hops to the final target.
    Forward {
        payload: EncodedPayload,
        address_chain: Vec<String>,
    },
    /// The reply to an `Ask`.
    ReturnMessage(EncodedPayload),

    /// Instantiate a new actor as a child of the recipient.
    CreateActor {
        class: String,
        config: ActorConfig,
        parent_chain: Vec<String>,
    },
    /// Stop and deregister a child.
    RemoveActor { addr: Address },
    /// Stop the recipient itself.
    StopActor,
    /// Update a child's recorded status in the sender's registry.
    SetActorStatus { addr: Address, status: Status },
    /// Ask the recipient to report its current status.
    GetActorStatus,
    /// The reply to `GetActorStatus`.
    ActorStatusResponse { status: Status },
    /// Register an address under a human-readable name (system actor only).
    RegisterGlobalActor { name: String, addr: Address },
    /// Remove a global-name registration (system actor only).
    UnRegisterGlobalActor { name: String, addr: Address },
    /// Designate (or acknowledge) the convention leader for cross-system registration.
    SetConventionLeader { addr: Address },
    /// Record a remote system as known (system actor only).
    RegisterRemoteSystem { addr: Address },
    /// Forget a previously known remote system (system actor only).
    UnRegisterRemoteSystem { addr: Address },
    /// Sentinel: terminates the receive loop without further dispatch.
    Poison,
}

/// A complete message as it travels through the runtime, locally or over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub sender: Address,
    pub target: Option<Address>,
    pub kind: EnvelopeKind,
}

impl Envelope {
    pub fn new(sender: Address, target: Option<Address>, kind: EnvelopeKind) -> Self {
        Self {
            sender,
            target,
            kind,
        }
    }

    pub fn tell(sender: Address, target: Address, payload: EncodedPayload) -> Self {
        Self::new(sender, Some(target), EnvelopeKind::Tell(payload))
    }

    pub fn ask(sender: Address, target: Address, payload: EncodedPayload) -> Self {
        Self::new(sender, Some(target), EnvelopeKind::Ask(payload))
    }

    pub fn broadcast(sender: Address, target: Address, payload: EncodedPayload) -> Self {
        Self::new(sender, Some(target), EnvelopeKind::Broadcast(payload))
    }

    pub fn poison(sender: Address, target: Address) -> Self {
        Self::new(sender, Some(target), EnvelopeKind::Poison)
    }

    /// Whether this variant is a framework maintenance message rather than user routing traffic.
    pub fn is_maintenance(&self) -> bool {
        !matches!(
            self.kind,
            EnvelopeKind::Tell(_)
                | EnvelopeKind::Ask(_)
                | EnvelopeKind::Broadcast(_)
                | EnvelopeKind::Forward { .. }
                | EnvelopeKind::ReturnMessage(_)
        )
    }
}
