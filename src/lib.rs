//! # meshrelay-rt — a distributed actor runtime
//!
//! An actor runtime in the Erlang/Akka tradition, built for processes that need to address,
//! supervise, and exchange messages with actors both in-process and on remote hosts over an
//! HMAC-authenticated TCP wire protocol.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use meshrelay_rt::prelude::*;
//! use async_trait::async_trait;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Ping;
//! impl Payload for Ping {
//!     const TYPE_TAG: &'static str = "demo.ping";
//! }
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl ActorBehavior for Echo {
//!     async fn receive(
//!         &mut self,
//!         payload: EncodedPayload,
//!         _sender: Address,
//!         _ctx: &mut ActorContext,
//!     ) -> Option<EncodedPayload> {
//!         Some(payload)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SystemError> {
//!     let security = SecurityConfig::new(b"shared-secret".to_vec());
//!     let config = SystemConfig::new("127.0.0.1", 9000, security);
//!     let (facade, _signals) = Facade::start_system(config).await?;
//!
//!     let actor = facade.create_actor(Echo, 64);
//!     let reply = facade
//!         .ask(&actor, EncodedPayload::encode(&Ping)?, std::time::Duration::from_secs(1))
//!         .await?;
//!     let _: Ping = reply.decode()?;
//!
//!     facade.shutdown().await
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`address`] — actor identity: id, host/port, and ancestor chain (§3)
//! - [`config`] — [`config::SystemConfig`], [`config::ActorConfig`], [`config::SecurityConfig`]
//! - [`error`] — the typed error taxonomy, unified under [`error::SystemError`]
//! - [`observability`] — the in-process signal queue (§4.12)
//! - [`message`] — the envelope, its routing/maintenance variants, the tagged payload contract,
//!   and the HMAC wire codec (§4.2)
//! - [`mailbox`] — the bounded, FIFO, single-consumer mailbox (§4.6)
//! - [`registry`] — the per-actor child registry (§4.5)
//! - [`actor`] — the receive loop, dispatcher, forwarding algorithm, and supervision (§4.7)
//! - [`network`] — the socket server (§4.3) and the outbound sender (§4.4)
//! - [`system`] — the actor system root actor (§4.8)
//! - [`facade`] — the public handler façade (§4.9)
//! - [`workpool`] — the worker-pool trait boundary (§4.10; no production implementation shipped)

pub mod actor;
pub mod address;
pub mod config;
pub mod error;
pub mod facade;
pub mod mailbox;
pub mod message;
pub mod network;
pub mod observability;
pub mod registry;
pub mod system;
pub mod workpool;

pub mod prelude;

pub use address::Address;
pub use config::{ActorConfig, SecurityConfig, Status, SystemConfig};
pub use error::{
    AskError, CodecError, DeliveryError, DispatchError, ProtocolError, RegistryError, SystemError,
};
pub use facade::Facade;
pub use message::{EncodedPayload, Envelope, EnvelopeKind, Payload};
pub use observability::{Signal, SignalQueue, SignalSink};
pub use system::ActorSystem;
pub use workpool::{InlineWorkerPool, WorkerPool};
