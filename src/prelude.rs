//! Convenience re-exports. `use meshrelay_rt::prelude::*;` pulls in the types most callers touch
//! directly: the actor trait and context, the addressing/messaging types, configuration, the
//! façade, and the error union.

pub use crate::actor::{poison, spawn, ActorBehavior, ActorContext, ActorHandle};
pub use crate::address::Address;
pub use crate::config::{ActorConfig, SecurityConfig, Status, SystemConfig};
pub use crate::error::SystemError;
pub use crate::facade::Facade;
pub use crate::message::{EncodedPayload, Envelope, EnvelopeKind, Payload};
pub use crate::observability::{Signal, SignalQueue, SignalSink};
pub use crate::system::ActorSystem;
pub use crate::workpool::{InlineWorkerPool, WorkerPool};
