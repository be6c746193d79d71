//! The actor core (§4.7): receive loop, dispatcher, forwarding, and supervision. See
//! [`core`] for the implementation; this file only declares and re-exports.

pub mod core;

pub use core::{poison, spawn, supervision_timeout, ActorBehavior, ActorContext, ActorHandle};
