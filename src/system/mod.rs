//! The actor system (§4.8): the root actor plus the socket server it owns.

pub mod actor_system;

pub use actor_system::ActorSystem;
