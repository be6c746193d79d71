//! The message envelope, its routing/maintenance variants, the tagged payload contract, and the
//! HMAC wire codec (§3 "Message Envelope", §4.2).

pub mod codec;
pub mod envelope;
pub mod payload;

pub use envelope::{Envelope, EnvelopeKind};
pub use payload::{EncodedPayload, Payload};
