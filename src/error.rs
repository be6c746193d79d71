//! Typed error taxonomy for every failure surface the runtime exposes.
//!
//! Each surface gets its own `thiserror` enum rather than one catch-all, so callers can match on
//! the specific failure they care about. [`SystemError`] is the union the handler façade returns
//! to hosting programs; it wraps the others via `#[from]`.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::address::Address;

/// Failures decoding or encoding a wire frame (§4.2).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("frame magic mismatch: expected {expected:?}, got {actual:?}")]
    MagicMismatch { expected: String, actual: String },

    #[error("HMAC signature verification failed")]
    SignatureMismatch,

    #[error("configured hash function produces a {actual}-byte digest, key/signature expects {expected}")]
    HashSizeMismatch { expected: usize, actual: usize },

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("payload type {0:?} is not registered with the codec")]
    UnknownPayloadType(String),

    #[error("failed to serialize payload: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to deserialize payload: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("failed to base64-decode frame body: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("HMAC key has an invalid length: {0}")]
    InvalidKeyLength(#[from] hmac::digest::InvalidLength),
}

/// Failures reading a frame off the wire, before it even reaches the codec (§7 "Protocol").
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed after {read} of {expected} declared body bytes")]
    ShortRead { read: usize, expected: usize },

    #[error("no complete frame header within the read timeout")]
    ReadTimeout,

    #[error("declared frame length {0:?} is not a valid decimal number")]
    InvalidLength(String),

    #[error("declared frame length {declared} exceeds the configured buffer limit {limit}")]
    LengthOverLimit { declared: usize, limit: usize },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures handing a message to its destination (§7 "Delivery").
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to connect to {0}")]
    Connect(Address, #[source] std::io::Error),

    #[error("failed to write frame to {0}")]
    Write(Address, #[source] std::io::Error),

    #[error("target mailbox {0} is closed")]
    MailboxClosed(Address),
}

/// Failures stopping a supervised child within its grace period (§7 "Supervision").
#[derive(Debug, Error)]
pub enum SupervisionError {
    #[error("child {child} did not stop within {timeout:?}")]
    ChildJoinTimeout { child: Address, timeout: Duration },
}

/// A user `receive` implementation raised an error while handling a message (§7 "Dispatch").
#[derive(Debug, Error)]
#[error("actor {actor} failed handling a message: {source}")]
pub struct DispatchError {
    pub actor: Address,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// Failures of the child/parent registry (§4.5).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("address {0} is already registered")]
    DuplicateAddress(Address),

    #[error("address {0} is not registered")]
    NotFound(Address),
}

/// Failures of a caller's `ask` request.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("no reply from {target} within {timeout:?}")]
    Timeout { target: Address, timeout: Duration },

    #[error("reply channel for {target} was closed before a reply arrived")]
    ReplyChannelClosed { target: Address },
}

/// The top-level error union returned by the handler façade.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Supervision(#[from] SupervisionError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Ask(#[from] AskError),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("system is shutting down")]
    ShuttingDown,

    #[error("system did not shut down within {0:?}")]
    ShutdownTimeout(Duration),
}

impl SystemError {
    /// Whether retrying the same operation might succeed without intervention.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SystemError::Delivery(_) | SystemError::Ask(AskError::Timeout { .. })
        )
    }

    /// Whether the failure indicates the system itself can no longer make progress.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SystemError::Configuration(_) | SystemError::ShutdownTimeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_error_wraps_codec_error_transparently() {
        let err: SystemError = CodecError::SignatureMismatch.into();
        assert!(matches!(err, SystemError::Codec(CodecError::SignatureMismatch)));
    }

    #[test]
    fn delivery_error_is_transient() {
        let addr = crate::address::Address::new_root("127.0.0.1", 9000);
        let err = SystemError::Delivery(DeliveryError::MailboxClosed(addr));
        assert!(err.is_transient());
    }

    #[test]
    fn configuration_error_is_fatal_not_transient() {
        let err = SystemError::Configuration("bad hmac key length".into());
        assert!(err.is_fatal());
        assert!(!err.is_transient());
    }
}
