//! The length-prefixed, HMAC-signed wire codec (§4.2, §6):
//!
//! ```text
//! <magic> ":::" <base64(hmac)> ":::" <decimal length of body> ":::" <body>
//! ```
//!
//! `body` is UTF-8 JSON: `{"message": base64(json(Envelope)), "sender": [id, host, port],
//! "sender_addr": "<repr>", "target": "<repr>?"}`.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

// Layer 3: Internal module imports
use crate::address::Address;
use crate::config::{HashFn, SecurityConfig};
use crate::error::CodecError;
use crate::message::envelope::Envelope;

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR: &str = ":::";

#[derive(Debug, Serialize, Deserialize)]
struct WireBody {
    message: String,
    sender: (String, String, u16),
    sender_addr: String,
    target: Option<String>,
}

fn compute_signature(security: &SecurityConfig, body: &[u8]) -> Result<Vec<u8>, CodecError> {
    match security.hash_fn {
        HashFn::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(&security.hmac_key)?;
            mac.update(body);
            Ok(mac.finalize().into_bytes().to_vec())
        }
    }
}

/// Encode an envelope into a complete wire frame, ready to write to a socket.
pub fn encode(envelope: &Envelope, security: &SecurityConfig) -> Result<Vec<u8>, CodecError> {
    let message_json = serde_json::to_vec(envelope).map_err(CodecError::Serialize)?;
    let message_b64 = BASE64.encode(message_json);

    let target_repr = envelope.target.as_ref().map(|a| a.to_string());
    let body = WireBody {
        message: message_b64,
        sender: (
            envelope.sender.id().to_string(),
            envelope.sender.host().to_string(),
            envelope.sender.port(),
        ),
        sender_addr: envelope.sender.to_string(),
        target: target_repr,
    };
    let body_bytes = serde_json::to_vec(&body).map_err(CodecError::Serialize)?;

    let sig = compute_signature(security, &body_bytes)?;
    if sig.len() != security.hash_fn.digest_len() {
        return Err(CodecError::HashSizeMismatch {
            expected: security.hash_fn.digest_len(),
            actual: sig.len(),
        });
    }
    let sig_b64 = BASE64.encode(&sig);

    let mut frame = Vec::with_capacity(
        security.magic.len() + sig_b64.len() + body_bytes.len() + 3 * SEPARATOR.len() + 20,
    );
    frame.extend_from_slice(security.magic.as_bytes());
    frame.extend_from_slice(SEPARATOR.as_bytes());
    frame.extend_from_slice(sig_b64.as_bytes());
    frame.extend_from_slice(SEPARATOR.as_bytes());
    frame.extend_from_slice(body_bytes.len().to_string().as_bytes());
    frame.extend_from_slice(SEPARATOR.as_bytes());
    frame.extend_from_slice(&body_bytes);
    Ok(frame)
}

/// Decode a complete wire frame back into its envelope. Verifies the magic prefix and the HMAC
/// signature in constant time (via [`Mac::verify_slice`]) before touching the body's contents.
pub fn decode(frame: &[u8], security: &SecurityConfig) -> Result<Envelope, CodecError> {
    let text = std::str::from_utf8(frame)
        .map_err(|e| CodecError::MalformedFrame(format!("frame is not valid UTF-8: {e}")))?;

    let mut parts = text.splitn(4, SEPARATOR);
    let magic = parts
        .next()
        .ok_or_else(|| CodecError::MalformedFrame("missing magic field".into()))?;
    let sig_b64 = parts
        .next()
        .ok_or_else(|| CodecError::MalformedFrame("missing signature field".into()))?;
    let len_str = parts
        .next()
        .ok_or_else(|| CodecError::MalformedFrame("missing length field".into()))?;
    let body_str = parts
        .next()
        .ok_or_else(|| CodecError::MalformedFrame("missing body field".into()))?;

    if magic != security.magic {
        return Err(CodecError::MagicMismatch {
            expected: security.magic.clone(),
            actual: magic.to_string(),
        });
    }

    let declared_len: usize = len_str
        .parse()
        .map_err(|_| CodecError::MalformedFrame(format!("length {len_str:?} is not numeric")))?;
    let body_bytes = body_str.as_bytes();
    if body_bytes.len() != declared_len {
        return Err(CodecError::MalformedFrame(format!(
            "declared length {declared_len} does not match actual body length {}",
            body_bytes.len()
        )));
    }

    let given_sig = BASE64.decode(sig_b64)?;
    let mut mac = HmacSha256::new_from_slice(&security.hmac_key)?;
    mac.update(body_bytes);
    if mac.verify_slice(&given_sig).is_err() {
        return Err(CodecError::SignatureMismatch);
    }

    let body: WireBody =
        serde_json::from_slice(body_bytes).map_err(CodecError::Deserialize)?;
    let message_json = BASE64.decode(body.message)?;
    let envelope: Envelope =
        serde_json::from_slice(&message_json).map_err(CodecError::Deserialize)?;

    let (sender_id, sender_host, sender_port) = body.sender;
    debug_assert_eq!(envelope.sender.id(), sender_id, "wire sender tuple must match envelope");
    let _ = Address::from_parts(sender_id, sender_host, sender_port);

    Ok(envelope)
}
