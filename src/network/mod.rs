//! Transport layer: the inbound socket server (§4.3) and the outbound sender (§4.4).

pub mod sender;
pub mod server;
