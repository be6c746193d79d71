//! Outbound sender (§4.4): open a TCP connection to a remote address, write one framed message,
//! close. No retry — a failed delivery is reported to the caller as a [`DeliveryError`], and
//! retry policy, if any, belongs to the caller.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

// Layer 3: Internal module imports
use crate::address::Address;
use crate::config::SecurityConfig;
use crate::error::DeliveryError;
use crate::message::{codec, Envelope};

/// Encode `envelope` and deliver it to `target` over a fresh, one-shot TCP connection.
///
/// TLS is not implemented here: [`SecurityConfig::tls_cert_path`]/`tls_cipher` name the seam
/// where a connector would be installed, but certificate provisioning is a hosting-program
/// concern (§1).
pub async fn send(
    envelope: &Envelope,
    target: &Address,
    security: &SecurityConfig,
    connect_timeout: Duration,
) -> Result<(), DeliveryError> {
    let frame = codec::encode(envelope, security)
        .map_err(|e| DeliveryError::Write(target.clone(), std::io::Error::other(e)))?;

    let addr = format!("{}:{}", target.host(), target.port());
    let mut stream = timeout(connect_timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| {
            DeliveryError::Connect(
                target.clone(),
                std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"),
            )
        })?
        .map_err(|e| DeliveryError::Connect(target.clone(), e))?;

    stream
        .write_all(&frame)
        .await
        .map_err(|e| DeliveryError::Write(target.clone(), e))?;
    stream
        .shutdown()
        .await
        .map_err(|e| DeliveryError::Write(target.clone(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::EnvelopeKind;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn writes_a_single_valid_frame_and_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let local_addr = listener.local_addr().unwrap();

        let security = SecurityConfig::new(b"shared-secret".to_vec());
        let sender_addr = Address::new_root("127.0.0.1", 9000);
        let target_addr = Address::from_parts("t", "127.0.0.1", local_addr.port());
        let envelope = Envelope::new(sender_addr, Some(target_addr.clone()), EnvelopeKind::StopActor);

        let security_clone = security.clone();
        let send_task = tokio::spawn(async move {
            send(&envelope, &target_addr, &security_clone, Duration::from_secs(2))
                .await
                .unwrap();
        });

        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        socket.read_to_end(&mut buf).await.unwrap();
        send_task.await.unwrap();

        let decoded = codec::decode(&buf, &security).unwrap();
        assert!(matches!(decoded.kind, EnvelopeKind::StopActor));
    }

    #[tokio::test]
    async fn connect_failure_surfaces_as_delivery_error() {
        let security = SecurityConfig::new(b"k".to_vec());
        let sender_addr = Address::new_root("127.0.0.1", 9000);
        // Port 1 is reserved and should refuse immediately on a loopback connect.
        let target_addr = Address::from_parts("t", "127.0.0.1", 1);
        let envelope = Envelope::new(sender_addr, Some(target_addr.clone()), EnvelopeKind::StopActor);
        let result = send(&envelope, &target_addr, &security, Duration::from_millis(500)).await;
        assert!(result.is_err());
    }
}
