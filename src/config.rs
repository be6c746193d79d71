//! Configuration surfaces: [`SystemConfig`] (process-wide defaults), [`ActorConfig`] (per-actor
//! options), and [`SecurityConfig`] (HMAC wire protocol parameters). Every magic number named
//! elsewhere in this crate's documentation is a field here with that value as its `Default`,
//! never a literal buried in a function body.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::address::Address;

pub const DEFAULT_MAILBOX_CAPACITY: usize = 1024;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CHILD_JOIN_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_SERVER_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);
pub const DEFAULT_SYSTEM_SHUTDOWN_GRACE: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_THREADS: usize = 10_000;
pub const DEFAULT_SIGNAL_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_MAGIC: &str = "sendreceive";
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Status of an actor as tracked by its parent's registry entry (§3 "Status").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Setup,
    Running,
    Stopped,
    Unreachable,
}

/// The hash function an HMAC wire connection signs with. `Sha256` is the only built-in today;
/// the enum exists so a digest-size mismatch is caught by [`SecurityConfig::validate`] instead of
/// surfacing as a confusing signature failure at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashFn {
    Sha256,
}

impl HashFn {
    pub fn digest_len(self) -> usize {
        match self {
            HashFn::Sha256 => 32,
        }
    }
}

impl Default for HashFn {
    fn default() -> Self {
        HashFn::Sha256
    }
}

/// Parameters for the HMAC-authenticated wire protocol (§4.2, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub hmac_key: Vec<u8>,
    pub hash_fn: HashFn,
    pub magic: String,
    pub buffer_size: usize,
    pub tls_cert_path: Option<String>,
    pub tls_cipher: Option<String>,
}

impl SecurityConfig {
    pub fn new(hmac_key: impl Into<Vec<u8>>) -> Self {
        Self {
            hmac_key: hmac_key.into(),
            hash_fn: HashFn::default(),
            magic: DEFAULT_MAGIC.to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            tls_cert_path: None,
            tls_cipher: None,
        }
    }

    pub fn with_magic(mut self, magic: impl Into<String>) -> Self {
        self.magic = magic.into();
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_tls(mut self, cert_path: impl Into<String>, cipher: impl Into<String>) -> Self {
        self.tls_cert_path = Some(cert_path.into());
        self.tls_cipher = Some(cipher.into());
        self
    }

    /// Reject configurations that could never produce a valid frame.
    pub fn validate(&self) -> Result<(), String> {
        if self.hmac_key.is_empty() {
            return Err("hmac_key must not be empty".into());
        }
        if self.magic.is_empty() {
            return Err("magic must not be empty".into());
        }
        if self.buffer_size == 0 {
            return Err("buffer_size must be greater than zero".into());
        }
        Ok(())
    }
}

/// Per-actor construction options (§3 "ActorConfig").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    pub host: String,
    pub port: u16,
    pub mailbox_capacity: usize,
    pub global_name: Option<String>,
    pub properties: serde_json::Value,
}

impl ActorConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            global_name: None,
            properties: serde_json::Value::Null,
        }
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    pub fn with_global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = Some(name.into());
        self
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = properties;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.mailbox_capacity == 0 {
            return Err("mailbox_capacity must be greater than zero".into());
        }
        Ok(())
    }
}

/// Process-wide defaults consumed when constructing an actor system (§3 "SystemConfig",
/// expansion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub host: String,
    pub port: u16,
    pub max_threads: usize,
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
    pub child_join_timeout: Duration,
    pub server_shutdown_grace: Duration,
    pub system_shutdown_grace: Duration,
    pub default_mailbox_capacity: usize,
    pub signal_queue_capacity: usize,
    pub security: SecurityConfig,
    /// Existing remote system to adopt as convention leader instead of self-declaring.
    pub convention_leader: Option<Address>,
}

impl SystemConfig {
    pub fn new(host: impl Into<String>, port: u16, security: SecurityConfig) -> Self {
        Self {
            host: host.into(),
            port,
            max_threads: DEFAULT_MAX_THREADS,
            read_timeout: DEFAULT_READ_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            child_join_timeout: DEFAULT_CHILD_JOIN_TIMEOUT,
            server_shutdown_grace: DEFAULT_SERVER_SHUTDOWN_GRACE,
            system_shutdown_grace: DEFAULT_SYSTEM_SHUTDOWN_GRACE,
            default_mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            signal_queue_capacity: DEFAULT_SIGNAL_QUEUE_CAPACITY,
            security,
            convention_leader: None,
        }
    }

    pub fn builder(host: impl Into<String>, port: u16, security: SecurityConfig) -> Self {
        Self::new(host, port, security)
    }

    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_child_join_timeout(mut self, timeout: Duration) -> Self {
        self.child_join_timeout = timeout;
        self
    }

    pub fn with_system_shutdown_grace(mut self, timeout: Duration) -> Self {
        self.system_shutdown_grace = timeout;
        self
    }

    pub fn with_convention_leader(mut self, leader: Address) -> Self {
        self.convention_leader = Some(leader);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        self.security.validate()?;
        if self.max_threads == 0 {
            return Err("max_threads must be greater than zero".into());
        }
        if self.default_mailbox_capacity == 0 {
            return Err("default_mailbox_capacity must be greater than zero".into());
        }
        if self.security.hash_fn.digest_len() == 0 {
            return Err("configured hash_fn produces a zero-length digest".into());
        }
        Ok(())
    }
}
