//! Actor identity: a logical id derived from host, port, and a process-wide counter, plus the
//! ancestor chain that the registry (§4.5) and the forwarding algorithm (§4.7) both rely on.

// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

static ADDRESS_COUNTER: AtomicU64 = AtomicU64::new(0);

/// The identity of an actor: a unique id, the host/port of the system that owns it, and the
/// ordered chain of ancestor ids from root to immediate parent.
///
/// Two addresses are equal iff all four fields match (derived `PartialEq`). The parent chain is
/// set once at construction and is never mutated afterward — callers that need a "child of"
/// address should build it via [`Address::child`], not by cloning and editing `parent_chain`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    id: String,
    host: String,
    port: u16,
    parent_chain: Vec<String>,
}

impl Address {
    /// Allocate a fresh address with no parents (a system root actor).
    pub fn new_root(host: impl Into<String>, port: u16) -> Self {
        Self::with_parent_chain(host, port, Vec::new())
    }

    /// Allocate a fresh address that is a child of `parent`.
    pub fn child(parent: &Address) -> Self {
        let mut chain = parent.parent_chain.clone();
        chain.push(parent.id.clone());
        Self::with_parent_chain(parent.host.clone(), parent.port, chain)
    }

    fn with_parent_chain(host: impl Into<String>, port: u16, parent_chain: Vec<String>) -> Self {
        let host = host.into();
        let counter = ADDRESS_COUNTER.fetch_add(1, Ordering::Relaxed);
        let id = format!("{host}_{port}_{counter}");
        Self {
            id,
            host,
            port,
            parent_chain,
        }
    }

    /// Reconstruct an address from its wire-transmitted parts (§4.2 sender tuple). Does not
    /// consume the process-wide counter; used only when decoding a remote sender/target.
    pub fn from_parts(id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
            parent_chain: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn parent_chain(&self) -> &[String] {
        &self.parent_chain
    }

    /// The immediate parent's id, if any.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_chain.last().map(String::as_str)
    }

    /// Whether `self` and `other` are hosted by the same system.
    pub fn same_system(&self, other: &Address) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.id, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_addresses_are_unique() {
        let a = Address::new_root("127.0.0.1", 9000);
        let b = Address::new_root("127.0.0.1", 9000);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn child_parent_chain_extends_parent() {
        let root = Address::new_root("127.0.0.1", 9000);
        let child = Address::child(&root);
        assert_eq!(child.parent_chain(), &[root.id().to_string()]);
        assert_eq!(child.parent_id(), Some(root.id()));
    }

    #[test]
    fn grandchild_parent_chain_accumulates() {
        let root = Address::new_root("127.0.0.1", 9000);
        let mid = Address::child(&root);
        let leaf = Address::child(&mid);
        assert_eq!(
            leaf.parent_chain(),
            &[root.id().to_string(), mid.id().to_string()]
        );
    }

    #[test]
    fn equality_is_by_all_fields() {
        let a = Address::from_parts("x_1_0", "127.0.0.1", 9000);
        let b = Address::from_parts("x_1_0", "127.0.0.1", 9000);
        assert_eq!(a, b);
        let c = Address::from_parts("x_1_0", "127.0.0.1", 9001);
        assert_ne!(a, c);
    }

    #[test]
    fn same_system_ignores_id_and_parent_chain() {
        let root = Address::new_root("127.0.0.1", 9000);
        let child = Address::child(&root);
        assert!(root.same_system(&child));
    }

    #[test]
    fn display_includes_id_host_port() {
        let a = Address::from_parts("abc", "10.0.0.1", 7000);
        assert_eq!(format!("{a}"), "abc@10.0.0.1:7000");
    }
}
