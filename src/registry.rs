//! The per-actor child registry (§3 "Registry Entry", §4.5): every actor that has spawned
//! children owns one of these, keyed by child id. It is never shared across actors — each
//! actor's registry is read and written only from that actor's own receive loop.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::address::Address;
use crate::config::Status;
use crate::error::RegistryError;
use crate::mailbox::MailboxSender;

/// One child's bookkeeping: where to find it, where it is in its lifecycle, and an execution
/// handle so supervision can forcibly terminate it if it misses the cooperative stop window.
pub struct RegistryEntry {
    pub address: Address,
    pub status: Status,
    pub mailbox: MailboxSender,
    pub task: tokio::task::JoinHandle<()>,
}

/// The ordered table of an actor's children, keyed by child id. Order of insertion is preserved
/// (`children_in_order`) because supervision (§4.7) stops children in that order.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, RegistryEntry>,
    order: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: RegistryEntry) -> Result<(), RegistryError> {
        let id = entry.address.id().to_string();
        if self.entries.contains_key(&id) {
            return Err(RegistryError::DuplicateAddress(entry.address));
        }
        self.order.push(id.clone());
        self.entries.insert(id, entry);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut RegistryEntry> {
        self.entries.get_mut(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<RegistryEntry> {
        self.order.retain(|existing| existing != id);
        self.entries.remove(id)
    }

    pub fn set_status(&mut self, id: &str, status: Status) -> Result<(), RegistryError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(Address::from_parts(id, "", 0)))?;
        entry.status = status;
        Ok(())
    }

    /// Child ids in the order they were added — the order supervision stops them in.
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
