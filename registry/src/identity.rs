//! Identity registry: tracks the public key bound to each nickname.

use std::collections::HashMap;

use hushcom_types::PublicKey;

/// Nickname → public key bindings.
///
/// The first key registered for a nickname wins; later registrations for the
/// same nickname leave it unchanged until the nickname is removed.
pub struct IdentityRegistry {
    users: HashMap<String, PublicKey>,
}

impl IdentityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Bind `key` to `nick` unless the nickname is already bound.
    ///
    /// Returns `true` if a new binding was created.
    pub fn register(&mut self, nick: &str, key: PublicKey) -> bool {
        if self.users.contains_key(nick) {
            return false;
        }
        self.users.insert(nick.to_owned(), key);
        true
    }

    /// Get the key bound to a nickname.
    pub fn get(&self, nick: &str) -> Option<&PublicKey> {
        self.users.get(nick)
    }

    pub fn contains(&self, nick: &str) -> bool {
        self.users.contains_key(nick)
    }

    /// Remove a binding.
    pub fn remove(&mut self, nick: &str) -> Option<PublicKey> {
        self.users.remove(nick)
    }

    /// Number of registered nicknames.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
