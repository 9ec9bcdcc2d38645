//! Peer-key cache: nickname → public key, as learned by this client.

use std::collections::HashMap;

use hushcom_types::PublicKey;

/// Keys of identities this client has heard from.
///
/// Always holds the server's content key under the server nickname.
#[derive(Clone, Debug)]
pub struct PeerKeys {
    keys: HashMap<String, PublicKey>,
}

impl PeerKeys {
    pub fn new(server_name: &str, server_key: PublicKey) -> Self {
        let mut keys = HashMap::new();
        keys.insert(server_name.to_owned(), server_key);
        Self { keys }
    }

    /// Cache a key, replacing any previous one for `nick`.
    pub fn insert(&mut self, nick: &str, key: PublicKey) -> Option<PublicKey> {
        self.keys.insert(nick.to_owned(), key)
    }

    pub fn get(&self, nick: &str) -> Option<&PublicKey> {
        self.keys.get(nick)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
