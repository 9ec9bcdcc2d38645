//! Channel registry: directory of channels, their keys, and membership.

use std::collections::BTreeMap;

use hushcom_types::PublicKey;

use crate::RegistryError;

/// One channel as known to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelRecord {
    /// Public half of the channel key.
    pub key: PublicKey,
    /// Empty means public and listable.
    pub password: String,
    /// Ordered, duplicate-free.
    pub admins: Vec<String>,
    /// Ordered, duplicate-free.
    pub users: Vec<String>,
}

impl ChannelRecord {
    fn new(key: PublicKey, password: String, creator: &str) -> Self {
        Self {
            key,
            password,
            admins: vec![creator.to_owned()],
            users: Vec::new(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.password.is_empty()
    }

    pub fn is_admin(&self, nick: &str) -> bool {
        self.admins.iter().any(|a| a == nick)
    }

    pub fn is_user(&self, nick: &str) -> bool {
        self.users.iter().any(|u| u == nick)
    }

    /// Drop `nick` from both lists. Returns `true` if anything changed.
    fn remove_member(&mut self, nick: &str) -> bool {
        let before = self.admins.len() + self.users.len();
        self.admins.retain(|a| a != nick);
        self.users.retain(|u| u != nick);
        before != self.admins.len() + self.users.len()
    }
}

/// Channel name → record.
///
/// Channels are never deleted. Iteration is in name order.
pub struct ChannelRegistry {
    channels: BTreeMap<String, ChannelRecord>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            channels: BTreeMap::new(),
        }
    }

    /// Create a channel with `creator` as its sole admin.
    ///
    /// Fails without touching the registry if the name is taken.
    pub fn create(
        &mut self,
        name: &str,
        key: PublicKey,
        password: String,
        creator: &str,
    ) -> Result<&ChannelRecord, RegistryError> {
        if self.channels.contains_key(name) {
            return Err(RegistryError::ChannelExists(name.to_owned()));
        }
        let record = self
            .channels
            .entry(name.to_owned())
            .or_insert(ChannelRecord::new(key, password, creator));
        Ok(&*record)
    }

    pub fn get(&self, name: &str) -> Option<&ChannelRecord> {
        self.channels.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Channels with an empty password, as `(name, public key)` pairs.
    pub fn public_channels(&self) -> impl Iterator<Item = (&str, &PublicKey)> {
        self.channels
            .iter()
            .filter(|(_, record)| record.is_public())
            .map(|(name, record)| (name.as_str(), &record.key))
    }

    /// Remove `nick` from the admin and user lists of every channel.
    ///
    /// Returns the number of channels that changed.
    pub fn remove_member_everywhere(&mut self, nick: &str) -> usize {
        self.channels
            .values_mut()
            .map(|record| record.remove_member(nick))
            .filter(|changed| *changed)
            .count()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
