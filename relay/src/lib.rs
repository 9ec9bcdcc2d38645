//! Interface to the store-and-forward relay.
//!
//! The relay moves opaque frames between identities, keeps the local
//! contact list and channel key store, and owns this node's routing and
//! content keys. Transport, queuing, and retries are its business; the
//! protocol engines only call the operations below and never retry.

pub mod error;

pub use error::RelayError;

use std::sync::Arc;

use hushcom_types::PublicKey;

/// Where a frame is headed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// To a single identity, by nickname.
    Direct(String),
    /// To every holder of a channel key, by channel name.
    Channel(String),
}

/// A frame ready for the relay, plus its routing metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub route: Route,
    pub frame: Vec<u8>,
    /// Key the relay encrypts to, when the destination is not yet a contact.
    pub dest_key: Option<PublicKey>,
}

impl Delivery {
    pub fn direct(to: impl Into<String>, frame: Vec<u8>, dest_key: Option<PublicKey>) -> Self {
        Self {
            route: Route::Direct(to.into()),
            frame,
            dest_key,
        }
    }

    pub fn channel(name: impl Into<String>, frame: Vec<u8>, dest_key: Option<PublicKey>) -> Self {
        Self {
            route: Route::Channel(name.into()),
            frame,
            dest_key,
        }
    }
}

/// Operations the protocol engines consume from the relay.
pub trait Relay: Send + Sync {
    /// Queue a frame for a single identity.
    fn send(&self, to: &str, frame: &[u8], dest_key: Option<&PublicKey>) -> Result<(), RelayError>;

    /// Queue a frame for a channel.
    fn send_channel(
        &self,
        channel: &str,
        frame: &[u8],
        dest_key: Option<&PublicKey>,
    ) -> Result<(), RelayError>;

    /// Remember a contact so later traffic to `nick` can be routed.
    fn add_contact(&self, nick: &str, key: &PublicKey) -> Result<(), RelayError>;

    /// Store channel private key material (base64).
    fn add_channel(&self, name: &str, secret_b64: &str) -> Result<(), RelayError>;

    /// Fetch channel private key material (base64).
    fn channel_secret(&self, name: &str) -> Result<String, RelayError>;

    /// This node's routing key.
    fn self_key(&self) -> Result<PublicKey, RelayError>;

    /// This node's content key, used to sign server responses.
    fn content_key(&self) -> Result<PublicKey, RelayError>;

    /// Hand a prepared delivery to [`Relay::send`] or [`Relay::send_channel`].
    fn deliver(&self, delivery: &Delivery) -> Result<(), RelayError> {
        match &delivery.route {
            Route::Direct(to) => self.send(to, &delivery.frame, delivery.dest_key.as_ref()),
            Route::Channel(name) => {
                self.send_channel(name, &delivery.frame, delivery.dest_key.as_ref())
            }
        }
    }
}

impl<R: Relay + ?Sized> Relay for Arc<R> {
    fn send(&self, to: &str, frame: &[u8], dest_key: Option<&PublicKey>) -> Result<(), RelayError> {
        (**self).send(to, frame, dest_key)
    }

    fn send_channel(
        &self,
        channel: &str,
        frame: &[u8],
        dest_key: Option<&PublicKey>,
    ) -> Result<(), RelayError> {
        (**self).send_channel(channel, frame, dest_key)
    }

    fn add_contact(&self, nick: &str, key: &PublicKey) -> Result<(), RelayError> {
        (**self).add_contact(nick, key)
    }

    fn add_channel(&self, name: &str, secret_b64: &str) -> Result<(), RelayError> {
        (**self).add_channel(name, secret_b64)
    }

    fn channel_secret(&self, name: &str) -> Result<String, RelayError> {
        (**self).channel_secret(name)
    }

    fn self_key(&self) -> Result<PublicKey, RelayError> {
        (**self).self_key()
    }

    fn content_key(&self) -> Result<PublicKey, RelayError> {
        (**self).content_key()
    }
}
