//! Queue-backed relay for hosts that move frames themselves.
//!
//! Outbound deliveries are pushed into a bounded queue that the host
//! drains toward its transport. Contacts and channel keys are kept in
//! memory for the life of the process.

use std::collections::HashMap;
use std::sync::Mutex;

use hushcom_relay::{Delivery, Relay, RelayError};
use hushcom_types::PublicKey;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

pub struct MailboxRelay {
    self_key: PublicKey,
    content_key: PublicKey,
    outbound: mpsc::Sender<Delivery>,
    contacts: Mutex<HashMap<String, PublicKey>>,
    channels: Mutex<HashMap<String, String>>,
}

impl MailboxRelay {
    /// Create a relay and the receiving end of its outbound queue.
    pub fn new(
        self_key: PublicKey,
        content_key: PublicKey,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Delivery>) {
        let (outbound, rx) = mpsc::channel(capacity.max(1));
        let relay = Self {
            self_key,
            content_key,
            outbound,
            contacts: Mutex::new(HashMap::new()),
            channels: Mutex::new(HashMap::new()),
        };
        (relay, rx)
    }

    pub fn contact(&self, nick: &str) -> Option<PublicKey> {
        self.contacts.lock().ok()?.get(nick).cloned()
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn enqueue(&self, delivery: Delivery) -> Result<(), RelayError> {
        self.outbound.try_send(delivery).map_err(|e| match e {
            TrySendError::Full(_) => RelayError::Unavailable("outbound queue full".into()),
            TrySendError::Closed(_) => RelayError::Unavailable("outbound queue closed".into()),
        })
    }
}

fn poisoned<T>(_: T) -> RelayError {
    RelayError::Other("mailbox state lock poisoned".into())
}

impl Relay for MailboxRelay {
    fn send(&self, to: &str, frame: &[u8], dest_key: Option<&PublicKey>) -> Result<(), RelayError> {
        self.enqueue(Delivery::direct(to, frame.to_vec(), dest_key.cloned()))
    }

    fn send_channel(
        &self,
        channel: &str,
        frame: &[u8],
        dest_key: Option<&PublicKey>,
    ) -> Result<(), RelayError> {
        self.enqueue(Delivery::channel(channel, frame.to_vec(), dest_key.cloned()))
    }

    fn add_contact(&self, nick: &str, key: &PublicKey) -> Result<(), RelayError> {
        self.contacts
            .lock()
            .map_err(poisoned)?
            .insert(nick.to_owned(), key.clone());
        tracing::debug!(contact = %nick, "contact stored");
        Ok(())
    }

    fn add_channel(&self, name: &str, secret_b64: &str) -> Result<(), RelayError> {
        self.channels
            .lock()
            .map_err(poisoned)?
            .insert(name.to_owned(), secret_b64.to_owned());
        tracing::debug!(channel = %name, "channel key stored");
        Ok(())
    }

    fn channel_secret(&self, name: &str) -> Result<String, RelayError> {
        self.channels
            .lock()
            .map_err(poisoned)?
            .get(name)
            .cloned()
            .ok_or_else(|| RelayError::UnknownChannel(name.to_owned()))
    }

    fn self_key(&self) -> Result<PublicKey, RelayError> {
        Ok(self.self_key.clone())
    }

    fn content_key(&self) -> Result<PublicKey, RelayError> {
        Ok(self.content_key.clone())
    }
}
