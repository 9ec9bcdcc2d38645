//! Nullable relay: record deliveries and key-store calls without sending.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use hushcom_relay::{Delivery, Relay, RelayError};
use hushcom_types::PublicKey;

/// A test relay that records traffic instead of sending it.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullRelay {
    self_key: PublicKey,
    content_key: PublicKey,
    /// All deliveries "sent", in order.
    sent: Mutex<Vec<Delivery>>,
    /// Every `add_contact` call, in order.
    contacts: Mutex<Vec<(String, PublicKey)>>,
    /// Channel name → base64 private key material.
    channels: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl NullRelay {
    pub fn new(self_key: PublicKey, content_key: PublicKey) -> Self {
        Self {
            self_key,
            content_key,
            sent: Mutex::new(Vec::new()),
            contacts: Mutex::new(Vec::new()),
            channels: Mutex::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// A relay whose routing and content key are the same.
    pub fn with_key(key: PublicKey) -> Self {
        Self::new(key.clone(), key)
    }

    /// Make every send and key-store write fail with [`RelayError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Get all deliveries sent so far (for assertions).
    pub fn sent(&self) -> Vec<Delivery> {
        self.sent.lock().unwrap().clone()
    }

    /// Remove and return all deliveries sent so far.
    pub fn take_sent(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    /// Get all recorded contacts.
    pub fn contacts(&self) -> Vec<(String, PublicKey)> {
        self.contacts.lock().unwrap().clone()
    }

    /// Stored channel key material, if any.
    pub fn stored_channel(&self, name: &str) -> Option<String> {
        self.channels.lock().unwrap().get(name).cloned()
    }

    /// Clear all recorded state except stored channel keys.
    pub fn reset(&self) {
        self.sent.lock().unwrap().clear();
        self.contacts.lock().unwrap().clear();
    }

    fn check_available(&self) -> Result<(), RelayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RelayError::Unavailable("null relay switched off".into()));
        }
        Ok(())
    }

    fn record(&self, delivery: Delivery) -> Result<(), RelayError> {
        self.check_available()?;
        self.sent.lock().unwrap().push(delivery);
        Ok(())
    }
}

impl Relay for NullRelay {
    fn send(&self, to: &str, frame: &[u8], dest_key: Option<&PublicKey>) -> Result<(), RelayError> {
        self.record(Delivery::direct(to, frame.to_vec(), dest_key.cloned()))
    }

    fn send_channel(
        &self,
        channel: &str,
        frame: &[u8],
        dest_key: Option<&PublicKey>,
    ) -> Result<(), RelayError> {
        self.record(Delivery::channel(channel, frame.to_vec(), dest_key.cloned()))
    }

    fn add_contact(&self, nick: &str, key: &PublicKey) -> Result<(), RelayError> {
        self.check_available()?;
        self.contacts
            .lock()
            .unwrap()
            .push((nick.to_owned(), key.clone()));
        Ok(())
    }

    fn add_channel(&self, name: &str, secret_b64: &str) -> Result<(), RelayError> {
        self.check_available()?;
        self.channels
            .lock()
            .unwrap()
            .insert(name.to_owned(), secret_b64.to_owned());
        Ok(())
    }

    fn channel_secret(&self, name: &str) -> Result<String, RelayError> {
        self.stored_channel(name)
            .ok_or_else(|| RelayError::UnknownChannel(name.to_owned()))
    }

    fn self_key(&self) -> Result<PublicKey, RelayError> {
        Ok(self.self_key.clone())
    }

    fn content_key(&self) -> Result<PublicKey, RelayError> {
        Ok(self.content_key.clone())
    }
}
