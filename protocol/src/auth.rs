//! Envelope authentication.
//!
//! Producer and verifier must key the tag with the same public key: a
//! client signs with its own profile key and the server checks against the
//! registered key for that nickname; the server signs with its content key
//! and clients check against their cached copy of it.

use hushcom_crypto::{auth_tag, verify_tag, AuthTag};
use hushcom_messages::Envelope;
use hushcom_types::PublicKey;

use crate::ProtocolError;

/// Compute the tag of `envelope` under `key`.
pub fn sign(key: &PublicKey, envelope: &Envelope) -> AuthTag {
    auth_tag(key, &envelope.signing_bytes())
}

/// Sign `envelope` in place of any previous tag.
pub fn seal(key: &PublicKey, mut envelope: Envelope) -> Envelope {
    envelope.sig = sign(key, &envelope).to_vec();
    envelope
}

/// Whether `envelope.sig` matches its recomputed tag under `key`.
pub fn verify(key: &PublicKey, envelope: &Envelope) -> bool {
    verify_tag(key, &envelope.signing_bytes(), &envelope.sig)
}

/// Like [`verify`], but fails with an error naming the sender and tag.
pub fn authenticate(key: &PublicKey, envelope: &Envelope) -> Result<(), ProtocolError> {
    if verify(key, envelope) {
        Ok(())
    } else {
        Err(ProtocolError::Authentication {
            sender: envelope.from.clone(),
            signature: hex::encode(&envelope.sig),
        })
    }
}
