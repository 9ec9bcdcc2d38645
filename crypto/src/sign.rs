//! Keyed authentication tags over envelope signing bytes.
//!
//! The tag is HMAC-SHA256 keyed by a **public** key. It is not a signature:
//! anyone holding the same public key can compute it. It shows that the
//! producer and verifier agree on the counterpart key, which the surrounding
//! key exchange hands out only to holders of the matching key material.
//! Hardening candidate: replace with a true asymmetric signature once every
//! peer can be upgraded at once, since the change breaks interoperability.

use hmac::{Hmac, Mac};
use hushcom_types::PublicKey;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Tag length in bytes.
pub const TAG_LEN: usize = 32;

/// A computed authentication tag.
pub type AuthTag = [u8; TAG_LEN];

fn keyed_mac(key: &PublicKey) -> HmacSha256 {
    <HmacSha256 as Mac>::new_from_slice(key.keying_material())
        .expect("HMAC accepts keys of any length")
}

/// Compute the tag of `message` under `key`.
pub fn auth_tag(key: &PublicKey, message: &[u8]) -> AuthTag {
    let mut mac = keyed_mac(key);
    mac.update(message);
    let result = mac.finalize().into_bytes();
    let mut output = [0u8; TAG_LEN];
    output.copy_from_slice(&result);
    output
}

/// Check `tag` against `message` under `key` in constant time.
///
/// Returns `false` for a tag of the wrong length.
pub fn verify_tag(key: &PublicKey, message: &[u8], tag: &[u8]) -> bool {
    let mut mac = keyed_mac(key);
    mac.update(message);
    mac.verify_slice(tag).is_ok()
}
