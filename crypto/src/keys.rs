//! X25519 key generation.

use hushcom_types::{KeyPair, PublicKey, SecretKey, KEY_LEN};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::Zeroize;

use crate::CryptoError;

/// Generate a new key pair from the operating system's entropy source.
pub fn generate_keypair() -> Result<KeyPair, CryptoError> {
    let mut seed = [0u8; KEY_LEN];
    getrandom::getrandom(&mut seed).map_err(|e| CryptoError::Entropy(e.to_string()))?;
    let pair = keypair_from_secret(SecretKey::from_bytes(seed));
    seed.zeroize();
    Ok(pair)
}

/// Derive the public key from secret key material.
pub fn public_from_secret(secret: &SecretKey) -> PublicKey {
    let static_secret = StaticSecret::from(*secret.as_bytes());
    PublicKey::Curve25519(X25519Public::from(&static_secret).to_bytes())
}

/// Reconstruct a full key pair from secret key material.
pub fn keypair_from_secret(secret: SecretKey) -> KeyPair {
    let public = public_from_secret(&secret);
    KeyPair { public, secret }
}
