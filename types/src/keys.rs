//! Key types for identities and channels.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::KeyError;

/// Length in bytes of every key the protocol currently supports.
pub const KEY_LEN: usize = 32;

/// A public key, tagged by scheme.
///
/// Registries and peer caches store this type only. Wire payloads carry the
/// raw key bytes as standard base64, so a key decoded from the wire is always
/// interpreted as the single supported scheme.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PublicKey {
    /// A Curve25519 (X25519) public point.
    Curve25519([u8; KEY_LEN]),
}

impl PublicKey {
    /// Interpret raw key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; KEY_LEN] = bytes.try_into().map_err(|_| KeyError::InvalidLength {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self::Curve25519(arr))
    }

    /// Decode a standard-base64 key.
    pub fn from_b64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| KeyError::InvalidBase64(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Curve25519(bytes) => bytes,
        }
    }

    pub fn to_b64(&self) -> String {
        BASE64.encode(self.as_bytes())
    }

    /// Bytes fed to the envelope authenticator as its key.
    pub fn keying_material(&self) -> &[u8] {
        match self {
            Self::Curve25519(bytes) => bytes,
        }
    }

    /// Human-readable scheme name, for logs.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Curve25519(_) => "curve25519",
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}:{})", self.scheme(), self.to_b64())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b64())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_b64())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> serde::de::Visitor<'de> for KeyVisitor {
            type Value = PublicKey;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a base64-encoded {KEY_LEN}-byte public key")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                PublicKey::from_b64(v).map_err(E::custom)
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                PublicKey::from_bytes(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}

/// Private key material for a profile or a channel.
///
/// This type intentionally does not implement `Debug`, `Serialize`, or `Clone`
/// to prevent accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode base64 private key material, as carried by `JoinChanResp`.
    pub fn from_b64(encoded: &str) -> Result<Self, KeyError> {
        let mut bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| KeyError::InvalidBase64(e.to_string()))?;
        let result = <[u8; KEY_LEN]>::try_from(bytes.as_slice())
            .map(Self)
            .map_err(|_| KeyError::InvalidLength {
                expected: KEY_LEN,
                actual: bytes.len(),
            });
        bytes.zeroize();
        result
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_b64(&self) -> String {
        BASE64.encode(self.0)
    }
}

/// A key pair (public + secret).
///
/// Use `hushcom_crypto::generate_keypair()` or `hushcom_crypto::keypair_from_secret()`
/// to construct key pairs. This struct is intentionally just data.
pub struct KeyPair {
    pub public: PublicKey,
    pub secret: SecretKey,
}
