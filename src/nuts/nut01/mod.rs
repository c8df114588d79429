//! NUT-01: Mint public key exchange
//!
//! <https://github.com/cashubtc/nuts/blob/main/01.md>

use std::collections::BTreeMap;

use bitcoin::secp256k1;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

mod public_key;
mod secret_key;

pub use self::public_key::PublicKey;
pub use self::secret_key::SecretKey;
use super::nut02::KeySet;
use crate::amount::Amount;

/// NUT01 Error
#[derive(Debug, Error)]
pub enum Error {
    /// Secp256k1 error
    #[error(transparent)]
    Secp256k1(#[from] secp256k1::Error),
    /// Json error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Invalid Pubkey size
    #[error("Invalid public key size: expected={expected}, found={found}")]
    InvalidPublicKeySize {
        /// Expected size
        expected: usize,
        /// Actual size
        found: usize,
    },
}

/// Mint Keys [NUT-01]
///
/// Map of amount to the mint public key signing for that amount.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Keys(BTreeMap<Amount, PublicKey>);

impl Keys {
    /// Create new [`Keys`]
    #[inline]
    pub fn new(keys: BTreeMap<Amount, PublicKey>) -> Self {
        Self(keys)
    }

    /// Get [`Keys`]
    #[inline]
    pub fn keys(&self) -> &BTreeMap<Amount, PublicKey> {
        &self.0
    }

    /// Get [`PublicKey`] for [`Amount`]
    #[inline]
    pub fn amount_key(&self, amount: Amount) -> Option<PublicKey> {
        self.0.get(&amount).copied()
    }

    /// Iterate through the (`Amount`, `PublicKey`) entries in the map
    ///
    /// A `BTreeMap` iterates in ascending amount order, the order keyset id
    /// computation requires.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&Amount, &PublicKey)> {
        self.0.iter()
    }

    /// Number of keys
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Mint Public Keys [NUT-01]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeysResponse {
    /// Keysets with public keys
    pub keysets: Vec<KeySet>,
}

impl<'de> Deserialize<'de> for KeysResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Tolerant: keysets this wallet cannot parse are skipped
        let keys_response: Value = Value::deserialize(deserializer)?;

        let keysets = keys_response
            .get("keysets")
            .ok_or(de::Error::custom("Keysets not found"))?
            .as_array()
            .ok_or(de::Error::custom("Keysets not found"))?;

        let keysets = keysets
            .iter()
            .flat_map(|keyset| serde_json::from_value(keyset.clone()))
            .collect();

        Ok(KeysResponse { keysets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializing_keys() {
        let keys = r#"{
            "1":"03a40f20667ed53513075dc51e715ff2046cad64eb68960632269ba7f0210e38bc",
            "2":"03fd4ce5a16b65576145949e6f99f445f8249fee17c606b688b504a849cdc452de",
            "4":"02648eccfa4c026960966276fa5a4cae46ce0fd432211a4f449bf84f13aa5f8303",
            "8":"02fdfd6796bfeac490cbee12f778f867f0a2c68f6508d17c649759ea0dc3547528"
        }"#;

        let keys: Keys = serde_json::from_str(keys).unwrap();

        assert_eq!(keys.len(), 4);
        assert_eq!(
            keys.amount_key(Amount::from(2)).unwrap(),
            PublicKey::from_hex(
                "03fd4ce5a16b65576145949e6f99f445f8249fee17c606b688b504a849cdc452de"
            )
            .unwrap()
        );
        assert!(keys.amount_key(Amount::from(16)).is_none());

        // Iteration is in ascending amount order
        let amounts: Vec<u64> = keys.iter().map(|(a, _)| u64::from(*a)).collect();
        assert_eq!(amounts, vec![1, 2, 4, 8]);
    }
}
