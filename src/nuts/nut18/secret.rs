//! Secret types for NUT-18: Payment Requests

use serde::{Deserialize, Serialize};

use crate::nuts::nut10::Kind;
use crate::nuts::{Nut10Secret, SpendingConditions};

/// Nut10Secret without nonce for payment requests
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nut10SecretRequest {
    /// Kind of the spending condition
    #[serde(rename = "k")]
    pub kind: Kind,
    /// Secret data
    #[serde(rename = "d")]
    pub data: String,
    /// Additional data committed to and can be used for feature extensions
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Vec<String>>>,
}

impl Nut10SecretRequest {
    /// Create a new [`Nut10SecretRequest`]
    pub fn new<S, V>(kind: Kind, data: S, tags: Option<V>) -> Self
    where
        S: Into<String>,
        V: Into<Vec<Vec<String>>>,
    {
        Self {
            kind,
            data: data.into(),
            tags: tags.map(|v| v.into()),
        }
    }
}

impl From<Nut10Secret> for Nut10SecretRequest {
    fn from(secret: Nut10Secret) -> Self {
        Self {
            kind: secret.kind,
            data: secret.secret_data.data,
            tags: secret.secret_data.tags,
        }
    }
}

impl From<Nut10SecretRequest> for Nut10Secret {
    fn from(value: Nut10SecretRequest) -> Self {
        // A nonce is minted here; the request form carries none
        Self::new(value.kind, value.data, value.tags)
    }
}

impl From<SpendingConditions> for Nut10SecretRequest {
    fn from(conditions: SpendingConditions) -> Self {
        match conditions {
            SpendingConditions::P2PKConditions { data, conditions } => {
                Self::new(Kind::P2PK, data.to_hex(), conditions)
            }
            SpendingConditions::HTLCConditions { data, conditions } => {
                Self::new(Kind::HTLC, data.to_string(), conditions)
            }
        }
    }
}
