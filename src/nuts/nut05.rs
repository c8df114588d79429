//! NUT-05: Melting Tokens
//!
//! <https://github.com/cashubtc/nuts/blob/main/05.md>

use std::fmt;
use std::str::FromStr;

use lightning_invoice::Bolt11Invoice;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::nut00::{BlindSignature, BlindedMessage, CurrencyUnit, PaymentMethod, Proofs};
use crate::Amount;

/// NUT05 Error
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown Quote State
    #[error("Unknown quote state")]
    UnknownState,
    /// Amount overflow
    #[error("Amount overflow")]
    AmountOverflow,
}

/// Melt quote request [NUT-05]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltQuoteBolt11Request {
    /// Bolt11 invoice to be paid
    pub request: Bolt11Invoice,
    /// Unit wallet would like to pay with
    pub unit: CurrencyUnit,
}

/// Possible states of a melt quote
///
/// A state the wallet does not recognize degrades to [`QuoteState::Unknown`]
/// rather than failing the whole response; encountering it is a protocol
/// error the caller must surface.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum QuoteState {
    /// Quote has not been paid
    #[default]
    Unpaid,
    /// Payment is in flight, proofs remain in flight with it
    Pending,
    /// Quote has been paid
    Paid,
    /// State the wallet does not recognize
    Unknown,
}

impl fmt::Display for QuoteState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unpaid => write!(f, "UNPAID"),
            Self::Pending => write!(f, "PENDING"),
            Self::Paid => write!(f, "PAID"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl FromStr for QuoteState {
    type Err = Error;

    fn from_str(state: &str) -> Result<Self, Self::Err> {
        match state {
            "UNPAID" => Ok(Self::Unpaid),
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            _ => Ok(Self::Unknown),
        }
    }
}

impl Serialize for QuoteState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for QuoteState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let state = String::deserialize(deserializer)?;
        Self::from_str(&state).map_err(serde::de::Error::custom)
    }
}

/// Melt quote response [NUT-05]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltQuoteBolt11Response {
    /// Quote Id
    pub quote: String,
    /// The amount that needs to be provided
    pub amount: Amount,
    /// The fee reserve that is required
    pub fee_reserve: Amount,
    /// Quote State
    pub state: QuoteState,
    /// Unix timestamp until the quote is valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u64>,
    /// Bolt11 payment preimage, present once paid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_preimage: Option<String>,
    /// Promises for overpaid Lightning fees [NUT-08]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Vec<BlindSignature>>,
}

/// Melt Bolt11 Request [NUT-05]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltBolt11Request {
    /// Quote ID
    pub quote: String,
    /// Proofs
    pub inputs: Proofs,
    /// Blinded messages that can be used to return change [NUT-08]
    ///
    /// Amount field of blinded messages `SHOULD` be set to zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<BlindedMessage>>,
}

impl MeltBolt11Request {
    /// Total [`Amount`] of proofs
    pub fn proofs_amount(&self) -> Result<Amount, Error> {
        Amount::try_sum(self.inputs.iter().map(|proof| proof.amount))
            .map_err(|_| Error::AmountOverflow)
    }
}

/// Melt Method Settings
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeltMethodSettings {
    /// Payment Method e.g. bolt11
    pub method: PaymentMethod,
    /// Currency Unit e.g. sat
    pub unit: CurrencyUnit,
    /// Min Amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Amount>,
    /// Max Amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Amount>,
}

/// Melt Settings
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
    /// Methods to melt
    pub methods: Vec<MeltMethodSettings>,
    /// Melting disabled
    pub disabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_melt_quote_state_tolerant() {
        let response = r#"{"quote":"TRWKzQpMQy...","amount":10,"fee_reserve":2,"state":"SETTLING","expiry":1701704757}"#;

        let quote: MeltQuoteBolt11Response = serde_json::from_str(response).unwrap();
        assert_eq!(quote.state, QuoteState::Unknown);
    }

    #[test]
    fn test_melt_quote_response_deserialization() {
        let response = r#"{"quote":"TRWKzQpMQy...","amount":10,"fee_reserve":2,"state":"PAID","expiry":1701704757,"payment_preimage":"c5a1ae1f639e1f4a3872e81500fd028bece7bedc1152f740cba5c3417b748c1b"}"#;

        let quote: MeltQuoteBolt11Response = serde_json::from_str(response).unwrap();
        assert_eq!(quote.state, QuoteState::Paid);
        assert_eq!(quote.amount, Amount::from(10));
        assert_eq!(quote.fee_reserve, Amount::from(2));
        assert!(quote.change.is_none());
    }
}
