//! Errors

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::util::hex;

/// Wallet Error
#[derive(Debug, Error)]
pub enum Error {
    // Mint protocol errors
    /// Blinded Message is already signed
    #[error("Blinded message is already signed")]
    BlindedMessageAlreadySigned,
    /// Proof is not verified by the mint
    #[error("Token not verified")]
    TokenNotVerified,
    /// Proofs already spent
    #[error("Token already spent")]
    TokenAlreadySpent,
    /// Transaction unbalanced
    #[error("Transaction unbalanced")]
    TransactionUnbalanced,
    /// Unit not supported by the mint
    #[error("Unit not supported")]
    UnitNotSupported,
    /// Amount outside of allowed range
    #[error("Amount outside of allowed range")]
    AmountOutsideLimitRange,
    /// Keyset is not known by the mint
    #[error("Unknown keyset")]
    UnknownKeySet,
    /// Keyset is inactive, mint will not sign
    #[error("Keyset inactive")]
    InactiveKeyset,
    /// Quote is not paid
    #[error("Quote not paid")]
    QuoteNotPaid,
    /// Proofs for quote already issued
    #[error("Proofs already issued for quote")]
    ProofsAlreadyIssued,
    /// Minting is disabled
    #[error("Minting is disabled")]
    MintingDisabled,
    /// Lightning payment failed
    #[error("Lightning payment failed")]
    PaymentFailed,
    /// Quote is pending
    #[error("Quote is pending")]
    QuotePending,
    /// Invoice already paid
    #[error("Invoice already paid")]
    InvoiceAlreadyPaid,
    /// Quote has expired
    #[error("Quote expired")]
    QuoteExpired,
    /// The mint returned an error the wallet does not know
    #[error("Mint error: {0}")]
    UnknownErrorResponse(String),

    // Input and semantic errors
    /// Inputs do not cover amount plus fee
    #[error("Insufficient inputs: needed {needed} with fee, have {available}")]
    InsufficientInputs {
        /// Amount required including fees
        needed: crate::Amount,
        /// Amount the provided proofs sum to
        available: crate::Amount,
    },
    /// Preferred distribution does not sum to the amount
    #[error("Preferred distribution does not match amount")]
    PreferredDistributionMismatch,
    /// Inputs carry more than one unit
    #[error("Inputs are not all of the same unit")]
    UnitMismatch,
    /// Mint quote is missing its request detail
    #[error("Mint quote missing request detail")]
    MissingRequestDetail,
    /// No active keyset for the unit
    #[error("No active keyset found for unit")]
    NoActiveKeysetForUnit,
    /// Token cannot be processed by this wallet
    #[error("Unsupported token")]
    UnsupportedToken,
    /// Inputs already carry spending conditions
    #[error("Inputs with spending conditions cannot be sent")]
    SpendingConditionsOnInputs,
    /// Provided signing key does not open the lock
    #[error("Locking condition mismatch")]
    LockingConditionMismatch,
    /// Some inputs are locked and some are not, or locks differ
    #[error("Mixed spending conditions in one operation")]
    MixedSpendingConditions,
    /// Spending condition kind this wallet cannot satisfy
    #[error("Unsupported spending condition")]
    UnsupportedSpendingCondition,
    /// The mint responded with fewer or different promises than outputs sent
    #[error("Promise count does not match output count")]
    PromiseCountMismatch,

    // Transport errors
    /// Network error
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    /// Http error with status and body
    #[error("HTTP error {0:?}: {1}")]
    HttpError(Option<u16>, String),

    // Component errors
    /// Amount Error
    #[error(transparent)]
    Amount(#[from] crate::amount::Error),
    /// DHKE Error
    #[error(transparent)]
    Dhke(#[from] crate::dhke::Error),
    /// Secret Error
    #[error(transparent)]
    Secret(#[from] crate::secret::Error),
    /// Mint Url Error
    #[error(transparent)]
    MintUrl(#[from] crate::mint_url::Error),
    /// NUT00 Error
    #[error(transparent)]
    Nut00(#[from] crate::nuts::nut00::Error),
    /// NUT01 Error
    #[error(transparent)]
    Nut01(#[from] crate::nuts::nut01::Error),
    /// NUT02 Error
    #[error(transparent)]
    Nut02(#[from] crate::nuts::nut02::Error),
    /// NUT04 Error
    #[error(transparent)]
    Nut04(#[from] crate::nuts::nut04::Error),
    /// NUT05 Error
    #[error(transparent)]
    Nut05(#[from] crate::nuts::nut05::Error),
    /// NUT11 Error
    #[error(transparent)]
    Nut11(#[from] crate::nuts::nut11::Error),
    /// NUT12 Error
    #[error(transparent)]
    Nut12(#[from] crate::nuts::nut12::Error),
    /// NUT13 Error
    #[error(transparent)]
    Nut13(#[from] crate::nuts::nut13::Error),
    /// NUT18 Error
    #[error(transparent)]
    Nut18(#[from] crate::nuts::nut18::Error),
    /// Bip32 Error
    #[error(transparent)]
    Bip32(#[from] bitcoin::bip32::Error),
    /// Hex Error
    #[error(transparent)]
    Hex(#[from] hex::Error),
    /// Serde Json error
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Error Response
///
/// Sent by the mint as a non-2xx json body
/// ([NUT-00](https://github.com/cashubtc/nuts/blob/main/00.md)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error Code
    pub code: ErrorCode,
    /// Human readable description
    #[serde(default)]
    pub detail: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code: {}, detail: {}", self.code, self.detail)
    }
}

impl ErrorResponse {
    /// Create new [`ErrorResponse`]
    pub fn new(code: ErrorCode, detail: String) -> Self {
        Self { code, detail }
    }

    /// Error response from json
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;

        Self::from_value(value)
    }

    /// Error response from json Value
    ///
    /// Bodies that are not an error document at all still become a response
    /// with an unknown code so the caller sees what the mint sent.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match serde_json::from_value::<ErrorResponse>(value.clone()) {
            Ok(res) => Ok(res),
            Err(_) => Ok(Self {
                code: ErrorCode::Unknown(999),
                detail: value.to_string(),
            }),
        }
    }
}

impl From<ErrorResponse> for Error {
    fn from(err: ErrorResponse) -> Error {
        match err.code {
            ErrorCode::BlindedMessageAlreadySigned => Self::BlindedMessageAlreadySigned,
            ErrorCode::TokenNotVerified => Self::TokenNotVerified,
            ErrorCode::TokenAlreadySpent => Self::TokenAlreadySpent,
            ErrorCode::TransactionUnbalanced => Self::TransactionUnbalanced,
            ErrorCode::UnitNotSupported => Self::UnitNotSupported,
            ErrorCode::AmountOutsideLimitRange => Self::AmountOutsideLimitRange,
            ErrorCode::KeysetNotFound => Self::UnknownKeySet,
            ErrorCode::KeysetInactive => Self::InactiveKeyset,
            ErrorCode::QuoteNotPaid => Self::QuoteNotPaid,
            ErrorCode::TokensAlreadyIssued => Self::ProofsAlreadyIssued,
            ErrorCode::MintingDisabled => Self::MintingDisabled,
            ErrorCode::LightningError => Self::PaymentFailed,
            ErrorCode::QuotePending => Self::QuotePending,
            ErrorCode::InvoiceAlreadyPaid => Self::InvoiceAlreadyPaid,
            ErrorCode::QuoteExpired => Self::QuoteExpired,
            _ => Self::UnknownErrorResponse(err.to_string()),
        }
    }
}

/// Possible Error Codes
///
/// The numeric taxonomy shared by all mints
/// (<https://github.com/cashubtc/nuts/blob/main/error_codes.md>).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ErrorCode {
    /// Blinded Message is already signed (10002)
    BlindedMessageAlreadySigned,
    /// Token could not be verified (10003)
    TokenNotVerified,
    /// Token is already spent (11001)
    TokenAlreadySpent,
    /// Transaction is not balanced, amount + fee (11002)
    TransactionUnbalanced,
    /// Unit in request is not supported (11005)
    UnitNotSupported,
    /// Amount outside of limit range (11006)
    AmountOutsideLimitRange,
    /// Keyset is not known (12001)
    KeysetNotFound,
    /// Keyset is inactive, cannot sign messages (12002)
    KeysetInactive,
    /// Lightning error (20000)
    LightningError,
    /// Quote request is not paid (20001)
    QuoteNotPaid,
    /// Tokens have already been issued for quote (20002)
    TokensAlreadyIssued,
    /// Minting is disabled (20003)
    MintingDisabled,
    /// Quote is pending (20005)
    QuotePending,
    /// Invoice already paid (20006)
    InvoiceAlreadyPaid,
    /// Quote is expired (20007)
    QuoteExpired,
    /// Unknown or unmapped error code
    Unknown(u16),
}

impl ErrorCode {
    /// Error code from u16
    pub fn from_code(code: u16) -> Self {
        match code {
            10002 => Self::BlindedMessageAlreadySigned,
            10003 => Self::TokenNotVerified,
            11001 => Self::TokenAlreadySpent,
            11002 => Self::TransactionUnbalanced,
            11005 => Self::UnitNotSupported,
            11006 => Self::AmountOutsideLimitRange,
            12001 => Self::KeysetNotFound,
            12002 => Self::KeysetInactive,
            20000 => Self::LightningError,
            20001 => Self::QuoteNotPaid,
            20002 => Self::TokensAlreadyIssued,
            20003 => Self::MintingDisabled,
            20005 => Self::QuotePending,
            20006 => Self::InvoiceAlreadyPaid,
            20007 => Self::QuoteExpired,
            _ => Self::Unknown(code),
        }
    }

    /// Error code to u16
    pub fn to_code(&self) -> u16 {
        match self {
            Self::BlindedMessageAlreadySigned => 10002,
            Self::TokenNotVerified => 10003,
            Self::TokenAlreadySpent => 11001,
            Self::TransactionUnbalanced => 11002,
            Self::UnitNotSupported => 11005,
            Self::AmountOutsideLimitRange => 11006,
            Self::KeysetNotFound => 12001,
            Self::KeysetInactive => 12002,
            Self::LightningError => 20000,
            Self::QuoteNotPaid => 20001,
            Self::TokensAlreadyIssued => 20002,
            Self::MintingDisabled => 20003,
            Self::QuotePending => 20005,
            Self::InvoiceAlreadyPaid => 20006,
            Self::QuoteExpired => 20007,
            Self::Unknown(code) => *code,
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(self.to_code())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = u16::deserialize(deserializer)?;

        Ok(ErrorCode::from_code(code))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_decoding() {
        let json = r#"{"code": 11001, "detail": "Token already spent"}"#;

        let response = ErrorResponse::from_json(json).unwrap();
        assert_eq!(response.code, ErrorCode::TokenAlreadySpent);
        assert_eq!(response.detail, "Token already spent");

        let error: Error = response.into();
        assert!(matches!(error, Error::TokenAlreadySpent));
    }

    #[test]
    fn test_error_code_roundtrip() {
        for code in [10002, 10003, 11001, 11002, 11005, 11006, 12002, 20001, 20007] {
            assert_eq!(ErrorCode::from_code(code).to_code(), code);
        }

        assert_eq!(ErrorCode::from_code(42), ErrorCode::Unknown(42));
    }

    #[test]
    fn test_error_response_from_unexpected_body() {
        let response = ErrorResponse::from_json(r#"{"something": "else"}"#).unwrap();
        assert_eq!(response.code, ErrorCode::Unknown(999));

        let error: Error = response.into();
        assert!(matches!(error, Error::UnknownErrorResponse(_)));
    }

    #[test]
    fn test_quote_error_codes_map_to_typed_errors() {
        for (code, matcher) in [
            (20001u16, "quote not paid"),
            (20002, "already issued"),
            (20003, "disabled"),
        ] {
            let response = ErrorResponse::new(ErrorCode::from_code(code), String::new());
            let error: Error = response.into();
            match (code, &error) {
                (20001, Error::QuoteNotPaid) => {}
                (20002, Error::ProofsAlreadyIssued) => {}
                (20003, Error::MintingDisabled) => {}
                _ => panic!("code {code} ({matcher}) mapped to {error:?}"),
            }
        }
    }
}
