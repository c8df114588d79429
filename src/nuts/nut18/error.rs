//! Error types for NUT-18: Payment Requests

use thiserror::Error;

/// NUT18 Error
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid Prefix
    #[error("Invalid prefix")]
    InvalidPrefix,
    /// Amount without unit
    #[error("Payment request with an amount requires a unit")]
    AmountWithoutUnit,
    /// Transport is not supported
    #[error("Transport type is not supported")]
    UnsupportedTransport,
    /// Ciborium deserialization error
    #[error(transparent)]
    CiboriumError(#[from] ciborium::de::Error<std::io::Error>),
    /// Ciborium serialization error
    #[error(transparent)]
    CiboriumSerError(#[from] ciborium::ser::Error<std::io::Error>),
    /// Base64 error
    #[error(transparent)]
    Base64Error(#[from] bitcoin::base64::DecodeError),
}
