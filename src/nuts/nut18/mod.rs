//! NUT-18 module imports

pub mod error;
pub mod payment_request;
pub mod secret;
pub mod transport;

pub use error::Error;
pub use payment_request::{PaymentRequest, PaymentRequestBuilder, PaymentRequestPayload};
pub use secret::Nut10SecretRequest;
pub use transport::{Transport, TransportBuilder, TransportType};
