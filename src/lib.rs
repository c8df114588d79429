//! Client side core of a Cashu ecash wallet
//!
//! Blind signatures, keysets, deterministic secrets, token and payment
//! request codecs, and the wallet operations (mint, swap, send, receive,
//! melt) against a mint's HTTP interface.
//!
//! <https://github.com/cashubtc/nuts>

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod amount;
pub mod dhke;
pub mod error;
pub mod mint_url;
pub mod nuts;
pub mod secret;
pub mod util;
pub mod wallet;

pub use amount::{Amount, SplitTarget};
pub use bip39::Mnemonic;
pub use error::{Error, ErrorCode, ErrorResponse};
pub use lightning_invoice::Bolt11Invoice;
pub use mint_url::MintUrl;
pub use nuts::{DleqVerification, Proof, Proofs, Token};
pub use util::SECP256K1;
pub use wallet::{HttpClient, Keyset, Mint, MintConnector, Wallet};

/// Result
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Like `assert!` but returns an error instead of panicking
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
