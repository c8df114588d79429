//! Nuts
//!
//! See all at <https://github.com/cashubtc/nuts>

pub mod nut00;
pub mod nut01;
pub mod nut02;
pub mod nut03;
pub mod nut04;
pub mod nut05;
pub mod nut06;
pub mod nut10;
pub mod nut11;
pub mod nut12;
pub mod nut13;
pub mod nut18;

pub use nut00::{
    BlindSignature, BlindedMessage, CurrencyUnit, PaymentMethod, PreMint, PreMintSecrets, Proof,
    Proofs, ProofsMethods, Token, TokenV3, TokenV4, Witness,
};
pub use nut01::{Keys, KeysResponse, PublicKey, SecretKey};
pub use nut02::{Id, KeySet, KeySetInfo, KeysetResponse};
pub use nut03::{SwapRequest, SwapResponse};
pub use nut04::{
    MintBolt11Request, MintBolt11Response, MintMethodSettings, MintQuoteBolt11Request,
    MintQuoteBolt11Response, QuoteState as MintQuoteState, Settings as Nut04Settings,
};
pub use nut05::{
    MeltBolt11Request, MeltMethodSettings, MeltQuoteBolt11Request, MeltQuoteBolt11Response,
    QuoteState as MeltQuoteState, Settings as Nut05Settings,
};
pub use nut06::{ContactInfo, MintInfo, MintVersion, Nuts};
pub use nut10::{Kind, Secret as Nut10Secret, SecretData};
pub use nut11::{Conditions, P2PKWitness, SigFlag, SpendingConditions};
pub use nut12::{BlindSignatureDleq, DleqVerification, ProofDleq};
pub use nut18::{PaymentRequest, PaymentRequestPayload, Transport};
