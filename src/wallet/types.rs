//! Wallet side types

use serde::{Deserialize, Serialize};

use crate::mint_url::MintUrl;
use crate::nuts::{
    CurrencyUnit, DleqVerification, Id, Keys, MeltQuoteState, MintInfo, MintQuoteState, Proofs,
    Token,
};
use crate::{ensure, Amount, Error};

/// A mint's keyset as the wallet sees it
///
/// Merges the `/v1/keysets` listing with the keys fetched per keyset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyset {
    /// Keyset [`Id`]
    pub id: Id,
    /// Keyset [`CurrencyUnit`]
    pub unit: CurrencyUnit,
    /// Whether the mint still signs with this keyset
    pub active: bool,
    /// Input fee per thousand spent proofs
    pub input_fee_ppk: u64,
    /// Expiry after which the keyset must not be used
    pub final_expiry: Option<u64>,
    /// Public keys by amount
    pub keys: Keys,
}

/// Snapshot of a mint's state
///
/// Obtained from [`load_mint`](crate::wallet::Wallet::load_mint); operations
/// read it immutably. The only mutable companion, the derivation counter, is
/// owned by the caller's persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    /// Mint url
    pub url: MintUrl,
    /// Keysets published by the mint
    pub keysets: Vec<Keyset>,
    /// Info descriptor
    pub info: Option<MintInfo>,
}

impl Mint {
    /// First active keyset for `unit`
    pub fn active_keyset_for_unit(&self, unit: &CurrencyUnit) -> Result<&Keyset, Error> {
        self.keysets
            .iter()
            .find(|keyset| &keyset.unit == unit && keyset.active)
            .ok_or(Error::NoActiveKeysetForUnit)
    }

    /// Keyset by [`Id`]
    pub fn keyset(&self, id: &Id) -> Option<&Keyset> {
        self.keysets.iter().find(|keyset| &keyset.id == id)
    }
}

/// Mint quote, bridging a Lightning deposit to issuance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintQuote {
    /// Quote id
    pub id: String,
    /// Payment request to fulfil
    pub request: String,
    /// Amount the quote was requested for
    pub amount: Amount,
    /// Unit the quote was requested in
    pub unit: CurrencyUnit,
    /// Quote state
    pub state: MintQuoteState,
    /// Unix timestamp until the quote is valid
    pub expiry: Option<u64>,
}

/// Melt quote, bridging proofs back to a Lightning payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltQuote {
    /// Quote id
    pub id: String,
    /// Amount to be paid
    pub amount: Amount,
    /// Fee reserve required on top of the amount
    pub fee_reserve: Amount,
    /// Unit the quote was requested in
    pub unit: CurrencyUnit,
    /// Quote state
    pub state: MeltQuoteState,
    /// Unix timestamp until the quote is valid
    pub expiry: Option<u64>,
}

/// Result of issuing proofs against a paid mint quote
#[derive(Debug, Clone)]
pub struct IssueResult {
    /// The newly minted proofs
    pub proofs: Proofs,
    /// DLEQ outcome over the new proofs
    pub dleq: DleqVerification,
    /// Deterministic counter slots consumed; persist on success
    pub counter_increase: u32,
}

/// Result of a swap
#[derive(Debug, Clone)]
pub struct SwapResult {
    /// Proofs the wallet keeps
    pub keep: Proofs,
    /// Proofs meant to be handed on
    pub send: Proofs,
    /// DLEQ outcome over the spent inputs
    pub input_dleq: DleqVerification,
    /// DLEQ outcome over the fresh outputs
    pub output_dleq: DleqVerification,
    /// Deterministic counter slots consumed; persist on success
    pub counter_increase: u32,
}

/// Result of preparing a token to hand to a payee
#[derive(Debug, Clone)]
pub struct SendResult {
    /// The token to transmit
    pub token: Token,
    /// Change the wallet keeps
    pub change: Proofs,
    /// DLEQ outcome over the token's proofs
    pub output_dleq: DleqVerification,
    /// Deterministic counter slots consumed; persist on success
    pub counter_increase: u32,
}

/// Result of receiving a token
#[derive(Debug, Clone)]
pub struct ReceiveResult {
    /// The fresh proofs now owned by this wallet
    pub proofs: Proofs,
    /// DLEQ outcome over the received inputs
    pub input_dleq: DleqVerification,
    /// DLEQ outcome over the fresh outputs
    pub output_dleq: DleqVerification,
    /// Deterministic counter slots consumed; persist on success
    pub counter_increase: u32,
}

/// Result of a melt
#[derive(Debug, Clone)]
pub struct MeltResult {
    /// State the quote resolved to; `Pending` leaves the proofs in flight and
    /// the caller must poll until it resolves
    pub state: MeltQuoteState,
    /// Payment preimage once paid
    pub preimage: Option<String>,
    /// Change for an overpaid fee reserve
    pub change: Option<Proofs>,
    /// DLEQ outcome over the change proofs
    pub change_dleq: DleqVerification,
}

/// How the inputs of a token relate to a provided signing key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockClassification {
    /// No input carries a spending condition
    NotLocked,
    /// All inputs are P2PK locked to the provided key
    Match,
    /// All inputs are P2PK locked, but not to the provided key
    Mismatch,
    /// Inputs are locked and no key was provided
    NoKey,
    /// Inputs disagree about their spending conditions
    Partial,
}

/// Split an input total into keep and send amounts
///
/// With no target the whole sum, less the fee, is sent.
pub(crate) fn split_for_send(
    inputs_total: Amount,
    target: Option<Amount>,
    fee: Amount,
) -> Result<(Amount, Amount), Error> {
    let send_amount = match target {
        Some(target) => target,
        None => inputs_total
            .checked_sub(fee)
            .ok_or(Error::InsufficientInputs {
                needed: fee,
                available: inputs_total,
            })?,
    };

    let needed = send_amount
        .checked_add(fee)
        .ok_or(Error::Amount(crate::amount::Error::AmountOverflow))?;

    ensure!(
        inputs_total >= needed,
        Error::InsufficientInputs {
            needed,
            available: inputs_total,
        }
    );

    let keep_amount = inputs_total - send_amount - fee;

    Ok((keep_amount, send_amount))
}
