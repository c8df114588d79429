//! Cashu Wallet
//!
//! The operation state machines: mint-quote → issue, swap, send, receive and
//! melt-quote → melt, each orchestrating the crypto and codec modules against
//! a [`MintConnector`].
//!
//! The wallet owns no storage. Keyset state is read as an immutable [`Mint`]
//! snapshot at operation start, and the deterministic counter is threaded in
//! by the caller: every seeded operation reports a `counter_increase` the
//! caller persists only on success. On any error an operation is
//! observationally atomic and the counter must not advance.

use std::sync::Arc;

use bitcoin::bip32::Xpriv;
use bitcoin::Network;

use crate::mint_url::MintUrl;
use crate::nuts::CurrencyUnit;
use crate::Error;

mod issue;
mod keysets;
mod melt;
mod mint_connector;
mod receive;
mod send;
mod swap;
#[cfg(test)]
pub(crate) mod test_utils;
mod types;

pub use keysets::{calculate_fee, proofs_unit, select_proofs};
pub use mint_connector::{HttpClient, MintConnector};
pub use types::{
    IssueResult, Keyset, LockClassification, MeltQuote, MeltResult, Mint, MintQuote,
    ReceiveResult, SendResult, SwapResult,
};

/// Cashu Wallet
///
/// One wallet is bound to one mint and one unit.
#[derive(Clone)]
pub struct Wallet {
    /// Mint base url
    pub mint_url: MintUrl,
    /// Unit this wallet operates in
    pub unit: CurrencyUnit,
    client: Arc<dyn MintConnector + Send + Sync>,
    xpriv: Option<Xpriv>,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("mint_url", &self.mint_url)
            .field("unit", &self.unit)
            .field("seeded", &self.xpriv.is_some())
            .finish()
    }
}

impl Wallet {
    /// Create new [`Wallet`] against the mint's HTTP interface
    ///
    /// When a BIP-39 style seed is given, outputs are derived
    /// deterministically and operations report counter increases; otherwise
    /// secrets and blinding factors are random.
    pub fn new(
        mint_url: MintUrl,
        unit: CurrencyUnit,
        seed: Option<&[u8]>,
    ) -> Result<Self, Error> {
        let client = HttpClient::new(mint_url.clone())?;

        Self::with_connector(mint_url, unit, Arc::new(client), seed)
    }

    /// Create new [`Wallet`] with a custom [`MintConnector`]
    pub fn with_connector(
        mint_url: MintUrl,
        unit: CurrencyUnit,
        client: Arc<dyn MintConnector + Send + Sync>,
        seed: Option<&[u8]>,
    ) -> Result<Self, Error> {
        let xpriv = seed
            .map(|seed| Xpriv::new_master(Network::Bitcoin, seed))
            .transpose()?;

        Ok(Self {
            mint_url,
            unit,
            client,
            xpriv,
        })
    }

    /// Whether this wallet derives outputs deterministically
    pub fn is_seeded(&self) -> bool {
        self.xpriv.is_some()
    }

    pub(crate) fn client(&self) -> &(dyn MintConnector + Send + Sync) {
        self.client.as_ref()
    }

    pub(crate) fn xpriv(&self) -> Option<Xpriv> {
        self.xpriv
    }
}
