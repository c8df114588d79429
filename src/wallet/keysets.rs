//! Keyset loading, selection and fees

use crate::amount::SplitTarget;
use crate::nuts::nut02::KeySet;
use crate::nuts::{CurrencyUnit, Id, PreMintSecrets, Proofs};
use crate::wallet::{Keyset, Mint, Wallet};
use crate::{ensure, Amount, Error};
use tracing::instrument;

impl Wallet {
    /// Fetch the mint's keysets, keys and info into a [`Mint`] snapshot
    ///
    /// Every keyset id is recomputed from the fetched key material; a
    /// mismatch means the mint is lying about its keys and fails the load.
    #[instrument(skip(self))]
    pub async fn load_mint(&self) -> Result<Mint, Error> {
        let info = match self.client().get_mint_info().await {
            Ok(info) => Some(info),
            Err(err) => {
                tracing::warn!("Could not fetch mint info: {}", err);
                None
            }
        };

        let keysets_response = self.client().get_mint_keysets().await?;

        let mut keysets = Vec::with_capacity(keysets_response.keysets.len());
        for keyset_info in keysets_response.keysets {
            let keys_response = self.client().get_mint_keyset(keyset_info.id).await?;

            let keyset = KeySet {
                id: keyset_info.id,
                unit: keyset_info.unit.clone(),
                keys: keys_response.keys,
                final_expiry: keyset_info.final_expiry.or(keys_response.final_expiry),
            };
            keyset.verify_id()?;

            keysets.push(Keyset {
                id: keyset_info.id,
                unit: keyset_info.unit,
                active: keyset_info.active,
                input_fee_ppk: keyset_info.input_fee_ppk,
                final_expiry: keyset.final_expiry,
                keys: keyset.keys,
            });
        }

        Ok(Mint {
            url: self.mint_url.clone(),
            keysets,
            info,
        })
    }

    /// Generate outputs for `amount`, deterministic when the wallet is seeded
    ///
    /// Returns the pre mint secrets together with the number of counter
    /// slots they consumed.
    pub(crate) fn generate_outputs(
        &self,
        keyset_id: Id,
        counter: u32,
        amount: Amount,
        target: &SplitTarget,
    ) -> Result<(PreMintSecrets, u32), Error> {
        let premint = match self.xpriv() {
            Some(xpriv) => {
                PreMintSecrets::from_xpriv(keyset_id, counter, xpriv, amount, target)?
            }
            None => PreMintSecrets::random(keyset_id, amount, target)?,
        };

        let consumed = match self.is_seeded() {
            true => premint.len() as u32,
            false => 0,
        };

        Ok((premint, consumed))
    }
}

/// Fee to spend `proofs`, in the input unit
///
/// `ceil(sum(input_fee_ppk of each input's keyset) / 1000)`
pub fn calculate_fee(proofs: &Proofs, mint: &Mint) -> Result<Amount, Error> {
    let mut sum_fee_ppk: u64 = 0;

    for proof in proofs {
        let keyset = mint.keyset(&proof.keyset_id).ok_or(Error::UnknownKeySet)?;
        sum_fee_ppk = sum_fee_ppk
            .checked_add(keyset.input_fee_ppk)
            .ok_or(Error::Amount(crate::amount::Error::AmountOverflow))?;
    }

    Ok(Amount::from(sum_fee_ppk.div_ceil(1000)))
}

/// Check all proofs belong to known keysets of one unit and return it
pub fn proofs_unit(proofs: &Proofs, mint: &Mint) -> Result<CurrencyUnit, Error> {
    let mut unit: Option<CurrencyUnit> = None;

    for proof in proofs {
        let keyset = mint.keyset(&proof.keyset_id).ok_or(Error::UnknownKeySet)?;
        match &unit {
            Some(unit) => ensure!(unit == &keyset.unit, Error::UnitMismatch),
            None => unit = Some(keyset.unit.clone()),
        }
    }

    unit.ok_or(Error::UnitMismatch)
}

/// Select proofs for a target amount, smallest first
///
/// Returns the selected proofs; fails when the pool cannot cover the amount.
pub fn select_proofs(amount: Amount, proofs: Proofs) -> Result<Proofs, Error> {
    let mut sorted = proofs;
    sorted.sort();

    let mut selected = Vec::new();
    let mut selected_total = Amount::ZERO;

    for proof in sorted {
        if selected_total >= amount {
            break;
        }
        selected_total = selected_total
            .checked_add(proof.amount)
            .ok_or(Error::Amount(crate::amount::Error::AmountOverflow))?;
        selected.push(proof);
    }

    ensure!(
        selected_total >= amount,
        Error::InsufficientInputs {
            needed: amount,
            available: selected_total,
        }
    );

    Ok(selected)
}
