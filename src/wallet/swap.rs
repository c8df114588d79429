//! Swap operation

use crate::amount::SplitTarget;
use crate::nuts::nut12::{self, DleqVerification};
use crate::nuts::{Proofs, ProofsMethods, SpendingConditions, SwapRequest};
use crate::wallet::keysets::{calculate_fee, proofs_unit};
use crate::wallet::types::split_for_send;
use crate::wallet::{Mint, SwapResult, Wallet};
use crate::{dhke, ensure, Amount, Error};
use tracing::instrument;

impl Wallet {
    /// Swap proofs for fresh ones
    ///
    /// With a `send_amount` the fresh proofs are partitioned into keep and
    /// send; `spending_conditions` lock the send partition. Output
    /// construction order equals promise order equals proof order: keep
    /// outputs first, send outputs after, never re-sorted.
    ///
    /// `counter` is the caller's deterministic counter for the active
    /// keyset; the reported `counter_increase` must be persisted by the
    /// caller only when the swap returns successfully.
    #[instrument(skip(self, mint, input_proofs))]
    pub async fn swap(
        &self,
        mint: &Mint,
        input_proofs: Proofs,
        send_amount: Option<Amount>,
        spending_conditions: Option<SpendingConditions>,
        counter: u32,
    ) -> Result<SwapResult, Error> {
        let unit = proofs_unit(&input_proofs, mint)?;
        ensure!(unit == self.unit, Error::UnitMismatch);

        let active_keyset = mint.active_keyset_for_unit(&unit)?;

        let inputs_total = input_proofs.total_amount()?;
        let fee = calculate_fee(&input_proofs, mint)?;

        let (keep_amount, send_amount) = match send_amount {
            Some(amount) => split_for_send(inputs_total, Some(amount), fee)?,
            None => (
                inputs_total
                    .checked_sub(fee)
                    .ok_or(Error::InsufficientInputs {
                        needed: fee,
                        available: inputs_total,
                    })?,
                Amount::ZERO,
            ),
        };

        // Keep outputs consume deterministic slots first, send outputs
        // continue after them unless a lock makes them unrestorable.
        let (keep_premint, keep_consumed) = self.generate_outputs(
            active_keyset.id,
            counter,
            keep_amount,
            &SplitTarget::default(),
        )?;

        let (send_premint, send_consumed) = match (&spending_conditions, send_amount) {
            (_, amount) if amount == Amount::ZERO => {
                (crate::nuts::PreMintSecrets::new(active_keyset.id), 0)
            }
            (Some(conditions), amount) => (
                crate::nuts::PreMintSecrets::with_conditions(
                    active_keyset.id,
                    amount,
                    &SplitTarget::default(),
                    conditions,
                )?,
                0,
            ),
            (None, amount) => self.generate_outputs(
                active_keyset.id,
                counter + keep_consumed,
                amount,
                &SplitTarget::default(),
            )?,
        };

        let boundary = keep_premint.len();

        let mut premint = keep_premint;
        premint.combine(send_premint);

        // The mint has no use for input DLEQ data
        let swap_request =
            SwapRequest::new(input_proofs.without_dleqs(), premint.blinded_messages());

        let swap_response = self.client().post_swap(swap_request).await?;

        ensure!(
            swap_response.signatures.len() == premint.len(),
            Error::PromiseCountMismatch
        );

        let post_swap_proofs = dhke::construct_proofs(
            swap_response.signatures,
            premint.rs(),
            premint.secrets(),
            &active_keyset.keys,
        )?;

        let mut keep = post_swap_proofs;
        let send = keep.split_off(boundary);

        let input_dleq = proofs_dleq(&input_proofs, mint)?;
        let output_dleq = match send.is_empty() {
            true => proofs_dleq(&keep, mint)?,
            false => {
                let keep_dleq = proofs_dleq(&keep, mint)?;
                let send_dleq = proofs_dleq(&send, mint)?;
                combine_dleq(keep_dleq, send_dleq)
            }
        };

        Ok(SwapResult {
            keep,
            send,
            input_dleq,
            output_dleq,
            counter_increase: keep_consumed + send_consumed,
        })
    }
}

/// Verify DLEQ for proofs that may span keysets of one mint
pub(crate) fn proofs_dleq(proofs: &Proofs, mint: &Mint) -> Result<DleqVerification, Error> {
    let mut missing = false;

    for proof in proofs {
        let keyset = mint.keyset(&proof.keyset_id).ok_or(Error::UnknownKeySet)?;
        let mint_pubkey = keyset
            .keys
            .amount_key(proof.amount)
            .ok_or(Error::Nut12(nut12::Error::AmountKey))?;

        match proof.verify_dleq(mint_pubkey) {
            Ok(()) => {}
            Err(nut12::Error::MissingDleqProof) => missing = true,
            Err(nut12::Error::InvalidDleqProof) => return Ok(DleqVerification::Invalid),
            Err(err) => return Err(err.into()),
        }
    }

    if proofs.is_empty() || missing {
        tracing::debug!("Proofs without DLEQ data, skipping offline validation");
        return Ok(DleqVerification::NoData);
    }

    Ok(DleqVerification::Valid)
}

fn combine_dleq(a: DleqVerification, b: DleqVerification) -> DleqVerification {
    match (a, b) {
        (DleqVerification::Invalid, _) | (_, DleqVerification::Invalid) => {
            DleqVerification::Invalid
        }
        (DleqVerification::NoData, _) | (_, DleqVerification::NoData) => DleqVerification::NoData,
        _ => DleqVerification::Valid,
    }
}
