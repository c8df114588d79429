//! Melt quote, melt and melt state polling

use lightning_invoice::Bolt11Invoice;

use crate::nuts::{
    MeltBolt11Request, MeltQuoteBolt11Request, MeltQuoteBolt11Response, MeltQuoteState,
    PreMintSecrets, Proofs, ProofsMethods,
};
use crate::wallet::keysets::{calculate_fee, proofs_unit};
use crate::wallet::swap::proofs_dleq;
use crate::wallet::{MeltQuote, MeltResult, Mint, Wallet};
use crate::{dhke, ensure, DleqVerification, Error};
use tracing::instrument;

impl Wallet {
    /// Request a quote for paying a bolt11 invoice from proofs
    pub async fn melt_quote(&self, request: Bolt11Invoice) -> Result<MeltQuote, Error> {
        let quote_request = MeltQuoteBolt11Request {
            request,
            unit: self.unit.clone(),
        };

        let response = self.client().post_melt_quote(quote_request).await?;

        Ok(MeltQuote {
            id: response.quote,
            amount: response.amount,
            fee_reserve: response.fee_reserve,
            unit: self.unit.clone(),
            state: response.state,
            expiry: response.expiry,
        })
    }

    /// Melt proofs to settle a quote's Lightning payment
    ///
    /// `blank_outputs` are pre-built zero amount outputs
    /// ([`PreMintSecrets::blank`] or the deterministic
    /// [`PreMintSecrets::from_xpriv_blank`]) the mint may use to return an
    /// overpaid fee reserve; the caller keeps them for
    /// [`melt_state`](Wallet::melt_state) polling while the payment is
    /// pending. A failure to unblind returned change is only warned about,
    /// the payment itself already succeeded.
    #[instrument(skip(self, mint, quote, proofs, blank_outputs))]
    pub async fn melt(
        &self,
        mint: &Mint,
        quote: &MeltQuote,
        proofs: Proofs,
        blank_outputs: Option<&PreMintSecrets>,
    ) -> Result<MeltResult, Error> {
        ensure!(quote.unit == self.unit, Error::UnitMismatch);

        let unit = proofs_unit(&proofs, mint)?;
        ensure!(unit == self.unit, Error::UnitMismatch);

        let inputs_total = proofs.total_amount()?;
        let fee = calculate_fee(&proofs, mint)?;

        let needed = quote
            .amount
            .checked_add(quote.fee_reserve)
            .and_then(|n| n.checked_add(fee))
            .ok_or(Error::Amount(crate::amount::Error::AmountOverflow))?;

        ensure!(
            inputs_total >= needed,
            Error::InsufficientInputs {
                needed,
                available: inputs_total,
            }
        );

        let request = MeltBolt11Request {
            quote: quote.id.clone(),
            inputs: proofs.without_dleqs(),
            outputs: blank_outputs.map(|outputs| outputs.blinded_messages()),
        };

        let response = self.client().post_melt(request).await?;

        Ok(process_melt_response(mint, response, blank_outputs))
    }

    /// Poll the state of a melt quote
    ///
    /// Same post conditions as [`melt`](Wallet::melt): pass the blank
    /// outputs supplied there to recover change once the quote resolves to
    /// paid.
    #[instrument(skip(self, mint, blank_outputs))]
    pub async fn melt_state(
        &self,
        mint: &Mint,
        quote_id: &str,
        blank_outputs: Option<&PreMintSecrets>,
    ) -> Result<MeltResult, Error> {
        let response = self.client().get_melt_quote_status(quote_id).await?;

        Ok(process_melt_response(mint, response, blank_outputs))
    }
}

fn process_melt_response(
    mint: &Mint,
    response: MeltQuoteBolt11Response,
    blank_outputs: Option<&PreMintSecrets>,
) -> MeltResult {
    let (change, change_dleq) = match (response.change, blank_outputs) {
        (Some(promises), Some(blanks)) => match unblind_change(mint, promises, blanks) {
            Ok(change) => {
                let dleq = proofs_dleq(&change, mint).unwrap_or(DleqVerification::NoData);
                (Some(change), dleq)
            }
            Err(err) => {
                // The payment went through; losing the fee change is not
                // worth failing the operation over
                tracing::warn!("Could not unblind melt change: {}", err);
                (None, DleqVerification::NoData)
            }
        },
        (Some(_), None) => {
            tracing::warn!("Mint returned change but no blank outputs were supplied");
            (None, DleqVerification::NoData)
        }
        (None, _) => (None, DleqVerification::NoData),
    };

    if response.state == MeltQuoteState::Unknown {
        tracing::warn!("Melt quote {} is in an unknown state", response.quote);
    }

    MeltResult {
        state: response.state,
        preimage: response.payment_preimage,
        change,
        change_dleq,
    }
}

/// Unblind the prefix of blank outputs the change promises correspond to
fn unblind_change(
    mint: &Mint,
    promises: Vec<crate::nuts::BlindSignature>,
    blanks: &PreMintSecrets,
) -> Result<Proofs, Error> {
    ensure!(promises.len() <= blanks.len(), Error::PromiseCountMismatch);

    let keyset = mint
        .keyset(&blanks.keyset_id)
        .ok_or(Error::UnknownKeySet)?;

    let count = promises.len();
    let rs = blanks.rs().into_iter().take(count).collect();
    let secrets = blanks.secrets().into_iter().take(count).collect();

    Ok(dhke::construct_proofs(
        promises,
        rs,
        secrets,
        &keyset.keys,
    )?)
}
