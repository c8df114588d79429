//! Mint quote and issuance

use crate::amount::SplitTarget;
use crate::nuts::{MintBolt11Request, MintQuoteBolt11Request};
use crate::wallet::swap::proofs_dleq;
use crate::wallet::{IssueResult, Mint, MintQuote, Wallet};
use crate::{dhke, ensure, Amount, Error};
use tracing::instrument;

impl Wallet {
    /// Request a quote for minting `amount` against a Lightning deposit
    pub async fn mint_quote(
        &self,
        amount: Amount,
        description: Option<String>,
    ) -> Result<MintQuote, Error> {
        let request = MintQuoteBolt11Request {
            amount,
            unit: self.unit.clone(),
            description,
        };

        let response = self.client().post_mint_quote(request).await?;

        Ok(MintQuote {
            id: response.quote,
            request: response.request,
            amount,
            unit: self.unit.clone(),
            state: response.state,
            expiry: response.expiry,
        })
    }

    /// Refresh the state of a mint quote
    pub async fn mint_quote_state(&self, quote: &MintQuote) -> Result<MintQuote, Error> {
        let response = self.client().get_mint_quote_status(&quote.id).await?;

        let mut quote = quote.clone();
        quote.state = response.state;
        quote.expiry = response.expiry;

        Ok(quote)
    }

    /// Mint proofs against a paid quote
    ///
    /// The issued denominations follow `preferred_distribution` when given,
    /// which must sum to the quote amount, and the binary decomposition
    /// otherwise. `counter` is the caller's deterministic counter; the
    /// reported `counter_increase` is persisted by the caller only on
    /// success, and the mint's refusals (quote not paid, already issued,
    /// minting disabled) surface as typed errors before any slot is
    /// consumed.
    #[instrument(skip(self, mint, quote))]
    pub async fn mint(
        &self,
        mint: &Mint,
        quote: &MintQuote,
        preferred_distribution: Option<Vec<Amount>>,
        counter: u32,
    ) -> Result<IssueResult, Error> {
        ensure!(quote.amount > Amount::ZERO, Error::MissingRequestDetail);
        ensure!(quote.unit == self.unit, Error::UnitMismatch);

        let split_target = match preferred_distribution {
            Some(distribution) => {
                let total = Amount::try_sum(distribution.iter().copied())?;
                ensure!(
                    total == quote.amount,
                    Error::PreferredDistributionMismatch
                );
                SplitTarget::Values(distribution)
            }
            None => SplitTarget::default(),
        };

        let active_keyset = mint.active_keyset_for_unit(&self.unit)?;

        let (premint, counter_increase) =
            self.generate_outputs(active_keyset.id, counter, quote.amount, &split_target)?;

        let request = MintBolt11Request {
            quote: quote.id.clone(),
            outputs: premint.blinded_messages(),
        };

        let response = self.client().post_mint(request).await?;

        ensure!(
            response.signatures.len() == premint.len(),
            Error::PromiseCountMismatch
        );

        let proofs = dhke::construct_proofs(
            response.signatures,
            premint.rs(),
            premint.secrets(),
            &active_keyset.keys,
        )?;

        let dleq = proofs_dleq(&proofs, mint)?;

        Ok(IssueResult {
            proofs,
            dleq,
            counter_increase,
        })
    }
}
