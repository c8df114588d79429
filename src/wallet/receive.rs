//! Receive operation

use crate::nuts::nut00::Token;
use crate::nuts::{Kind, Proofs, SecretKey, SpendingConditions};
use crate::wallet::{LockClassification, Mint, ReceiveResult, Wallet};
use crate::{ensure, Error};
use tracing::instrument;

impl Wallet {
    /// Receive a token by swapping its proofs for fresh ones
    ///
    /// The token must come from a single mint. P2PK locked inputs are signed
    /// with `signing_key` when it opens the lock; a key that does not match,
    /// a missing key, or inputs that disagree about their conditions are
    /// rejected before anything is sent to the mint.
    #[instrument(skip(self, mint, token, signing_key))]
    pub async fn receive(
        &self,
        mint: &Mint,
        token: &Token,
        signing_key: Option<&SecretKey>,
        counter: u32,
    ) -> Result<ReceiveResult, Error> {
        let token_mint_url = token.mint_url()?;
        if token_mint_url != self.mint_url {
            tracing::warn!(
                "Token mint {} does not match wallet mint {}",
                token_mint_url,
                self.mint_url
            );
        }

        let mut proofs = token.proofs();
        ensure!(!proofs.is_empty(), Error::UnsupportedToken);

        if let Some(token_unit) = token.unit() {
            ensure!(token_unit == self.unit, Error::UnitMismatch);
        }

        match classify_inputs(&proofs, signing_key)? {
            LockClassification::NotLocked => {}
            LockClassification::Match => {
                let signing_key = signing_key.expect("match implies a key");
                for proof in proofs.iter_mut() {
                    proof.sign_p2pk(signing_key)?;
                }
            }
            LockClassification::Partial => return Err(Error::MixedSpendingConditions),
            LockClassification::Mismatch | LockClassification::NoKey => {
                return Err(Error::LockingConditionMismatch)
            }
        }

        let swap = self.swap(mint, proofs, None, None, counter).await?;

        Ok(ReceiveResult {
            proofs: swap.keep,
            input_dleq: swap.input_dleq,
            output_dleq: swap.output_dleq,
            counter_increase: swap.counter_increase,
        })
    }
}

/// Relate the inputs' spending conditions to the provided signing key
fn classify_inputs(
    proofs: &Proofs,
    signing_key: Option<&SecretKey>,
) -> Result<LockClassification, Error> {
    let conditions: Vec<Option<SpendingConditions>> = proofs
        .iter()
        .map(|proof| SpendingConditions::try_from(&proof.secret).ok())
        .collect();

    let locked_count = conditions.iter().filter(|c| c.is_some()).count();

    if locked_count == 0 {
        return Ok(LockClassification::NotLocked);
    }

    if locked_count != conditions.len() {
        return Ok(LockClassification::Partial);
    }

    let conditions: Vec<&SpendingConditions> =
        conditions.iter().map(|c| c.as_ref().expect("all locked")).collect();

    // Inputs disagreeing about their lock are refused wholesale rather than
    // partially processed
    if conditions.windows(2).any(|pair| pair[0] != pair[1]) {
        return Ok(LockClassification::Partial);
    }

    ensure!(
        conditions[0].kind() == Kind::P2PK,
        Error::UnsupportedSpendingCondition
    );

    let signing_key = match signing_key {
        Some(key) => key,
        None => return Ok(LockClassification::NoKey),
    };

    let signing_pubkey = signing_key.public_key();
    let authorized = conditions[0].pubkeys().unwrap_or_default();

    match authorized.contains(&signing_pubkey) {
        true => Ok(LockClassification::Match),
        false => Ok(LockClassification::Mismatch),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::nuts::{CurrencyUnit, DleqVerification, ProofsMethods};
    use crate::wallet::test_utils::test_wallet;
    use crate::Amount;

    #[tokio::test]
    async fn test_receive_plain_token() {
        let (wallet, fake, mint) = test_wallet(0, true);

        let token = Token::new(
            mint.url.clone(),
            fake.proofs(&[4, 8]),
            None,
            CurrencyUnit::Sat,
        );

        let result = wallet.receive(&mint, &token, None, 0).await.unwrap();

        assert_eq!(result.proofs.total_amount().unwrap(), Amount::from(12));
        assert_eq!(result.input_dleq, DleqVerification::Valid);
        assert_eq!(result.output_dleq, DleqVerification::Valid);
        assert_eq!(result.counter_increase, 2);
    }

    #[tokio::test]
    async fn test_receive_locked_token_with_key() {
        let (wallet, fake, mint) = test_wallet(0, true);

        let receiver_key = SecretKey::generate();

        // Sender locks 12 to the receiver key
        let send_result = wallet
            .send(
                &mint,
                fake.proofs(&[16]),
                Some(Amount::from(12)),
                None,
                Some(receiver_key.public_key()),
                0,
            )
            .await
            .unwrap();

        // Exercise the legacy json wire form
        let token = Token::from_str(&send_result.token.to_v3_string()).unwrap();

        let result = wallet
            .receive(&mint, &token, Some(&receiver_key), 10)
            .await
            .unwrap();

        assert_eq!(result.proofs.total_amount().unwrap(), Amount::from(12));

        // Each input carried a witness whose signature verifies against the
        // lock pubkey and the secret bytes
        let witness_signatures = fake.last_swap_input_witness_signatures();
        assert!(!witness_signatures.is_empty());
        for (proof, signatures) in token.proofs().iter().zip(witness_signatures) {
            assert_eq!(signatures.len(), 1);
            let signature =
                bitcoin::secp256k1::schnorr::Signature::from_str(&signatures[0]).unwrap();
            receiver_key
                .public_key()
                .verify(proof.secret.as_bytes(), &signature)
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_receive_locked_token_wrong_key() {
        let (wallet, fake, mint) = test_wallet(0, true);

        let receiver_key = SecretKey::generate();
        let wrong_key = SecretKey::generate();

        let send_result = wallet
            .send(
                &mint,
                fake.proofs(&[16]),
                Some(Amount::from(12)),
                None,
                Some(receiver_key.public_key()),
                0,
            )
            .await
            .unwrap();

        let err = wallet
            .receive(&mint, &send_result.token, Some(&wrong_key), 10)
            .await;
        assert!(matches!(err, Err(Error::LockingConditionMismatch)));

        // And with no key at all
        let err = wallet.receive(&mint, &send_result.token, None, 10).await;
        assert!(matches!(err, Err(Error::LockingConditionMismatch)));
    }

    #[tokio::test]
    async fn test_receive_mixed_conditions_rejected() {
        let (wallet, fake, mint) = test_wallet(0, true);

        let receiver_key = SecretKey::generate();

        let locked = wallet
            .send(
                &mint,
                fake.proofs(&[16]),
                Some(Amount::from(8)),
                None,
                Some(receiver_key.public_key()),
                0,
            )
            .await
            .unwrap();

        // A token mixing locked and unlocked proofs
        let mut proofs = locked.token.proofs();
        proofs.extend(fake.proofs(&[4]));
        let token = Token::new(mint.url.clone(), proofs, None, CurrencyUnit::Sat);

        let err = wallet
            .receive(&mint, &token, Some(&receiver_key), 10)
            .await;
        assert!(matches!(err, Err(Error::MixedSpendingConditions)));
    }

    #[tokio::test]
    async fn test_receive_foreign_unit_rejected() {
        let (wallet, fake, mint) = test_wallet(0, true);

        let token = Token::new(
            mint.url.clone(),
            fake.proofs(&[4]),
            None,
            CurrencyUnit::Usd,
        );

        let err = wallet.receive(&mint, &token, None, 0).await;
        assert!(matches!(err, Err(Error::UnitMismatch)));
    }
}
