//! Send operation

use crate::nuts::nut00::Token;
use crate::nuts::{Proofs, ProofsMethods, PublicKey, SpendingConditions};
use crate::wallet::keysets::{calculate_fee, proofs_unit};
use crate::wallet::{Mint, SendResult, Wallet};
use crate::{ensure, Amount, DleqVerification, Error};
use tracing::instrument;

impl Wallet {
    /// Prepare a token for a payee out of the given proofs
    ///
    /// Without an `amount` the whole input value is sent. When the inputs
    /// already match the target and no lock was requested the token wraps
    /// them directly with no mint round trip; otherwise the inputs are
    /// swapped into an exact send partition, P2PK locked to `lock` when
    /// given, and the keep partition is returned as change.
    #[instrument(skip(self, mint, proofs))]
    pub async fn send(
        &self,
        mint: &Mint,
        proofs: Proofs,
        amount: Option<Amount>,
        memo: Option<String>,
        lock: Option<PublicKey>,
        counter: u32,
    ) -> Result<SendResult, Error> {
        // Forwarding someone else's locked proofs is not supported
        ensure!(
            !proofs.iter().any(|p| p.secret.is_spending_condition()),
            Error::SpendingConditionsOnInputs
        );

        let unit = proofs_unit(&proofs, mint)?;
        ensure!(unit == self.unit, Error::UnitMismatch);

        let inputs_total = proofs.total_amount()?;
        let fee = calculate_fee(&proofs, mint)?;

        // Inputs that already match the target pass through untouched
        if amount.unwrap_or(inputs_total) == inputs_total && lock.is_none() {
            let token = Token::new(mint.url.clone(), proofs, memo, unit);

            return Ok(SendResult {
                token,
                change: Proofs::new(),
                output_dleq: DleqVerification::Valid,
                counter_increase: 0,
            });
        }

        let send_amount = match amount {
            Some(amount) => amount,
            None => inputs_total
                .checked_sub(fee)
                .ok_or(Error::InsufficientInputs {
                    needed: fee,
                    available: inputs_total,
                })?,
        };

        let conditions = lock.map(|pubkey| SpendingConditions::new_p2pk(pubkey, None));

        let swap = self
            .swap(mint, proofs, Some(send_amount), conditions, counter)
            .await?;

        let token = Token::new(mint.url.clone(), swap.send, memo, unit);

        Ok(SendResult {
            token,
            change: swap.keep,
            output_dleq: swap.output_dleq,
            counter_increase: swap.counter_increase,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::nuts::{Kind, Nut10Secret, SecretKey};
    use crate::wallet::test_utils::test_wallet;

    #[tokio::test]
    async fn test_send_exact_amount_short_circuits() {
        let (wallet, fake, mint) = test_wallet(0, true);

        let proofs = fake.proofs(&[4, 8]);

        let result = wallet
            .send(&mint, proofs, Some(Amount::from(12)), None, None, 0)
            .await
            .unwrap();

        assert_eq!(result.token.value().unwrap(), Amount::from(12));
        assert!(result.change.is_empty());
        assert_eq!(result.output_dleq, DleqVerification::Valid);
        assert_eq!(result.counter_increase, 0);

        // No mint round trip happened
        assert_eq!(fake.swap_count(), 0);

        // The token string decodes back to the same proofs
        let encoded = result.token.to_string();
        let decoded = Token::from_str(&encoded).unwrap();
        assert_eq!(decoded.value().unwrap(), Amount::from(12));
    }

    #[tokio::test]
    async fn test_send_with_change() {
        let (wallet, fake, mint) = test_wallet(0, true);

        let proofs = fake.proofs(&[128]);

        let result = wallet
            .send(&mint, proofs, Some(Amount::from(100)), None, None, 0)
            .await
            .unwrap();

        assert_eq!(result.token.value().unwrap(), Amount::from(100));
        assert_eq!(
            Amount::try_sum(result.change.iter().map(|p| p.amount)).unwrap(),
            Amount::from(28)
        );
        assert_eq!(result.counter_increase, 6);
        assert_eq!(fake.swap_count(), 1);
    }

    #[tokio::test]
    async fn test_send_locked() {
        let (wallet, fake, mint) = test_wallet(0, true);

        let receiver_key = SecretKey::generate();

        let proofs = fake.proofs(&[128]);

        let result = wallet
            .send(
                &mint,
                proofs,
                Some(Amount::from(100)),
                None,
                Some(receiver_key.public_key()),
                0,
            )
            .await
            .unwrap();

        // Every sent proof is locked to the receiver key
        for proof in result.token.proofs() {
            let secret: Nut10Secret = proof.secret.clone().try_into().unwrap();
            assert_eq!(secret.kind, Kind::P2PK);
            assert_eq!(secret.secret_data.data, receiver_key.public_key().to_hex());
        }

        // Locked outputs do not consume deterministic slots, only the three
        // change outputs for 28 do
        assert_eq!(result.counter_increase, 3);
    }

    #[tokio::test]
    async fn test_send_rejects_locked_inputs() {
        let (wallet, fake, mint) = test_wallet(0, true);

        let mut proofs = fake.proofs(&[8]);
        let conditioned: crate::secret::Secret = Nut10Secret::new(
            Kind::P2PK,
            SecretKey::generate().public_key().to_hex(),
            None::<Vec<Vec<String>>>,
        )
        .try_into()
        .unwrap();
        proofs[0].secret = conditioned;

        let err = wallet.send(&mint, proofs, None, None, None, 0).await;
        assert!(matches!(err, Err(Error::SpendingConditionsOnInputs)));
    }

    #[tokio::test]
    async fn test_send_memo_carried_in_token() {
        let (wallet, fake, mint) = test_wallet(0, true);

        let proofs = fake.proofs(&[4]);

        let result = wallet
            .send(
                &mint,
                proofs,
                None,
                Some("thanks for lunch".to_string()),
                None,
                0,
            )
            .await
            .unwrap();

        assert_eq!(result.token.memo().as_deref(), Some("thanks for lunch"));
    }
}
