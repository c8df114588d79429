//! Scripted fake mint for wallet operation tests

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::dhke::{blind_message, construct_proofs, sign_message};
use crate::error::{ErrorCode, ErrorResponse};
use crate::mint_url::MintUrl;
use crate::nuts::{
    BlindSignature, BlindedMessage, CurrencyUnit, Id, KeySet, Keys, KeysetResponse,
    MeltBolt11Request, MeltQuoteBolt11Request, MeltQuoteBolt11Response, MeltQuoteState,
    MintBolt11Request, MintBolt11Response, MintInfo, MintQuoteBolt11Request,
    MintQuoteBolt11Response, MintQuoteState, Proofs, SecretKey, SwapRequest, SwapResponse,
};
use crate::secret::Secret;
use crate::wallet::{Keyset, Mint, MintConnector, Wallet};
use crate::{Amount, Error};

/// What the fake mint should do on the next request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FakeMintBehaviour {
    Normal,
    SwapAlreadySpent,
    MintQuoteNotPaid,
    MintAlreadyIssued,
    MintingDisabled,
    MeltPending,
}

/// An in-process mint that really signs
#[derive(Debug)]
pub(crate) struct FakeMint {
    keyset_id: Id,
    secret_keys: BTreeMap<Amount, SecretKey>,
    keys: Keys,
    input_fee_ppk: u64,
    behaviour: Mutex<FakeMintBehaviour>,
    swap_requests: Mutex<Vec<SwapRequest>>,
    mint_requests: Mutex<Vec<MintBolt11Request>>,
    melt_requests: Mutex<Vec<MeltBolt11Request>>,
    /// Amounts the mint hands back as melt change
    melt_change: Mutex<Vec<u64>>,
    melt_amount: Mutex<u64>,
    melt_fee_reserve: Mutex<u64>,
}

impl FakeMint {
    pub fn new(input_fee_ppk: u64) -> Self {
        let mut secret_keys = BTreeMap::new();
        let mut pubkeys = BTreeMap::new();

        for bit in 0..10u64 {
            let amount = Amount::from(1 << bit);
            let secret_key = SecretKey::generate();
            pubkeys.insert(amount, secret_key.public_key());
            secret_keys.insert(amount, secret_key);
        }

        let keys = Keys::new(pubkeys);
        let keyset_id = Id::v1_from_keys(&keys);

        Self {
            keyset_id,
            secret_keys,
            keys,
            input_fee_ppk,
            behaviour: Mutex::new(FakeMintBehaviour::Normal),
            swap_requests: Mutex::new(Vec::new()),
            mint_requests: Mutex::new(Vec::new()),
            melt_requests: Mutex::new(Vec::new()),
            melt_change: Mutex::new(Vec::new()),
            melt_amount: Mutex::new(100),
            melt_fee_reserve: Mutex::new(5),
        }
    }

    pub fn url() -> MintUrl {
        MintUrl::from_str("https://mint.example.com").unwrap()
    }

    pub fn keyset_id(&self) -> Id {
        self.keyset_id
    }

    pub fn set_behaviour(&self, behaviour: FakeMintBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    pub fn set_melt_terms(&self, amount: u64, fee_reserve: u64) {
        *self.melt_amount.lock().unwrap() = amount;
        *self.melt_fee_reserve.lock().unwrap() = fee_reserve;
    }

    pub fn set_melt_change(&self, amounts: &[u64]) {
        *self.melt_change.lock().unwrap() = amounts.to_vec();
    }

    /// Wallet side snapshot of this mint
    pub fn snapshot(&self) -> Mint {
        Mint {
            url: Self::url(),
            keysets: vec![Keyset {
                id: self.keyset_id,
                unit: CurrencyUnit::Sat,
                active: true,
                input_fee_ppk: self.input_fee_ppk,
                final_expiry: None,
                keys: self.keys.clone(),
            }],
            info: None,
        }
    }

    /// Fabricate spendable proofs with valid signatures and DLEQ data
    pub fn proofs(&self, amounts: &[u64]) -> Proofs {
        let mut promises = Vec::new();
        let mut rs = Vec::new();
        let mut secrets = Vec::new();

        for amount in amounts {
            let amount = Amount::from(*amount);
            let secret = Secret::generate();
            let (blinded, r) = blind_message(&secret.to_bytes(), None).unwrap();

            promises.push(self.sign_one(&BlindedMessage::new(amount, self.keyset_id, blinded)));
            rs.push(r);
            secrets.push(secret);
        }

        construct_proofs(promises, rs, secrets, &self.keys).unwrap()
    }

    fn sign_one(&self, output: &BlindedMessage) -> BlindSignature {
        let secret_key = self
            .secret_keys
            .get(&output.amount)
            .expect("keyset covers amount");

        let c = sign_message(secret_key, &output.blinded_secret).unwrap();

        let mut signature = BlindSignature {
            amount: output.amount,
            keyset_id: output.keyset_id,
            c,
            dleq: None,
        };
        signature
            .add_dleq_proof(&output.blinded_secret, secret_key)
            .unwrap();

        signature
    }

    fn sign(&self, outputs: &[BlindedMessage]) -> Vec<BlindSignature> {
        outputs.iter().map(|output| self.sign_one(output)).collect()
    }

    pub fn swap_count(&self) -> usize {
        self.swap_requests.lock().unwrap().len()
    }

    pub fn last_swap_output_amounts(&self) -> Vec<u64> {
        self.swap_requests
            .lock()
            .unwrap()
            .last()
            .map(|req| req.outputs.iter().map(|o| u64::from(o.amount)).collect())
            .unwrap_or_default()
    }

    pub fn last_swap_inputs_had_dleq(&self) -> Option<bool> {
        self.swap_requests
            .lock()
            .unwrap()
            .last()
            .map(|req| req.inputs.iter().any(|p| p.dleq.is_some()))
    }

    pub fn last_swap_input_witness_signatures(&self) -> Vec<Vec<String>> {
        self.swap_requests
            .lock()
            .unwrap()
            .last()
            .map(|req| {
                req.inputs
                    .iter()
                    .map(|p| {
                        p.witness
                            .as_ref()
                            .and_then(|w| w.signatures())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn last_melt_inputs_had_dleq(&self) -> Option<bool> {
        self.melt_requests
            .lock()
            .unwrap()
            .last()
            .map(|req| req.inputs.iter().any(|p| p.dleq.is_some()))
    }

    pub fn last_melt_output_count(&self) -> Option<usize> {
        self.melt_requests
            .lock()
            .unwrap()
            .last()
            .map(|req| req.outputs.as_ref().map(|o| o.len()).unwrap_or_default())
    }

    fn melt_response(&self, outputs: Option<&[BlindedMessage]>) -> MeltQuoteBolt11Response {
        let pending = *self.behaviour.lock().unwrap() == FakeMintBehaviour::MeltPending;
        let change_amounts = self.melt_change.lock().unwrap().clone();

        let change = match (pending, outputs) {
            (false, Some(outputs)) if !change_amounts.is_empty() => {
                let promises = change_amounts
                    .iter()
                    .zip(outputs.iter())
                    .map(|(amount, output)| {
                        // Change promises re-use the blank outputs with the
                        // mint chosen amounts
                        let mut output = output.clone();
                        output.amount = Amount::from(*amount);
                        self.sign_one(&output)
                    })
                    .collect();
                Some(promises)
            }
            _ => None,
        };

        MeltQuoteBolt11Response {
            quote: "melt-quote-1".to_string(),
            amount: Amount::from(*self.melt_amount.lock().unwrap()),
            fee_reserve: Amount::from(*self.melt_fee_reserve.lock().unwrap()),
            state: match pending {
                true => MeltQuoteState::Pending,
                false => MeltQuoteState::Paid,
            },
            expiry: Some(1_900_000_000),
            payment_preimage: match pending {
                true => None,
                false => Some("00".repeat(32)),
            },
            change,
        }
    }
}

#[async_trait]
impl MintConnector for FakeMint {
    async fn get_mint_keysets(&self) -> Result<KeysetResponse, Error> {
        Ok(KeysetResponse {
            keysets: vec![crate::nuts::KeySetInfo {
                id: self.keyset_id,
                unit: CurrencyUnit::Sat,
                active: true,
                input_fee_ppk: self.input_fee_ppk,
                final_expiry: None,
            }],
        })
    }

    async fn get_mint_keyset(&self, keyset_id: Id) -> Result<KeySet, Error> {
        if keyset_id != self.keyset_id {
            return Err(Error::UnknownKeySet);
        }
        Ok(KeySet {
            id: self.keyset_id,
            unit: CurrencyUnit::Sat,
            keys: self.keys.clone(),
            final_expiry: None,
        })
    }

    async fn get_mint_info(&self) -> Result<MintInfo, Error> {
        Ok(MintInfo::default())
    }

    async fn post_mint_quote(
        &self,
        request: MintQuoteBolt11Request,
    ) -> Result<MintQuoteBolt11Response, Error> {
        let _ = request;
        Ok(MintQuoteBolt11Response {
            quote: "mint-quote-1".to_string(),
            request: "lnbc10n1fake".to_string(),
            state: MintQuoteState::Unpaid,
            expiry: Some(1_900_000_000),
        })
    }

    async fn get_mint_quote_status(
        &self,
        quote_id: &str,
    ) -> Result<MintQuoteBolt11Response, Error> {
        Ok(MintQuoteBolt11Response {
            quote: quote_id.to_string(),
            request: "lnbc10n1fake".to_string(),
            state: MintQuoteState::Paid,
            expiry: Some(1_900_000_000),
        })
    }

    async fn post_mint(&self, request: MintBolt11Request) -> Result<MintBolt11Response, Error> {
        match *self.behaviour.lock().unwrap() {
            FakeMintBehaviour::MintQuoteNotPaid => {
                return Err(ErrorResponse::new(
                    ErrorCode::QuoteNotPaid,
                    "quote not paid".to_string(),
                )
                .into())
            }
            FakeMintBehaviour::MintAlreadyIssued => {
                return Err(ErrorResponse::new(
                    ErrorCode::TokensAlreadyIssued,
                    "already issued".to_string(),
                )
                .into())
            }
            FakeMintBehaviour::MintingDisabled => {
                return Err(ErrorResponse::new(
                    ErrorCode::MintingDisabled,
                    "minting disabled".to_string(),
                )
                .into())
            }
            _ => {}
        }

        let signatures = self.sign(&request.outputs);
        self.mint_requests.lock().unwrap().push(request);

        Ok(MintBolt11Response { signatures })
    }

    async fn post_swap(&self, request: SwapRequest) -> Result<SwapResponse, Error> {
        if *self.behaviour.lock().unwrap() == FakeMintBehaviour::SwapAlreadySpent {
            return Err(ErrorResponse::new(
                ErrorCode::TokenAlreadySpent,
                "Token already spent".to_string(),
            )
            .into());
        }

        // Enforce the balance law: inputs == outputs + fee
        let input_total = request.input_amount()?;
        let output_total = request.output_amount()?;
        let fee_ppk = self.input_fee_ppk * request.inputs.len() as u64;
        let fee = Amount::from(fee_ppk.div_ceil(1000));

        if input_total != output_total.checked_add(fee).unwrap() {
            return Err(ErrorResponse::new(
                ErrorCode::TransactionUnbalanced,
                "Transaction unbalanced".to_string(),
            )
            .into());
        }

        let signatures = self.sign(&request.outputs);
        self.swap_requests.lock().unwrap().push(request);

        Ok(SwapResponse { signatures })
    }

    async fn post_melt_quote(
        &self,
        request: MeltQuoteBolt11Request,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        let _ = request;
        Ok(self.melt_response(None))
    }

    async fn get_melt_quote_status(
        &self,
        _quote_id: &str,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        Ok(self.melt_response(None))
    }

    async fn post_melt(
        &self,
        request: MeltBolt11Request,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        let response = self.melt_response(request.outputs.as_deref());
        self.melt_requests.lock().unwrap().push(request);
        Ok(response)
    }
}

/// Deterministic seed for reproducible tests
pub(crate) fn test_seed() -> [u8; 64] {
    let mut seed = [0u8; 64];
    seed[63] = 1;
    seed
}

/// A wallet wired to a [`FakeMint`], plus the mint snapshot
pub(crate) fn test_wallet(input_fee_ppk: u64, seeded: bool) -> (Wallet, Arc<FakeMint>, Mint) {
    let fake = Arc::new(FakeMint::new(input_fee_ppk));
    let snapshot = fake.snapshot();

    let seed = test_seed();
    let wallet = Wallet::with_connector(
        FakeMint::url(),
        CurrencyUnit::Sat,
        fake.clone(),
        seeded.then_some(&seed[..]),
    )
    .unwrap();

    (wallet, fake, snapshot)
}
