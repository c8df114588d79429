//! Cashu Token
//!
//! <https://github.com/cashubtc/nuts/blob/main/00.md>

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bitcoin::base64::engine::{general_purpose, GeneralPurpose};
use bitcoin::base64::{alphabet, Engine as _};
use serde::{Deserialize, Serialize};

use super::{Error, Proof, Proofs, ProofsMethods, Witness};
use crate::ensure;
use crate::mint_url::MintUrl;
use crate::nuts::{CurrencyUnit, Id, ProofDleq};
use crate::secret::Secret;
use crate::Amount;

/// Token Enum
///
/// Decoders accept both serializations; encoders emit one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    /// Token V3, `cashuA` json
    TokenV3(TokenV3),
    /// Token V4, `cashuB` cbor
    TokenV4(TokenV4),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::TokenV3(token) => token.to_string(),
            Self::TokenV4(token) => token.to_string(),
        };

        write!(f, "{token}")
    }
}

impl Token {
    /// Create new [`Token`] in the v4 serialization
    pub fn new(
        mint_url: MintUrl,
        proofs: Proofs,
        memo: Option<String>,
        unit: CurrencyUnit,
    ) -> Self {
        let proofs = proofs
            .into_iter()
            .fold(HashMap::new(), |mut acc, val| {
                acc.entry(val.keyset_id)
                    .and_modify(|p: &mut Vec<Proof>| p.push(val.clone()))
                    .or_insert(vec![val]);
                acc
            })
            .into_iter()
            .map(|(id, proofs)| TokenV4Token::new(id, proofs))
            .collect();

        Token::TokenV4(TokenV4 {
            mint_url,
            unit,
            memo,
            token: proofs,
        })
    }

    /// Proofs in [`Token`]
    pub fn proofs(&self) -> Proofs {
        match self {
            Self::TokenV3(token) => token.proofs(),
            Self::TokenV4(token) => token.proofs(),
        }
    }

    /// Total value of [`Token`]
    pub fn value(&self) -> Result<Amount, Error> {
        match self {
            Self::TokenV3(token) => token.value(),
            Self::TokenV4(token) => token.value(),
        }
    }

    /// [`Token`] memo
    pub fn memo(&self) -> &Option<String> {
        match self {
            Self::TokenV3(token) => token.memo(),
            Self::TokenV4(token) => token.memo(),
        }
    }

    /// Unit
    pub fn unit(&self) -> Option<CurrencyUnit> {
        match self {
            Self::TokenV3(token) => token.unit().clone(),
            Self::TokenV4(token) => Some(token.unit().clone()),
        }
    }

    /// Mint url
    ///
    /// Errors when a v3 token carries proofs from more than one mint.
    pub fn mint_url(&self) -> Result<MintUrl, Error> {
        match self {
            Self::TokenV3(token) => {
                let mint_urls = token.mint_urls();

                ensure!(mint_urls.len() == 1, Error::UnsupportedToken);

                mint_urls.first().ok_or(Error::UnsupportedToken).cloned()
            }
            Self::TokenV4(token) => Ok(token.mint_url.clone()),
        }
    }

    /// To v3 string
    pub fn to_v3_string(&self) -> String {
        let v3_token = match self {
            Self::TokenV3(token) => token.clone(),
            Self::TokenV4(token) => token.clone().into(),
        };

        v3_token.to_string()
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (is_v3, s) = match (s.strip_prefix("cashuA"), s.strip_prefix("cashuB")) {
            (Some(s), None) => (true, s),
            (None, Some(s)) => (false, s),
            _ => return Err(Error::UnsupportedToken),
        };

        let decode_config = general_purpose::GeneralPurposeConfig::new()
            .with_decode_padding_mode(bitcoin::base64::engine::DecodePaddingMode::Indifferent);
        let decoded = GeneralPurpose::new(&alphabet::URL_SAFE, decode_config).decode(s)?;

        match is_v3 {
            true => {
                let decoded_str = String::from_utf8(decoded)?;
                let token: TokenV3 = serde_json::from_str(&decoded_str)?;
                Ok(Token::TokenV3(token))
            }
            false => {
                let token: TokenV4 = ciborium::from_reader(&decoded[..])?;
                Ok(Token::TokenV4(token))
            }
        }
    }
}

/// Token V3 Token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenV3Token {
    /// Url of mint
    pub mint: MintUrl,
    /// [`Proofs`]
    pub proofs: Proofs,
}

impl TokenV3Token {
    /// Create new [`TokenV3Token`]
    pub fn new(mint_url: MintUrl, proofs: Proofs) -> Self {
        Self {
            mint: mint_url,
            proofs,
        }
    }
}

/// Token V3
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenV3 {
    /// Proofs in [`Token`] by mint
    pub token: Vec<TokenV3Token>,
    /// Memo for token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Token Unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<CurrencyUnit>,
}

impl TokenV3 {
    /// Create new [`TokenV3`]
    pub fn new(
        mint_url: MintUrl,
        proofs: Proofs,
        memo: Option<String>,
        unit: Option<CurrencyUnit>,
    ) -> Result<Self, Error> {
        ensure!(!proofs.is_empty(), Error::ProofsRequired);

        Ok(Self {
            token: vec![TokenV3Token::new(mint_url, proofs)],
            memo,
            unit,
        })
    }

    /// Proofs
    pub fn proofs(&self) -> Proofs {
        self.token
            .iter()
            .flat_map(|token| token.proofs.clone())
            .collect()
    }

    /// Value - errors if duplicate proofs are found
    pub fn value(&self) -> Result<Amount, Error> {
        let proofs = self.proofs();
        let unique_count = proofs
            .iter()
            .collect::<std::collections::HashSet<_>>()
            .len();

        ensure!(unique_count == proofs.len(), Error::DuplicateProofs);

        proofs.total_amount()
    }

    /// Memo
    #[inline]
    pub fn memo(&self) -> &Option<String> {
        &self.memo
    }

    /// Unit
    #[inline]
    pub fn unit(&self) -> &Option<CurrencyUnit> {
        &self.unit
    }

    /// Mint Urls
    pub fn mint_urls(&self) -> Vec<MintUrl> {
        self.token.iter().map(|token| token.mint.clone()).collect()
    }

    /// Checks if a token spans multiple mints
    ///
    /// These tokens are not supported by this crate
    pub fn is_multi_mint(&self) -> bool {
        self.token.len() > 1
    }
}

impl FromStr for TokenV3 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("cashuA").ok_or(Error::UnsupportedToken)?;

        let decode_config = general_purpose::GeneralPurposeConfig::new()
            .with_decode_padding_mode(bitcoin::base64::engine::DecodePaddingMode::Indifferent);
        let decoded = GeneralPurpose::new(&alphabet::URL_SAFE, decode_config).decode(s)?;
        let decoded_str = String::from_utf8(decoded)?;
        let token: TokenV3 = serde_json::from_str(&decoded_str)?;
        Ok(token)
    }
}

impl fmt::Display for TokenV3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json_string = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        let encoded = general_purpose::URL_SAFE_NO_PAD.encode(json_string);
        write!(f, "cashuA{encoded}")
    }
}

impl From<TokenV4> for TokenV3 {
    fn from(token: TokenV4) -> Self {
        let proofs: Proofs = token.proofs();

        let token_v3_token = TokenV3Token {
            mint: token.mint_url,
            proofs,
        };
        TokenV3 {
            token: vec![token_v3_token],
            memo: token.memo,
            unit: Some(token.unit),
        }
    }
}

/// Token V4
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenV4 {
    /// Mint Url
    #[serde(rename = "m")]
    pub mint_url: MintUrl,
    /// Token Unit
    #[serde(rename = "u")]
    pub unit: CurrencyUnit,
    /// Memo for token
    #[serde(rename = "d", skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Proofs grouped by keyset_id
    #[serde(rename = "t")]
    pub token: Vec<TokenV4Token>,
}

impl TokenV4 {
    /// Proofs from token
    pub fn proofs(&self) -> Proofs {
        self.token
            .iter()
            .flat_map(|token| {
                token
                    .proofs
                    .iter()
                    .map(|p| p.into_proof(&token.keyset_id))
            })
            .collect()
    }

    /// Value - errors if duplicate proofs are found
    pub fn value(&self) -> Result<Amount, Error> {
        let proofs = self.proofs();
        let unique_count = proofs
            .iter()
            .collect::<std::collections::HashSet<_>>()
            .len();

        ensure!(unique_count == proofs.len(), Error::DuplicateProofs);

        proofs.total_amount()
    }

    /// Memo
    #[inline]
    pub fn memo(&self) -> &Option<String> {
        &self.memo
    }

    /// Unit
    #[inline]
    pub fn unit(&self) -> &CurrencyUnit {
        &self.unit
    }
}

impl fmt::Display for TokenV4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use serde::ser::Error;
        let mut data = Vec::new();
        ciborium::into_writer(self, &mut data).map_err(|e| fmt::Error::custom(e.to_string()))?;
        let encoded = general_purpose::URL_SAFE_NO_PAD.encode(data);
        write!(f, "cashuB{encoded}")
    }
}

impl FromStr for TokenV4 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("cashuB").ok_or(Error::UnsupportedToken)?;

        let decode_config = general_purpose::GeneralPurposeConfig::new()
            .with_decode_padding_mode(bitcoin::base64::engine::DecodePaddingMode::Indifferent);
        let decoded = GeneralPurpose::new(&alphabet::URL_SAFE, decode_config).decode(s)?;
        let token: TokenV4 = ciborium::from_reader(&decoded[..])?;
        Ok(token)
    }
}

impl TryFrom<TokenV3> for TokenV4 {
    type Error = Error;

    fn try_from(token: TokenV3) -> Result<Self, Self::Error> {
        let mint_urls = token.mint_urls();

        ensure!(mint_urls.len() == 1, Error::UnsupportedToken);

        let mint_url = mint_urls.first().ok_or(Error::UnsupportedToken)?;

        let proofs = token
            .proofs()
            .into_iter()
            .fold(HashMap::<Id, Vec<Proof>>::new(), |mut acc, val| {
                acc.entry(val.keyset_id)
                    .and_modify(|p: &mut Vec<Proof>| p.push(val.clone()))
                    .or_insert(vec![val]);
                acc
            })
            .into_iter()
            .map(|(id, proofs)| TokenV4Token::new(id, proofs))
            .collect();

        Ok(TokenV4 {
            mint_url: mint_url.clone(),
            token: proofs,
            memo: token.memo,
            unit: token.unit.ok_or(Error::UnsupportedUnit)?,
        })
    }
}

/// Token V4 Token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenV4Token {
    /// `Keyset id`
    #[serde(
        rename = "i",
        serialize_with = "serialize_v4_keyset_id",
        deserialize_with = "deserialize_v4_keyset_id"
    )]
    pub keyset_id: Id,
    /// Proofs
    #[serde(rename = "p")]
    pub proofs: Vec<ProofV4>,
}

fn serialize_v4_keyset_id<S>(keyset_id: &Id, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_bytes(&keyset_id.to_bytes())
}

fn deserialize_v4_keyset_id<'de, D>(deserializer: D) -> Result<Id, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let bytes = Vec::<u8>::deserialize(deserializer)?;
    Id::from_bytes(&bytes).map_err(serde::de::Error::custom)
}

impl TokenV4Token {
    /// Create new [`TokenV4Token`]
    pub fn new(keyset_id: Id, proofs: Proofs) -> Self {
        Self {
            keyset_id,
            proofs: proofs.into_iter().map(|p| p.into()).collect(),
        }
    }
}

/// Proof V4
///
/// Compact proof representation used inside [`TokenV4`]; keyset id, secret
/// and signature are carried as byte strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofV4 {
    /// Amount
    #[serde(rename = "a")]
    pub amount: Amount,
    /// Secret message
    #[serde(rename = "s")]
    pub secret: Secret,
    /// Unblinded signature
    #[serde(
        serialize_with = "serialize_v4_pubkey",
        deserialize_with = "deserialize_v4_pubkey"
    )]
    pub c: crate::nuts::PublicKey,
    /// Witness
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witness: Option<Witness>,
    /// DLEQ Proof
    #[serde(rename = "d", default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dleq: Option<ProofDleq>,
}

impl ProofV4 {
    /// [`ProofV4`] into [`Proof`]
    pub fn into_proof(&self, keyset_id: &Id) -> Proof {
        Proof {
            amount: self.amount,
            keyset_id: *keyset_id,
            secret: self.secret.clone(),
            c: self.c,
            witness: self.witness.clone(),
            dleq: self.dleq.clone(),
        }
    }
}

impl From<Proof> for ProofV4 {
    fn from(proof: Proof) -> ProofV4 {
        let Proof {
            amount,
            secret,
            c,
            witness,
            dleq,
            ..
        } = proof;
        ProofV4 {
            amount,
            secret,
            c,
            witness,
            dleq,
        }
    }
}

fn serialize_v4_pubkey<S>(key: &crate::nuts::PublicKey, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_bytes(&key.to_bytes())
}

fn deserialize_v4_pubkey<'de, D>(deserializer: D) -> Result<crate::nuts::PublicKey, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let bytes = Vec::<u8>::deserialize(deserializer)?;
    crate::nuts::PublicKey::from_slice(&bytes).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::nuts::SecretKey;

    fn test_proofs() -> Proofs {
        let keyset_id = Id::from_str("009a1f293253e41e").unwrap();
        [2u64, 8]
            .iter()
            .map(|amount| {
                Proof::new(
                    Amount::from(*amount),
                    keyset_id,
                    Secret::generate(),
                    SecretKey::generate().public_key(),
                )
            })
            .collect()
    }

    #[test]
    fn test_token_v3_roundtrip() {
        let mint_url = MintUrl::from_str("https://8333.space:3338").unwrap();
        let token = TokenV3::new(
            mint_url,
            test_proofs(),
            Some("Thank you.".to_string()),
            Some(CurrencyUnit::Sat),
        )
        .unwrap();

        let encoded = token.to_string();
        assert!(encoded.starts_with("cashuA"));
        // base64 is url safe and unpadded
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));

        let decoded = TokenV3::from_str(&encoded).unwrap();
        assert_eq!(decoded, token);

        // Also decodes through the version dispatching entry point
        let decoded = Token::from_str(&encoded).unwrap();
        assert_eq!(decoded, Token::TokenV3(token));
    }

    #[test]
    fn test_token_v4_roundtrip() {
        let mint_url = MintUrl::from_str("https://8333.space:3338").unwrap();
        let token = Token::new(mint_url.clone(), test_proofs(), None, CurrencyUnit::Sat);

        let encoded = token.to_string();
        assert!(encoded.starts_with("cashuB"));
        assert!(!encoded.contains('='));

        let decoded = Token::from_str(&encoded).unwrap();
        assert_eq!(decoded, token);
        assert_eq!(decoded.mint_url().unwrap(), mint_url);
        assert_eq!(decoded.value().unwrap(), Amount::from(10));
        assert_eq!(decoded.unit().unwrap(), CurrencyUnit::Sat);
    }

    #[test]
    fn test_token_v3_v4_conversion() {
        let mint_url = MintUrl::from_str("https://8333.space:3338").unwrap();
        let proofs = test_proofs();

        let v3 = TokenV3::new(
            mint_url.clone(),
            proofs.clone(),
            None,
            Some(CurrencyUnit::Sat),
        )
        .unwrap();

        let v4 = TokenV4::try_from(v3.clone()).unwrap();
        assert_eq!(v4.mint_url, mint_url);
        assert_eq!(v4.value().unwrap(), v3.value().unwrap());

        let v3_again: TokenV3 = v4.into();
        assert_eq!(v3_again.value().unwrap(), v3.value().unwrap());
    }

    #[test]
    fn test_token_v4_known_vector() {
        let token_str = "cashuBo2FteCJodHRwczovL21pbnQubWluaWJpdHMuY2FzaC9CaXRjb2luYXVjc2F0YXSBomFpSABQBVDwSUFGYXCCpGFhCGFzeEBjODY1NmFkODgzNWY5ZWYzNWRhZDUxNmM0ZTllNTlmMDdjMWY4ODQ1NzY1ZjczYWE1YzIyNWE4YjgwYzRkYzRmYWNYIQI2me8t0VyxpVsI9SU7Ovvxe0GgPeabeNByV2xDqIpQEWFko2FlWCCsRHi1-OOIfR76V_0f7766zXKNBCL_9kIUH3IXAfiMOmFzWCBl8_YpxA5YDXXS8vPXVxpkXU-5c3rTpxo87ZkICF92-mFyWCBp2DPSmxAQs2J_fEnknZ39Mla1Ep8MVKPuHZkPhZIV7KRhYQJhc3hAZmU2MDM2MDU1YzUzNWVlMGViMjcyNDU2ZTM2MmU2Y2Q5ZWI0M2QxZDE4ODQzYzMwNDgwZTRjMTZiMjQwNjkwNmFjWCECKUDeDb82uIT3i5M8hJ3YIz73THneYrlA0zaLJMUOWdNhZKNhZVggTFHttTOozr6VFTs9tsR-c9bW-dLMIQ3hICuYlmqn_tthc1ggkwpFNKVe6ZSM9ZdflXz6EY9Jn45dkmIRabr8gH3c5QNhclggHxiyKArt0xfn06LLhGHTnFTSfStUA9XuD9gXHnrhlVo";

        let token = Token::from_str(token_str).unwrap();

        assert_eq!(
            token.mint_url().unwrap(),
            MintUrl::from_str("https://mint.minibits.cash/Bitcoin").unwrap()
        );
        assert_eq!(token.unit().unwrap(), CurrencyUnit::Sat);
        assert_eq!(token.value().unwrap(), Amount::from(10));

        let proofs = token.proofs();
        assert_eq!(proofs.len(), 2);
        for proof in proofs {
            assert!(proof.dleq.is_some());
        }
    }

    #[test]
    fn test_token_invalid_prefix() {
        assert!(Token::from_str("casshuAeyJwcm9vZnMiOltdfQ").is_err());
        assert!(TokenV3::from_str("cashuBabc").is_err());
        assert!(TokenV4::from_str("cashuAabc").is_err());
    }
}
