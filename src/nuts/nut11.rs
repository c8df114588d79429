//! NUT-11: Pay to Public Key (P2PK)
//!
//! <https://github.com/cashubtc/nuts/blob/main/11.md>

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use bitcoin::hashes::sha256::Hash as Sha256Hash;
use bitcoin::secp256k1::schnorr::Signature;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::nut00::Witness;
use super::nut01::PublicKey;
use super::{Kind, Nut10Secret, Proof, Proofs, SecretKey};
use crate::ensure;
use crate::secret::Secret;
use crate::util::unix_time;

/// Nut11 Error
#[derive(Debug, Error)]
pub enum Error {
    /// Incorrect secret kind
    #[error("Secret is not a p2pk secret")]
    IncorrectSecretKind,
    /// P2PK locktime has already passed
    #[error("Locktime in past")]
    LocktimeInPast,
    /// Witness signature is not valid
    #[error("Invalid signature")]
    InvalidSignature,
    /// Unknown Sigflag
    #[error("Unknown sigflag")]
    UnknownSigFlag,
    /// P2PK spend conditions not met
    #[error("P2PK spend conditions are not met")]
    SpendConditionsNotMet,
    /// HTLC hash invalid
    #[error("Invalid hash")]
    InvalidHash,
    /// Witness Signatures not provided
    #[error("Witness signatures not provided")]
    SignaturesNotProvided,
    /// Tag without a name
    #[error("Empty tag")]
    EmptyTag,
    /// Tag without its value
    #[error("Tag value missing")]
    TagValueMissing,
    /// Parse int error
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),
    /// Serde Json error
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
    /// Secp256k1 error
    #[error(transparent)]
    Secp256k1(#[from] bitcoin::secp256k1::Error),
    /// NUT01 Error
    #[error(transparent)]
    Nut01(#[from] crate::nuts::nut01::Error),
}

/// P2PK Witness
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct P2PKWitness {
    /// Signatures
    pub signatures: Vec<String>,
}

impl P2PKWitness {
    /// Check if Witness is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Who may spend a locked proof at a given moment
///
/// Before the locktime the committed pubkeys rule; once it passes, the
/// refund keys take over, and with no refund keys the lock dissolves
/// entirely.
enum Authorization {
    /// Anyone can spend, no signature needed
    Open,
    /// `needed` distinct keys out of `keys` must have signed
    Signers {
        /// Keys whose signatures count
        keys: Vec<PublicKey>,
        /// Distinct signers required
        needed: u64,
    },
}

fn spending_authorization(conditions: &SpendingConditions, now: u64) -> Authorization {
    let locktime_passed = conditions.locktime().is_some_and(|locktime| now >= locktime);

    if locktime_passed {
        return match conditions.refund_keys() {
            Some(refund_keys) if !refund_keys.is_empty() => Authorization::Signers {
                keys: refund_keys,
                needed: 1,
            },
            _ => Authorization::Open,
        };
    }

    Authorization::Signers {
        keys: conditions.pubkeys().unwrap_or_default(),
        needed: conditions.num_sigs().unwrap_or(1),
    }
}

impl Proof {
    /// Sign [Proof]
    ///
    /// The message signed is the utf8 bytes of the secret string; the
    /// signature is appended to the proof's witness.
    pub fn sign_p2pk(&mut self, secret_key: &SecretKey) -> Result<(), Error> {
        let signature = secret_key.sign(self.secret.as_bytes())?.to_string();

        match self.witness.as_mut() {
            Some(witness) => witness.add_signatures(vec![signature]),
            None => {
                self.witness = Some(
                    P2PKWitness {
                        signatures: vec![signature],
                    }
                    .into(),
                )
            }
        }

        Ok(())
    }

    /// Verify the P2PK witness on [Proof]
    pub fn verify_p2pk(&self) -> Result<(), Error> {
        let conditions = SpendingConditions::try_from(&self.secret)?;
        ensure!(conditions.kind() == Kind::P2PK, Error::IncorrectSecretKind);

        let (keys, needed) = match spending_authorization(&conditions, unix_time()) {
            Authorization::Open => return Ok(()),
            Authorization::Signers { keys, needed } => (keys, needed),
        };

        let signatures = witness_signatures(self.witness.as_ref())?;
        let signed = valid_signatures(self.secret.as_bytes(), &keys, &signatures);

        ensure!(signed >= needed, Error::SpendConditionsNotMet);

        Ok(())
    }
}

/// Parse the schnorr signatures out of a proof witness
fn witness_signatures(witness: Option<&Witness>) -> Result<Vec<Signature>, Error> {
    witness
        .and_then(Witness::signatures)
        .ok_or(Error::SignaturesNotProvided)?
        .iter()
        .map(|signature| Signature::from_str(signature).map_err(|_| Error::InvalidSignature))
        .collect()
}

/// Count the distinct public keys with at least one valid signature on `msg`
///
/// A key signing twice still counts once, so a single signer can never
/// satisfy a multisig threshold on its own.
pub fn valid_signatures(msg: &[u8], pubkeys: &[PublicKey], signatures: &[Signature]) -> u64 {
    let unique: HashSet<&PublicKey> = pubkeys.iter().collect();

    unique
        .into_iter()
        .filter(|pubkey| {
            signatures
                .iter()
                .any(|signature| pubkey.verify(msg, signature).is_ok())
        })
        .count() as u64
}

/// Spending Conditions
///
/// Defined in [NUT10](https://github.com/cashubtc/nuts/blob/main/10.md)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpendingConditions {
    /// NUT11 Spending conditions
    ///
    /// Defined in [NUT11](https://github.com/cashubtc/nuts/blob/main/11.md)
    P2PKConditions {
        /// The public key of the recipient of the locked ecash
        data: PublicKey,
        /// Additional Optional Spending [`Conditions`]
        conditions: Option<Conditions>,
    },
    /// NUT14 Spending conditions
    ///
    /// Defined in [NUT14](https://github.com/cashubtc/nuts/blob/main/14.md).
    /// Recognized so tokens carrying them classify correctly; the operations
    /// in this crate do not construct or satisfy them.
    HTLCConditions {
        /// Hash Lock of ecash
        data: Sha256Hash,
        /// Additional Optional Spending [`Conditions`]
        conditions: Option<Conditions>,
    },
}

impl SpendingConditions {
    /// New P2PK [SpendingConditions]
    pub fn new_p2pk(pubkey: PublicKey, conditions: Option<Conditions>) -> Self {
        Self::P2PKConditions {
            data: pubkey,
            conditions,
        }
    }

    /// Kind of [SpendingConditions]
    pub fn kind(&self) -> Kind {
        match self {
            Self::P2PKConditions { .. } => Kind::P2PK,
            Self::HTLCConditions { .. } => Kind::HTLC,
        }
    }

    fn conditions(&self) -> Option<&Conditions> {
        match self {
            Self::P2PKConditions { conditions, .. } => conditions.as_ref(),
            Self::HTLCConditions { conditions, .. } => conditions.as_ref(),
        }
    }

    /// Number of signatures required to unlock
    pub fn num_sigs(&self) -> Option<u64> {
        self.conditions().and_then(|c| c.num_sigs)
    }

    /// Public keys of locked [`Proof`]
    ///
    /// For P2PK the primary key in `data` counts alongside any keys from the
    /// `pubkeys` tag.
    pub fn pubkeys(&self) -> Option<Vec<PublicKey>> {
        let tag_keys = self.conditions().and_then(|c| c.pubkeys.clone());

        match self {
            Self::P2PKConditions { data, .. } => {
                let mut pubkeys = vec![*data];
                pubkeys.extend(tag_keys.unwrap_or_default());
                Some(pubkeys)
            }
            Self::HTLCConditions { .. } => tag_keys,
        }
    }

    /// Locktime of Spending Conditions
    pub fn locktime(&self) -> Option<u64> {
        self.conditions().and_then(|c| c.locktime)
    }

    /// Refund keys
    pub fn refund_keys(&self) -> Option<Vec<PublicKey>> {
        self.conditions().and_then(|c| c.refund_keys.clone())
    }

    /// Signature flag
    pub fn sig_flag(&self) -> SigFlag {
        self.conditions().map(|c| c.sig_flag).unwrap_or_default()
    }
}

impl TryFrom<&Secret> for SpendingConditions {
    type Error = Error;
    fn try_from(secret: &Secret) -> Result<SpendingConditions, Error> {
        let nut10_secret: Nut10Secret =
            secret.try_into().map_err(|_| Error::IncorrectSecretKind)?;

        nut10_secret.try_into()
    }
}

impl TryFrom<Nut10Secret> for SpendingConditions {
    type Error = Error;
    fn try_from(secret: Nut10Secret) -> Result<SpendingConditions, Error> {
        let conditions = secret
            .secret_data
            .tags
            .and_then(|tags| tags.try_into().ok());

        match secret.kind {
            Kind::P2PK => Ok(SpendingConditions::P2PKConditions {
                data: PublicKey::from_str(&secret.secret_data.data)?,
                conditions,
            }),
            Kind::HTLC => Ok(Self::HTLCConditions {
                data: Sha256Hash::from_str(&secret.secret_data.data)
                    .map_err(|_| Error::InvalidHash)?,
                conditions,
            }),
        }
    }
}

impl From<SpendingConditions> for super::nut10::Secret {
    fn from(conditions: SpendingConditions) -> super::nut10::Secret {
        match conditions {
            SpendingConditions::P2PKConditions { data, conditions } => {
                super::nut10::Secret::new(Kind::P2PK, data.to_hex(), conditions)
            }
            SpendingConditions::HTLCConditions { data, conditions } => {
                super::nut10::Secret::new(Kind::HTLC, data.to_string(), conditions)
            }
        }
    }
}

/// P2PK and HTLC spending conditions
///
/// The structured form of the secret's tag list. Understood tags are
/// `sigflag`, `n_sigs`, `pubkeys`, `locktime` and `refund`; anything else is
/// committed to by the secret but carries no meaning here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Conditions {
    /// Unix locktime after which refund keys can be used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locktime: Option<u64>,
    /// Additional Public keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubkeys: Option<Vec<PublicKey>>,
    /// Refund keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_keys: Option<Vec<PublicKey>>,
    /// Number of signatures required
    ///
    /// Default is 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_sigs: Option<u64>,
    /// Signature flag
    ///
    /// Default [`SigFlag::SigInputs`]
    pub sig_flag: SigFlag,
}

impl Conditions {
    /// Create new Spending [`Conditions`]
    pub fn new(
        locktime: Option<u64>,
        pubkeys: Option<Vec<PublicKey>>,
        refund_keys: Option<Vec<PublicKey>>,
        num_sigs: Option<u64>,
        sig_flag: Option<SigFlag>,
    ) -> Result<Self, Error> {
        ensure!(
            !locktime.is_some_and(|locktime| locktime < unix_time()),
            Error::LocktimeInPast
        );

        Ok(Self {
            locktime,
            pubkeys,
            refund_keys,
            num_sigs,
            sig_flag: sig_flag.unwrap_or_default(),
        })
    }
}

/// One tag as it appears in the secret: a name followed by its values
fn tag<T: ToString>(name: &str, values: impl IntoIterator<Item = T>) -> Vec<String> {
    std::iter::once(name.to_string())
        .chain(values.into_iter().map(|value| value.to_string()))
        .collect()
}

impl From<Conditions> for Vec<Vec<String>> {
    fn from(conditions: Conditions) -> Vec<Vec<String>> {
        let Conditions {
            locktime,
            pubkeys,
            refund_keys,
            num_sigs,
            sig_flag,
        } = conditions;

        let mut tags = Vec::new();

        if let Some(pubkeys) = pubkeys {
            tags.push(tag("pubkeys", pubkeys));
        }
        if let Some(locktime) = locktime {
            tags.push(tag("locktime", [locktime]));
        }
        if let Some(num_sigs) = num_sigs {
            tags.push(tag("n_sigs", [num_sigs]));
        }
        if let Some(refund_keys) = refund_keys {
            tags.push(tag("refund", refund_keys));
        }
        tags.push(tag("sigflag", [sig_flag]));

        tags
    }
}

impl TryFrom<Vec<Vec<String>>> for Conditions {
    type Error = Error;

    fn try_from(tags: Vec<Vec<String>>) -> Result<Conditions, Self::Error> {
        fn first(values: &[String]) -> Result<&str, Error> {
            values.first().map(String::as_str).ok_or(Error::TagValueMissing)
        }

        fn keys(values: &[String]) -> Result<Vec<PublicKey>, Error> {
            values
                .iter()
                .map(|value| PublicKey::from_str(value).map_err(Error::from))
                .collect()
        }

        let mut conditions = Conditions::default();

        for entry in &tags {
            let (name, values) = entry.split_first().ok_or(Error::EmptyTag)?;

            match name.as_str() {
                "sigflag" => conditions.sig_flag = first(values)?.parse()?,
                "n_sigs" => conditions.num_sigs = Some(first(values)?.parse()?),
                "locktime" => conditions.locktime = Some(first(values)?.parse()?),
                "pubkeys" => conditions.pubkeys = Some(keys(values)?),
                "refund" => conditions.refund_keys = Some(keys(values)?),
                _ => {}
            }
        }

        Ok(conditions)
    }
}

/// Signature flag
///
/// Defined in [NUT11](https://github.com/cashubtc/nuts/blob/main/11.md)
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord, Hash,
)]
pub enum SigFlag {
    #[default]
    /// Requires valid signatures on all inputs.
    /// It is the default signature flag and will be applied even if the
    /// `sigflag` tag is absent.
    SigInputs,
    /// Requires valid signatures on all inputs and on all outputs.
    SigAll,
}

impl fmt::Display for SigFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SigAll => write!(f, "SIG_ALL"),
            Self::SigInputs => write!(f, "SIG_INPUTS"),
        }
    }
}

impl FromStr for SigFlag {
    type Err = Error;
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "SIG_ALL" => Ok(Self::SigAll),
            "SIG_INPUTS" => Ok(Self::SigInputs),
            _ => Err(Error::UnknownSigFlag),
        }
    }
}

/// Enforce Sigflag info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnforceSigFlag {
    /// Sigflag required for proofs
    pub sig_flag: SigFlag,
    /// Pubkeys that can sign for proofs
    pub pubkeys: HashSet<PublicKey>,
    /// Number of sigs required for proofs
    pub sigs_required: u64,
}

/// Fold the spending conditions of a proof set into the signature regime
/// the whole set must satisfy
///
/// `SIG_ALL` on any input wins, the largest `n_sigs` wins, and the
/// authorized key sets are unioned.
pub fn enforce_sig_flag(proofs: &Proofs) -> EnforceSigFlag {
    let mut sig_flag = SigFlag::SigInputs;
    let mut pubkeys = HashSet::new();
    let mut sigs_required = 1;

    for conditions in proofs
        .iter()
        .filter_map(|proof| SpendingConditions::try_from(&proof.secret).ok())
    {
        if conditions.sig_flag() == SigFlag::SigAll {
            sig_flag = SigFlag::SigAll;
        }
        if let Some(num_sigs) = conditions.num_sigs() {
            sigs_required = sigs_required.max(num_sigs);
        }
        if let Some(keys) = conditions.pubkeys() {
            pubkeys.extend(keys);
        }
    }

    EnforceSigFlag {
        sig_flag,
        pubkeys,
        sigs_required,
    }
}

/// Serde utils for P2PK Witness
pub mod serde_p2pk_witness {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    use super::P2PKWitness;

    /// Serialize [P2PKWitness] as stringified JSON
    pub fn serialize<S>(x: &P2PKWitness, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&serde_json::to_string(&x).map_err(ser::Error::custom)?)
    }

    /// Deserialize [P2PKWitness] from stringified JSON
    pub fn deserialize<'de, D>(deserializer: D) -> Result<P2PKWitness, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        serde_json::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::nuts::Id;
    use crate::Amount;

    fn locked_proof(secret: Secret) -> Proof {
        Proof::new(
            Amount::from(8),
            Id::from_str("009a1f293253e41e").unwrap(),
            secret,
            SecretKey::generate().public_key(),
        )
    }

    fn p2pk_secret(data: PublicKey, conditions: Option<Conditions>) -> Secret {
        let nut10: Nut10Secret = SpendingConditions::new_p2pk(data, conditions).into();
        nut10.try_into().unwrap()
    }

    #[test]
    fn test_secret_ser() {
        let data = PublicKey::from_str(
            "033281c37677ea273eb7183b783067f5244933ef78d8c3f15b1a77cb246099c26e",
        )
        .unwrap();

        let conditions = Conditions {
            locktime: Some(99999),
            pubkeys: Some(vec![
                PublicKey::from_str(
                    "02f71e2d93aa95fc52b938735a24774ad926406c81e9dc9d2aa699fb89281548fd",
                )
                .unwrap(),
                PublicKey::from_str(
                    "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
                )
                .unwrap(),
            ]),
            refund_keys: Some(vec![PublicKey::from_str(
                "033281c37677ea273eb7183b783067f5244933ef78d8c3f15b1a77cb246099c26e",
            )
            .unwrap()]),
            num_sigs: Some(2),
            sig_flag: SigFlag::SigAll,
        };

        let secret: Nut10Secret = SpendingConditions::new_p2pk(data, Some(conditions)).into();

        let secret_str = serde_json::to_string(&secret).unwrap();

        let secret_der: Nut10Secret = serde_json::from_str(&secret_str).unwrap();

        assert_eq!(secret_der, secret);
    }

    #[test]
    fn sign_and_verify_proof() {
        let secret_key =
            SecretKey::from_str("99590802251e78ee1051648439eedb003dc539093a48a44e7b8f2642c909ea37")
                .unwrap();

        let mut proof = locked_proof(p2pk_secret(secret_key.public_key(), None));

        // Not yet signed
        assert!(proof.verify_p2pk().is_err());

        proof.sign_p2pk(&secret_key).unwrap();

        assert!(proof.verify_p2pk().is_ok());
    }

    #[test]
    fn test_verify_multi_sig() {
        let key_one =
            SecretKey::from_str("99590802251e78ee1051648439eedb003dc539093a48a44e7b8f2642c909ea37")
                .unwrap();
        let key_two =
            SecretKey::from_str("0000000000000000000000000000000000000000000000000000000000000001")
                .unwrap();

        let conditions = Conditions {
            locktime: None,
            pubkeys: Some(vec![key_two.public_key()]),
            refund_keys: None,
            num_sigs: Some(2),
            sig_flag: SigFlag::SigInputs,
        };

        let mut proof = locked_proof(p2pk_secret(key_one.public_key(), Some(conditions)));

        // Only one of the two required signatures
        proof.sign_p2pk(&key_one).unwrap();
        assert!(proof.verify_p2pk().is_err());

        proof.sign_p2pk(&key_two).unwrap();
        assert!(proof.verify_p2pk().is_ok());
    }

    #[test]
    fn test_same_signer_counts_once() {
        let key_one =
            SecretKey::from_str("99590802251e78ee1051648439eedb003dc539093a48a44e7b8f2642c909ea37")
                .unwrap();
        let key_two =
            SecretKey::from_str("0000000000000000000000000000000000000000000000000000000000000001")
                .unwrap();

        let conditions = Conditions {
            locktime: None,
            pubkeys: Some(vec![key_two.public_key()]),
            refund_keys: None,
            num_sigs: Some(2),
            sig_flag: SigFlag::SigInputs,
        };

        let mut proof = locked_proof(p2pk_secret(key_one.public_key(), Some(conditions)));

        // Signing twice with the same key cannot stand in for the second
        // signer
        proof.sign_p2pk(&key_one).unwrap();
        proof.sign_p2pk(&key_one).unwrap();
        assert!(proof.verify_p2pk().is_err());
    }

    #[test]
    fn test_refund_after_locktime() {
        let spend_key =
            SecretKey::from_str("99590802251e78ee1051648439eedb003dc539093a48a44e7b8f2642c909ea37")
                .unwrap();
        let refund_key =
            SecretKey::from_str("0000000000000000000000000000000000000000000000000000000000000001")
                .unwrap();

        // Locktime in the past
        let conditions = Conditions {
            locktime: Some(21),
            pubkeys: None,
            refund_keys: Some(vec![refund_key.public_key()]),
            num_sigs: None,
            sig_flag: SigFlag::SigInputs,
        };

        let mut proof = locked_proof(p2pk_secret(spend_key.public_key(), Some(conditions)));

        // The spend key no longer authorizes after expiry, the refund key does
        proof.sign_p2pk(&spend_key).unwrap();
        assert!(proof.verify_p2pk().is_err());

        proof.witness = None;
        proof.sign_p2pk(&refund_key).unwrap();
        assert!(proof.verify_p2pk().is_ok());
    }

    #[test]
    fn test_anyone_can_spend_after_locktime_without_refund_keys() {
        let spend_key = SecretKey::generate();

        let conditions = Conditions {
            locktime: Some(21),
            pubkeys: None,
            refund_keys: None,
            num_sigs: None,
            sig_flag: SigFlag::SigInputs,
        };

        let proof = locked_proof(p2pk_secret(spend_key.public_key(), Some(conditions)));

        // Expired with no refund keys, no witness needed at all
        assert!(proof.verify_p2pk().is_ok());
    }

    #[test]
    fn test_tags_roundtrip() {
        let conditions = Conditions {
            locktime: Some(99999),
            pubkeys: Some(vec![SecretKey::generate().public_key()]),
            refund_keys: Some(vec![SecretKey::generate().public_key()]),
            num_sigs: Some(2),
            sig_flag: SigFlag::SigAll,
        };

        let tags: Vec<Vec<String>> = conditions.clone().into();
        let back = Conditions::try_from(tags).unwrap();

        assert_eq!(back, conditions);
    }

    #[test]
    fn test_malformed_tags_rejected() {
        // A tag with a name but no value
        let tags = vec![vec!["n_sigs".to_string()]];
        assert!(Conditions::try_from(tags).is_err());

        // An empty tag
        let tags = vec![vec![]];
        assert!(Conditions::try_from(tags).is_err());

        // A sigflag nobody knows
        let tags = vec![vec!["sigflag".to_string(), "SIG_NOTHING".to_string()]];
        assert!(Conditions::try_from(tags).is_err());
    }

    #[test]
    fn test_unknown_tags_are_ignored() {
        let tags = vec![
            vec!["locktime".to_string(), "99999".to_string()],
            vec!["gate".to_string(), "value".to_string()],
        ];

        let conditions = Conditions::try_from(tags).unwrap();
        assert_eq!(conditions.locktime, Some(99999));
        assert_eq!(conditions.sig_flag, SigFlag::SigInputs);
    }

    #[test]
    fn test_enforce_sig_flag() {
        let key = SecretKey::generate();

        let conditions = Conditions {
            locktime: None,
            pubkeys: None,
            refund_keys: None,
            num_sigs: Some(3),
            sig_flag: SigFlag::SigAll,
        };

        let proofs = vec![
            locked_proof(p2pk_secret(key.public_key(), Some(conditions))),
            locked_proof(Secret::generate()),
        ];

        let enforced = enforce_sig_flag(&proofs);
        assert_eq!(enforced.sig_flag, SigFlag::SigAll);
        assert_eq!(enforced.sigs_required, 3);
        assert!(enforced.pubkeys.contains(&key.public_key()));
    }
}
