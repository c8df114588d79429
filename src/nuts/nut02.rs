//! NUT-02: Keysets and keyset ID
//!
//! <https://github.com/cashubtc/nuts/blob/main/02.md>

use core::fmt;
use core::str::FromStr;
use std::array::TryFromSliceError;

use bitcoin::base64::engine::{general_purpose, GeneralPurpose};
use bitcoin::base64::{alphabet, Engine as _};
use bitcoin::hashes::sha256::Hash as Sha256;
use bitcoin::hashes::Hash;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, VecSkipError};
use thiserror::Error;

use super::nut01::Keys;
use super::CurrencyUnit;
use crate::util::hex;

/// NUT02 Error
#[derive(Debug, Error)]
pub enum Error {
    /// Hex Error
    #[error(transparent)]
    HexError(#[from] hex::Error),
    /// Base64 error
    #[error(transparent)]
    Base64Error(#[from] bitcoin::base64::DecodeError),
    /// Keyset length error
    #[error("NUT02: ID length invalid")]
    Length,
    /// Unknown version
    #[error("NUT02: Unknown version")]
    UnknownVersion,
    /// Keyset id does not match the keys it claims to commit to
    #[error("Keyset id incorrect for keys")]
    IncorrectKeysetId,
    /// Slice Error
    #[error(transparent)]
    Slice(#[from] TryFromSliceError),
}

/// A keyset ID is an identifier for a specific keyset. It can be derived by
/// anyone who knows the set of public keys of a mint.
///
/// Three generations are in circulation and all must be accepted:
/// a legacy 12 character base64 digest prefix, the hex encoded version `00`,
/// and version `01` which additionally commits to the unit and an optional
/// final expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Id {
    /// Legacy pre-versioning id: first 12 base64 characters of the keys digest
    Base64([u8; Self::BASE64_BYTELEN]),
    /// Version `00`: `"00"` followed by 14 hex characters of the keys digest
    Version00([u8; Self::V00_BYTELEN]),
    /// Version `01`: `"01"` followed by the full hex digest binding keys,
    /// unit and optional final expiry
    Version01([u8; Self::V01_BYTELEN]),
}

impl Id {
    const BASE64_STRLEN: usize = 12;
    const BASE64_BYTELEN: usize = 9;
    const V00_STRLEN: usize = 16;
    const V00_BYTELEN: usize = 7;
    const V01_STRLEN: usize = 66;
    const V01_BYTELEN: usize = 32;

    /// Version prefix byte, `None` for the unversioned legacy form
    pub fn version_byte(&self) -> Option<u8> {
        match self {
            Self::Base64(_) => None,
            Self::Version00(_) => Some(0),
            Self::Version01(_) => Some(1),
        }
    }

    /// [`Id`] to bytes
    ///
    /// Versioned ids are prefixed with their version byte; the legacy form is
    /// the raw digest prefix.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Base64(id) => id.to_vec(),
            Self::Version00(id) => [&[0u8][..], id.as_slice()].concat(),
            Self::Version01(id) => [&[1u8][..], id.as_slice()].concat(),
        }
    }

    /// [`Id`] from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        match (bytes.first(), bytes.len()) {
            (Some(0), len) if len == Self::V00_BYTELEN + 1 => {
                Ok(Self::Version00(bytes[1..].try_into()?))
            }
            (Some(1), len) if len == Self::V01_BYTELEN + 1 => {
                Ok(Self::Version01(bytes[1..].try_into()?))
            }
            (Some(_), len) if len == Self::BASE64_BYTELEN => {
                Ok(Self::Base64(bytes.try_into()?))
            }
            _ => Err(Error::Length),
        }
    }

    /// Id with `+` and `/` substituted for use in a URL path
    pub fn url_safe(&self) -> String {
        self.to_string().replace('+', "-").replace('/', "_")
    }

    /// Legacy id from keys: sort the public keys by amount, concatenate their
    /// hex strings, SHA-256 the UTF-8 bytes and keep the first 12 base64
    /// characters of the digest.
    pub fn v0_from_keys(keys: &Keys) -> Self {
        let hex_concat: String = keys.iter().map(|(_, pubkey)| pubkey.to_hex()).collect();

        let hash = Sha256::hash(hex_concat.as_bytes());

        // The first 12 base64 chars encode exactly the first 9 digest bytes
        let mut id = [0u8; Self::BASE64_BYTELEN];
        id.copy_from_slice(&hash.to_byte_array()[0..Self::BASE64_BYTELEN]);
        Self::Base64(id)
    }

    /// Version `00` id from keys: sort the public keys by amount, concatenate
    /// their compressed bytes, SHA-256 and keep the first 14 hex characters.
    pub fn v1_from_keys(keys: &Keys) -> Self {
        let pubkeys_concat: Vec<u8> = keys
            .iter()
            .map(|(_, pubkey)| pubkey.to_bytes())
            .collect::<Vec<[u8; 33]>>()
            .concat();

        let hash = Sha256::hash(&pubkeys_concat);

        let mut id = [0u8; Self::V00_BYTELEN];
        id.copy_from_slice(&hash.to_byte_array()[0..Self::V00_BYTELEN]);
        Self::Version00(id)
    }

    /// Version `01` id: as version `00` but the digest additionally commits
    /// to `unit:<unit>` and, when present, `final_expiry:<unix seconds>`.
    pub fn v2_from_data(keys: &Keys, unit: &CurrencyUnit, expiry: Option<u64>) -> Self {
        let mut data: Vec<u8> = keys
            .iter()
            .map(|(_, pubkey)| pubkey.to_bytes())
            .collect::<Vec<[u8; 33]>>()
            .concat();

        data.extend_from_slice(format!("unit:{unit}").as_bytes());
        if let Some(expiry) = expiry {
            data.extend_from_slice(format!("final_expiry:{expiry}").as_bytes());
        }

        let hash = Sha256::hash(&data);
        Self::Version01(hash.to_byte_array())
    }
}

impl TryFrom<Id> for u64 {
    type Error = Error;

    /// Big-endian integer of the first 8 id bytes, reduced to fit a hardened
    /// BIP-32 child index ([NUT-13](https://github.com/cashubtc/nuts/blob/main/13.md))
    fn try_from(value: Id) -> Result<Self, Self::Error> {
        let bytes = value.to_bytes();
        let bytes: [u8; 8] = bytes.get(0..8).ok_or(Error::Length)?.try_into()?;

        let int = u64::from_be_bytes(bytes);

        Ok(int % (2_u64.pow(31) - 1))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64(id) => f.write_str(&general_purpose::STANDARD_NO_PAD.encode(id)),
            Self::Version00(id) => write!(f, "00{}", hex::encode(id)),
            Self::Version01(id) => write!(f, "01{}", hex::encode(id)),
        }
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match (s.len(), s.get(0..2)) {
            (Self::BASE64_STRLEN, _) => {
                // Accept both the standard and the url-safe substituted form
                let decode_config = general_purpose::GeneralPurposeConfig::new()
                    .with_decode_padding_mode(
                        bitcoin::base64::engine::DecodePaddingMode::Indifferent,
                    );
                let standard = s.replace('-', "+").replace('_', "/");
                let decoded =
                    GeneralPurpose::new(&alphabet::STANDARD, decode_config).decode(standard)?;
                Ok(Self::Base64(
                    decoded.as_slice().try_into().map_err(|_| Error::Length)?,
                ))
            }
            (Self::V00_STRLEN, Some("00")) => Ok(Self::Version00(
                hex::decode(&s[2..])?
                    .try_into()
                    .map_err(|_| Error::Length)?,
            )),
            (Self::V01_STRLEN, Some("01")) => Ok(Self::Version01(
                hex::decode(&s[2..])?
                    .try_into()
                    .map_err(|_| Error::Length)?,
            )),
            (Self::V00_STRLEN, Some(_)) | (Self::V01_STRLEN, Some(_)) => Err(Error::UnknownVersion),
            _ => Err(Error::Length),
        }
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = Id;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a keyset id string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Id::from_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(IdVisitor)
    }
}

impl From<&Keys> for Id {
    /// New keysets derive the current versioned id
    fn from(keys: &Keys) -> Self {
        Self::v1_from_keys(keys)
    }
}

/// Mint Keysets [NUT-02]
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetResponse {
    /// Set of keysets the mint generates; entries the wallet cannot parse are
    /// skipped rather than failing the document
    #[serde_as(as = "VecSkipError<_>")]
    pub keysets: Vec<KeySetInfo>,
}

/// Keyset with keys
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeySet {
    /// Keyset [`Id`]
    pub id: Id,
    /// Keyset [`CurrencyUnit`]
    pub unit: CurrencyUnit,
    /// Keyset [`Keys`]
    pub keys: Keys,
    /// Expiry after which the keyset must not be used [`Id::Version01`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_expiry: Option<u64>,
}

impl KeySet {
    /// Recompute the keyset id from the key material and compare it to the
    /// stored id, dispatching on the id generation.
    pub fn verify_id(&self) -> Result<(), Error> {
        let expected = match self.id {
            Id::Base64(_) => Id::v0_from_keys(&self.keys),
            Id::Version00(_) => Id::v1_from_keys(&self.keys),
            Id::Version01(_) => Id::v2_from_data(&self.keys, &self.unit, self.final_expiry),
        };

        if expected != self.id {
            tracing::warn!(
                "Keyset id mismatch: stored {}, computed {}",
                self.id,
                expected
            );
            return Err(Error::IncorrectKeysetId);
        }

        Ok(())
    }
}

/// KeySetInfo
#[derive(Debug, Clone, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeySetInfo {
    /// Keyset [`Id`]
    pub id: Id,
    /// Keyset [`CurrencyUnit`]
    pub unit: CurrencyUnit,
    /// Keyset state
    ///
    /// The mint will only sign with an active keyset
    pub active: bool,
    /// Input fee per thousand spent proofs, in the keyset unit
    #[serde(default)]
    pub input_fee_ppk: u64,
    /// Expiry after which the keyset must not be used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_expiry: Option<u64>,
}
