//! Blind Diffie-Hellmann key exchange

use std::ops::Deref;

use bitcoin::hashes::sha256::Hash as Sha256Hash;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Parity, PublicKey as NormalizedPublicKey, Scalar, XOnlyPublicKey};
use thiserror::Error;

use crate::nuts::nut01::{PublicKey, SecretKey};
use crate::nuts::nut12::ProofDleq;
use crate::nuts::{BlindSignature, Keys, Proof, Proofs};
use crate::secret::Secret;
use crate::SECP256K1;

const DOMAIN_SEPARATOR: &[u8; 28] = b"Secp256k1_HashToCurve_Cashu_";

/// DHKE Error
#[derive(Debug, Error)]
pub enum Error {
    /// Signature verification failed
    #[error("Message not verified")]
    MessageNotVerified,
    /// No valid point on curve
    #[error("No valid point found")]
    NoValidPoint,
    /// Unbalanced promise, blinding factor and secret lists
    #[error("Lengths of promises, rs, and secrets must be equal")]
    LengthMismatch,
    /// No key for amount in keyset
    #[error("No key for amount in keyset")]
    AmountKey,
    /// Secp256k1 error
    #[error(transparent)]
    Secp256k1(#[from] bitcoin::secp256k1::Error),
}

/// Deterministically maps a message to a public key point on the secp256k1
/// curve, utilizing a domain separator to ensure uniqueness.
///
/// For definition in NUT see [NUT-00](https://github.com/cashubtc/nuts/blob/main/00.md)
pub fn hash_to_curve(message: &[u8]) -> Result<PublicKey, Error> {
    let msg_to_hash: Vec<u8> = [DOMAIN_SEPARATOR, message].concat();

    let msg_hash: [u8; 32] = Sha256Hash::hash(&msg_to_hash).to_byte_array();

    let mut counter: u32 = 0;
    while counter < 2_u32.pow(16) {
        let mut bytes_to_hash: Vec<u8> = Vec::with_capacity(36);
        bytes_to_hash.extend_from_slice(&msg_hash);
        bytes_to_hash.extend_from_slice(&counter.to_le_bytes());
        let hash: [u8; 32] = Sha256Hash::hash(&bytes_to_hash).to_byte_array();

        // Try to lift hash as the x coordinate of an even point
        match XOnlyPublicKey::from_slice(&hash) {
            Ok(pk) => {
                return Ok(NormalizedPublicKey::from_x_only_public_key(pk, Parity::Even).into())
            }
            Err(_) => {
                counter += 1;
            }
        }
    }

    Err(Error::NoValidPoint)
}

/// Hash public keys to e per [NUT-12](https://github.com/cashubtc/nuts/blob/main/12.md)
pub fn hash_e<I>(public_keys: I) -> [u8; 32]
where
    I: IntoIterator<Item = PublicKey>,
{
    let mut e: String = String::new();

    for public_key in public_keys.into_iter() {
        let uncompressed: [u8; 65] = public_key.to_uncompressed_bytes();
        e.push_str(&crate::util::hex::encode(uncompressed));
    }

    Sha256Hash::hash(e.as_bytes()).to_byte_array()
}

/// Blind Message
///
/// `B_ = Y + rG`
pub fn blind_message(
    secret: &[u8],
    blinding_factor: Option<SecretKey>,
) -> Result<(PublicKey, SecretKey), Error> {
    let y: PublicKey = hash_to_curve(secret)?;
    let r: SecretKey = blinding_factor.unwrap_or_else(SecretKey::generate);
    Ok((y.combine(&r.public_key())?.into(), r))
}

/// Unblind Message
///
/// `C = C_ - rA`
pub fn unblind_message(
    // C_
    blinded_key: &PublicKey,
    r: &SecretKey,
    // A
    mint_pubkey: &PublicKey,
) -> Result<PublicKey, Error> {
    let r: Scalar = Scalar::from(r.deref().to_owned());

    // a = r * A
    let a: PublicKey = mint_pubkey.mul_tweak(&SECP256K1, &r)?.into();

    // C_ - a
    let a: PublicKey = a.negate(&SECP256K1).into();
    Ok(blinded_key.combine(&a)?.into())
}

/// Unblind a list of promises into [`Proofs`]
///
/// Promise order is preserved; the DLEQ proof, if the mint attached one, is
/// completed with the blinding factor so the receiver can verify it offline.
pub fn construct_proofs(
    promises: Vec<BlindSignature>,
    rs: Vec<SecretKey>,
    secrets: Vec<Secret>,
    keys: &Keys,
) -> Result<Proofs, Error> {
    if (promises.len() != rs.len()) || (promises.len() != secrets.len()) {
        tracing::error!(
            "Promises: {}, rs: {}, secrets: {}",
            promises.len(),
            rs.len(),
            secrets.len()
        );
        return Err(Error::LengthMismatch);
    }

    let mut proofs = Vec::with_capacity(promises.len());
    for ((blind_signature, r), secret) in promises.into_iter().zip(rs).zip(secrets) {
        let blinded_c: PublicKey = blind_signature.c;
        let a: PublicKey = keys
            .amount_key(blind_signature.amount)
            .ok_or(Error::AmountKey)?;

        let unblinded_signature: PublicKey = unblind_message(&blinded_c, &r, &a)?;

        let dleq = blind_signature
            .dleq
            .map(|d| ProofDleq::new(d.e, d.s, r.clone()));

        let mut proof = Proof::new(
            blind_signature.amount,
            blind_signature.keyset_id,
            secret,
            unblinded_signature,
        );
        proof.dleq = dleq;

        proofs.push(proof);
    }

    Ok(proofs)
}

/// Sign Blinded Message
///
/// `C_ = a * B_`, where `a` is the mint's private key for the amount.
/// The wallet only needs this to fabricate mint responses in tests.
pub fn sign_message(a: &SecretKey, blinded_message: &PublicKey) -> Result<PublicKey, Error> {
    let a: Scalar = Scalar::from(a.deref().to_owned());
    Ok(blinded_message.mul_tweak(&SECP256K1, &a)?.into())
}

/// Verify that an unblinded signature was produced with key `a` over `msg`
pub fn verify_message(
    a: &SecretKey,
    unblinded_message: PublicKey,
    msg: &[u8],
) -> Result<(), Error> {
    // Y
    let y: PublicKey = hash_to_curve(msg)?;

    // a * Y
    let expected: PublicKey = y.mul_tweak(&SECP256K1, &Scalar::from(*a.deref()))?.into();

    if unblinded_message == expected {
        return Ok(());
    }

    Err(Error::MessageNotVerified)
}
