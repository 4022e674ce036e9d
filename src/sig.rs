//! Handles the creation and verification of (Ethereum) Signatures.
//!
//! The channel logic only talks to the [ChannelSigner] and
//! [SignatureRecovery] traits, [EthSigner] and [EthRecovery] implement them on
//! top of whichever secp256k1 backend is enabled.

use crate::{
    abiencode::types::{Address, Hash, Signature},
    channel::PublicIdentifier,
};
use async_trait::async_trait;
use sha3::{Digest, Keccak256};

#[cfg(feature = "k256")]
mod k256;
#[cfg(feature = "secp256k1")]
mod secp256k1;

#[cfg(feature = "secp256k1")]
pub use self::secp256k1::{recover_signer, Signer};
#[cfg(all(feature = "k256", not(feature = "secp256k1")))]
pub use self::k256::{recover_signer, Signer};

#[cfg(not(any(feature = "k256", feature = "secp256k1")))]
compile_error!("enable a signature backend: feature `k256` or `secp256k1`");


/// Errors of the signing backends.
///
/// Messages never contain signature or key bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// `v` is not 27 or 28.
    #[error("invalid recovery id")]
    InvalidRecoveryId,
    #[error("signature backend error: {0}")]
    Backend(String),
}

/// Add the `\x19Ethereum Signed Message\n<length>` prefix to hash.
///
/// This is the format expected by the Solidity contracts.
fn hash_to_eth_signed_msg_hash(hash: Hash) -> Hash {
    // Packed encoding => We can't use the encoder
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n32");
    hasher.update(hash.0);
    Hash(hasher.finalize().into())
}

/// Undo the offset of 27 Ethereum adds to the recovery id.
fn recovery_id(sig: &Signature) -> Result<u8, Error> {
    match sig.0[64] {
        v @ (27 | 28) => Ok(v - 27),
        _ => Err(Error::InvalidRecoveryId),
    }
}

/// Address derived from an uncompressed SEC1 public key (65 bytes).
fn address_from_uncompressed(pk_bytes: &[u8; 65]) -> Address {
    // See https://ethereum.stackexchange.com/questions/65233/goethereum-getting-public-key-from-private-key-hex-formatting
    //
    // Throw away the first byte, which is not part of the public key. It is
    // added by the encoding used.
    let hash: [u8; 32] = Keccak256::digest(&pk_bytes[1..]).into();

    let mut addr = Address([0; 20]);
    addr.0.copy_from_slice(&hash[32 - 20..]);
    addr
}

/// Capability of a channel participant to sign commitments.
#[async_trait]
pub trait ChannelSigner: Send + Sync {
    /// Identifier of the participant on the messaging layer.
    fn public_identifier(&self) -> &PublicIdentifier;

    /// On-chain address, this is what `alice`/`bob` of a channel refer to.
    fn address(&self) -> Address;

    /// Sign a commitment hash (`personal_sign` style).
    async fn sign_message(&self, hash: Hash) -> Result<Signature, Error>;
}

/// Recovers the signer address from a commitment hash and a signature.
#[async_trait]
pub trait SignatureRecovery: Send + Sync {
    /// Fails on malformed signature bytes.
    async fn recover(&self, hash: Hash, sig: Signature) -> Result<Address, Error>;
}

/// [ChannelSigner] holding a secp256k1 key.
#[derive(Debug)]
pub struct EthSigner {
    signer: Signer,
    identifier: PublicIdentifier,
}

impl EthSigner {
    pub fn new(signer: Signer) -> Self {
        let identifier = PublicIdentifier::from_public_key(&signer.public_key());
        Self { signer, identifier }
    }

    pub fn random<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Self {
        Self::new(Signer::new(rng))
    }

    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, Error> {
        Ok(Self::new(Signer::from_secret_bytes(secret)?))
    }
}

#[async_trait]
impl ChannelSigner for EthSigner {
    fn public_identifier(&self) -> &PublicIdentifier {
        &self.identifier
    }

    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_message(&self, hash: Hash) -> Result<Signature, Error> {
        self.signer.sign_eth(hash)
    }
}

/// [SignatureRecovery] for signatures produced by [EthSigner] (or any other
/// `personal_sign` implementation).
#[derive(Debug, Default, Clone, Copy)]
pub struct EthRecovery;

#[async_trait]
impl SignatureRecovery for EthRecovery {
    async fn recover(&self, hash: Hash, sig: Signature) -> Result<Address, Error> {
        recover_signer(hash, sig)
    }
}
