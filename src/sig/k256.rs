//! Signer using the k256 Rust crate (implementation of ecdsa in Rust).

use crate::abiencode::types::{Address, Hash, Signature};
use k256::{
    ecdsa::{
        recoverable,
        signature::{hazmat::PrehashSigner, Signature as k256Signature},
        SigningKey, VerifyingKey,
    },
    elliptic_curve::sec1::ToEncodedPoint,
};

use super::{address_from_uncompressed, hash_to_eth_signed_msg_hash, recovery_id, Error};

impl From<k256::ecdsa::Error> for Error {
    fn from(e: k256::ecdsa::Error) -> Self {
        Error::Backend(e.to_string())
    }
}

impl From<VerifyingKey> for Address {
    fn from(key: VerifyingKey) -> Self {
        // Convert the key into an EncodedPoint (on the curve), which has the
        // data we need in bytes [1..]. An uncompressed point is always 65
        // bytes, so the conversion into an array cannot fail unless the
        // dependency changes its layout.
        let mut pk_bytes = [0u8; 65];
        pk_bytes.copy_from_slice(key.to_encoded_point(false).as_bytes());
        address_from_uncompressed(&pk_bytes)
    }
}

#[derive(Debug)]
pub struct Signer {
    key: SigningKey,
    addr: Address,
}

impl Signer {
    pub fn new<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Self {
        let key = SigningKey::random(rng);
        let addr = key.verifying_key().into();
        Self { key, addr }
    }

    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, Error> {
        let key = SigningKey::from_bytes(secret)?;
        let addr = key.verifying_key().into();
        Ok(Self { key, addr })
    }

    pub fn address(&self) -> Address {
        self.addr
    }

    /// Compressed SEC1 public key.
    pub fn public_key(&self) -> [u8; 33] {
        let mut pk = [0u8; 33];
        pk.copy_from_slice(self.key.verifying_key().to_encoded_point(true).as_bytes());
        pk
    }

    pub fn sign_eth(&self, msg: Hash) -> Result<Signature, Error> {
        // "\x19Ethereum Signed Message:\n32" format
        let hash = hash_to_eth_signed_msg_hash(msg);

        let sig: recoverable::Signature = self.key.sign_prehash(&hash.0)?;

        // Luckily for us, this Signature type already has the format we need:
        // - 65 bytes containing r, s and v in this order
        //
        // But we still have to add 27 to v for the signature to be valid in the
        // EVM.
        let mut sig_bytes = [0u8; 65];
        sig_bytes.copy_from_slice(sig.as_bytes());
        debug_assert!(sig_bytes[32] & 0x80 == 0);
        sig_bytes[64] += 27;

        Ok(Signature(sig_bytes))
    }
}

pub fn recover_signer(msg: Hash, eth_sig: Signature) -> Result<Address, Error> {
    // "\x19Ethereum Signed Message:\n32" format
    let hash = hash_to_eth_signed_msg_hash(msg);

    // Undo adding the 27, to go back to the format expected below
    let mut sig_bytes: [u8; 65] = eth_sig.0;
    sig_bytes[64] = recovery_id(&eth_sig)?;

    let sig = recoverable::Signature::from_bytes(&sig_bytes)?;

    let verifying_key = sig.recover_verifying_key_from_digest_bytes(&hash.0.into())?;
    Ok(verifying_key.into())
}
