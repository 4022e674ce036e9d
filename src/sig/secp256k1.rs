//! Signer using the secp256k1 crate (bindings to libsecp256k1).

use crate::abiencode::types::{Address, Hash, Signature};
use secp256k1::{
    self,
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1, SecretKey,
};

use super::{address_from_uncompressed, hash_to_eth_signed_msg_hash, recovery_id, Error};

impl From<secp256k1::Error> for Error {
    fn from(e: secp256k1::Error) -> Self {
        Error::Backend(e.to_string())
    }
}

impl From<PublicKey> for Address {
    fn from(pk: PublicKey) -> Self {
        address_from_uncompressed(&pk.serialize_uncompressed())
    }
}

#[derive(Debug)]
pub struct Signer {
    secp: Secp256k1<All>,
    sk: SecretKey,
    addr: Address,
}

impl Signer {
    pub fn new<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Self {
        let secp = Secp256k1::new();
        let sk = SecretKey::new(rng);
        let addr = PublicKey::from_secret_key(&secp, &sk).into();
        Self { secp, sk, addr }
    }

    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, Error> {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(secret)?;
        let addr = PublicKey::from_secret_key(&secp, &sk).into();
        Ok(Self { secp, sk, addr })
    }

    pub fn address(&self) -> Address {
        self.addr
    }

    /// Compressed SEC1 public key.
    pub fn public_key(&self) -> [u8; 33] {
        PublicKey::from_secret_key(&self.secp, &self.sk).serialize()
    }

    /// Sign a hash using a Ethereum 65-byte recoverable signature.
    ///
    /// Note that this differs from transaction signatures, as it does not
    /// include the length. 64-byte recoverable signatures would be possible,
    /// but are not implemented here for simplicity.
    pub fn sign_eth(&self, msg: Hash) -> Result<Signature, Error> {
        // Partially taken from https://github.com/synlestidae/ethereum-tx-sign/blob/master/src/lib.rs#L534

        // "\x19Ethereum Signed Message:\n32" format
        let hash = hash_to_eth_signed_msg_hash(msg);

        // We have to use sign_ecdsa_recoverable because the smart contract must
        // be able to recover the address. This gives us the additional
        // information needed for v.
        let sig = self
            .secp
            .sign_ecdsa_recoverable(&Message::from_slice(&hash.0)?, &self.sk);

        let (v, rs) = sig.serialize_compact();

        // [EIP-2](https://eips.ethereum.org/EIPS/eip-2) makes all signatures
        // with a non-canonical solution (s starts with the bit 1) invalid. The
        // library already produces canonical signatures, this debug_assert is
        // just to fail early if that changes at some point.
        debug_assert!(rs[32] & 0x80 == 0);

        // According to [EIP-2098](https://eips.ethereum.org/EIPS/eip-2098), the
        // yParity (v) is offset by 27 so the value does not collide with other
        // binary prefixes used in Bitcoin. Ethereum just kept this offset.
        let v: u8 = 27 + v.to_i32() as u8;

        Ok(Signature::new(&rs, v))
    }
}

/// Recover the signing address from a signature.
///
/// Hash is the hash of the data given to [Signer::sign_eth], it should not
/// include the `Ethereum Signed Message` prefix.
pub fn recover_signer(msg: Hash, eth_sig: Signature) -> Result<Address, Error> {
    let secp = Secp256k1::verification_only();
    let hash = hash_to_eth_signed_msg_hash(msg);

    let recid = RecoveryId::from_i32(recovery_id(&eth_sig)?.into())?;
    let sig = RecoverableSignature::from_compact(&eth_sig.0[..64], recid)?;

    let pk = secp.recover_ecdsa(&Message::from_slice(&hash.0)?, &sig)?;

    Ok(pk.into())
}
