use crate::{
    abiencode::{self, types::Hash},
    sig::ChannelSigner,
};
use serde::{Deserialize, Serialize};

use super::{ChannelError, CoreChannelState, FullChannelState, Signature};

/// Deterministic hash of a [CoreChannelState].
///
/// Semantically equal core states must hash identically. The hash is all a
/// signature commits to, so contextual fields must never reach it, which the
/// signature taking a [CoreChannelState] guarantees.
pub trait CommitmentHasher: Send + Sync {
    fn hash_core_state(&self, core: &CoreChannelState) -> Result<Hash, abiencode::Error>;
}

/// `keccak256(abi.encode(core))`, as computed by the channel contracts.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbiCommitmentHasher;

impl CommitmentHasher for AbiCommitmentHasher {
    fn hash_core_state(&self, core: &CoreChannelState) -> Result<Hash, abiencode::Error> {
        Ok(abiencode::to_hash(&[core.to_token()?]))
    }
}

/// A core state with the signatures collected for it so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commitment {
    pub core: CoreChannelState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alice_signature: Option<Signature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bob_signature: Option<Signature>,
}

impl Commitment {
    pub fn is_fully_signed(&self) -> bool {
        self.alice_signature.is_some() && self.bob_signature.is_some()
    }
}

/// Add our signature to the commitment of `state`.
///
/// Our signature goes into the slot of the participant whose address matches
/// the signer, the counterparty's signature is kept as given. A state already
/// carrying both signatures is returned unchanged without signing again.
pub async fn sign_channel_commitment<S, H>(
    state: &FullChannelState,
    signer: &S,
    hasher: &H,
    alice_signature: Option<Signature>,
    bob_signature: Option<Signature>,
) -> Result<Commitment, ChannelError>
where
    S: ChannelSigner + ?Sized,
    H: CommitmentHasher + ?Sized,
{
    let core = state.core().clone();

    if let (Some(alice_signature), Some(bob_signature)) = (alice_signature, bob_signature) {
        return Ok(Commitment {
            core,
            alice_signature: Some(alice_signature),
            bob_signature: Some(bob_signature),
        });
    }

    let address = signer.address();
    let is_alice = if address == core.alice {
        true
    } else if address == core.bob {
        false
    } else {
        return Err(ChannelError::NotAParticipant(address));
    };

    let hash = hasher
        .hash_core_state(&core)
        .map_err(|e| ChannelError::HashGenerationFailure(e.to_string()))?;
    let sig = signer
        .sign_message(hash)
        .await
        .map_err(|e| ChannelError::SigningFailure(e.to_string()))?;

    tracing::debug!(
        channel = %core.channel_address,
        nonce = core.nonce,
        signer = %address,
        as_alice = is_alice,
        "Signed channel commitment"
    );

    let (alice_signature, bob_signature) = if is_alice {
        (Some(sig), bob_signature)
    } else {
        (alice_signature, Some(sig))
    };

    Ok(Commitment {
        core,
        alice_signature,
        bob_signature,
    })
}
