//! Signer quorum of a channel commitment.
//!
//! Which participants must have signed depends on the caller (a proposal
//! only carries the proposer's signature, an applied state carries both). A
//! signature that is present must always be valid, even if its signer was not
//! required: omitting or corrupting a signature must never let a state pass.

use core::fmt;

use crate::{
    abiencode::types::{Address, Hash, Signature},
    sig::SignatureRecovery,
};
use serde::{Deserialize, Serialize};

use super::{ChannelError, CommitmentHasher, CoreChannelState};

/// Participants whose signature a state must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredSigners {
    Alice,
    Bob,
    #[default]
    Both,
}

impl fmt::Display for RequiredSigners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequiredSigners::Alice => "alice",
            RequiredSigners::Bob => "bob",
            RequiredSigners::Both => "alice + bob",
        })
    }
}

/// Result of recovering the signer of one signature slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    Recovered(Address),
    /// No signature was supplied.
    Absent,
    /// The signature could not be recovered, holds the reason.
    Malformed(String),
}

impl RecoveryOutcome {
    fn is_supplied(&self) -> bool {
        !matches!(self, RecoveryOutcome::Absent)
    }

    fn is_from(&self, expected: Address) -> bool {
        matches!(self, RecoveryOutcome::Recovered(addr) if *addr == expected)
    }
}

impl fmt::Display for RecoveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryOutcome::Recovered(addr) => write!(f, "{addr}"),
            RecoveryOutcome::Absent => f.write_str("no signature"),
            RecoveryOutcome::Malformed(reason) => write!(f, "invalid signature ({reason})"),
        }
    }
}

async fn recover_slot<R>(recovery: &R, hash: Hash, sig: Option<Signature>) -> RecoveryOutcome
where
    R: SignatureRecovery + ?Sized,
{
    match sig {
        None => RecoveryOutcome::Absent,
        Some(sig) => match recovery.recover(hash, sig).await {
            Ok(addr) => RecoveryOutcome::Recovered(addr),
            Err(e) => RecoveryOutcome::Malformed(e.to_string()),
        },
    }
}

fn quorum_reached(
    required: RequiredSigners,
    state: &CoreChannelState,
    alice: &RecoveryOutcome,
    bob: &RecoveryOutcome,
) -> bool {
    let alice_signed = alice.is_from(state.alice);
    let bob_signed = bob.is_from(state.bob);

    if alice.is_supplied() && bob.is_supplied() {
        return alice_signed && bob_signed;
    }

    match required {
        RequiredSigners::Both => alice_signed && bob_signed,
        RequiredSigners::Alice => alice_signed && !bob.is_supplied(),
        RequiredSigners::Bob => bob_signed && !alice.is_supplied(),
    }
}

/// Check that `state` is signed by the `required` participants and that no
/// invalid signature is attached.
pub async fn validate_channel_signatures<H, R>(
    state: &CoreChannelState,
    alice_signature: Option<Signature>,
    bob_signature: Option<Signature>,
    required: RequiredSigners,
    hasher: &H,
    recovery: &R,
) -> Result<(), ChannelError>
where
    H: CommitmentHasher + ?Sized,
    R: SignatureRecovery + ?Sized,
{
    let hash = hasher
        .hash_core_state(state)
        .map_err(|e| ChannelError::HashGenerationFailure(e.to_string()))?;

    let (alice, bob) = futures::join!(
        recover_slot(recovery, hash, alice_signature),
        recover_slot(recovery, hash, bob_signature),
    );

    if quorum_reached(required, state, &alice, &bob) {
        tracing::debug!(
            channel = %state.channel_address,
            nonce = state.nonce,
            %required,
            "Channel signatures valid"
        );
        Ok(())
    } else {
        tracing::warn!(
            channel = %state.channel_address,
            nonce = state.nonce,
            %required,
            %alice,
            %bob,
            "Channel signatures invalid"
        );
        Err(ChannelError::SignatureMismatch {
            required,
            alice,
            bob,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        channel::{sign_channel_commitment, AbiCommitmentHasher},
        sig::EthRecovery,
        test_utils::{self, FailingHasher, FakeRecovery},
    };

    struct Sigs {
        state: CoreChannelState,
        alice: Signature,
        bob: Signature,
    }

    async fn signed_state() -> Sigs {
        let (alice, bob) = test_utils::signers();
        let state = test_utils::full_state();
        let a = sign_channel_commitment(&state, &alice, &AbiCommitmentHasher, None, None)
            .await
            .unwrap();
        let b = sign_channel_commitment(&state, &bob, &AbiCommitmentHasher, None, None)
            .await
            .unwrap();
        Sigs {
            state: state.core,
            alice: a.alice_signature.unwrap(),
            bob: b.bob_signature.unwrap(),
        }
    }

    async fn validate(
        state: &CoreChannelState,
        alice: Option<Signature>,
        bob: Option<Signature>,
        required: RequiredSigners,
    ) -> Result<(), ChannelError> {
        validate_channel_signatures(state, alice, bob, required, &AbiCommitmentHasher, &EthRecovery)
            .await
    }

    /// Valid signature bytes, but made by neither participant.
    fn forged() -> Signature {
        let mut sig = Signature::new(&[0x11; 64], 27);
        sig.0[0] = 0x01;
        sig
    }

    /// Bytes that cannot be recovered at all.
    fn garbage() -> Signature {
        Signature::new(&[0x42; 64], 99)
    }

    #[tokio::test]
    async fn both_valid_both_required() {
        let s = signed_state().await;
        validate(&s.state, Some(s.alice), Some(s.bob), RequiredSigners::Both)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn single_signer_required() {
        let s = signed_state().await;
        validate(&s.state, Some(s.alice), None, RequiredSigners::Alice)
            .await
            .unwrap();
        validate(&s.state, None, Some(s.bob), RequiredSigners::Bob)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn extra_valid_signature_is_accepted() {
        let s = signed_state().await;
        validate(&s.state, Some(s.alice), Some(s.bob), RequiredSigners::Alice)
            .await
            .unwrap();
        validate(&s.state, Some(s.alice), Some(s.bob), RequiredSigners::Bob)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn extra_invalid_signature_is_rejected() {
        test_utils::init_tracing();
        let s = signed_state().await;

        let err = validate(&s.state, Some(s.alice), Some(garbage()), RequiredSigners::Alice)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChannelError::SignatureMismatch {
                bob: RecoveryOutcome::Malformed(_),
                ..
            }
        ));

        // A well-formed signature from someone else, in this case alice
        // signing in bob's slot.
        let res = validate(&s.state, Some(s.alice), Some(s.alice), RequiredSigners::Alice).await;
        assert!(res.is_err());
        let res = validate(&s.state, Some(forged()), Some(s.bob), RequiredSigners::Bob).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn missing_required_signature() {
        let s = signed_state().await;

        let err = validate(&s.state, None, None, RequiredSigners::Both)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ChannelError::SignatureMismatch {
                required: RequiredSigners::Both,
                alice: RecoveryOutcome::Absent,
                bob: RecoveryOutcome::Absent,
            }
        );

        assert!(validate(&s.state, Some(s.alice), None, RequiredSigners::Both)
            .await
            .is_err());
        assert!(validate(&s.state, None, Some(s.bob), RequiredSigners::Alice)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn signatures_of_other_state_are_rejected() {
        let s = signed_state().await;
        let mut state = s.state.clone();
        state.nonce += 1;

        let err = validate(&state, Some(s.alice), Some(s.bob), RequiredSigners::Both)
            .await
            .unwrap_err();
        let ChannelError::SignatureMismatch { alice, bob, .. } = err else {
            panic!("expected signature mismatch");
        };
        assert!(matches!(alice, RecoveryOutcome::Recovered(addr) if addr != state.alice));
        assert!(matches!(bob, RecoveryOutcome::Recovered(addr) if addr != state.bob));
    }

    #[tokio::test]
    async fn unrecoverable_signature_is_reported_per_slot() {
        let state = test_utils::full_state().core;
        let (sig_a, sig_b) = (Signature::new(&[1; 64], 27), Signature::new(&[2; 64], 28));
        let recovery = FakeRecovery::default()
            .with_signer(sig_a, state.alice)
            .with_malformed(sig_b, "s out of range");

        let res = validate_channel_signatures(
            &state,
            Some(sig_a),
            Some(sig_b),
            RequiredSigners::Alice,
            &AbiCommitmentHasher,
            &recovery,
        )
        .await;

        assert_eq!(
            res,
            Err(ChannelError::SignatureMismatch {
                required: RequiredSigners::Alice,
                alice: RecoveryOutcome::Recovered(state.alice),
                bob: RecoveryOutcome::Malformed(
                    "signature backend error: s out of range".to_string()
                ),
            })
        );
    }

    #[tokio::test]
    async fn signer_swap_is_rejected() {
        let state = test_utils::full_state().core;
        let (sig_a, sig_b) = (Signature::new(&[1; 64], 27), Signature::new(&[2; 64], 28));
        // Both signatures valid, but each one sits in the other's slot.
        let recovery = FakeRecovery::default()
            .with_signer(sig_a, state.bob)
            .with_signer(sig_b, state.alice);

        for required in [RequiredSigners::Alice, RequiredSigners::Bob, RequiredSigners::Both] {
            let res = validate_channel_signatures(
                &state,
                Some(sig_a),
                Some(sig_b),
                required,
                &AbiCommitmentHasher,
                &recovery,
            )
            .await;
            assert!(matches!(res, Err(ChannelError::SignatureMismatch { .. })));
        }
    }

    #[tokio::test]
    async fn hash_failure_short_circuits() {
        let s = signed_state().await;

        let res = validate_channel_signatures(
            &s.state,
            Some(s.alice),
            Some(s.bob),
            RequiredSigners::Both,
            &FailingHasher,
            &EthRecovery,
        )
        .await;

        assert!(matches!(res, Err(ChannelError::HashGenerationFailure(_))));
    }

    #[tokio::test]
    async fn error_message_names_signers_not_bytes() {
        let s = signed_state().await;

        let err = validate(&s.state, Some(s.alice), Some(garbage()), RequiredSigners::Both)
            .await
            .unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("alice + bob"));
        assert!(msg.contains(&s.state.alice.to_string()));
        assert!(!msg.contains(&hex::encode(s.alice.0)));
        assert!(!msg.contains(&hex::encode(garbage().0)));
    }
}
