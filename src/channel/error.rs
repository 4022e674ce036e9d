use super::{Address, Amount, RecoveryOutcome, RequiredSigners};

/// Errors returned by the channel operations.
///
/// None of the messages contain signature bytes or key material.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid update type: {0:?}")]
    InvalidUpdateType(String),
    #[error("invalid update payload: {0}")]
    InvalidPayload(String),
    #[error("failed to sign channel commitment: {0}")]
    SigningFailure(String),
    #[error("could not generate channel commitment hash: {0}")]
    HashGenerationFailure(String),
    #[error("expected signature from {required}, recovered alice: {alice}, bob: {bob}")]
    SignatureMismatch {
        required: RequiredSigners,
        alice: RecoveryOutcome,
        bob: RecoveryOutcome,
    },
    #[error("signer {0} is neither alice nor bob")]
    NotAParticipant(Address),
    #[error("asset {0} not found in channel")]
    AssetNotFound(Address),
    #[error("insufficient balance of asset {asset}: {available} < {required}")]
    BalanceUnderflow {
        asset: Address,
        available: Amount,
        required: Amount,
    },
    #[error("balance of asset {asset} overflows")]
    BalanceOverflow { asset: Address },
    #[error("failed to read deposits from chain: {0}")]
    ChainReadFailure(String),
}
