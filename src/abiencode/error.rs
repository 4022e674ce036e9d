//! Error type and Return values used by the encoder.

/// Represents all possible errors that can happen while building the
/// encoding of a channel state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The per-asset vectors of a ledger must all have one entry per asset.
    /// Solidity would happily encode vectors of different lengths, but the
    /// resulting state would be unusable on-chain.
    #[error("{field} has {actual} entries, but the channel has {expected} assets")]
    LedgerLengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Alias for `Result` using the [Error] returned by the encoder.
pub type Result<T> = core::result::Result<T, Error>;
