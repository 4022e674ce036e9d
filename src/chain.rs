//! Read access to the on-chain channel contract.

use async_trait::async_trait;

use crate::channel::{Address, Amount, AssetId};

/// Error of a chain read, the text of the underlying provider error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ChainError(pub String);

impl ChainError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Low-Level abstraction over the chain the channel contract lives on.
///
/// Totals are cumulative and never decrease. Retries and timeouts are up to
/// the implementation.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Total amount of `asset_id` ever deposited for alice.
    async fn get_total_deposited_a(
        &self,
        channel_address: Address,
        chain_id: u64,
        asset_id: AssetId,
    ) -> Result<Amount, ChainError>;

    /// Total amount of `asset_id` ever deposited for bob.
    async fn get_total_deposited_b(
        &self,
        channel_address: Address,
        chain_id: u64,
        asset_id: AssetId,
    ) -> Result<Amount, ChainError>;
}
