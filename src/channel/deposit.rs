use crate::chain::ChainReader;
use serde::{Deserialize, Serialize};

use super::{Address, Amount, AssetId, Balance, ChannelError};

/// Balance after folding in on-chain deposits, together with the totals the
/// caller stores as the new processed watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledDeposit {
    pub balance: Balance,
    pub total_deposits_alice: Amount,
    pub total_deposits_bob: Amount,
}

/// `current + total - processed`, exact.
fn fold_deposit(
    asset_id: AssetId,
    current: Amount,
    total: Amount,
    processed: Amount,
) -> Result<Amount, ChannelError> {
    if processed > total {
        tracing::warn!(
            asset = %asset_id,
            %processed,
            %total,
            "Processed deposits exceed on-chain total"
        );
    }

    let available = current
        .checked_add(total)
        .ok_or(ChannelError::BalanceOverflow { asset: asset_id })?;
    available
        .checked_sub(processed)
        .ok_or(ChannelError::BalanceUnderflow {
            asset: asset_id,
            available,
            required: processed,
        })
}

/// Add all deposits not yet reflected in `initial_balance`.
///
/// Both totals are read concurrently. If either read fails, the whole
/// reconciliation fails, no partially updated balance is returned.
/// Reconciling again against the returned totals is a no-op.
pub async fn reconcile_deposit<C>(
    channel_address: Address,
    chain_id: u64,
    initial_balance: &Balance,
    processed_deposit_alice: Amount,
    processed_deposit_bob: Amount,
    asset_id: AssetId,
    chain_reader: &C,
) -> Result<ReconciledDeposit, ChannelError>
where
    C: ChainReader + ?Sized,
{
    let (total_deposits_alice, total_deposits_bob) = futures::try_join!(
        chain_reader.get_total_deposited_a(channel_address, chain_id, asset_id),
        chain_reader.get_total_deposited_b(channel_address, chain_id, asset_id),
    )
    .map_err(|e| ChannelError::ChainReadFailure(e.to_string()))?;

    let balance = Balance {
        to: initial_balance.to,
        amount: [
            fold_deposit(
                asset_id,
                initial_balance.amount[0],
                total_deposits_alice,
                processed_deposit_alice,
            )?,
            fold_deposit(
                asset_id,
                initial_balance.amount[1],
                total_deposits_bob,
                processed_deposit_bob,
            )?,
        ],
    };

    tracing::debug!(
        channel = %channel_address,
        chain_id,
        asset = %asset_id,
        %total_deposits_alice,
        %total_deposits_bob,
        "Reconciled deposits"
    );

    Ok(ReconciledDeposit {
        balance,
        total_deposits_alice,
        total_deposits_bob,
    })
}
