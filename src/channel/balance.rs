use super::{Address, Amount, AssetId, Balance, ChannelError, CoreChannelState, UpdateType};

/// How a transfer moves value in or out of the channel ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferUpdate {
    /// Funds are locked into the transfer.
    Create,
    /// Funds are released from the transfer.
    Resolve,
}

impl TryFrom<UpdateType> for TransferUpdate {
    type Error = ChannelError;

    fn try_from(value: UpdateType) -> Result<Self, Self::Error> {
        match value {
            UpdateType::Create => Ok(TransferUpdate::Create),
            UpdateType::Resolve => Ok(TransferUpdate::Resolve),
            other => Err(ChannelError::InvalidUpdateType(other.to_string())),
        }
    }
}

/// Channel balance of `asset_id` after applying a transfer's value movement.
///
/// `transfer_balance` is indexed `[initiator, responder]` and is remapped onto
/// the ledger's `[alice, bob]` ordering. The ledger's `to` is kept: a transfer
/// may pay out to addresses outside of the channel.
pub fn update_channel_balance(
    update: TransferUpdate,
    asset_id: AssetId,
    transfer_balance: &Balance,
    state: &CoreChannelState,
    initiator: Address,
) -> Result<Balance, ChannelError> {
    let idx = state
        .asset_index(asset_id)
        .ok_or(ChannelError::AssetNotFound(asset_id))?;

    let existing = state
        .balances
        .get(idx)
        .copied()
        .unwrap_or_else(|| Balance::zero([state.alice, state.bob]));

    let alice_amount = if initiator == state.alice {
        transfer_balance.amount[0]
    } else {
        transfer_balance.amount[1]
    };
    let bob_amount = if initiator == state.bob {
        transfer_balance.amount[0]
    } else {
        transfer_balance.amount[1]
    };

    let apply = |current: Amount, delta: Amount| match update {
        TransferUpdate::Create => {
            current
                .checked_sub(delta)
                .ok_or(ChannelError::BalanceUnderflow {
                    asset: asset_id,
                    available: current,
                    required: delta,
                })
        }
        TransferUpdate::Resolve => current
            .checked_add(delta)
            .ok_or(ChannelError::BalanceOverflow { asset: asset_id }),
    };

    Ok(Balance {
        to: existing.to,
        amount: [
            apply(existing.amount[0], alice_amount)?,
            apply(existing.amount[1], bob_amount)?,
        ],
    })
}
