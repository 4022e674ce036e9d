use super::{
    ChannelUpdate, CreateParams, DepositParams, ParamsDetails, PublicIdentifier, ResolveParams,
    SetupParams, UpdateDetails, UpdateParams,
};

/// Recover the request that produced an applied update.
///
/// Used to catch up on an update we missed: the request is re-validated and
/// re-applied instead of trusting the counterparty's resulting state. Values
/// the update engine derives while applying (the channel balance after a
/// create, deposit totals) are never copied into the params.
pub fn reconstruct_params(update: &ChannelUpdate, own_identifier: &PublicIdentifier) -> UpdateParams {
    let details = match &update.details {
        UpdateDetails::Setup(details) => {
            let counterparty_identifier = if update.to_identifier == *own_identifier {
                update.from_identifier.clone()
            } else {
                update.to_identifier.clone()
            };
            ParamsDetails::Setup(SetupParams {
                counterparty_identifier,
                timeout: details.timeout,
                network_context: details.network_context,
                meta: details.meta.clone(),
            })
        }
        UpdateDetails::Deposit(details) => ParamsDetails::Deposit(DepositParams {
            channel_address: update.channel_address,
            asset_id: update.asset_id,
            meta: details.meta.clone(),
        }),
        UpdateDetails::Create(details) => ParamsDetails::Create(CreateParams {
            channel_address: update.channel_address,
            // `details.balance` is the channel balance after the update
            balance: details.transfer_initial_state.balance,
            asset_id: update.asset_id,
            transfer_definition: details.transfer_definition,
            transfer_initial_state: details.transfer_initial_state.clone(),
            timeout: details.transfer_timeout,
            meta: details.meta.clone(),
        }),
        UpdateDetails::Resolve(details) => ParamsDetails::Resolve(ResolveParams {
            channel_address: update.channel_address,
            transfer_id: details.transfer_id,
            transfer_resolver: details.transfer_resolver.clone(),
            meta: details.meta.clone(),
        }),
    };

    tracing::trace!(
        channel = %update.channel_address,
        nonce = update.nonce,
        update_type = %update.update_type(),
        "Reconstructed update params"
    );

    UpdateParams {
        channel_address: update.channel_address,
        details,
    }
}
