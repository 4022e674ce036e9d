//! Applied channel updates and the requests (params) producing them.

use core::{fmt, str::FromStr};

use crate::abiencode::types::{Address, Hash, Signature, U256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AssetId, Balance, ChannelError, NetworkContext, PublicIdentifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    Setup,
    Deposit,
    Create,
    Resolve,
}

impl UpdateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateType::Setup => "setup",
            UpdateType::Deposit => "deposit",
            UpdateType::Create => "create",
            UpdateType::Resolve => "resolve",
        }
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateType {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setup" => Ok(UpdateType::Setup),
            "deposit" => Ok(UpdateType::Deposit),
            "create" => Ok(UpdateType::Create),
            "resolve" => Ok(UpdateType::Resolve),
            other => Err(ChannelError::InvalidUpdateType(other.to_string())),
        }
    }
}

/// Initial (or current) state of a conditional transfer.
///
/// Only the balance is interpreted here, everything else is defined by the
/// transfer definition contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferState {
    pub balance: Balance,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupUpdateDetails {
    pub timeout: U256,
    pub network_context: NetworkContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositUpdateDetails {
    pub total_deposits_alice: U256,
    pub total_deposits_bob: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUpdateDetails {
    pub transfer_id: Hash,
    /// Channel balance after the transfer was created.
    pub balance: Balance,
    pub transfer_definition: Address,
    pub transfer_timeout: U256,
    /// Carries the transfer's own initial balance, which is not the same as
    /// `balance`.
    pub transfer_initial_state: TransferState,
    #[serde(default)]
    pub transfer_encodings: Vec<String>,
    pub merkle_root: Hash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveUpdateDetails {
    pub transfer_id: Hash,
    pub transfer_definition: Address,
    pub transfer_resolver: Value,
    pub merkle_root: Hash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Type specific part of an applied update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UpdateDetails {
    Setup(SetupUpdateDetails),
    Deposit(DepositUpdateDetails),
    Create(CreateUpdateDetails),
    Resolve(ResolveUpdateDetails),
}

impl UpdateDetails {
    pub fn update_type(&self) -> UpdateType {
        match self {
            UpdateDetails::Setup(_) => UpdateType::Setup,
            UpdateDetails::Deposit(_) => UpdateType::Deposit,
            UpdateDetails::Create(_) => UpdateType::Create,
            UpdateDetails::Resolve(_) => UpdateType::Resolve,
        }
    }
}

/// A state transition as it was applied to a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelUpdate {
    pub channel_address: Address,
    pub from_identifier: PublicIdentifier,
    pub to_identifier: PublicIdentifier,
    pub nonce: u64,
    /// Channel balance of `asset_id` after the update.
    pub balance: Balance,
    pub asset_id: AssetId,
    pub details: UpdateDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alice_signature: Option<Signature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bob_signature: Option<Signature>,
}

impl ChannelUpdate {
    pub fn update_type(&self) -> UpdateType {
        self.details.update_type()
    }

    /// Decode an update received from the counterparty.
    ///
    /// The `details.type` tag is checked first, so an unknown tag is reported
    /// as [ChannelError::InvalidUpdateType] instead of a generic decoding
    /// error.
    pub fn from_json(value: Value) -> Result<Self, ChannelError> {
        let tag = value
            .get("details")
            .and_then(|details| details.get("type"))
            .and_then(Value::as_str)
            .ok_or_else(|| ChannelError::InvalidPayload("missing details.type".to_string()))?;
        tag.parse::<UpdateType>()?;

        serde_json::from_value(value).map_err(|e| ChannelError::InvalidPayload(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupParams {
    pub counterparty_identifier: PublicIdentifier,
    pub timeout: U256,
    pub network_context: NetworkContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Deposits carry no amounts, they are read from the chain when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositParams {
    pub channel_address: Address,
    pub asset_id: AssetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParams {
    pub channel_address: Address,
    /// Initial balance of the transfer, indexed `[initiator, responder]`.
    pub balance: Balance,
    pub asset_id: AssetId,
    pub transfer_definition: Address,
    pub transfer_initial_state: TransferState,
    pub timeout: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveParams {
    pub channel_address: Address,
    pub transfer_id: Hash,
    pub transfer_resolver: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Type specific part of an update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamsDetails {
    Setup(SetupParams),
    Deposit(DepositParams),
    Create(CreateParams),
    Resolve(ResolveParams),
}

/// A request to update a channel, the input of the update engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParams {
    pub channel_address: Address,
    pub details: ParamsDetails,
}

impl UpdateParams {
    pub fn update_type(&self) -> UpdateType {
        match self.details {
            ParamsDetails::Setup(_) => UpdateType::Setup,
            ParamsDetails::Deposit(_) => UpdateType::Deposit,
            ParamsDetails::Create(_) => UpdateType::Create,
            ParamsDetails::Resolve(_) => UpdateType::Resolve,
        }
    }
}
