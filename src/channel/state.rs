//! Channel states as agreed upon by both participants.
//!
//! [CoreChannelState] is exactly what is hashed and signed, [FullChannelState]
//! adds context both parties keep locally but which must never influence the
//! commitment.

use core::fmt;

use crate::abiencode::{
    self,
    types::{Address, Hash, U256},
    Token,
};
use serde::{Deserialize, Serialize};

use super::ChannelUpdate;

/// Assets are identified by their token contract address, the zero address
/// being the chain's native asset.
pub type AssetId = Address;

/// Non-negative amount of an asset, exact to the last unit.
pub type Amount = U256;

/// Identifies a participant on the messaging layer.
///
/// Unlike the participant's [Address], this is not part of any signed state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicIdentifier(String);

impl PublicIdentifier {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    /// Identifier derived from a compressed public key.
    pub fn from_public_key(compressed: &[u8; 33]) -> Self {
        Self(format!("vector{}", hex::encode(compressed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PublicIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Amounts of a single asset, `amount[i]` belongs to `to[i]`.
///
/// In a channel ledger `to` is `[alice, bob]`, in a transfer it is
/// `[initiator, responder]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub to: [Address; 2],
    pub amount: [Amount; 2],
}

impl Balance {
    pub fn zero(to: [Address; 2]) -> Self {
        Self {
            to,
            amount: [Amount::zero(); 2],
        }
    }

    /// `struct Balance { uint256[2] amount; address[2] to; }`
    fn to_token(&self) -> Token {
        Token::Tuple(vec![
            Token::FixedArray(self.amount.iter().map(|a| Token::Uint(*a)).collect()),
            Token::FixedArray(self.to.iter().map(|a| Token::Address(*a)).collect()),
        ])
    }
}

/// Chain specific context of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkContext {
    pub chain_id: u64,
    pub channel_factory_address: Address,
    pub transfer_registry_address: Address,
}

/// The part of a channel state both participants sign.
///
/// All per-asset vectors are indexed like `asset_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreChannelState {
    pub channel_address: Address,
    pub alice: Address,
    pub bob: Address,
    pub asset_ids: Vec<AssetId>,
    pub balances: Vec<Balance>,
    pub processed_deposits_a: Vec<Amount>,
    pub processed_deposits_b: Vec<Amount>,
    pub defund_nonces: Vec<U256>,
    pub timeout: U256,
    pub nonce: u64,
    pub merkle_root: Hash,
}

impl CoreChannelState {
    /// Position of `asset_id` in the ledger.
    pub fn asset_index(&self, asset_id: AssetId) -> Option<usize> {
        self.asset_ids.iter().position(|a| *a == asset_id)
    }

    /// The Solidity `CoreChannelState` struct, as hashed by the channel
    /// contracts.
    pub(crate) fn to_token(&self) -> abiencode::Result<Token> {
        let assets = self.asset_ids.len();
        for (field, actual) in [
            ("balances", self.balances.len()),
            ("processedDepositsA", self.processed_deposits_a.len()),
            ("processedDepositsB", self.processed_deposits_b.len()),
            ("defundNonces", self.defund_nonces.len()),
        ] {
            if actual != assets {
                return Err(abiencode::Error::LedgerLengthMismatch {
                    field,
                    expected: assets,
                    actual,
                });
            }
        }

        let uints = |values: &[U256]| Token::Array(values.iter().map(|v| Token::Uint(*v)).collect());

        Ok(Token::Tuple(vec![
            Token::Address(self.channel_address),
            Token::Address(self.alice),
            Token::Address(self.bob),
            Token::Array(self.asset_ids.iter().map(|a| Token::Address(*a)).collect()),
            Token::Array(self.balances.iter().map(Balance::to_token).collect()),
            uints(&self.processed_deposits_a),
            uints(&self.processed_deposits_b),
            uints(&self.defund_nonces),
            Token::Uint(self.timeout),
            Token::Uint(self.nonce.into()),
            Token::FixedBytes(self.merkle_root),
        ]))
    }
}

/// Everything a participant stores about a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullChannelState {
    #[serde(flatten)]
    pub core: CoreChannelState,
    pub alice_identifier: PublicIdentifier,
    pub bob_identifier: PublicIdentifier,
    pub network_context: NetworkContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_update: Option<ChannelUpdate>,
    #[serde(default)]
    pub in_dispute: bool,
}

impl FullChannelState {
    /// The hash relevant part of the state, without the network context and
    /// other local bookkeeping.
    pub fn core(&self) -> &CoreChannelState {
        &self.core
    }
}
