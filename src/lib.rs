//! Reconciliation and signature core of a two-party payment channel.
//!
//! The [channel] module reconstructs update requests from applied updates,
//! signs and validates channel commitments and computes balances after
//! deposits and transfers. It does not store states, talk to the
//! counterparty or submit transactions, the caller provides those through
//! the [sig::ChannelSigner], [sig::SignatureRecovery] and
//! [chain::ChainReader] traits.

mod abiencode {
    mod error;
    mod hashing;
    mod ser;

    pub mod types;

    pub use error::{Error, Result};
    pub use hashing::to_hash;
    pub use ser::{to_writer, Token, Writer};
}
pub mod chain;
pub mod channel;
pub mod schema;
pub mod sig;

#[cfg(test)]
mod test_utils;

pub use abiencode::types::{Address, Hash, ParseError, Signature, U256};
pub use abiencode::Error as EncodeError;
