mod balance;
mod commitment;
mod deposit;
mod error;
mod params;
mod state;
mod update;
mod validation;

pub use balance::*;
pub use commitment::*;
pub use deposit::*;
pub use error::*;
pub use params::*;
pub use state::*;
pub use update::*;
pub use validation::*;

// Re-exported because they are part of the channel data model
pub use crate::abiencode::types::{Address, Hash, Signature, U256};
