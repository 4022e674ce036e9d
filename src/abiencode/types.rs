//! Rust representations of the fixed-size Solidity types used by channels.
//!
//! On the wire (JSON) byte types are `0x`-prefixed hex strings and [U256] is a
//! decimal string, which is how the counterparty and the chain tooling
//! exchange them.

use core::{fmt, str::FromStr};

use rand::{distributions::Standard, prelude::Distribution};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uint::construct_uint;

/// Error returned when parsing one of the types in this module from a string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid hex value: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("invalid decimal amount: {0:?}")]
    InvalidAmount(String),
}

macro_rules! impl_hex_fmt {
    ($T:ident) => {
        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("0x")?;
                for b in self.0 {
                    f.write_fmt(format_args!("{:02x}", b))?;
                }
                Ok(())
            }
        }
    };
}

macro_rules! bytesN {
    ( $T:ident, $N:literal ) => {
        #[derive(PartialEq, Eq, PartialOrd, Ord, core::hash::Hash, Copy, Clone)]
        pub struct $T(pub [u8; $N]);

        impl Default for $T {
            fn default() -> Self {
                Self([0; $N])
            }
        }

        impl FromStr for $T {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let mut bytes = [0u8; $N];
                hex::decode_to_slice(s, &mut bytes)?;
                Ok(Self(bytes))
            }
        }

        impl Serialize for $T {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $T {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }

        impl Distribution<$T> for Standard {
            fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> $T {
                $T(rng.gen())
            }
        }

        impl_hex_fmt!($T);
    };
}

bytesN!(Address, 20);
bytesN!(Hash, 32);
bytesN!(Signature, 65);

impl Signature {
    pub fn new(rs: &[u8; 64], v: u8) -> Self {
        let mut sig: Signature = Signature([0; 65]);
        sig.0[..64].copy_from_slice(rs);
        sig.0[64] = v;
        sig
    }
}

// Serialized as a decimal string, unlike primitive_types::U256 (hex).
construct_uint! {
    pub struct U256(4);
}

impl U256 {
    /// Parse a non-negative decimal integer, the only accepted amount format.
    pub fn from_decimal(s: &str) -> Result<Self, ParseError> {
        U256::from_dec_str(s).map_err(|_| ParseError::InvalidAmount(s.to_string()))
    }
}

impl Serialize for U256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        U256::from_decimal(&s).map_err(de::Error::custom)
    }
}
