use super::{to_writer, types::Hash, Token, Writer};

use sha3::{digest::Output, Digest, Keccak256};

#[derive(Default)]
pub struct Keccak256Writer {
    hasher: Keccak256,
}

impl Writer for Keccak256Writer {
    fn write(&mut self, slot: &[u8]) {
        self.hasher.update(slot);
    }
}

impl Keccak256Writer {
    pub fn finalize(self) -> Output<Keccak256> {
        self.hasher.finalize()
    }
}

/// `keccak256(abi.encode(tokens...))`
pub fn to_hash(tokens: &[Token]) -> Hash {
    let mut writer = Keccak256Writer::default();
    to_writer(tokens, &mut writer);
    Hash(writer.finalize().into())
}
