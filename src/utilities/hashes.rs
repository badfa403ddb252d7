//! Functions relating hashes and byte conversions.
//!
//! Both parties derive every intermediate digest with Keccak-256 (the
//! original Keccak padding, as used by Ethereum, not the NIST SHA3-256
//! variant). Sender and receiver may run different implementations, so
//! these functions must stay bit-for-bit stable.

use k256::elliptic_curve::bigint::Encoding;
use k256::U256;
use sha3::{Digest, Keccak256};

use crate::SECURITY;

/// Represents the output of the hash function.
///
/// We are using Keccak-256, so the hash values have 256 bits.
pub type HashOutput = [u8; SECURITY];

/// Hash with result in bytes.
#[must_use]
pub fn hash(msg: &[u8]) -> HashOutput {
    let mut hasher = Keccak256::new();
    hasher.update(msg);

    let mut output = [0u8; SECURITY];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Hash with result as an integer.
///
/// The digest is read as a big-endian integer.
#[must_use]
pub fn hash_as_int(msg: &[u8]) -> U256 {
    U256::from_be_bytes(hash(msg))
}

/// Byte-wise XOR of two digests.
#[must_use]
pub fn xor(left: &HashOutput, right: &HashOutput) -> HashOutput {
    let mut output = [0u8; SECURITY];
    for i in 0..SECURITY {
        output[i] = left[i] ^ right[i];
    }
    output
}
