//! Canonical octet encoding of the protocol values
//!
//! Every big integer crossing the wire is encoded big-endian and left-padded
//! with zeroes to the fixed width of its field, so that commitments and proofs
//! are bit-exactly reproducible from their octet form.

use curv::arithmetic::traits::*;
use curv::BigInt;

/// Width of a value modulo the 2048-bit Paillier or commitment modulus
pub const FS_2048: usize = 256;
/// Half width, enough for values below `q^4`
pub const HFS_2048: usize = 128;
/// Width of a value modulo `N^2`
pub const FS_4096: usize = 512;
/// Width of the proof responses with headroom for `e*rho + gamma`
pub const FS_PROOF: usize = FS_2048 + HFS_2048;
/// Width of a curve scalar
pub const EGS: usize = 32;
/// Width of a compressed curve point
pub const EPS: usize = 33;

/// Encodes `n` big-endian, left-padded to `width` octets.
///
/// A value exceeding the width of its field violates the serialization
/// contract, it cannot happen with honestly produced protocol values.
pub fn to_octets(n: &BigInt, width: usize) -> Vec<u8> {
    let bytes = n.to_bytes();
    assert!(
        bytes.len() <= width,
        "value of {} octets does not fit a field of {} octets",
        bytes.len(),
        width
    );
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(&bytes);
    out
}

/// Decodes a big-endian octet string, inverse of [`to_octets`]
pub fn from_octets(bytes: &[u8]) -> BigInt {
    BigInt::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use curv::arithmetic::traits::Samplable;

    #[test]
    fn octets_are_left_padded() {
        let n = BigInt::from(0xff00u32);
        let bytes = to_octets(&n, 4);
        assert_eq!(bytes, vec![0u8, 0, 0xff, 0]);
        assert_eq!(from_octets(&bytes), n);
    }

    #[test]
    fn round_trip_preserves_value() {
        for _ in 0..100 {
            let n = BigInt::sample(2040);
            let bytes = to_octets(&n, FS_2048);
            assert_eq!(bytes.len(), FS_2048);
            assert_eq!(from_octets(&bytes), n);
        }
    }

    #[test]
    #[should_panic]
    fn oversized_value_is_a_contract_violation() {
        let n = BigInt::sample(2056);
        let _ = to_octets(&n, FS_2048);
    }
}
