//! Fiat-Shamir transcript hashing
//!
//! A challenge is derived as `e = SHA-256( f_1 || f_2 || ... ) mod q` where
//! every field `f_i` is absorbed in its canonical fixed-width big-endian
//! encoding. The same transcript therefore always produces the same
//! challenge, and the challenge binds the verifier's public parameters, the
//! ciphertexts and the prover's commitment together.

use curv::arithmetic::traits::*;
use curv::elliptic::curves::{secp256_k1::Secp256k1, Point, Scalar};
use curv::BigInt;
use sha2::{Digest, Sha256};

use super::encoding::to_octets;

/// Incremental Fiat-Shamir transcript over SHA-256
pub struct TranscriptHash {
    hasher: Sha256,
}

impl TranscriptHash {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Absorbs a big integer in its fixed-width encoding
    pub fn field(mut self, n: &BigInt, width: usize) -> Self {
        self.hasher.update(&to_octets(n, width));
        self
    }

    /// Absorbs a curve point in its compressed encoding
    pub fn point(mut self, p: &Point<Secp256k1>) -> Self {
        self.hasher.update(p.to_bytes(true).as_ref());
        self
    }

    /// Produces the challenge, reduced into the scalar field
    pub fn finalize_mod_q(self) -> BigInt {
        let digest = self.hasher.finalize();
        BigInt::from_bytes(&digest).mod_floor(Scalar::<Secp256k1>::group_order())
    }
}

impl Default for TranscriptHash {
    fn default() -> Self {
        Self::new()
    }
}

/// Samples a random challenge `e` in `[0, q]`.
///
/// Used in place of the deterministic transcript challenge to run any of the
/// proofs interactively, e.g. against implementations that expect the
/// verifier to pick `e`.
pub fn random_challenge() -> BigInt {
    let q = Scalar::<Secp256k1>::group_order();
    BigInt::sample_below(&(q + &BigInt::one()))
}
