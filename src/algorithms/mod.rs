//! Zero knowledge proofs for the `MtA` protocol, commitment-modulus setup and
//! transcript hashing
//!
#![allow(non_snake_case)]
pub mod encoding;
pub mod mta;
pub mod range_proof;
pub mod receiver_proof;
pub mod sha;
pub mod zkp;

use curv::arithmetic::traits::*;
use curv::BigInt;
use thiserror::Error;

/// Outcome of a failed proof verification.
///
/// The discriminants carry the protocol error codes so that transcripts stay
/// interoperable with other implementations of the same protocol.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProofError {
    /// A verification equation does not hold, or a response is out of range
    #[error("invalid proof")]
    InvalidProof,
    /// Received octets do not decode to a point on the curve
    #[error("invalid curve point")]
    InvalidPoint,
}

impl ProofError {
    /// Numeric code of the error on the wire
    pub fn code(self) -> u32 {
        match self {
            ProofError::InvalidProof => 61,
            ProofError::InvalidPoint => 62,
        }
    }
}

/// Finds a generator of a cyclic group of prime order `p_prim`,
/// a subgroup of $` Z^{*}_p `$ with $` p' | (p-1) `$.
///
/// See "Handbook of applied cryptography", algorithm 4.80
pub fn sample_generator_of_cyclic_subgroup(p: &BigInt, p_prim: &BigInt) -> BigInt {
    const MAX_ITERATIONS_IN_REJECTION_SAMPLING: usize = 256;
    let p_minus_one = p - &BigInt::one();
    assert_eq!(
        p_minus_one.mod_floor(p_prim),
        BigInt::zero(),
        "subgroup order must divide the group order"
    );
    let exp = &p_minus_one / p_prim;
    for _ in 0..MAX_ITERATIONS_IN_REJECTION_SAMPLING {
        let h = BigInt::sample_below(p);
        if h != BigInt::one() {
            return BigInt::mod_pow(&h, &exp, p);
        }
    }
    unreachable!(
        "rejection sampling exceeded {} iterations in sample_generator_of_cyclic_subgroup()",
        MAX_ITERATIONS_IN_REJECTION_SAMPLING
    );
}

/// Solves the system of simultaneous congruences (CRT) with Gauss' algorithm
///
/// See "Handbook of applied cryptography", algorithm 2.121
pub fn crt_solver(residues: &[&BigInt], moduli: &[&BigInt]) -> BigInt {
    let n = moduli.iter().fold(BigInt::one(), |acc, &ni| acc * ni);
    let mut result = BigInt::zero();
    for (&ai, &ni) in residues.iter().zip(moduli) {
        let Ni = &n / ni;
        let Mi = BigInt::mod_inv(&Ni, ni).expect("moduli must be pairwise coprime");
        result = result + (ai * &Ni * &Mi) % &n;
    }
    result % n
}

/// Samples a generator of the RSA group modulo the product of two safe primes
///
/// Samples elements of the prime-order cyclic subgroups modulo each prime
/// and combines them with the CRT.
pub fn sample_generator_of_rsa_group(safe_p: &BigInt, safe_q: &BigInt) -> BigInt {
    let One = &BigInt::one();
    let Two = &BigInt::from(2);

    let p_prim = (safe_p - One) / Two;
    let q_prim = (safe_q - One) / Two;

    let g_p = sample_generator_of_cyclic_subgroup(safe_p, &p_prim);
    let g_q = sample_generator_of_cyclic_subgroup(safe_q, &q_prim);
    crt_solver(&[&g_p, &g_q], &[safe_p, safe_q])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crt_reconstructs_residues() {
        let p = BigInt::from(11);
        let q = BigInt::from(13);
        let x = crt_solver(&[&BigInt::from(7), &BigInt::from(4)], &[&p, &q]);
        assert_eq!(x.mod_floor(&p), BigInt::from(7));
        assert_eq!(x.mod_floor(&q), BigInt::from(4));
        assert!(x < p * q);
    }

    #[test]
    fn subgroup_element_has_expected_order() {
        // 23 = 2 * 11 + 1 is a safe prime
        let p = BigInt::from(23);
        let p_prim = BigInt::from(11);
        for _ in 0..16 {
            let g = sample_generator_of_cyclic_subgroup(&p, &p_prim);
            assert_eq!(BigInt::mod_pow(&g, &p_prim, &p), BigInt::one());
        }
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ProofError::InvalidProof.code(), 61);
        assert_eq!(ProofError::InvalidPoint.code(), 62);
    }
}
