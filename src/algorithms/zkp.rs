//! Commitment-modulus setup for the zero knowledge range proofs
//!
//! The proofs commit to their witnesses with a Fujisaki-Okamoto style
//! commitment $` h_1^{m} h_2^{\rho} \mod \tilde{N} `$, statistically hiding
//! and computationally binding under the hardness of discrete logarithms in
//! the subgroup generated by $` h_1 `$.
//!
//! The setup consists of the private values $` \tilde{P}, \tilde{Q} `$ (safe
//! primes) and $` \alpha `$, and the public values
//! $` \tilde{N} = \tilde{P}\tilde{Q}, \: h_1, \: h_2 = h_1^{\alpha} `$.
//! The private side stays with the party that verifies proofs against the
//! setup; provers only ever see [`ZkpPublicSetup`].
#![allow(non_snake_case)]
use curv::arithmetic::traits::*;
use curv::BigInt;
use paillier::{EncryptionKey, PrimeSampable};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::sample_generator_of_rsa_group;

pub const DEFAULT_MODULUS_BIT_LENGTH: usize = 2048;
pub const DEFAULT_SAFE_PRIME_BIT_LENGTH: usize = DEFAULT_MODULUS_BIT_LENGTH / 2;

/// Commitment-modulus key, private side held by the verifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZkpSetup {
    p: BigInt,
    q: BigInt,
    alpha: BigInt,
    pub N_tilde: BigInt,
    pub h1: BigInt,
    pub h2: BigInt,
}

/// Zeroes the memory occupied by the struct
impl Zeroize for ZkpSetup {
    fn zeroize(&mut self) {
        self.p.zeroize();
        self.q.zeroize();
        self.alpha.zeroize();
        self.N_tilde.zeroize();
        self.h1.zeroize();
        self.h2.zeroize();
    }
}

impl Drop for ZkpSetup {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Commitment-modulus key, public side shared with provers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZkpPublicSetup {
    pub N_tilde: BigInt,
    pub h1: BigInt,
    pub h2: BigInt,
}

impl ZkpSetup {
    /// Generates a new commitment modulus from two fresh safe primes.
    ///
    /// `h1` is sampled as a generator of the RSA group, `h2 = h1^alpha` with
    /// `alpha` invertible modulo $` \phi(\tilde{N}) `$ so that `h1` also lies
    /// in the subgroup generated by `h2`. Safe prime generation dominates the
    /// runtime by far.
    pub fn random(modulus_bit_length: usize) -> Self {
        let bit_length = modulus_bit_length / 2;
        let One = &BigInt::one();

        let p = BigInt::sample_safe_prime(bit_length);
        let q = BigInt::sample_safe_prime(bit_length);

        let h1 = loop {
            let h1 = sample_generator_of_rsa_group(&p, &q);
            if h1 != *One {
                break h1;
            }
        };

        let N_tilde = &p * &q;
        let mut phi = (&p - One) * (&q - One);
        let alpha = loop {
            let alpha = BigInt::strict_sample_range(One, &(&phi / &BigInt::from(4)));
            if BigInt::mod_inv(&alpha, &phi).is_some() {
                break alpha;
            }
        };
        phi.zeroize();
        let h2 = BigInt::mod_pow(&h1, &alpha, &N_tilde);

        Self {
            p,
            q,
            alpha,
            N_tilde,
            h1,
            h2,
        }
    }

    /// Public side of the setup, to be sent to provers
    pub fn public_setup(&self) -> ZkpPublicSetup {
        ZkpPublicSetup {
            N_tilde: self.N_tilde.clone(),
            h1: self.h1.clone(),
            h2: self.h2.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn phi(&self) -> BigInt {
        let One = &BigInt::one();
        (&self.p - One) * (&self.q - One)
    }
}

/// Builds a setup from ordinary Paillier primes instead of safe primes.
///
/// Orders of magnitude faster than [`ZkpSetup::random`], which makes it the
/// setup of choice for tests; the commitments lose nothing the proofs rely
/// on for completeness.
#[cfg(test)]
pub(crate) fn test_setup() -> ZkpSetup {
    use paillier::{KeyGeneration, Paillier};

    let (ek_tilde, dk_tilde) = Paillier::keypair().keys();
    let One = &BigInt::one();
    let mut phi = (&dk_tilde.p - One) * (&dk_tilde.q - One);
    let h1 = BigInt::sample_below(&ek_tilde.n);
    let alpha = loop {
        let alpha = BigInt::sample_below(&phi);
        if BigInt::mod_inv(&alpha, &phi).is_some() {
            break alpha;
        }
    };
    phi.zeroize();
    let h2 = BigInt::mod_pow(&h1, &alpha, &ek_tilde.n);
    ZkpSetup {
        p: dk_tilde.p,
        q: dk_tilde.q,
        alpha,
        N_tilde: ek_tilde.n,
        h1,
        h2,
    }
}

/// Sample a random element of a multiplicative group
pub trait SampleFromMultiplicativeGroup {
    fn from_modulo(N: &BigInt) -> BigInt;
    fn from_paillier_key(ek: &EncryptionKey) -> BigInt;
}

impl SampleFromMultiplicativeGroup for BigInt {
    fn from_modulo(N: &BigInt) -> BigInt {
        let One = BigInt::one();
        loop {
            let r = Self::sample_below(N);
            if r.gcd(N) == One {
                return r;
            }
        }
    }

    fn from_paillier_key(ek: &EncryptionKey) -> BigInt {
        Self::from_modulo(&ek.n)
    }
}
