//! ECDSA signature types and helpers shared by the `MtA`-based signing flow
//!
//! The module holds the Paillier key wrapper of the `MtA` client, message
//! hashing, and the signature container with its standard verification
//! algorithm. The signing operations, including the per-party `s`-share
//! assembly, live in the [`signature`](./signature/index.html) submodule.
use curv::arithmetic::traits::*;
use curv::elliptic::curves::{secp256_k1::Secp256k1, Point, Scalar};
use curv::BigInt;
use paillier::{Decrypt, DecryptionKey, EncryptionKey, KeyGeneration, Paillier, RawCiphertext};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use thiserror::Error;
use zeroize::Zeroize;

pub mod signature;

/// Current recommended bit size for the primes in the Paillier scheme
pub(crate) const PRIME_BIT_LENGTH_IN_PAILLIER_SCHEMA: usize = 1024;

/// Errors of the deterministic signing path
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SigningError {
    /// The ephemeral key is zero or otherwise not invertible
    #[error("ephemeral key is not invertible")]
    ZeroEphemeralKey,
    /// The ephemeral key maps to `r = 0`, a fresh key is required
    #[error("signature component r is zero")]
    ZeroR,
    /// The inputs produce `s = 0`, a fresh ephemeral key is required
    #[error("signature component s is zero")]
    ZeroS,
}

/// Public/private key pair for the additive homomorphic encryption scheme
#[derive(Clone, Serialize, Deserialize)]
pub struct PaillierKeys {
    pub dk: DecryptionKey,
    pub ek: EncryptionKey,
}

impl Zeroize for PaillierKeys {
    fn zeroize(&mut self) {
        self.dk.p.zeroize();
        self.dk.q.zeroize();
        self.ek.n.zeroize();
        self.ek.nn.zeroize();
    }
}

impl Drop for PaillierKeys {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl PaillierKeys {
    /// Produces a new Paillier key pair
    pub fn random() -> Self {
        let (ek, dk) =
            Paillier::keypair_with_modulus_size(2 * PRIME_BIT_LENGTH_IN_PAILLIER_SCHEMA).keys();
        Self { dk, ek }
    }

    /// Decrypts the given ciphertext
    pub fn decrypt(&self, c: &BigInt) -> BigInt {
        Paillier::decrypt(&self.dk, &RawCiphertext::from(c.clone()))
            .0
            .into_owned()
    }
}

impl Display for PaillierKeys {
    /// hides the private key of the scheme
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaillierKeys")
            .field("dk", &"[***]".to_owned())
            .field("ek", &self.ek)
            .finish()
    }
}

impl Debug for PaillierKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Hash of the message being signed, reduced into the scalar field.
///
/// SHA-256 matches the bit length of the secp256k1 group order, so the
/// truncation step of the standard collapses to a reduction.
pub fn message_hash(message: &[u8]) -> Scalar<Secp256k1> {
    let digest = Sha256::digest(message);
    Scalar::<Secp256k1>::from_bigint(&BigInt::from_bytes(&digest))
}

/// The result of the ECDSA signing algorithm
///
/// For message hash $` z `$, private key $` x `$ and random
/// $` k \in \mathbb{Z}_{q} `$ the signature is
/// ```math
///    r = F(k^{-1}g) , \space s = k(z + x r) \mod q
/// ```
/// where $` F `$ maps a group element to the x coordinate reduced mod `q`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub r: Scalar<Secp256k1>,
    pub s: Scalar<Secp256k1>,
}

impl Signature {
    /// Verifies the signature using the public key and the hash of the message
    pub fn verify(&self, pubkey: &Point<Secp256k1>, message: &Scalar<Secp256k1>) -> bool {
        if self.s == Scalar::<Secp256k1>::zero() || self.r == Scalar::<Secp256k1>::zero() {
            return false;
        }
        let s_invert = match self.s.invert() {
            Some(s) => s,
            None => return false,
        };
        let u1 = message * &s_invert;
        let u2 = &self.r * &s_invert;

        let rhs = Point::generator() * u1 + pubkey * &u2;
        match rhs.x_coord() {
            Some(x) => {
                self.r
                    == Scalar::<Secp256k1>::from_bigint(
                        &x.mod_floor(Scalar::<Secp256k1>::group_order()),
                    )
            }
            None => false,
        }
    }
}
