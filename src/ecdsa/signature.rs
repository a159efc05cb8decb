//! ECDSA signing and the per-party assembly of the final `s` component
//!
//! Threshold signing shares the ephemeral key multiplicatively, which turns
//! the textbook formula inside out: the parties publish
//! $` R = k^{-1}G `$ while holding additive shares of `k`, and each party's
//! contribution to `s` is linear in its shares,
//! $` s_i = k_i z + r \sigma_i `$ where $` \sigma_i `$ is the party's
//! additive share of `k*sk` obtained from two `MtA` conversions. The joint
//! `s` is the plain sum of the contributions mod `q`.
//!
//! The single-party [`sign`] implements the same convention end to end, so
//! its signatures agree with what a group of parties assembles from shares.
use curv::arithmetic::traits::*;
use curv::elliptic::curves::{secp256_k1::Secp256k1, Point, Scalar};

use super::{Signature, SigningError};

/// Signs the message hash, resampling the ephemeral key until both signature
/// components are non-zero
pub fn sign(sk: &Scalar<Secp256k1>, message_hash: &Scalar<Secp256k1>) -> Signature {
    loop {
        let k = Scalar::<Secp256k1>::random();
        match sign_with_ephemeral(&k, sk, message_hash) {
            Ok(signature) => return signature,
            Err(e) => log::trace!("resampling the ephemeral key: {}", e),
        }
    }
}

/// Signs with the caller's ephemeral key, deterministically.
///
/// Rejects instead of resampling, so known-answer vectors can drive the
/// algorithm with a fixed `k`:
///
/// 1. $` R = k^{-1}G `$, $` r = R_x \mod q `$
/// 2. $` s = k(z + r \cdot sk) \mod q `$
pub fn sign_with_ephemeral(
    k: &Scalar<Secp256k1>,
    sk: &Scalar<Secp256k1>,
    message_hash: &Scalar<Secp256k1>,
) -> Result<Signature, SigningError> {
    let k_inv = k.invert().ok_or(SigningError::ZeroEphemeralKey)?;
    let big_r = Point::generator() * &k_inv;
    let r_x = big_r.x_coord().ok_or(SigningError::ZeroR)?;
    let r = Scalar::<Secp256k1>::from_bigint(&r_x.mod_floor(Scalar::<Secp256k1>::group_order()));
    if r == Scalar::<Secp256k1>::zero() {
        return Err(SigningError::ZeroR);
    }

    let s = k * &(message_hash + &(&r * sk));
    if s == Scalar::<Secp256k1>::zero() {
        return Err(SigningError::ZeroS);
    }

    Ok(Signature { r, s })
}

/// One party's contribution to the joint `s`,
/// $` s_i = k_i z + r \sigma_i \mod q `$
///
/// `k_i` is the party's additive share of the ephemeral key and `sigma_i`
/// its additive share of `k*sk` assembled from the `MtA` conversions.
pub fn partial_signature(
    k_i: &Scalar<Secp256k1>,
    sigma_i: &Scalar<Secp256k1>,
    r: &Scalar<Secp256k1>,
    message_hash: &Scalar<Secp256k1>,
) -> Scalar<Secp256k1> {
    k_i * message_hash + r * sigma_i
}

/// The joint `s`: sum of the parties' contributions mod `q`
pub fn sum_signatures(shares: &[Scalar<Secp256k1>]) -> Scalar<Secp256k1> {
    shares.iter().sum()
}
