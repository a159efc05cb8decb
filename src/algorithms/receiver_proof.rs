//! Zero knowledge proofs for the `MtA` server
//!
//! The server (Bob) answers the client's ciphertext `c1` with
//! $` c_2 = c_1^{x} \Gamma^{y} r^{N} \mod N^2 `$ and proves that he knows
//! $` x \in [0, q^3] `$, $` y \in [0, N] `$ and $` r \in Z^*_N `$ behind that
//! homomorphic operation. The variant "with check" additionally binds `x` to
//! a published curve point $` X = xG `$, which lets the client detect a
//! server using a share different from the one it committed to earlier in
//! the signing ceremony.
//!
//! ## Algorithm
//!
//! ```math
//! \begin{array}{lcl}
//! \textrm{\underline{Prover}}                                       &  & \textrm{\underline{Verifier}} \\ \\
//! \quad \alpha \in_R Z_{q^3},\: \beta \in_R Z^*_N,\: \gamma \in_R Z_N                    &  & \\
//! \quad \rho, \sigma, \tau \in_R Z_{q\tilde{N}},\: \rho_1 \in_R Z_{q^3\tilde{N}}         &  & \\
//! \quad z = h_1^xh_2^{\rho} \mod {\tilde{N}}                        &  & \\
//! \quad z_1 = h_1^{\alpha} h_2^{\rho_1} \mod {\tilde{N}}            &  & \\
//! \quad t = h_1^{y} h_2^{\sigma} \mod {\tilde{N}}                   &  & \\
//! \quad w = h_1^{\gamma} h_2^{\tau}  \mod {\tilde{N}}               &  & \\
//! \quad v = c_1^{\alpha} \Gamma^{\gamma} \beta^{N} \mod {N^2}       & \xrightarrow{\hspace{2pt} z, z_1, t, v, w \: (U) \hspace{2pt}} & \\
//! &  \xleftarrow{\hspace{18pt} e \hspace{18pt}}  & \quad e \in_R Z_q              \\
//! \quad s = \beta r^e \mod N                                        &  & \\
//! \quad s_1 = ex + \alpha                                           &  & \\
//! \quad s_2 = e\rho + \rho_1                                        &  & \\
//! \quad t_1 = ey + \gamma                                           &  & \\
//! \quad t_2 = e\sigma + \tau                                        & \xrightarrow{\hspace{4pt}s, s_1, s_2, t_1, t_2\hspace{4pt}}  &   \\
//! &                        & \quad s_1 \stackrel{?}{\leq} q^3                 \\
//! &                        & \quad z_1 \stackrel{?}{=} h_1^{s_1} h_2^{s_2} z^{-e}  \mod {\tilde{N}}     \\
//! &                        & \quad w \stackrel{?}{=} h_1^{t_1} h_2^{t_2} t^{-e}  \mod {\tilde{N}}     \\
//! &                        & \quad v \stackrel{?}{=} c_1^{s_1} s^{N} \Gamma^{t_1} c_2^{-e}  \mod N^2     \\
//! \end{array}
//! ```
//!
//! With check the prover also sends $` U = \alpha G `$ and the verifier
//! requires $` U = s_1 G - eX `$.
//!
//! The non-interactive challenge is
//! `e = SHA-256( g || N_tilde || h1 || h2 || q || c1 || c2 || z || z1 || t || v || w ) mod q`,
//! with `U` inserted right after `c2` in the variant with check.
#![allow(non_snake_case)]
use curv::arithmetic::traits::*;
use curv::elliptic::curves::{secp256_k1::Secp256k1, Point, Scalar};
use curv::BigInt;
use paillier::EncryptionKey;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::encoding::{from_octets, to_octets, EGS, EPS, FS_2048, FS_4096, FS_PROOF, HFS_2048};
use super::sha::TranscriptHash;
use super::zkp::{SampleFromMultiplicativeGroup, ZkpPublicSetup, ZkpSetup};
use super::ProofError;

/// Secret random values behind a [`ReceiverCommitment`].
///
/// Zeroized on every exit path once the responses are computed.
#[derive(Debug)]
pub struct ReceiverProofSecrets {
    pub alpha: BigInt,
    pub beta: BigInt,
    pub gamma: BigInt,
    pub rho: BigInt,
    pub rho1: BigInt,
    pub sigma: BigInt,
    pub tau: BigInt,
}

impl Zeroize for ReceiverProofSecrets {
    fn zeroize(&mut self) {
        self.alpha.zeroize();
        self.beta.zeroize();
        self.gamma.zeroize();
        self.rho.zeroize();
        self.rho1.zeroize();
        self.sigma.zeroize();
        self.tau.zeroize();
    }
}

impl Drop for ReceiverProofSecrets {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ReceiverProofSecrets {
    /// Samples fresh commitment randomness for the given key and setup
    pub fn random(ek: &EncryptionKey, setup: &ZkpPublicSetup) -> Self {
        let q = Scalar::<Secp256k1>::group_order();
        Self {
            alpha: BigInt::sample_below(&q.pow(3)),
            beta: BigInt::from_paillier_key(ek),
            gamma: BigInt::sample_below(&ek.n),
            rho: BigInt::sample_below(&(q * &setup.N_tilde)),
            rho1: BigInt::sample_below(&(q.pow(3) * &setup.N_tilde)),
            sigma: BigInt::sample_below(&(q * &setup.N_tilde)),
            tau: BigInt::sample_below(&(q * &setup.N_tilde)),
        }
    }
}

/// Public commitment of the receiver proof
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverCommitment {
    pub z: BigInt,
    pub z1: BigInt,
    pub t: BigInt,
    pub v: BigInt,
    pub w: BigInt,
}

impl ReceiverCommitment {
    /// Commits to the witnesses `x`, `y` against the base ciphertext `c1`
    pub fn new(
        x: &BigInt,
        y: &BigInt,
        c1: &BigInt,
        ek: &EncryptionKey,
        setup: &ZkpPublicSetup,
        rv: &ReceiverProofSecrets,
    ) -> Self {
        let N_tilde = &setup.N_tilde;
        let h1 = &setup.h1;
        let h2 = &setup.h2;
        Self {
            z: (BigInt::mod_pow(h1, x, N_tilde) * BigInt::mod_pow(h2, &rv.rho, N_tilde))
                % N_tilde,
            z1: (BigInt::mod_pow(h1, &rv.alpha, N_tilde)
                * BigInt::mod_pow(h2, &rv.rho1, N_tilde))
                % N_tilde,
            t: (BigInt::mod_pow(h1, y, N_tilde) * BigInt::mod_pow(h2, &rv.sigma, N_tilde))
                % N_tilde,
            v: (BigInt::mod_pow(c1, &rv.alpha, &ek.nn)
                * (&rv.gamma * &ek.n + BigInt::one())
                * BigInt::mod_pow(&rv.beta, &ek.n, &ek.nn))
                % &ek.nn,
            w: (BigInt::mod_pow(h1, &rv.gamma, N_tilde) * BigInt::mod_pow(h2, &rv.tau, N_tilde))
                % N_tilde,
        }
    }

    /// Canonical octets: `Z || Z1 || T || V || W`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = to_octets(&self.z, FS_2048);
        out.extend_from_slice(&to_octets(&self.z1, FS_2048));
        out.extend_from_slice(&to_octets(&self.t, FS_2048));
        out.extend_from_slice(&to_octets(&self.v, FS_4096));
        out.extend_from_slice(&to_octets(&self.w, FS_2048));
        out
    }

    /// Reads a commitment back from its canonical octets
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(
            bytes.len(),
            4 * FS_2048 + FS_4096,
            "receiver proof commitment must be {} octets",
            4 * FS_2048 + FS_4096
        );
        Self {
            z: from_octets(&bytes[..FS_2048]),
            z1: from_octets(&bytes[FS_2048..2 * FS_2048]),
            t: from_octets(&bytes[2 * FS_2048..3 * FS_2048]),
            v: from_octets(&bytes[3 * FS_2048..3 * FS_2048 + FS_4096]),
            w: from_octets(&bytes[3 * FS_2048 + FS_4096..]),
        }
    }
}

/// Receiver proof commitment extended with the discrete-log commitment
/// $` U = \alpha G `$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverCommitmentWc {
    pub commitment: ReceiverCommitment,
    pub U: Point<Secp256k1>,
}

impl ReceiverCommitmentWc {
    pub fn new(
        x: &BigInt,
        y: &BigInt,
        c1: &BigInt,
        ek: &EncryptionKey,
        setup: &ZkpPublicSetup,
        rv: &ReceiverProofSecrets,
    ) -> Self {
        Self {
            commitment: ReceiverCommitment::new(x, y, c1, ek, setup, rv),
            U: Point::generator() * Scalar::<Secp256k1>::from_bigint(&rv.alpha),
        }
    }

    /// Canonical octets: the plain commitment followed by `U` compressed
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.commitment.to_bytes();
        out.extend_from_slice(self.U.to_bytes(true).as_ref());
        out
    }

    /// Reads the commitment back, validating `U` as a curve point
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        let plain_len = 4 * FS_2048 + FS_4096;
        assert_eq!(
            bytes.len(),
            plain_len + EPS,
            "receiver proof commitment with check must be {} octets",
            plain_len + EPS
        );
        let commitment = ReceiverCommitment::from_bytes(&bytes[..plain_len]);
        let U = Point::from_bytes(&bytes[plain_len..]).map_err(|_| {
            log::trace!("commitment U does not decode to a curve point");
            ProofError::InvalidPoint
        })?;
        Ok(Self { commitment, U })
    }
}

/// Receiver proof responses, shared by the plain variant and the variant
/// with check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverProof {
    pub s: BigInt,
    pub s1: BigInt,
    pub s2: BigInt,
    pub t1: BigInt,
    pub t2: BigInt,
}

#[allow(clippy::too_many_arguments)]
impl ReceiverProof {
    /// Deterministic challenge for the plain proof
    pub fn challenge(
        ek: &EncryptionKey,
        setup: &ZkpPublicSetup,
        c1: &BigInt,
        c2: &BigInt,
        commitment: &ReceiverCommitment,
    ) -> BigInt {
        Self::transcript(ek, setup, c1, c2, None, commitment).finalize_mod_q()
    }

    /// Deterministic challenge for the proof with check; `U` enters the
    /// transcript right after `c2`
    pub fn challenge_wc(
        ek: &EncryptionKey,
        setup: &ZkpPublicSetup,
        c1: &BigInt,
        c2: &BigInt,
        commitment: &ReceiverCommitmentWc,
    ) -> BigInt {
        Self::transcript(
            ek,
            setup,
            c1,
            c2,
            Some(&commitment.U),
            &commitment.commitment,
        )
        .finalize_mod_q()
    }

    fn transcript(
        ek: &EncryptionKey,
        setup: &ZkpPublicSetup,
        c1: &BigInt,
        c2: &BigInt,
        U: Option<&Point<Secp256k1>>,
        commitment: &ReceiverCommitment,
    ) -> TranscriptHash {
        let Gen = &ek.n + &BigInt::one();
        let mut hash = TranscriptHash::new()
            .field(&Gen, FS_2048)
            .field(&setup.N_tilde, FS_2048)
            .field(&setup.h1, FS_2048)
            .field(&setup.h2, FS_2048)
            .field(Scalar::<Secp256k1>::group_order(), EGS)
            .field(c1, FS_4096)
            .field(c2, FS_4096);
        if let Some(point) = U {
            hash = hash.point(point);
        }
        hash.field(&commitment.z, FS_2048)
            .field(&commitment.z1, FS_2048)
            .field(&commitment.t, FS_2048)
            .field(&commitment.v, FS_4096)
            .field(&commitment.w, FS_2048)
    }

    /// Computes the responses for challenge `e`.
    ///
    /// `r` is the randomness of the homomorphic addition in `c2`. All linear
    /// responses are over the integers.
    pub fn prove(
        x: &BigInt,
        y: &BigInt,
        r: &BigInt,
        e: &BigInt,
        ek: &EncryptionKey,
        rv: &ReceiverProofSecrets,
    ) -> Self {
        Self {
            s: (BigInt::mod_pow(r, e, &ek.n) * &rv.beta) % &ek.n,
            s1: (e * x) + &rv.alpha,
            s2: (e * &rv.rho) + &rv.rho1,
            t1: (e * y) + &rv.gamma,
            t2: (e * &rv.sigma) + &rv.tau,
        }
    }

    /// Verifies the responses against a known challenge
    pub fn verify_with_challenge(
        &self,
        ek: &EncryptionKey,
        setup: &ZkpSetup,
        c1: &BigInt,
        c2: &BigInt,
        e: &BigInt,
        commitment: &ReceiverCommitment,
    ) -> Result<(), ProofError> {
        let N = &ek.n;
        let NN = &ek.nn;
        let N_tilde = &setup.N_tilde;
        let h1 = &setup.h1;
        let h2 = &setup.h2;

        if self.s1 > Scalar::<Secp256k1>::group_order().pow(3) {
            log::trace!("proof.s1 is larger than q^3");
            return Err(ProofError::InvalidProof);
        }

        let lhs_z = (BigInt::mod_pow(h1, &self.s1, N_tilde)
            * BigInt::mod_pow(h2, &self.s2, N_tilde))
            % N_tilde;
        let rhs_z = (BigInt::mod_pow(&commitment.z, e, N_tilde) * &commitment.z1) % N_tilde;
        if lhs_z != rhs_z {
            log::trace!("proof.z1 does not hold the right value");
            return Err(ProofError::InvalidProof);
        }

        let lhs_w = (BigInt::mod_pow(h1, &self.t1, N_tilde)
            * BigInt::mod_pow(h2, &self.t2, N_tilde))
            % N_tilde;
        let rhs_w = (BigInt::mod_pow(&commitment.t, e, N_tilde) * &commitment.w) % N_tilde;
        if lhs_w != rhs_w {
            log::trace!("proof.w does not hold the right value");
            return Err(ProofError::InvalidProof);
        }

        let lhs_v = (BigInt::mod_pow(c1, &self.s1, NN)
            * BigInt::mod_pow(&self.s, N, NN)
            * (&self.t1 * N + BigInt::one()))
            % NN;
        let rhs_v = (BigInt::mod_pow(c2, e, NN) * &commitment.v) % NN;
        if lhs_v != rhs_v {
            log::trace!("proof.v does not hold the right value");
            return Err(ProofError::InvalidProof);
        }

        Ok(())
    }

    /// Verifies the responses with the discrete-log check
    /// $` U \stackrel{?}{=} s_1 G - eX `$
    pub fn verify_wc_with_challenge(
        &self,
        ek: &EncryptionKey,
        setup: &ZkpSetup,
        c1: &BigInt,
        c2: &BigInt,
        X: &Point<Secp256k1>,
        e: &BigInt,
        commitment: &ReceiverCommitmentWc,
    ) -> Result<(), ProofError> {
        self.verify_with_challenge(ek, setup, c1, c2, e, &commitment.commitment)?;

        let s1_point = Point::generator() * Scalar::<Secp256k1>::from_bigint(&self.s1);
        let e_x = X * &Scalar::<Secp256k1>::from_bigint(e);
        if s1_point != e_x + &commitment.U {
            log::trace!("proof.U does not hold the right value");
            return Err(ProofError::InvalidProof);
        }
        Ok(())
    }

    /// Non-interactive prover for the plain proof
    pub fn generate(
        x: &BigInt,
        y: &BigInt,
        c1: &BigInt,
        c2: &BigInt,
        r: &BigInt,
        ek: &EncryptionKey,
        setup: &ZkpPublicSetup,
    ) -> (ReceiverCommitment, ReceiverProof) {
        let rv = ReceiverProofSecrets::random(ek, setup);
        let commitment = ReceiverCommitment::new(x, y, c1, ek, setup, &rv);
        let e = Self::challenge(ek, setup, c1, c2, &commitment);
        let proof = Self::prove(x, y, r, &e, ek, &rv);
        (commitment, proof)
    }

    /// Non-interactive prover for the proof with check
    pub fn generate_wc(
        x: &BigInt,
        y: &BigInt,
        c1: &BigInt,
        c2: &BigInt,
        r: &BigInt,
        ek: &EncryptionKey,
        setup: &ZkpPublicSetup,
    ) -> (ReceiverCommitmentWc, ReceiverProof) {
        let rv = ReceiverProofSecrets::random(ek, setup);
        let commitment = ReceiverCommitmentWc::new(x, y, c1, ek, setup, &rv);
        let e = Self::challenge_wc(ek, setup, c1, c2, &commitment);
        let proof = Self::prove(x, y, r, &e, ek, &rv);
        (commitment, proof)
    }

    /// Non-interactive verifier for the plain proof
    pub fn verify(
        &self,
        ek: &EncryptionKey,
        setup: &ZkpSetup,
        c1: &BigInt,
        c2: &BigInt,
        commitment: &ReceiverCommitment,
    ) -> Result<(), ProofError> {
        let e = Self::challenge(ek, &setup.public_setup(), c1, c2, commitment);
        self.verify_with_challenge(ek, setup, c1, c2, &e, commitment)
    }

    /// Non-interactive verifier for the proof with check
    pub fn verify_wc(
        &self,
        ek: &EncryptionKey,
        setup: &ZkpSetup,
        c1: &BigInt,
        c2: &BigInt,
        X: &Point<Secp256k1>,
        commitment: &ReceiverCommitmentWc,
    ) -> Result<(), ProofError> {
        let e = Self::challenge_wc(ek, &setup.public_setup(), c1, c2, commitment);
        self.verify_wc_with_challenge(ek, setup, c1, c2, X, &e, commitment)
    }

    /// Canonical octets: `S || S1 || S2 || T1 || T2`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = to_octets(&self.s, FS_2048);
        out.extend_from_slice(&to_octets(&self.s1, HFS_2048));
        out.extend_from_slice(&to_octets(&self.s2, FS_PROOF));
        out.extend_from_slice(&to_octets(&self.t1, FS_2048));
        out.extend_from_slice(&to_octets(&self.t2, FS_PROOF));
        out
    }

    /// Reads a proof back from its canonical octets
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let expected = 2 * FS_2048 + HFS_2048 + 2 * FS_PROOF;
        assert_eq!(
            bytes.len(),
            expected,
            "receiver proof must be {} octets",
            expected
        );
        let mut offset = 0;
        let mut take = |len: usize| {
            let part = from_octets(&bytes[offset..offset + len]);
            offset += len;
            part
        };
        Self {
            s: take(FS_2048),
            s1: take(HFS_2048),
            s2: take(FS_PROOF),
            t1: take(FS_2048),
            t2: take(FS_PROOF),
        }
    }
}
