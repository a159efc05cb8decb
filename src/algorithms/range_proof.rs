//! Zero knowledge range proof for the `MtA` client
//!
//! The client (Alice) proves that she knows $` m `$ and $` r \in Z^*_N `$
//! such that $` CT = \Gamma^{m} r^{N} \mod N^2 `$ with $` \Gamma = N + 1 `$,
//! and that $` m \in [0, q^3] `$, where $` q `$ is the order of the curve.
//! Without the range bound a malicious client could shift the server's
//! additive share by a multiple of $` N `$ and learn bits of the server's
//! secret.
//!
//! ## Algorithm
//!
//! ```math
//! \begin{array}{lcl}
//! \textrm{\underline{Prover}}                                  &  & \textrm{\underline{Verifier}} \\ \\
//! \quad \alpha \in_R Z_{q^3},\: \beta \in_R Z^*_{N},\: \gamma \in_R Z_{q^3\tilde{N}},\: \rho \in_R Z_{q\tilde{N}} & & \\
//! \quad z = {h_1^m h_2^{\rho}} \mod {\tilde{N}}                &  & \\
//! \quad u = \Gamma^{\alpha} \beta^{N} \mod {N^2}               &  & \\
//! \quad w = h_1^{\alpha} h_2^{\gamma}  \mod {\tilde{N}}        & \xrightarrow{\hspace{10pt} z,u,w \hspace{10pt}} & \\
//!                                & \xleftarrow{\hspace{18pt} e \hspace{18pt}} & \quad e \in_R Z_q   \\
//!  \quad s = \beta r^e \mod{N}   &  & \\
//!  \quad s_1 = em + \alpha       &  & \\
//!  \quad s_2 = e\rho + \gamma    & \xrightarrow{\hspace{9pt}s, s_1, s_2\hspace{9pt}} & \\
//!                                & & \quad s_1 \stackrel{?}{\leq} q^3   \\
//!                                & & \quad u \stackrel{?}{=} \Gamma^{s_1} s^N CT^{-e} \mod {N^2}  \\
//!                                & & \quad w \stackrel{?}{=} h_1^{s_1} h_2^{s_2} z^{-e} \mod {\tilde{N}}  \\
//! \end{array}
//! ```
//!
//! The non-interactive variant derives the challenge from the transcript,
//! `e = SHA-256( g || N_tilde || h1 || h2 || q || CT || z || u || w ) mod q`,
//! each field in its canonical fixed-width encoding.
#![allow(non_snake_case)]
use curv::arithmetic::traits::*;
use curv::elliptic::curves::{secp256_k1::Secp256k1, Scalar};
use curv::BigInt;
use paillier::EncryptionKey;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::encoding::{from_octets, to_octets, EGS, FS_2048, FS_4096, FS_PROOF, HFS_2048};
use super::sha::TranscriptHash;
use super::zkp::{SampleFromMultiplicativeGroup, ZkpPublicSetup, ZkpSetup};
use super::ProofError;

/// Secret random values behind a [`RangeCommitment`].
///
/// Consumed when the proof responses are computed and zeroized on every exit
/// path; commitments and proofs remain freely copyable public data.
#[derive(Debug)]
pub struct RangeProofSecrets {
    pub alpha: BigInt,
    pub beta: BigInt,
    pub gamma: BigInt,
    pub rho: BigInt,
}

impl Zeroize for RangeProofSecrets {
    fn zeroize(&mut self) {
        self.alpha.zeroize();
        self.beta.zeroize();
        self.gamma.zeroize();
        self.rho.zeroize();
    }
}

impl Drop for RangeProofSecrets {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl RangeProofSecrets {
    /// Samples fresh commitment randomness for the given key and setup
    pub fn random(ek: &EncryptionKey, setup: &ZkpPublicSetup) -> Self {
        let q = Scalar::<Secp256k1>::group_order();
        Self {
            alpha: BigInt::sample_below(&q.pow(3)),
            beta: BigInt::from_paillier_key(ek),
            gamma: BigInt::sample_below(&(q.pow(3) * &setup.N_tilde)),
            rho: BigInt::sample_below(&(q * &setup.N_tilde)),
        }
    }
}

/// Public commitment of the range proof
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeCommitment {
    pub z: BigInt,
    pub u: BigInt,
    pub w: BigInt,
}

impl RangeCommitment {
    /// Commits to the message `m` with the given secret randomness.
    ///
    /// Deterministic given the secrets, so that known-answer test vectors can
    /// inject them verbatim.
    pub fn new(
        m: &BigInt,
        ek: &EncryptionKey,
        setup: &ZkpPublicSetup,
        rv: &RangeProofSecrets,
    ) -> Self {
        let N_tilde = &setup.N_tilde;
        Self {
            z: (BigInt::mod_pow(&setup.h1, m, N_tilde)
                * BigInt::mod_pow(&setup.h2, &rv.rho, N_tilde))
                % N_tilde,
            u: ((&rv.alpha * &ek.n + BigInt::one())
                * BigInt::mod_pow(&rv.beta, &ek.n, &ek.nn))
                % &ek.nn,
            w: (BigInt::mod_pow(&setup.h1, &rv.alpha, N_tilde)
                * BigInt::mod_pow(&setup.h2, &rv.gamma, N_tilde))
                % N_tilde,
        }
    }

    /// Canonical octets: `Z || U || W`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = to_octets(&self.z, FS_2048);
        out.extend_from_slice(&to_octets(&self.u, FS_4096));
        out.extend_from_slice(&to_octets(&self.w, FS_2048));
        out
    }

    /// Reads a commitment back from its canonical octets
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(
            bytes.len(),
            2 * FS_2048 + FS_4096,
            "range proof commitment must be {} octets",
            2 * FS_2048 + FS_4096
        );
        Self {
            z: from_octets(&bytes[..FS_2048]),
            u: from_octets(&bytes[FS_2048..FS_2048 + FS_4096]),
            w: from_octets(&bytes[FS_2048 + FS_4096..]),
        }
    }
}

/// Range proof responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeProof {
    pub s: BigInt,
    pub s1: BigInt,
    pub s2: BigInt,
}

impl RangeProof {
    /// Deterministic challenge binding the public parameters, the ciphertext
    /// and the commitment
    pub fn challenge(
        ek: &EncryptionKey,
        setup: &ZkpPublicSetup,
        ct: &BigInt,
        commitment: &RangeCommitment,
    ) -> BigInt {
        let Gen = &ek.n + &BigInt::one();
        TranscriptHash::new()
            .field(&Gen, FS_2048)
            .field(&setup.N_tilde, FS_2048)
            .field(&setup.h1, FS_2048)
            .field(&setup.h2, FS_2048)
            .field(Scalar::<Secp256k1>::group_order(), EGS)
            .field(ct, FS_4096)
            .field(&commitment.z, FS_2048)
            .field(&commitment.u, FS_4096)
            .field(&commitment.w, FS_2048)
            .finalize_mod_q()
    }

    /// Computes the responses for challenge `e`.
    ///
    /// `r` is the randomness used in the Paillier encryption of `m`. `s1` and
    /// `s2` are computed over the integers, not reduced.
    pub fn prove(
        m: &BigInt,
        r: &BigInt,
        e: &BigInt,
        ek: &EncryptionKey,
        rv: &RangeProofSecrets,
    ) -> Self {
        Self {
            s: (BigInt::mod_pow(r, e, &ek.n) * &rv.beta) % &ek.n,
            s1: (e * m) + &rv.alpha,
            s2: (e * &rv.rho) + &rv.gamma,
        }
    }

    /// Verifies the responses against a known challenge.
    ///
    /// The caller is the holder of the commitment-modulus private key.
    pub fn verify_with_challenge(
        &self,
        ek: &EncryptionKey,
        setup: &ZkpSetup,
        ct: &BigInt,
        e: &BigInt,
        commitment: &RangeCommitment,
    ) -> Result<(), ProofError> {
        let N = &ek.n;
        let NN = &ek.nn;
        let N_tilde = &setup.N_tilde;

        if self.s1 > Scalar::<Secp256k1>::group_order().pow(3) {
            log::trace!("proof.s1 is larger than q^3");
            return Err(ProofError::InvalidProof);
        }

        let lhs_u = ((&self.s1 * N + BigInt::one()) * BigInt::mod_pow(&self.s, N, NN)) % NN;
        let rhs_u = (BigInt::mod_pow(ct, e, NN) * &commitment.u) % NN;
        if lhs_u != rhs_u {
            log::trace!("proof.u does not hold the right value");
            return Err(ProofError::InvalidProof);
        }

        let lhs_w = (BigInt::mod_pow(&setup.h1, &self.s1, N_tilde)
            * BigInt::mod_pow(&setup.h2, &self.s2, N_tilde))
            % N_tilde;
        let rhs_w = (BigInt::mod_pow(&commitment.z, e, N_tilde) * &commitment.w) % N_tilde;
        if lhs_w != rhs_w {
            log::trace!("proof.w does not hold the right value");
            return Err(ProofError::InvalidProof);
        }

        Ok(())
    }

    /// Non-interactive prover: commitment and proof under the transcript
    /// challenge
    pub fn generate(
        m: &BigInt,
        ct: &BigInt,
        r: &BigInt,
        ek: &EncryptionKey,
        setup: &ZkpPublicSetup,
    ) -> (RangeCommitment, RangeProof) {
        let rv = RangeProofSecrets::random(ek, setup);
        let commitment = RangeCommitment::new(m, ek, setup, &rv);
        let e = Self::challenge(ek, setup, ct, &commitment);
        let proof = Self::prove(m, r, &e, ek, &rv);
        (commitment, proof)
    }

    /// Non-interactive verifier, recomputes the transcript challenge
    pub fn verify(
        &self,
        ek: &EncryptionKey,
        setup: &ZkpSetup,
        ct: &BigInt,
        commitment: &RangeCommitment,
    ) -> Result<(), ProofError> {
        let e = Self::challenge(ek, &setup.public_setup(), ct, commitment);
        self.verify_with_challenge(ek, setup, ct, &e, commitment)
    }

    /// Canonical octets: `S || S1 || S2`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = to_octets(&self.s, FS_2048);
        out.extend_from_slice(&to_octets(&self.s1, HFS_2048));
        out.extend_from_slice(&to_octets(&self.s2, FS_PROOF));
        out
    }

    /// Reads a proof back from its canonical octets
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(
            bytes.len(),
            FS_2048 + HFS_2048 + FS_PROOF,
            "range proof must be {} octets",
            FS_2048 + HFS_2048 + FS_PROOF
        );
        Self {
            s: from_octets(&bytes[..FS_2048]),
            s1: from_octets(&bytes[FS_2048..FS_2048 + HFS_2048]),
            s2: from_octets(&bytes[FS_2048 + HFS_2048..]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::zkp::test_setup;
    use paillier::{
        EncryptWithChosenRandomness, KeyGeneration, Paillier, Randomness, RawPlaintext,
    };

    fn proof_instance() -> (
        EncryptionKey,
        ZkpSetup,
        BigInt,
        BigInt,
        BigInt,
    ) {
        let (ek, _) = Paillier::keypair().keys();
        let setup = test_setup();
        let m = Scalar::<Secp256k1>::random().to_bigint();
        let r = BigInt::from_paillier_key(&ek);
        let ct = Paillier::encrypt_with_chosen_randomness(
            &ek,
            RawPlaintext::from(m.clone()),
            &Randomness::from(r.clone()),
        )
        .0
        .into_owned();
        (ek, setup, m, r, ct)
    }

    #[test]
    fn honest_proof_verifies() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (ek, setup, m, r, ct) = proof_instance();

        let (commitment, proof) = RangeProof::generate(&m, &ct, &r, &ek, &setup.public_setup());
        assert!(proof.verify(&ek, &setup, &ct, &commitment).is_ok());
    }

    #[test]
    fn challenge_is_deterministic() {
        let (ek, setup, m, _, ct) = proof_instance();
        let public = setup.public_setup();
        let rv = RangeProofSecrets::random(&ek, &public);
        let commitment = RangeCommitment::new(&m, &ek, &public, &rv);
        let e1 = RangeProof::challenge(&ek, &public, &ct, &commitment);
        let e2 = RangeProof::challenge(&ek, &public, &ct, &commitment);
        assert_eq!(e1, e2);
    }

    #[test]
    fn tampered_response_is_rejected() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (ek, setup, m, r, ct) = proof_instance();
        let (commitment, proof) = RangeProof::generate(&m, &ct, &r, &ek, &setup.public_setup());

        let mut bad = proof.clone();
        bad.s1 = &bad.s1 + &BigInt::one();
        assert_eq!(
            bad.verify(&ek, &setup, &ct, &commitment),
            Err(ProofError::InvalidProof)
        );

        let mut bad = proof;
        bad.s2 = &bad.s2 + &BigInt::one();
        assert_eq!(
            bad.verify(&ek, &setup, &ct, &commitment),
            Err(ProofError::InvalidProof)
        );
    }

    #[test]
    fn tampered_commitment_or_ciphertext_is_rejected() {
        let (ek, setup, m, r, ct) = proof_instance();
        let (commitment, proof) = RangeProof::generate(&m, &ct, &r, &ek, &setup.public_setup());

        let mut bad = commitment.clone();
        bad.z = &bad.z + &BigInt::one();
        assert_eq!(
            proof.verify(&ek, &setup, &ct, &bad),
            Err(ProofError::InvalidProof)
        );

        let bad_ct = &ct + &BigInt::one();
        assert_eq!(
            proof.verify(&ek, &setup, &bad_ct, &commitment),
            Err(ProofError::InvalidProof)
        );
    }

    #[test]
    fn byte_flips_in_serialized_proof_are_rejected() {
        let (ek, setup, m, r, ct) = proof_instance();
        let (commitment, proof) = RangeProof::generate(&m, &ct, &r, &ek, &setup.public_setup());
        let bytes = proof.to_bytes();

        // one position within each component of the proof
        for &pos in &[0usize, 255, 256, 383, 384, bytes.len() - 1] {
            let mut corrupted = bytes.clone();
            corrupted[pos] ^= 0x01;
            let bad = RangeProof::from_bytes(&corrupted);
            assert_eq!(
                bad.verify(&ek, &setup, &ct, &commitment),
                Err(ProofError::InvalidProof),
                "flip at octet {} must invalidate the proof",
                pos
            );
        }
    }

    #[test]
    fn response_range_boundary() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (ek, setup, _, r, ct) = proof_instance();
        let public = setup.public_setup();
        let q3 = Scalar::<Secp256k1>::group_order().pow(3);

        // With challenge zero the first response collapses to alpha, which
        // pins s1 to the injected value exactly.
        let m = BigInt::zero();
        let zero = BigInt::zero();

        let rv = RangeProofSecrets {
            alpha: q3.clone(),
            beta: BigInt::from_paillier_key(&ek),
            gamma: BigInt::sample_below(&(&q3 * &public.N_tilde)),
            rho: BigInt::sample_below(&(Scalar::<Secp256k1>::group_order() * &public.N_tilde)),
        };
        let commitment = RangeCommitment::new(&m, &ek, &public, &rv);
        let proof = RangeProof::prove(&m, &r, &zero, &ek, &rv);
        assert_eq!(proof.s1, q3);
        assert!(proof
            .verify_with_challenge(&ek, &setup, &ct, &zero, &commitment)
            .is_ok());

        let rv = RangeProofSecrets {
            alpha: &q3 + &BigInt::one(),
            beta: BigInt::from_paillier_key(&ek),
            gamma: BigInt::sample_below(&(&q3 * &public.N_tilde)),
            rho: BigInt::sample_below(&(Scalar::<Secp256k1>::group_order() * &public.N_tilde)),
        };
        let commitment = RangeCommitment::new(&m, &ek, &public, &rv);
        let proof = RangeProof::prove(&m, &r, &zero, &ek, &rv);
        assert_eq!(
            proof.verify_with_challenge(&ek, &setup, &ct, &zero, &commitment),
            Err(ProofError::InvalidProof)
        );
    }

    #[test]
    fn octet_round_trip() {
        let (ek, setup, m, r, ct) = proof_instance();
        let (commitment, proof) = RangeProof::generate(&m, &ct, &r, &ek, &setup.public_setup());

        let bytes = commitment.to_bytes();
        assert_eq!(bytes.len(), 1024);
        assert_eq!(RangeCommitment::from_bytes(&bytes), commitment);
        assert_eq!(RangeCommitment::from_bytes(&bytes).to_bytes(), bytes);

        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), 768);
        assert_eq!(RangeProof::from_bytes(&bytes), proof);
        assert_eq!(RangeProof::from_bytes(&bytes).to_bytes(), bytes);
    }
}
