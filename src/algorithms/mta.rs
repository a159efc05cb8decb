//! Multiplicative-to-additive share conversion
//!
//! Two parties hold multiplicative shares `a` and `b` of `s = a*b mod q` and
//! end up with additive shares `alpha + beta = a*b mod q`:
//!
//! 1. the client encrypts its share under its own Paillier key,
//!    $` c_A = E_A(a) `$, and sends it over,
//! 2. the server picks a mask $` z \in Z_q `$, replies with
//!    $` c_B = c_A \otimes b \oplus E_A(z) = E_A(ab + z) `$ and keeps
//!    $` \beta = -z \mod q `$,
//! 3. the client decrypts and reduces, $` \alpha = D_A(c_B) \mod q = ab + z \mod q `$.
//!
//! A dishonest party can still run the arithmetic with out-of-range values,
//! which is what the accompanying range and receiver proofs rule out: the
//! client attaches a range proof to `c_A`, the server attaches a receiver
//! proof (optionally with a discrete-log check) to `c_B`.
//!
//! Every pass has a twin entry point taking the randomness explicitly, used
//! verbatim, so known-answer vectors can drive the protocol
//! deterministically.
use curv::arithmetic::traits::*;
use curv::elliptic::curves::{secp256_k1::Secp256k1, Point, Scalar};
use curv::BigInt;
use paillier::{
    Add, Decrypt, DecryptionKey, EncryptWithChosenRandomness, EncryptionKey, Mul, Paillier,
    Randomness, RawCiphertext, RawPlaintext,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::range_proof::{RangeCommitment, RangeProof};
use super::receiver_proof::{ReceiverCommitment, ReceiverCommitmentWc, ReceiverProof};
use super::zkp::{SampleFromMultiplicativeGroup, ZkpPublicSetup, ZkpSetup};
use super::ProofError;
use crate::ecdsa::PaillierKeys;

/// Client pass 1: encrypt the multiplicative share `a`.
///
/// Returns the ciphertext and the Paillier randomness, which the caller
/// needs for the range proof and must dispose of afterwards.
pub fn client1(a: &Scalar<Secp256k1>, ek: &EncryptionKey) -> (BigInt, BigInt) {
    let ra = BigInt::from_paillier_key(ek);
    let ca = client1_with_randomness(a, ek, &ra);
    (ca, ra)
}

/// Client pass 1 with explicit encryption randomness, used verbatim
pub fn client1_with_randomness(
    a: &Scalar<Secp256k1>,
    ek: &EncryptionKey,
    ra: &BigInt,
) -> BigInt {
    Paillier::encrypt_with_chosen_randomness(
        ek,
        RawPlaintext::from(a.to_bigint()),
        &Randomness::from(ra.clone()),
    )
    .0
    .into_owned()
}

/// Values the server keeps private between producing `c_B` and proving it
#[derive(Debug)]
pub struct ServerSecrets {
    /// The additive mask, the `y` witness of the receiver proof
    pub z: BigInt,
    /// Randomness of the homomorphic addition, the `r` witness
    pub rb: BigInt,
}

impl Zeroize for ServerSecrets {
    fn zeroize(&mut self) {
        self.z.zeroize();
        self.rb.zeroize();
    }
}

impl Drop for ServerSecrets {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Server pass: homomorphically multiply by `b`, add a fresh mask `z` and
/// derive the additive share `beta = -z mod q`.
pub fn server(
    b: &Scalar<Secp256k1>,
    ca: &BigInt,
    ek: &EncryptionKey,
) -> (BigInt, Scalar<Secp256k1>, ServerSecrets) {
    let z = BigInt::sample_below(Scalar::<Secp256k1>::group_order());
    let rb = BigInt::from_paillier_key(ek);
    let (cb, beta) = server_with_randomness(b, ca, &z, &rb, ek);
    (cb, beta, ServerSecrets { z, rb })
}

/// Server pass with explicit mask and randomness, used verbatim
pub fn server_with_randomness(
    b: &Scalar<Secp256k1>,
    ca: &BigInt,
    z: &BigInt,
    rb: &BigInt,
    ek: &EncryptionKey,
) -> (BigInt, Scalar<Secp256k1>) {
    let b_times_ca = Paillier::mul(
        ek,
        RawCiphertext::from(ca.clone()),
        RawPlaintext::from(b.to_bigint()),
    );
    let enc_z = Paillier::encrypt_with_chosen_randomness(
        ek,
        RawPlaintext::from(z.clone()),
        &Randomness::from(rb.clone()),
    );
    let cb = Paillier::add(ek, b_times_ca, enc_z).0.into_owned();
    let beta = Scalar::<Secp256k1>::zero() - Scalar::<Secp256k1>::from_bigint(z);
    (cb, beta)
}

/// Client pass 2: decrypt `c_B` and reduce into the scalar field,
/// `alpha = D_A(c_B) mod q`
pub fn client2(dk: &DecryptionKey, cb: &BigInt) -> Scalar<Secp256k1> {
    let plaintext = Paillier::decrypt(dk, &RawCiphertext::from(cb.clone()))
        .0
        .into_owned();
    Scalar::<Secp256k1>::from_bigint(&plaintext)
}

/// Sum of the local multiplicative term and the conversion outputs,
/// `a*b + alpha + beta mod q` - one party's contribution to the joint product
pub fn sum_shares(
    a: &Scalar<Secp256k1>,
    b: &Scalar<Secp256k1>,
    alpha: &Scalar<Secp256k1>,
    beta: &Scalar<Secp256k1>,
) -> Scalar<Secp256k1> {
    a * b + alpha + beta
}

/// First message of the `MtA` protocol: the client's ciphertext with its
/// range proof
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageA {
    pub c: BigInt,
    pub commitment: RangeCommitment,
    pub proof: RangeProof,
}

impl MessageA {
    /// Encrypts the share `a` and proves it is in range against the
    /// receiving server's commitment modulus
    pub fn new(
        a: &Scalar<Secp256k1>,
        alice_ek: &EncryptionKey,
        bob_setup: &ZkpPublicSetup,
    ) -> MessageA {
        let (c, mut r) = client1(a, alice_ek);
        let (commitment, proof) = RangeProof::generate(&a.to_bigint(), &c, &r, alice_ek, bob_setup);
        r.zeroize();
        MessageA {
            c,
            commitment,
            proof,
        }
    }

    /// Server-side check of the range proof
    pub fn verify(&self, alice_ek: &EncryptionKey, setup: &ZkpSetup) -> Result<(), ProofError> {
        self.proof.verify(alice_ek, setup, &self.c, &self.commitment)
    }
}

/// Selects the proof the server attaches to its response
#[derive(Debug, Clone, Copy)]
pub enum MtaMode {
    /// Receiver proof only
    MtA,
    /// Receiver proof binding the share to its public point `b*G`
    MtAwc,
}

/// The receiver proof carried by [`MessageB`], with or without the
/// discrete-log check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReceiverProofBundle {
    Plain {
        commitment: ReceiverCommitment,
        proof: ReceiverProof,
    },
    WithCheck {
        commitment: ReceiverCommitmentWc,
        proof: ReceiverProof,
        public_share: Point<Secp256k1>,
    },
}

/// The server's response in the `MtA` protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageB {
    pub c: BigInt,
    pub proof: ReceiverProofBundle,
}

impl MessageB {
    /// Runs the server pass over a received (and already verified)
    /// [`MessageA`] and proves the response.
    ///
    /// Returns the message and the server's additive share `beta`.
    pub fn new(
        b: &Scalar<Secp256k1>,
        alice_ek: &EncryptionKey,
        alice_setup: &ZkpPublicSetup,
        msg_a: &MessageA,
        mode: MtaMode,
    ) -> (MessageB, Scalar<Secp256k1>) {
        let (cb, beta, secrets) = server(b, &msg_a.c, alice_ek);

        let proof = match mode {
            MtaMode::MtA => {
                let (commitment, proof) = ReceiverProof::generate(
                    &b.to_bigint(),
                    &secrets.z,
                    &msg_a.c,
                    &cb,
                    &secrets.rb,
                    alice_ek,
                    alice_setup,
                );
                ReceiverProofBundle::Plain { commitment, proof }
            }
            MtaMode::MtAwc => {
                let (commitment, proof) = ReceiverProof::generate_wc(
                    &b.to_bigint(),
                    &secrets.z,
                    &msg_a.c,
                    &cb,
                    &secrets.rb,
                    alice_ek,
                    alice_setup,
                );
                ReceiverProofBundle::WithCheck {
                    commitment,
                    proof,
                    public_share: Point::generator() * b,
                }
            }
        };

        (MessageB { c: cb, proof }, beta)
    }

    /// Client-side finish: verify the receiver proof, then decrypt the
    /// response into the additive share `alpha`
    pub fn verify_and_decrypt(
        &self,
        ca: &BigInt,
        alice_keys: &PaillierKeys,
        alice_setup: &ZkpSetup,
    ) -> Result<Scalar<Secp256k1>, ProofError> {
        match &self.proof {
            ReceiverProofBundle::Plain { commitment, proof } => {
                proof.verify(&alice_keys.ek, alice_setup, ca, &self.c, commitment)?;
            }
            ReceiverProofBundle::WithCheck {
                commitment,
                proof,
                public_share,
            } => {
                proof.verify_wc(
                    &alice_keys.ek,
                    alice_setup,
                    ca,
                    &self.c,
                    public_share,
                    commitment,
                )?;
            }
        }
        Ok(client2(&alice_keys.dk, &self.c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::zkp::test_setup;
    use paillier::KeyGeneration;

    fn alice_keys() -> PaillierKeys {
        let (ek, dk) = Paillier::keypair().keys();
        PaillierKeys { ek, dk }
    }

    #[test]
    fn conversion_is_complete() {
        let keys = alice_keys();
        for _ in 0..4 {
            let a = Scalar::<Secp256k1>::random();
            let b = Scalar::<Secp256k1>::random();

            let (ca, _ra) = client1(&a, &keys.ek);
            let (cb, beta, _secrets) = server(&b, &ca, &keys.ek);
            let alpha = client2(&keys.dk, &cb);

            assert_eq!(&alpha + &beta, &a * &b);
        }
    }

    #[test]
    fn zero_shares_are_ordinary_scalars() {
        let keys = alice_keys();
        let zero = Scalar::<Secp256k1>::zero();
        let b = Scalar::<Secp256k1>::random();

        let (ca, _) = client1(&zero, &keys.ek);
        let (cb, beta, _) = server(&b, &ca, &keys.ek);
        let alpha = client2(&keys.dk, &cb);
        assert_eq!(&alpha + &beta, Scalar::<Secp256k1>::zero());

        let a = Scalar::<Secp256k1>::random();
        let (ca, _) = client1(&a, &keys.ek);
        let (cb, beta, _) = server(&zero, &ca, &keys.ek);
        let alpha = client2(&keys.dk, &cb);
        assert_eq!(&alpha + &beta, Scalar::<Secp256k1>::zero());
    }

    #[test]
    fn injected_randomness_is_used_verbatim() {
        let keys = alice_keys();

        let a = Scalar::<Secp256k1>::from_bigint(&BigInt::from_bytes(
            &hex::decode("1f2e3d4c5b6a79880176253449586a7b8c9dafbecfd0e1f2a3b4c5d6e7f80912")
                .unwrap(),
        ));
        let b = Scalar::<Secp256k1>::from_bigint(&BigInt::from_bytes(
            &hex::decode("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef")
                .unwrap(),
        ));
        let z = BigInt::from_bytes(
            &hex::decode("55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa")
                .unwrap(),
        );
        let ra = BigInt::from(3);
        let rb = BigInt::from(7);

        let ca = client1_with_randomness(&a, &keys.ek, &ra);
        let (cb, beta) = server_with_randomness(&b, &ca, &z, &rb, &keys.ek);

        // same inputs, same transcript, bit for bit
        assert_eq!(client1_with_randomness(&a, &keys.ek, &ra), ca);
        let (cb2, beta2) = server_with_randomness(&b, &ca, &z, &rb, &keys.ek);
        assert_eq!(cb2, cb);
        assert_eq!(beta2, beta);

        let alpha = client2(&keys.dk, &cb);
        assert_eq!(&alpha + &beta, &a * &b);
        assert_eq!(
            beta,
            Scalar::<Secp256k1>::zero() - Scalar::<Secp256k1>::from_bigint(&z)
        );
    }

    #[test]
    fn unit_randomizer_is_legal() {
        let keys = alice_keys();
        let a = Scalar::<Secp256k1>::random();
        let b = Scalar::<Secp256k1>::random();
        let z = BigInt::sample_below(Scalar::<Secp256k1>::group_order());
        let one = BigInt::one();

        let ca = client1_with_randomness(&a, &keys.ek, &one);
        let (cb, beta) = server_with_randomness(&b, &ca, &z, &one, &keys.ek);
        let alpha = client2(&keys.dk, &cb);
        assert_eq!(&alpha + &beta, &a * &b);
    }

    #[test]
    fn sum_of_shares_reassembles_product() {
        let keys = alice_keys();
        // two parties with multiplicative shares of both factors
        let a1 = Scalar::<Secp256k1>::random();
        let b1 = Scalar::<Secp256k1>::random();
        let a2 = Scalar::<Secp256k1>::random();
        let b2 = Scalar::<Secp256k1>::random();

        // a1*b2 between party 1 (client) and party 2 (server)
        let (ca, _) = client1(&a1, &keys.ek);
        let (cb, beta12, _) = server(&b2, &ca, &keys.ek);
        let alpha12 = client2(&keys.dk, &cb);

        // a2*b1 between party 2 (client) and party 1 (server)
        let keys2 = alice_keys();
        let (ca, _) = client1(&a2, &keys2.ek);
        let (cb, beta21, _) = server(&b1, &ca, &keys2.ek);
        let alpha21 = client2(&keys2.dk, &cb);

        let sum1 = sum_shares(&a1, &b1, &alpha12, &beta21);
        let sum2 = sum_shares(&a2, &b2, &alpha21, &beta12);
        let product = (&a1 + &a2) * (&b1 + &b2);
        assert_eq!(sum1 + sum2, product);
    }

    #[test]
    fn message_flow_with_range_and_receiver_proofs() {
        let _ = env_logger::builder().is_test(true).try_init();
        let alice = alice_keys();
        let alice_setup = test_setup();
        let bob_setup = test_setup();

        let a = Scalar::<Secp256k1>::random();
        let b = Scalar::<Secp256k1>::random();

        let msg_a = MessageA::new(&a, &alice.ek, &bob_setup.public_setup());
        assert!(msg_a.verify(&alice.ek, &bob_setup).is_ok());

        let (msg_b, beta) = MessageB::new(
            &b,
            &alice.ek,
            &alice_setup.public_setup(),
            &msg_a,
            MtaMode::MtA,
        );
        let alpha = msg_b
            .verify_and_decrypt(&msg_a.c, &alice, &alice_setup)
            .expect("receiver proof must verify");
        assert_eq!(&alpha + &beta, &a * &b);
    }

    #[test]
    fn message_flow_with_check() {
        let _ = env_logger::builder().is_test(true).try_init();
        let alice = alice_keys();
        let alice_setup = test_setup();
        let bob_setup = test_setup();

        let a = Scalar::<Secp256k1>::random();
        let b = Scalar::<Secp256k1>::random();

        let msg_a = MessageA::new(&a, &alice.ek, &bob_setup.public_setup());
        assert!(msg_a.verify(&alice.ek, &bob_setup).is_ok());

        let (msg_b, beta) = MessageB::new(
            &b,
            &alice.ek,
            &alice_setup.public_setup(),
            &msg_a,
            MtaMode::MtAwc,
        );

        match &msg_b.proof {
            ReceiverProofBundle::WithCheck { public_share, .. } => {
                assert_eq!(*public_share, Point::generator() * &b);
            }
            _ => panic!("expected a proof with check"),
        }

        let alpha = msg_b
            .verify_and_decrypt(&msg_a.c, &alice, &alice_setup)
            .expect("receiver proof must verify");
        assert_eq!(&alpha + &beta, &a * &b);
    }

    #[test]
    fn messages_survive_serde_round_trip() {
        let alice = alice_keys();
        let alice_setup = test_setup();
        let bob_setup = test_setup();

        let a = Scalar::<Secp256k1>::random();
        let b = Scalar::<Secp256k1>::random();

        let msg_a = MessageA::new(&a, &alice.ek, &bob_setup.public_setup());
        let restored: MessageA =
            serde_json::from_str(&serde_json::to_string(&msg_a).unwrap()).unwrap();
        assert_eq!(restored, msg_a);

        let (msg_b, _) = MessageB::new(
            &b,
            &alice.ek,
            &alice_setup.public_setup(),
            &msg_a,
            MtaMode::MtAwc,
        );
        let restored: MessageB =
            serde_json::from_str(&serde_json::to_string(&msg_b).unwrap()).unwrap();
        assert_eq!(restored, msg_b);
        assert!(restored
            .verify_and_decrypt(&msg_a.c, &alice, &alice_setup)
            .is_ok());
    }

    #[test]
    fn tampered_response_ciphertext_is_rejected() {
        let alice = alice_keys();
        let alice_setup = test_setup();
        let bob_setup = test_setup();

        let a = Scalar::<Secp256k1>::random();
        let b = Scalar::<Secp256k1>::random();

        let msg_a = MessageA::new(&a, &alice.ek, &bob_setup.public_setup());
        let (mut msg_b, _) = MessageB::new(
            &b,
            &alice.ek,
            &alice_setup.public_setup(),
            &msg_a,
            MtaMode::MtA,
        );
        msg_b.c = &msg_b.c + &BigInt::one();
        assert_eq!(
            msg_b.verify_and_decrypt(&msg_a.c, &alice, &alice_setup),
            Err(ProofError::InvalidProof)
        );
    }
}
