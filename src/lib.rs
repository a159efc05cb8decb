//! The crate implements the multiplicative-to-additive (`MtA`) share
//! conversion protocol used by multiparty threshold ECDSA schemes in the style of
//! ["Fast multiparty threshold ECDSA with Fast trustless setup"](https://eprint.iacr.org/2019/114.pdf),
//! together with its accompanying zero-knowledge proofs.
//!
//! Two parties holding multiplicative shares `a` and `b` of a secret
//! `s = a*b mod q` convert them into additive shares `alpha` and `beta` with
//! `alpha + beta = a*b mod q`, using Paillier's additively homomorphic
//! encryption. Three proofs bind the parties to well-formed inputs:
//!
//! * a range proof showing the plaintext behind the client's ciphertext lies in `[0, q^3]`,
//! * a receiver proof showing the server's homomorphic response was computed
//!   with in-range plaintexts,
//! * a receiver proof with check, additionally binding the server's share to a
//!   public curve point.
//!
//! The proofs are implemented by the [`algorithms`](./algorithms/index.html) module.
//! Signature types and the final `s`-assembly live in the [`ecdsa`](./ecdsa/index.html) module.
#![allow(
    clippy::must_use_candidate,
    clippy::items_after_statements,
    clippy::module_name_repetitions,
    //
    clippy::missing_errors_doc // remove at some point
)]
pub mod algorithms;
pub mod ecdsa;

pub use algorithms::ProofError;
pub use ecdsa::Signature;
