//! dl-cards: discrete-log card protocol for mental poker
//!
//! n players jointly mask, shuffle and reveal a deck without a trusted
//! dealer. cards are elgamal ciphertexts over ristretto255 under the sum of
//! all player keys; every step ships a non-interactive proof:
//!
//! - key ownership: schnorr proof bound to the player's info string
//! - masking / remasking / reveal: chaum-pedersen (dleq) proofs
//! - shuffle: commitments to the permutation polynomial and masking factors
//!
//! revealing a card needs one verified token from every player, there is no
//! threshold recovery.
//!
//! ```ignore
//! let pp = Parameters::new(13, 4)?;
//! let (pk, sk) = keygen(&mut rng, &pp);
//! let proof = prove_key_ownership(&mut rng, &pp, &pk, &sk, b"alice")?;
//! // ... collect (pk, proof, info) from every player
//! let shared = compute_aggregate_key(&pp, &players)?;
//! ```
//!
//! NOTE: shuffle verification checks the fiat-shamir challenge and the
//! commitment openings, not the permutation relation between the decks. see
//! [`shuffle`] before relying on it.

pub mod card;
pub mod curve;
pub mod dleq;
pub mod error;
pub mod keys;
pub mod masking;
pub mod parameters;
pub mod permutation;
pub mod reveal;
pub mod shuffle;
pub mod transcript;

#[cfg(test)]
mod tests;

pub use card::{Card, CardEncoding, CardIndex, DeckEncoding, MaskedCard};
pub use dleq::{DleqProof, DleqStatement};
pub use error::{CardProtocolError, CryptoError, Result};
pub use keys::{
    compute_aggregate_key, keygen, prove_key_ownership, verify_key_ownership,
    AggregatePublicKey, KeyOwnershipProof, PlayerPublicKey, PlayerSecretKey,
};
pub use masking::{
    mask, mask_deck, remask, verify_mask, verify_remask, MaskingProof, RemaskingProof,
};
pub use parameters::{Parameters, PedersenKey};
pub use permutation::Permutation;
pub use reveal::{
    compute_reveal_token, unmask, unmask_point, verify_reveal, RevealProof, RevealToken,
};
pub use shuffle::{
    prove_shuffle, random_masking_factors, shuffle_and_remask, verify_shuffle, PedersenOpening,
    PermutationPolynomial, ShuffleProof, ShuffleStatement, ShuffleWitness,
};
pub use transcript::Transcript;
