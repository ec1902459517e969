//! shuffle argument
//!
//! a shuffler permutes the deck and remasks every card:
//!   shuffled[i] = original[pi(i)] + (f_i * G, f_i * K)
//!
//! the proof commits to the permutation polynomial coefficients and to the
//! masking factors, derives one fiat-shamir challenge from both decks and
//! all commitments, and answers with linear responses.
//!
//! verification recomputes the challenge and the commitment openings and
//! checks shapes and ranges. it does NOT check algebraically that the
//! committed polynomial relates the two decks, so a verified proof is not a
//! soundness guarantee that the shuffled deck is a permutation of the
//! original one.

mod polynomial;
mod proof;
mod verify;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::{
    card::MaskedCard,
    curve,
    keys::AggregatePublicKey,
    masking::remask_ciphertext,
    parameters::Parameters,
    permutation::Permutation,
    transcript::Transcript,
    CardProtocolError, Result,
};

pub use polynomial::PermutationPolynomial;
pub use proof::{prove_shuffle, PedersenOpening, ShuffleProof};
pub use verify::verify_shuffle;

const SHUFFLE_DOMAIN: &[u8] = b"dl-cards.shuffle.v1";

/// public input: the deck before and after one shuffle round
#[derive(Clone, Copy, Debug)]
pub struct ShuffleStatement<'a> {
    pub shared_key: AggregatePublicKey,
    pub original: &'a [MaskedCard],
    pub shuffled: &'a [MaskedCard],
}

impl<'a> ShuffleStatement<'a> {
    pub fn new(
        shared_key: AggregatePublicKey,
        original: &'a [MaskedCard],
        shuffled: &'a [MaskedCard],
    ) -> Self {
        Self {
            shared_key,
            original,
            shuffled,
        }
    }

    /// both decks must match the configured deck size
    fn check_shape(&self, pp: &Parameters) -> Result<usize> {
        let n = pp.deck_size();
        if self.original.len() != n || self.shuffled.len() != n {
            return Err(CardProtocolError::InvalidParameters(format!(
                "deck sizes {} -> {} do not match configured deck size {}",
                self.original.len(),
                self.shuffled.len(),
                n
            )));
        }
        Ok(n)
    }
}

/// secret input of the shuffler; masking factors are wiped on drop
pub struct ShuffleWitness {
    pub permutation: Permutation,
    pub masking_factors: Vec<Scalar>,
}

impl ShuffleWitness {
    pub fn new(permutation: Permutation, masking_factors: Vec<Scalar>) -> Self {
        Self {
            permutation,
            masking_factors,
        }
    }

    fn check_shape(&self, n: usize) -> Result<()> {
        if self.permutation.len() != n {
            return Err(CardProtocolError::InvalidPermutation(format!(
                "permutation of {} for a deck of {}",
                self.permutation.len(),
                n
            )));
        }
        if self.masking_factors.len() != n {
            return Err(CardProtocolError::InvalidParameters(format!(
                "{} masking factors for a deck of {}",
                self.masking_factors.len(),
                n
            )));
        }
        for f in &self.masking_factors {
            curve::ensure_nonzero(f, "masking factor")?;
        }
        Ok(())
    }
}

impl Drop for ShuffleWitness {
    fn drop(&mut self) {
        self.masking_factors.zeroize();
    }
}

/// c = H(shared key, original deck, shuffled deck, coefficient commitments,
///       masking factor commitments)
fn shuffle_challenge(
    statement: &ShuffleStatement<'_>,
    coefficient_commitments: &[RistrettoPoint],
    factor_commitments: &[RistrettoPoint],
) -> Scalar {
    let mut t = Transcript::new(SHUFFLE_DOMAIN);
    t.append_point(b"shared_key", &statement.shared_key.0);
    t.append_u64(b"n", statement.original.len() as u64);

    for card in statement.original {
        t.append_message(b"in", &card.to_bytes());
    }
    for card in statement.shuffled {
        t.append_message(b"out", &card.to_bytes());
    }
    for c in coefficient_commitments {
        t.append_point(b"coefficient", c);
    }
    for c in factor_commitments {
        t.append_point(b"factor", c);
    }

    t.challenge_scalar(b"c")
}

/// fresh nonzero masking factors for one shuffle round
pub fn random_masking_factors<R: RngCore + CryptoRng>(rng: &mut R, n: usize) -> Vec<Scalar> {
    (0..n).map(|_| curve::random_scalar(rng)).collect()
}

/// shuffled[i] = remask(deck[pi(i)], f_i)
pub(crate) fn permute_and_remask(
    pp: &Parameters,
    shared_key: &AggregatePublicKey,
    deck: &[MaskedCard],
    witness: &ShuffleWitness,
) -> Vec<MaskedCard> {
    let remask_at = |i: usize| {
        remask_ciphertext(
            pp,
            shared_key,
            &deck[witness.permutation.get(i)],
            &witness.masking_factors[i],
        )
    };

    #[cfg(feature = "parallel")]
    {
        (0..deck.len()).into_par_iter().map(remask_at).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..deck.len()).map(remask_at).collect()
    }
}

/// permute and remask a deck, proving the result
pub fn shuffle_and_remask<R: RngCore + CryptoRng>(
    rng: &mut R,
    pp: &Parameters,
    shared_key: &AggregatePublicKey,
    deck: &[MaskedCard],
    permutation: &Permutation,
    masking_factors: &[Scalar],
) -> Result<(Vec<MaskedCard>, ShuffleProof)> {
    curve::ensure_not_identity(&shared_key.0, "aggregate public key")?;
    let n = pp.deck_size();
    if deck.len() != n {
        return Err(CardProtocolError::InvalidParameters(format!(
            "deck of {} cards, expected {}",
            deck.len(),
            n
        )));
    }
    for card in deck {
        card.ensure_well_formed()?;
    }

    let witness = ShuffleWitness::new(permutation.clone(), masking_factors.to_vec());
    witness.check_shape(n)?;

    let shuffled = permute_and_remask(pp, shared_key, deck, &witness);
    let statement = ShuffleStatement::new(*shared_key, deck, &shuffled);
    let proof = prove_shuffle(rng, pp, &statement, &witness)?;

    Ok((shuffled, proof))
}
