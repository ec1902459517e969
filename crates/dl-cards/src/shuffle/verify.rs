//! shuffle proof verification
//!
//! recomputes the challenge and every commitment opening. the permutation
//! relation between the decks is not checked (see the module docs).

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{shuffle_challenge, PedersenOpening, ShuffleProof, ShuffleStatement};
use crate::{curve, parameters::Parameters, CardProtocolError, CryptoError, Result};

/// verify a shuffle proof against its statement
///
/// malformed input (deck shape, identity points, wrong counts) is an error;
/// a well-formed proof that does not check out returns `Ok(false)`
pub fn verify_shuffle(
    pp: &Parameters,
    statement: &ShuffleStatement<'_>,
    proof: &ShuffleProof,
) -> Result<bool> {
    let n = statement.check_shape(pp)?;
    curve::ensure_not_identity(&statement.shared_key.0, "aggregate public key")?;
    #[cfg(feature = "parallel")]
    statement
        .original
        .par_iter()
        .chain(statement.shuffled.par_iter())
        .try_for_each(|card| card.ensure_well_formed())?;
    #[cfg(not(feature = "parallel"))]
    statement
        .original
        .iter()
        .chain(statement.shuffled)
        .try_for_each(|card| card.ensure_well_formed())?;
    check_counts(proof, n)?;
    check_scalars(proof)?;

    // 1. fiat-shamir challenge
    let challenge = shuffle_challenge(
        statement,
        &proof.coefficient_commitments,
        &proof.factor_commitments,
    );
    if challenge != proof.challenge {
        tracing::debug!("shuffle proof rejected: challenge mismatch");
        return Ok(false);
    }

    // 2. openings, coefficients first then masking factors
    let key = pp.commit_key();
    let listed = |j: usize| {
        if j < n {
            &proof.coefficient_commitments[j]
        } else {
            &proof.factor_commitments[j - n]
        }
    };
    let check_opening = |(j, opening): (usize, &PedersenOpening)| -> Result<bool> {
        if opening.commitment != *listed(j) {
            return Ok(false);
        }
        let recomputed = key.commit_at(j % n, &opening.opening, &opening.randomness)?;
        Ok(recomputed == opening.commitment)
    };

    #[cfg(feature = "parallel")]
    let bad = proof
        .openings
        .par_iter()
        .enumerate()
        .map(check_opening)
        .find_first(|r| !matches!(r, Ok(true)));
    #[cfg(not(feature = "parallel"))]
    let bad = proof
        .openings
        .iter()
        .enumerate()
        .map(check_opening)
        .find(|r| !matches!(r, Ok(true)));

    match bad {
        None => {
            tracing::debug!(cards = n, "shuffle proof accepted");
            Ok(true)
        }
        Some(Ok(_)) => {
            tracing::debug!("shuffle proof rejected: opening mismatch");
            Ok(false)
        }
        Some(Err(e)) => Err(e),
    }
}

fn check_counts(proof: &ShuffleProof, n: usize) -> Result<()> {
    let counts = [
        ("coefficient commitments", proof.coefficient_commitments.len(), n),
        ("masking factor commitments", proof.factor_commitments.len(), n),
        ("responses", proof.responses.len(), 2 * n),
        ("opening proofs", proof.openings.len(), 2 * n),
    ];
    for (what, got, expected) in counts {
        if got != expected {
            return Err(CardProtocolError::InvalidParameters(format!(
                "shuffle proof has {} {}, expected {}",
                got, what, expected
            )));
        }
    }
    Ok(())
}

/// every scalar must be reduced mod the group order
fn check_scalars(proof: &ShuffleProof) -> Result<()> {
    let all_canonical = curve::is_canonical(&proof.challenge)
        && curve::is_canonical(&proof.evaluation)
        && proof.responses.iter().all(curve::is_canonical)
        && proof
            .openings
            .iter()
            .all(|o| curve::is_canonical(&o.opening) && curve::is_canonical(&o.randomness));
    if !all_canonical {
        return Err(CryptoError::NonCanonicalScalar.into());
    }
    Ok(())
}
