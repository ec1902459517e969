//! elgamal masking and remasking of cards with consistency proofs
//!
//! mask:   (c1, c2) = (alpha * G, card + alpha * K)
//! remask: (c1', c2') = (c1 + beta * G, c2 + beta * K)
//!
//! a remasking proof only covers the delta (beta * G, beta * K), so it can be
//! checked without knowing which card sits under the ciphertext.

use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};

use crate::{
    card::{Card, MaskedCard},
    curve,
    dleq::{DleqProof, DleqStatement},
    keys::AggregatePublicKey,
    parameters::Parameters,
    CardProtocolError, Result,
};

const MASKING_LABEL: &[u8] = b"dl-cards.masking.v1";
const REMASKING_LABEL: &[u8] = b"dl-cards.remasking.v1";

/// proof that one alpha satisfies c1 = alpha * G and c2 - card = alpha * K
pub type MaskingProof = DleqProof;

/// proof that one beta produced both components of the remasking delta
pub type RemaskingProof = DleqProof;

fn masking_statement(
    pp: &Parameters,
    shared_key: &AggregatePublicKey,
    card: &Card,
    masked: &MaskedCard,
) -> DleqStatement {
    DleqStatement {
        base_a: *pp.generator(),
        base_b: shared_key.0,
        public_a: masked.randomness,
        public_b: masked.ciphertext - card.point,
    }
}

fn remasking_statement(
    pp: &Parameters,
    shared_key: &AggregatePublicKey,
    original: &MaskedCard,
    remasked: &MaskedCard,
) -> DleqStatement {
    let (diff_c1, diff_c2) = remasked.delta(original);
    DleqStatement {
        base_a: *pp.generator(),
        base_b: shared_key.0,
        public_a: diff_c1,
        public_b: diff_c2,
    }
}

/// apply a remasking factor without proving anything; used by the shuffle
pub(crate) fn remask_ciphertext(
    pp: &Parameters,
    shared_key: &AggregatePublicKey,
    masked: &MaskedCard,
    beta: &Scalar,
) -> MaskedCard {
    MaskedCard::new(
        masked.randomness + beta * pp.generator(),
        masked.ciphertext + beta * shared_key.0,
    )
}

pub fn mask<R: RngCore + CryptoRng>(
    rng: &mut R,
    pp: &Parameters,
    shared_key: &AggregatePublicKey,
    card: &Card,
    alpha: &Scalar,
) -> Result<(MaskedCard, MaskingProof)> {
    curve::ensure_not_identity(&shared_key.0, "aggregate public key")?;
    curve::ensure_nonzero(alpha, "masking factor")?;

    let masked = MaskedCard::new(alpha * pp.generator(), card.point + alpha * shared_key.0);
    let statement = masking_statement(pp, shared_key, card, &masked);
    let proof = DleqProof::prove(rng, MASKING_LABEL, &statement, alpha);

    Ok((masked, proof))
}

/// checks e * G == P + c * c1 and e * K == Q + c * (c2 - card)
pub fn verify_mask(
    pp: &Parameters,
    shared_key: &AggregatePublicKey,
    card: &Card,
    masked: &MaskedCard,
    proof: &MaskingProof,
) -> Result<bool> {
    curve::ensure_not_identity(&shared_key.0, "aggregate public key")?;
    masked.ensure_well_formed()?;

    let statement = masking_statement(pp, shared_key, card, masked);
    let valid = proof.verify(MASKING_LABEL, &statement);
    if !valid {
        tracing::debug!(card = %card.index, "masking proof rejected");
    }
    Ok(valid)
}

pub fn remask<R: RngCore + CryptoRng>(
    rng: &mut R,
    pp: &Parameters,
    shared_key: &AggregatePublicKey,
    masked: &MaskedCard,
    beta: &Scalar,
) -> Result<(MaskedCard, RemaskingProof)> {
    curve::ensure_not_identity(&shared_key.0, "aggregate public key")?;
    curve::ensure_nonzero(beta, "remasking factor")?;
    masked.ensure_well_formed()?;

    let remasked = remask_ciphertext(pp, shared_key, masked, beta);
    let statement = remasking_statement(pp, shared_key, masked, &remasked);
    let proof = DleqProof::prove(rng, REMASKING_LABEL, &statement, beta);

    Ok((remasked, proof))
}

/// recompute the delta remasked - original and check the proof over it
pub fn verify_remask(
    pp: &Parameters,
    shared_key: &AggregatePublicKey,
    original: &MaskedCard,
    remasked: &MaskedCard,
    proof: &RemaskingProof,
) -> Result<bool> {
    curve::ensure_not_identity(&shared_key.0, "aggregate public key")?;
    original.ensure_well_formed()?;
    remasked.ensure_well_formed()?;

    let statement = remasking_statement(pp, shared_key, original, remasked);
    let valid = proof.verify(REMASKING_LABEL, &statement);
    if !valid {
        tracing::debug!("remasking proof rejected");
    }
    Ok(valid)
}

/// mask a whole plaintext deck, one factor per card
pub fn mask_deck<R: RngCore + CryptoRng>(
    rng: &mut R,
    pp: &Parameters,
    shared_key: &AggregatePublicKey,
    cards: &[Card],
    alphas: &[Scalar],
) -> Result<Vec<(MaskedCard, MaskingProof)>> {
    if cards.len() != alphas.len() {
        return Err(CardProtocolError::InvalidParameters(format!(
            "{} cards but {} masking factors",
            cards.len(),
            alphas.len()
        )));
    }

    let masked = cards
        .iter()
        .zip(alphas)
        .map(|(card, alpha)| mask(rng, pp, shared_key, card, alpha))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(cards = masked.len(), "masked deck");
    Ok(masked)
}
