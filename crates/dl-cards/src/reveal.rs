//! reveal tokens (partial decryptions) and unmasking
//!
//! token_i = sk_i * c1, and card = c2 - sum(token_i). every player must
//! contribute; there is no threshold recovery.

use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use curve25519_dalek::ristretto::RistrettoPoint;
use rand_core::{CryptoRng, RngCore};

use crate::{
    card::{Card, CardEncoding, CardIndex, MaskedCard},
    curve::{self, ENCODED_SIZE},
    dleq::{DleqProof, DleqStatement},
    keys::{PlayerPublicKey, PlayerSecretKey},
    parameters::Parameters,
    CardProtocolError, CryptoError, Result,
};

const REVEAL_LABEL: &[u8] = b"dl-cards.reveal.v1";

/// one player's decryption share of a masked card
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RevealToken(pub RistrettoPoint);

impl RevealToken {
    pub fn to_bytes(&self) -> [u8; ENCODED_SIZE] {
        curve::encode_point(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> core::result::Result<Self, CryptoError> {
        curve::decode_point(bytes).map(Self)
    }
}

/// proof that the same sk links (G, pk) and (c1, token)
pub type RevealProof = DleqProof;

fn reveal_statement(
    pp: &Parameters,
    pk: &PlayerPublicKey,
    token: &RevealToken,
    masked: &MaskedCard,
) -> DleqStatement {
    DleqStatement {
        base_a: *pp.generator(),
        base_b: masked.randomness,
        public_a: pk.0,
        public_b: token.0,
    }
}

pub fn compute_reveal_token<R: RngCore + CryptoRng>(
    rng: &mut R,
    pp: &Parameters,
    sk: &PlayerSecretKey,
    pk: &PlayerPublicKey,
    masked: &MaskedCard,
) -> Result<(RevealToken, RevealProof)> {
    masked.ensure_well_formed()?;
    curve::ensure_not_identity(&pk.0, "player public key")?;

    let token = RevealToken(sk.scalar() * masked.randomness);
    let statement = reveal_statement(pp, pk, &token, masked);
    let proof = DleqProof::prove(rng, REVEAL_LABEL, &statement, sk.scalar());

    Ok((token, proof))
}

pub fn verify_reveal(
    pp: &Parameters,
    pk: &PlayerPublicKey,
    token: &RevealToken,
    masked: &MaskedCard,
    proof: &RevealProof,
) -> Result<bool> {
    masked.ensure_well_formed()?;
    curve::ensure_not_identity(&pk.0, "player public key")?;
    curve::ensure_not_identity(&token.0, "reveal token")?;

    let statement = reveal_statement(pp, pk, token, masked);
    let valid = proof.verify(REVEAL_LABEL, &statement);
    if !valid {
        tracing::debug!("reveal proof rejected");
    }
    Ok(valid)
}

fn verify_all_reveals(
    pp: &Parameters,
    tokens: &[(RevealToken, RevealProof, PlayerPublicKey)],
    masked: &MaskedCard,
) -> Result<()> {
    type Entry = (RevealToken, RevealProof, PlayerPublicKey);
    let check = |(index, (token, proof, pk)): (usize, &Entry)| {
        if verify_reveal(pp, pk, token, masked, proof)? {
            Ok(())
        } else {
            tracing::warn!(index, "rejecting unmask: invalid reveal proof");
            Err(CardProtocolError::ProofVerificationFailed {
                proof: "reveal",
                index,
            })
        }
    };

    #[cfg(feature = "parallel")]
    {
        // find_first keeps the reported index deterministic
        match tokens
            .par_iter()
            .enumerate()
            .map(check)
            .find_first(|r| r.is_err())
        {
            Some(err) => err,
            None => Ok(()),
        }
    }
    #[cfg(not(feature = "parallel"))]
    {
        tokens.iter().enumerate().try_for_each(check)
    }
}

/// recover the plaintext point c2 - sum(token_i)
///
/// requires exactly one verified token from each of the n distinct players
pub fn unmask_point(
    pp: &Parameters,
    tokens: &[(RevealToken, RevealProof, PlayerPublicKey)],
    masked: &MaskedCard,
) -> Result<RistrettoPoint> {
    let need = pp.num_players();
    if tokens.len() < need {
        return Err(CardProtocolError::InsufficientRevealTokens {
            got: tokens.len(),
            need,
        });
    }
    if tokens.len() > need {
        return Err(CardProtocolError::InvalidParameters(format!(
            "{} reveal tokens for {} players",
            tokens.len(),
            need
        )));
    }

    // one token per player, a repeated key cannot stand in for another seat
    let distinct = tokens
        .iter()
        .map(|(_, _, pk)| pk.0.compress())
        .collect::<HashSet<_>>()
        .len();
    if distinct != need {
        tracing::warn!(distinct, need, "rejecting unmask: repeated player key");
        return Err(CardProtocolError::InsufficientRevealTokens { got: distinct, need });
    }

    verify_all_reveals(pp, tokens, masked)?;

    let aggregate: RistrettoPoint = tokens.iter().map(|(token, _, _)| token.0).sum();
    Ok(masked.ciphertext - aggregate)
}

/// recover the card under `masked`
///
/// without an encoding, or when the point is not in it, the card comes back
/// with index 0 and the raw point
pub fn unmask(
    pp: &Parameters,
    tokens: &[(RevealToken, RevealProof, PlayerPublicKey)],
    masked: &MaskedCard,
    encoding: Option<&dyn CardEncoding>,
) -> Result<Card> {
    let point = unmask_point(pp, tokens, masked)?;

    let card = encoding
        .and_then(|e| e.point_to_card(&point))
        .unwrap_or_else(|| Card::new(point, CardIndex::default()));

    tracing::debug!(card = %card.index, "unmasked card");
    Ok(card)
}
