//! game parameters and the pedersen commitment key
//!
//! everything here is derived deterministically from the deck shape, so
//! every player computes identical parameters without a trusted setup.

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand_core::{CryptoRng, RngCore};

use crate::{
    curve::{self, G},
    CardProtocolError, Result,
};

const COMMIT_KEY_DOMAIN: &[u8] = b"dl-cards.pedersen.generator.v1";

/// pedersen commitment key: one generator per committed position plus a
/// shared blinding generator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PedersenKey {
    generators: Vec<RistrettoPoint>,
    blinding: RistrettoPoint,
}

impl PedersenKey {
    /// derive a key with `size` position generators
    pub fn new(size: usize) -> Self {
        let generators = (0..size as u64)
            .map(|i| curve::hash_to_point(COMMIT_KEY_DOMAIN, &i.to_le_bytes()))
            .collect();
        Self {
            generators,
            blinding: curve::generator_h(),
        }
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn generator(&self, position: usize) -> Option<&RistrettoPoint> {
        self.generators.get(position)
    }

    pub fn blinding_generator(&self) -> &RistrettoPoint {
        &self.blinding
    }

    /// commit to `value` at `position`: value * g_position + blinding * h
    pub fn commit_at(
        &self,
        position: usize,
        value: &Scalar,
        blinding: &Scalar,
    ) -> Result<RistrettoPoint> {
        let g = self.generator(position).ok_or_else(|| {
            CardProtocolError::InvalidParameters(format!(
                "commitment position {} exceeds key size {}",
                position,
                self.len()
            ))
        })?;
        Ok(value * g + blinding * self.blinding)
    }

    /// commit to `value` at `position` with fresh blinding, returning the blinding
    pub fn commit_random<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        position: usize,
        value: &Scalar,
    ) -> Result<(RistrettoPoint, Scalar)> {
        let blinding = curve::random_scalar(rng);
        let commitment = self.commit_at(position, value, &blinding)?;
        Ok((commitment, blinding))
    }
}

/// per-game protocol parameters
///
/// the deck is laid out as `m` cards per player row for `n` players,
/// so `deck_size = m * n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    m: usize,
    n: usize,
    h: RistrettoPoint,
    commit_key: PedersenKey,
}

impl Parameters {
    pub fn new(m: usize, n: usize) -> Result<Self> {
        if m == 0 || n == 0 {
            return Err(CardProtocolError::InvalidParameters(format!(
                "deck shape must be positive, got m={} n={}",
                m, n
            )));
        }
        let deck_size = m.checked_mul(n).ok_or_else(|| {
            CardProtocolError::InvalidParameters("deck size overflows".into())
        })?;

        tracing::debug!(m, n, deck_size, "deriving card protocol parameters");

        Ok(Self {
            m,
            n,
            h: curve::generator_h(),
            commit_key: PedersenKey::new(deck_size),
        })
    }

    /// cards per player row
    pub fn m(&self) -> usize {
        self.m
    }

    pub fn num_players(&self) -> usize {
        self.n
    }

    pub fn deck_size(&self) -> usize {
        self.m * self.n
    }

    pub fn generator(&self) -> &RistrettoPoint {
        &G
    }

    pub fn blinding_generator(&self) -> &RistrettoPoint {
        &self.h
    }

    pub fn commit_key(&self) -> &PedersenKey {
        &self.commit_key
    }
}
