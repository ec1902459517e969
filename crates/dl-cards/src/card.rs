//! plaintext and masked cards, and the point <-> card lookup

use std::collections::HashMap;

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};

use crate::{
    curve::{self, Reader, ENCODED_SIZE},
    CardProtocolError, CryptoError, Result,
};

const CARD_DOMAIN: &[u8] = b"dl-cards.card.v1";

/// position of a card in the plaintext deck
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardIndex(u32);

impl CardIndex {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<i64> for CardIndex {
    type Error = CardProtocolError;

    /// negative or oversized indices are rejected
    fn try_from(index: i64) -> Result<Self> {
        u32::try_from(index)
            .map(CardIndex)
            .map_err(|_| CardProtocolError::InvalidCardIndex(index))
    }
}

impl core::fmt::Display for CardIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// a plaintext card: a group element and its deck position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Card {
    pub point: RistrettoPoint,
    pub index: CardIndex,
}

impl Card {
    pub fn new(point: RistrettoPoint, index: CardIndex) -> Self {
        Self { point, index }
    }
}

/// elgamal ciphertext of a card under the aggregate key
///
/// values are never mutated; remasking and shuffling build new ones
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskedCard {
    /// c1 = alpha * G
    pub randomness: RistrettoPoint,
    /// c2 = card + alpha * shared_key
    pub ciphertext: RistrettoPoint,
}

impl MaskedCard {
    pub const SIZE: usize = 2 * ENCODED_SIZE;

    pub fn new(randomness: RistrettoPoint, ciphertext: RistrettoPoint) -> Self {
        Self {
            randomness,
            ciphertext,
        }
    }

    /// component-wise difference self - other
    pub fn delta(&self, other: &Self) -> (RistrettoPoint, RistrettoPoint) {
        (
            self.randomness - other.randomness,
            self.ciphertext - other.ciphertext,
        )
    }

    /// both components must be proper group elements
    pub fn ensure_well_formed(&self) -> core::result::Result<(), CryptoError> {
        curve::ensure_not_identity(&self.randomness, "masked card randomness")?;
        curve::ensure_not_identity(&self.ciphertext, "masked card ciphertext")
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..32].copy_from_slice(&curve::encode_point(&self.randomness));
        bytes[32..].copy_from_slice(&curve::encode_point(&self.ciphertext));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> core::result::Result<Self, CryptoError> {
        let mut reader = Reader::new(bytes);
        let card = Self {
            randomness: reader.point()?,
            ciphertext: reader.point()?,
        };
        reader.finish()?;
        Ok(card)
    }
}

/// mapping between card identities and group elements
pub trait CardEncoding {
    fn point_to_card(&self, point: &RistrettoPoint) -> Option<Card>;

    fn card_to_point(&self, index: CardIndex) -> Result<RistrettoPoint>;
}

/// lookup table of `size` cards, each hashed onto the group from its index
#[derive(Clone, Debug)]
pub struct DeckEncoding {
    points: Vec<RistrettoPoint>,
    lookup: HashMap<CompressedRistretto, CardIndex>,
}

impl DeckEncoding {
    pub const STANDARD_DECK_SIZE: usize = 52;

    pub fn new(size: usize) -> Self {
        let points: Vec<RistrettoPoint> = (0..size as u64)
            .map(|i| curve::hash_to_point(CARD_DOMAIN, &i.to_le_bytes()))
            .collect();
        let lookup = points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.compress(), CardIndex(i as u32)))
            .collect();
        Self { points, lookup }
    }

    pub fn standard() -> Self {
        Self::new(Self::STANDARD_DECK_SIZE)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// every card in deck order
    pub fn cards(&self) -> Vec<Card> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| Card::new(*p, CardIndex(i as u32)))
            .collect()
    }

    pub fn card(&self, index: CardIndex) -> Result<Card> {
        Ok(Card::new(self.card_to_point(index)?, index))
    }
}

impl CardEncoding for DeckEncoding {
    fn point_to_card(&self, point: &RistrettoPoint) -> Option<Card> {
        self.lookup
            .get(&point.compress())
            .map(|index| Card::new(*point, *index))
    }

    fn card_to_point(&self, index: CardIndex) -> Result<RistrettoPoint> {
        self.points
            .get(index.as_usize())
            .copied()
            .ok_or(CardProtocolError::InvalidCardIndex(index.get() as i64))
    }
}
