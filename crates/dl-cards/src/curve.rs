//! ristretto255 binding for the card protocol
//!
//! G is the ristretto basepoint. every other generator is derived by
//! hashing a domain string to the group, so no discrete log between any
//! two of them is known to anybody.

use blake2::Blake2b512;
use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::IsIdentity,
};
use rand_core::{CryptoRng, RngCore};

use crate::{transcript::Transcript, CryptoError};

/// encoded size of a point or a scalar
pub const ENCODED_SIZE: usize = 32;

/// primary generator
pub const G: RistrettoPoint = RISTRETTO_BASEPOINT_POINT;

const H_DOMAIN: &[u8] = b"dl-cards.generator.H.v1";

/// second generator with unknown discrete log relative to G
pub fn generator_h() -> RistrettoPoint {
    hash_to_point(H_DOMAIN, &[])
}

/// hash a domain-separated message onto the group
pub fn hash_to_point(domain: &[u8], message: &[u8]) -> RistrettoPoint {
    let mut input = Vec::with_capacity(domain.len() + message.len() + 4);
    input.extend_from_slice(&(domain.len() as u32).to_le_bytes());
    input.extend_from_slice(domain);
    input.extend_from_slice(message);
    RistrettoPoint::hash_from_bytes::<Blake2b512>(&input)
}

/// hash arbitrary bytes to a scalar
pub fn hash_bytes_to_scalar(domain: &[u8], bytes: &[u8]) -> Scalar {
    let mut t = Transcript::new(domain);
    t.append_message(b"bytes", bytes);
    t.challenge_scalar(b"scalar")
}

/// uniform scalar in [1, l)
pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    loop {
        let s = Scalar::random(rng);
        if s != Scalar::ZERO {
            return s;
        }
    }
}

pub fn ensure_not_identity(point: &RistrettoPoint, what: &'static str) -> Result<(), CryptoError> {
    if point.is_identity() {
        return Err(CryptoError::IdentityPoint(what));
    }
    Ok(())
}

pub fn ensure_nonzero(scalar: &Scalar, what: &'static str) -> Result<(), CryptoError> {
    if *scalar == Scalar::ZERO {
        return Err(CryptoError::ZeroScalar(what));
    }
    Ok(())
}

/// true if the scalar's encoding is fully reduced mod l
pub fn is_canonical(scalar: &Scalar) -> bool {
    Option::<Scalar>::from(Scalar::from_canonical_bytes(scalar.to_bytes())).is_some()
}

pub fn encode_point(point: &RistrettoPoint) -> [u8; ENCODED_SIZE] {
    point.compress().to_bytes()
}

pub fn decode_point(bytes: &[u8]) -> Result<RistrettoPoint, CryptoError> {
    if bytes.len() != ENCODED_SIZE {
        return Err(CryptoError::InvalidLength {
            expected: ENCODED_SIZE,
            got: bytes.len(),
        });
    }
    CompressedRistretto::from_slice(bytes)
        .map_err(|_| CryptoError::InvalidPointEncoding)?
        .decompress()
        .ok_or(CryptoError::InvalidPointEncoding)
}

pub fn decode_scalar(bytes: &[u8]) -> Result<Scalar, CryptoError> {
    let arr: [u8; ENCODED_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
        expected: ENCODED_SIZE,
        got: bytes.len(),
    })?;
    Option::from(Scalar::from_canonical_bytes(arr)).ok_or(CryptoError::NonCanonicalScalar)
}

/// cursor over a fixed-layout byte encoding
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CryptoError> {
        let end = self.offset + n;
        if end > self.bytes.len() {
            return Err(CryptoError::InvalidLength {
                expected: end,
                got: self.bytes.len(),
            });
        }
        let out = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(out)
    }

    pub(crate) fn point(&mut self) -> Result<RistrettoPoint, CryptoError> {
        decode_point(self.take(ENCODED_SIZE)?)
    }

    pub(crate) fn scalar(&mut self) -> Result<Scalar, CryptoError> {
        decode_scalar(self.take(ENCODED_SIZE)?)
    }

    pub(crate) fn u32(&mut self) -> Result<u32, CryptoError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// fails if unread bytes remain
    pub(crate) fn finish(self) -> Result<(), CryptoError> {
        if self.offset != self.bytes.len() {
            return Err(CryptoError::InvalidLength {
                expected: self.offset,
                got: self.bytes.len(),
            });
        }
        Ok(())
    }
}
