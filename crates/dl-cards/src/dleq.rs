//! chaum-pedersen proof of discrete log equality
//!
//! proves knowledge of x such that A = x*base_a and B = x*base_b.
//! masking, remasking and reveal proofs are all this proof over different
//! statements, separated by their transcript label.

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand_core::{CryptoRng, RngCore};

use crate::{
    curve::{self, Reader, ENCODED_SIZE},
    transcript::Transcript,
    CryptoError,
};

/// public values (base_a, base_b, A, B) where we prove log_base_a(A) = log_base_b(B)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DleqStatement {
    pub base_a: RistrettoPoint,
    pub base_b: RistrettoPoint,
    pub public_a: RistrettoPoint,
    pub public_b: RistrettoPoint,
}

/// non-interactive chaum-pedersen proof
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DleqProof {
    /// R = k * base_a
    pub commitment_a: RistrettoPoint,
    /// S = k * base_b
    pub commitment_b: RistrettoPoint,
    /// c = H(statement, R, S)
    pub challenge: Scalar,
    /// z = k + c * x
    pub response: Scalar,
}

impl DleqStatement {
    fn challenge(&self, label: &'static [u8], r: &RistrettoPoint, s: &RistrettoPoint) -> Scalar {
        let mut t = Transcript::new(label);
        t.append_point(b"base_a", &self.base_a);
        t.append_point(b"base_b", &self.base_b);
        t.append_point(b"R", r);
        t.append_point(b"S", s);
        t.append_point(b"A", &self.public_a);
        t.append_point(b"B", &self.public_b);
        t.challenge_scalar(b"c")
    }
}

impl DleqProof {
    pub const SIZE: usize = 4 * ENCODED_SIZE;

    /// prove log_base_a(public_a) = log_base_b(public_b) = x
    pub fn prove<R: RngCore + CryptoRng>(
        rng: &mut R,
        label: &'static [u8],
        statement: &DleqStatement,
        x: &Scalar,
    ) -> Self {
        let k = curve::random_scalar(rng);
        let commitment_a = k * statement.base_a;
        let commitment_b = k * statement.base_b;
        let challenge = statement.challenge(label, &commitment_a, &commitment_b);
        let response = k + challenge * x;
        Self {
            commitment_a,
            commitment_b,
            challenge,
            response,
        }
    }

    /// checks:
    /// 1. c == H(statement, R, S)
    /// 2. z * base_a == R + c * A
    /// 3. z * base_b == S + c * B
    pub fn verify(&self, label: &'static [u8], statement: &DleqStatement) -> bool {
        let expected = statement.challenge(label, &self.commitment_a, &self.commitment_b);
        if expected != self.challenge {
            return false;
        }

        let lhs_a = self.response * statement.base_a;
        let rhs_a = self.commitment_a + self.challenge * statement.public_a;
        if lhs_a != rhs_a {
            return false;
        }

        let lhs_b = self.response * statement.base_b;
        let rhs_b = self.commitment_b + self.challenge * statement.public_b;
        lhs_b == rhs_b
    }

    /// R || S || c || z
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..32].copy_from_slice(&curve::encode_point(&self.commitment_a));
        bytes[32..64].copy_from_slice(&curve::encode_point(&self.commitment_b));
        bytes[64..96].copy_from_slice(self.challenge.as_bytes());
        bytes[96..].copy_from_slice(self.response.as_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let mut reader = Reader::new(bytes);
        let proof = Self {
            commitment_a: reader.point()?,
            commitment_b: reader.point()?,
            challenge: reader.scalar()?,
            response: reader.scalar()?,
        };
        reader.finish()?;
        Ok(proof)
    }
}
