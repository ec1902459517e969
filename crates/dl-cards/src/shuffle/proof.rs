//! shuffle proof generation and encoding

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand_core::{CryptoRng, RngCore};

use super::{
    permute_and_remask, shuffle_challenge, PermutationPolynomial, ShuffleStatement,
    ShuffleWitness,
};
use crate::{
    curve::{self, Reader, ENCODED_SIZE},
    parameters::Parameters,
    CardProtocolError, CryptoError, Result,
};

/// opening of one pedersen commitment
///
/// NOTE: this discloses the committed value and its blinding in the clear.
/// it is a consistency check, not a hiding opening argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PedersenOpening {
    pub commitment: RistrettoPoint,
    pub opening: Scalar,
    pub randomness: Scalar,
}

/// shuffle proof: commitments, one challenge, linear responses and openings
///
/// `responses` and `openings` list the N polynomial coefficients first,
/// then the N masking factors.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShuffleProof {
    pub coefficient_commitments: Vec<RistrettoPoint>,
    pub factor_commitments: Vec<RistrettoPoint>,
    pub challenge: Scalar,
    /// response_j = blinding_j + c * value_j
    pub responses: Vec<Scalar>,
    /// permutation polynomial evaluated at the challenge
    pub evaluation: Scalar,
    pub openings: Vec<PedersenOpening>,
}

impl ShuffleProof {
    /// number of cards this proof covers
    pub fn deck_size(&self) -> usize {
        self.coefficient_commitments.len()
    }

    /// serialize the proof for transmission
    ///
    /// n | coefficient commitments | factor commitments | challenge |
    /// responses (len-prefixed) | evaluation | openings (len-prefixed)
    pub fn to_bytes(&self) -> Vec<u8> {
        let n = self.coefficient_commitments.len();
        let elements = 2 + 2 * n + self.responses.len() + 3 * self.openings.len();
        let mut bytes = Vec::with_capacity(12 + ENCODED_SIZE * elements);

        bytes.extend_from_slice(&(n as u32).to_le_bytes());
        for c in &self.coefficient_commitments {
            bytes.extend_from_slice(&curve::encode_point(c));
        }
        for c in &self.factor_commitments {
            bytes.extend_from_slice(&curve::encode_point(c));
        }
        bytes.extend_from_slice(self.challenge.as_bytes());

        bytes.extend_from_slice(&(self.responses.len() as u32).to_le_bytes());
        for r in &self.responses {
            bytes.extend_from_slice(r.as_bytes());
        }
        bytes.extend_from_slice(self.evaluation.as_bytes());

        bytes.extend_from_slice(&(self.openings.len() as u32).to_le_bytes());
        for o in &self.openings {
            bytes.extend_from_slice(&curve::encode_point(&o.commitment));
            bytes.extend_from_slice(o.opening.as_bytes());
            bytes.extend_from_slice(o.randomness.as_bytes());
        }

        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> core::result::Result<Self, CryptoError> {
        let mut reader = Reader::new(bytes);

        let n = reader.u32()? as usize;
        check_count(n, bytes.len())?;
        let coefficient_commitments = (0..n)
            .map(|_| reader.point())
            .collect::<core::result::Result<Vec<_>, _>>()?;
        let factor_commitments = (0..n)
            .map(|_| reader.point())
            .collect::<core::result::Result<Vec<_>, _>>()?;
        let challenge = reader.scalar()?;

        let response_count = reader.u32()? as usize;
        check_count(response_count, bytes.len())?;
        let responses = (0..response_count)
            .map(|_| reader.scalar())
            .collect::<core::result::Result<Vec<_>, _>>()?;
        let evaluation = reader.scalar()?;

        let opening_count = reader.u32()? as usize;
        check_count(opening_count, bytes.len())?;
        let openings = (0..opening_count)
            .map(|_| {
                Ok(PedersenOpening {
                    commitment: reader.point()?,
                    opening: reader.scalar()?,
                    randomness: reader.scalar()?,
                })
            })
            .collect::<core::result::Result<Vec<_>, CryptoError>>()?;

        reader.finish()?;

        Ok(Self {
            coefficient_commitments,
            factor_commitments,
            challenge,
            responses,
            evaluation,
            openings,
        })
    }
}

/// a count can never exceed the number of 32-byte elements in the input
fn check_count(count: usize, total: usize) -> core::result::Result<(), CryptoError> {
    if count > total / ENCODED_SIZE {
        return Err(CryptoError::InvalidLength {
            expected: count * ENCODED_SIZE,
            got: total,
        });
    }
    Ok(())
}

/// prove that `statement.shuffled` is `statement.original` permuted by the
/// witness permutation and remasked by its masking factors
pub fn prove_shuffle<R: RngCore + CryptoRng>(
    rng: &mut R,
    pp: &Parameters,
    statement: &ShuffleStatement<'_>,
    witness: &ShuffleWitness,
) -> Result<ShuffleProof> {
    let n = statement.check_shape(pp)?;
    witness.check_shape(n)?;

    // the witness must actually explain the statement
    let expected = permute_and_remask(pp, &statement.shared_key, statement.original, witness);
    if expected != statement.shuffled {
        return Err(CardProtocolError::InvalidParameters(
            "witness inconsistent with statement".into(),
        ));
    }

    let polynomial = PermutationPolynomial::from_permutation(&witness.permutation);
    let key = pp.commit_key();

    // step 1: commit to every coefficient and every masking factor
    let values: Vec<Scalar> = polynomial
        .coefficients()
        .iter()
        .chain(witness.masking_factors.iter())
        .copied()
        .collect();

    let mut commitments = Vec::with_capacity(2 * n);
    let mut blindings = Vec::with_capacity(2 * n);
    for (j, value) in values.iter().enumerate() {
        let (commitment, blinding) = key.commit_random(rng, j % n, value)?;
        commitments.push(commitment);
        blindings.push(blinding);
    }
    let (coefficient_commitments, factor_commitments) = commitments.split_at(n);

    // step 2: single fiat-shamir challenge over decks and commitments
    let challenge = shuffle_challenge(statement, coefficient_commitments, factor_commitments);

    // step 3: evaluation and linear responses
    let evaluation = polynomial.evaluate(&challenge);
    let responses: Vec<Scalar> = blindings
        .iter()
        .zip(&values)
        .map(|(b, v)| b + challenge * v)
        .collect();

    let openings = commitments
        .iter()
        .zip(values.iter().zip(&blindings))
        .map(|(commitment, (opening, randomness))| PedersenOpening {
            commitment: *commitment,
            opening: *opening,
            randomness: *randomness,
        })
        .collect();

    tracing::debug!(cards = n, "generated shuffle proof");

    Ok(ShuffleProof {
        coefficient_commitments: coefficient_commitments.to_vec(),
        factor_commitments: factor_commitments.to_vec(),
        challenge,
        responses,
        evaluation,
        openings,
    })
}
