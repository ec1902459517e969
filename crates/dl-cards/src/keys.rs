//! player keys, key ownership proofs and the aggregate key

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar, traits::IsIdentity};
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    curve::{self, Reader, ENCODED_SIZE},
    parameters::Parameters,
    transcript::Transcript,
    CardProtocolError, CryptoError, Result,
};

const KEY_OWNERSHIP_DOMAIN: &[u8] = b"dl-cards.key-ownership.v1";
const PLAYER_INFO_DOMAIN: &[u8] = b"dl-cards.player-info.v1";

/// player secret key, wiped on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PlayerSecretKey(Scalar);

impl PlayerSecretKey {
    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }
}

/// pk = sk * G
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerPublicKey(pub RistrettoPoint);

impl PlayerPublicKey {
    pub fn point(&self) -> &RistrettoPoint {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; ENCODED_SIZE] {
        curve::encode_point(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> core::result::Result<Self, CryptoError> {
        curve::decode_point(bytes).map(Self)
    }
}

/// sum of every verified player key; the joint masking key of the round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregatePublicKey(pub RistrettoPoint);

impl AggregatePublicKey {
    pub fn point(&self) -> &RistrettoPoint {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; ENCODED_SIZE] {
        curve::encode_point(&self.0)
    }
}

/// schnorr proof of knowledge of the secret key behind a public key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyOwnershipProof {
    /// R = k * G
    pub commitment: RistrettoPoint,
    pub challenge: Scalar,
    /// z = k + c * sk
    pub response: Scalar,
}

impl KeyOwnershipProof {
    pub const SIZE: usize = 3 * ENCODED_SIZE;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..32].copy_from_slice(&curve::encode_point(&self.commitment));
        bytes[32..64].copy_from_slice(self.challenge.as_bytes());
        bytes[64..].copy_from_slice(self.response.as_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> core::result::Result<Self, CryptoError> {
        let mut reader = Reader::new(bytes);
        let proof = Self {
            commitment: reader.point()?,
            challenge: reader.scalar()?,
            response: reader.scalar()?,
        };
        reader.finish()?;
        Ok(proof)
    }
}

/// c = H(R, pk, G, H(info) * H)
///
/// binding the announced player info stops a proof from being replayed
/// under another identity
fn key_ownership_challenge(
    pp: &Parameters,
    pk: &PlayerPublicKey,
    player_info: &[u8],
    commitment: &RistrettoPoint,
) -> Scalar {
    let info_point =
        curve::hash_bytes_to_scalar(PLAYER_INFO_DOMAIN, player_info) * pp.blinding_generator();

    let mut t = Transcript::new(KEY_OWNERSHIP_DOMAIN);
    t.append_point(b"R", commitment);
    t.append_point(b"pk", &pk.0);
    t.append_point(b"G", pp.generator());
    t.append_point(b"info", &info_point);
    t.challenge_scalar(b"c")
}

/// sample sk uniformly in [1, l) and derive pk = sk * G
pub fn keygen<R: RngCore + CryptoRng>(
    rng: &mut R,
    pp: &Parameters,
) -> (PlayerPublicKey, PlayerSecretKey) {
    let sk = curve::random_scalar(rng);
    let pk = PlayerPublicKey(sk * pp.generator());
    (pk, PlayerSecretKey(sk))
}

pub fn prove_key_ownership<R: RngCore + CryptoRng>(
    rng: &mut R,
    pp: &Parameters,
    pk: &PlayerPublicKey,
    sk: &PlayerSecretKey,
    player_info: &[u8],
) -> Result<KeyOwnershipProof> {
    curve::ensure_not_identity(&pk.0, "player public key")?;
    if sk.0 * pp.generator() != pk.0 {
        return Err(CardProtocolError::InvalidParameters(
            "secret key does not match public key".into(),
        ));
    }

    let mut nonce = curve::random_scalar(rng);
    let commitment = nonce * pp.generator();
    let challenge = key_ownership_challenge(pp, pk, player_info, &commitment);
    let response = nonce + challenge * sk.0;
    nonce.zeroize();

    Ok(KeyOwnershipProof {
        commitment,
        challenge,
        response,
    })
}

/// an identity public key is an error; any proof that does not verify,
/// including one with an identity commitment, is Ok(false)
pub fn verify_key_ownership(
    pp: &Parameters,
    pk: &PlayerPublicKey,
    player_info: &[u8],
    proof: &KeyOwnershipProof,
) -> Result<bool> {
    curve::ensure_not_identity(&pk.0, "player public key")?;
    if proof.commitment.is_identity() {
        tracing::debug!("key ownership commitment is the identity");
        return Ok(false);
    }

    let expected = key_ownership_challenge(pp, pk, player_info, &proof.commitment);
    if expected != proof.challenge {
        tracing::debug!("key ownership challenge mismatch");
        return Ok(false);
    }

    // z * G == R + c * pk
    let lhs = proof.response * pp.generator();
    let rhs = proof.commitment + proof.challenge * pk.0;
    Ok(lhs == rhs)
}

/// verify every key ownership proof and sum the keys
///
/// all-or-nothing: the first invalid proof aborts the aggregation
pub fn compute_aggregate_key<B: AsRef<[u8]>>(
    pp: &Parameters,
    players: &[(PlayerPublicKey, KeyOwnershipProof, B)],
) -> Result<AggregatePublicKey> {
    if players.is_empty() {
        return Err(CardProtocolError::InvalidParameters(
            "aggregate key needs at least one player".into(),
        ));
    }

    for (index, (pk, proof, info)) in players.iter().enumerate() {
        if !verify_key_ownership(pp, pk, info.as_ref(), proof)? {
            tracing::warn!(index, "rejecting aggregate key: invalid key ownership proof");
            return Err(CardProtocolError::ProofVerificationFailed {
                proof: "key ownership",
                index,
            });
        }
    }

    let aggregate: RistrettoPoint = players.iter().map(|(pk, _, _)| pk.0).sum();
    curve::ensure_not_identity(&aggregate, "aggregate public key")?;

    tracing::debug!(players = players.len(), "computed aggregate public key");
    Ok(AggregatePublicKey(aggregate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn setup() -> Parameters {
        Parameters::new(2, 4).unwrap()
    }

    #[test]
    fn test_keygen_relation() {
        let pp = setup();
        let (pk, sk) = keygen(&mut OsRng, &pp);
        assert_eq!(sk.scalar() * pp.generator(), pk.0);
    }

    #[test]
    fn test_secret_key_wipes() {
        let pp = setup();
        let (_, mut sk) = keygen(&mut OsRng, &pp);
        assert_ne!(*sk.scalar(), Scalar::ZERO);
        sk.zeroize();
        assert_eq!(*sk.scalar(), Scalar::ZERO);
    }

    #[test]
    fn test_key_ownership_roundtrip() {
        let mut rng = OsRng;
        let pp = setup();
        let (pk, sk) = keygen(&mut rng, &pp);

        let proof = prove_key_ownership(&mut rng, &pp, &pk, &sk, b"alice").unwrap();
        assert!(verify_key_ownership(&pp, &pk, b"alice", &proof).unwrap());
    }

    #[test]
    fn test_key_ownership_field_flips_fail() {
        let mut rng = OsRng;
        let pp = setup();
        let (pk, sk) = keygen(&mut rng, &pp);
        let proof = prove_key_ownership(&mut rng, &pp, &pk, &sk, b"alice").unwrap();

        let mut bad = proof;
        bad.commitment += pp.generator();
        assert!(!verify_key_ownership(&pp, &pk, b"alice", &bad).unwrap());

        let mut bad = proof;
        bad.challenge += Scalar::ONE;
        assert!(!verify_key_ownership(&pp, &pk, b"alice", &bad).unwrap());

        let mut bad = proof;
        bad.response += Scalar::ONE;
        assert!(!verify_key_ownership(&pp, &pk, b"alice", &bad).unwrap());
    }

    #[test]
    fn test_player_info_binding() {
        let mut rng = OsRng;
        let pp = setup();
        let (pk, sk) = keygen(&mut rng, &pp);
        let proof = prove_key_ownership(&mut rng, &pp, &pk, &sk, b"alice").unwrap();

        assert!(!verify_key_ownership(&pp, &pk, b"mallory", &proof).unwrap());
    }

    #[test]
    fn test_proof_for_other_key_fails() {
        let mut rng = OsRng;
        let pp = setup();
        let (pk, sk) = keygen(&mut rng, &pp);
        let (other_pk, _) = keygen(&mut rng, &pp);
        let proof = prove_key_ownership(&mut rng, &pp, &pk, &sk, b"alice").unwrap();

        assert!(!verify_key_ownership(&pp, &other_pk, b"alice", &proof).unwrap());
        assert!(prove_key_ownership(&mut rng, &pp, &other_pk, &sk, b"alice").is_err());
    }

    #[test]
    fn test_identity_key_is_structural_error() {
        use curve25519_dalek::traits::Identity;
        let mut rng = OsRng;
        let pp = setup();
        let (pk, sk) = keygen(&mut rng, &pp);
        let proof = prove_key_ownership(&mut rng, &pp, &pk, &sk, b"").unwrap();

        let identity = PlayerPublicKey(RistrettoPoint::identity());
        assert!(matches!(
            verify_key_ownership(&pp, &identity, b"", &proof),
            Err(CardProtocolError::Cryptographic(CryptoError::IdentityPoint(_)))
        ));
    }

    #[test]
    fn test_identity_commitment_does_not_verify() {
        use curve25519_dalek::traits::Identity;
        let mut rng = OsRng;
        let pp = setup();
        let (pk, sk) = keygen(&mut rng, &pp);
        let proof = prove_key_ownership(&mut rng, &pp, &pk, &sk, b"carol").unwrap();

        let mut bad = proof;
        bad.commitment = RistrettoPoint::identity();
        assert_eq!(verify_key_ownership(&pp, &pk, b"carol", &bad), Ok(false));

        // a bad commitment is a failed proof, not a malformed table
        let players = vec![(pk, bad, b"carol".to_vec())];
        assert_eq!(
            compute_aggregate_key(&pp, &players),
            Err(CardProtocolError::ProofVerificationFailed {
                proof: "key ownership",
                index: 0,
            })
        );
    }

    #[test]
    fn test_aggregate_key_is_sum_in_any_order() {
        let mut rng = OsRng;
        let pp = setup();

        let mut players = Vec::new();
        for i in 0..4u8 {
            let (pk, sk) = keygen(&mut rng, &pp);
            let info = vec![i];
            let proof = prove_key_ownership(&mut rng, &pp, &pk, &sk, &info).unwrap();
            players.push((pk, proof, info));
        }

        let apk = compute_aggregate_key(&pp, &players).unwrap();
        let expected: RistrettoPoint = players.iter().map(|(pk, _, _)| pk.0).sum();
        assert_eq!(apk.0, expected);

        players.reverse();
        assert_eq!(compute_aggregate_key(&pp, &players).unwrap(), apk);
    }

    #[test]
    fn test_aggregate_key_fails_fast() {
        let mut rng = OsRng;
        let pp = setup();

        let mut players = Vec::new();
        for i in 0..3u8 {
            let (pk, sk) = keygen(&mut rng, &pp);
            let proof = prove_key_ownership(&mut rng, &pp, &pk, &sk, &[i]).unwrap();
            players.push((pk, proof, [i]));
        }
        // announce player 1 under a different identity
        players[1].2 = [9];

        assert_eq!(
            compute_aggregate_key(&pp, &players),
            Err(CardProtocolError::ProofVerificationFailed {
                proof: "key ownership",
                index: 1,
            })
        );
    }

    #[test]
    fn test_aggregate_key_rejects_empty() {
        let pp = setup();
        let players: Vec<(PlayerPublicKey, KeyOwnershipProof, Vec<u8>)> = Vec::new();
        assert!(matches!(
            compute_aggregate_key(&pp, &players),
            Err(CardProtocolError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_proof_bytes() {
        let mut rng = OsRng;
        let pp = setup();
        let (pk, sk) = keygen(&mut rng, &pp);
        let proof = prove_key_ownership(&mut rng, &pp, &pk, &sk, b"bob").unwrap();

        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), 96);
        assert_eq!(KeyOwnershipProof::from_bytes(&bytes).unwrap(), proof);
        assert_eq!(PlayerPublicKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
    }
}
