//! fiat-shamir transcript over blake2b-512
//!
//! every proof in the crate opens a transcript under its own domain label,
//! absorbs the statement and commitments, and squeezes scalar challenges.
//! a 64-byte digest is reduced mod l, so challenges are uniform.

use blake2::{Blake2b512, Digest};
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};

const PROTOCOL: &[u8] = b"dl-cards";

/// labelled transcript; each absorbed item is framed as len(label) | label | len(data) | data
#[derive(Clone)]
pub struct Transcript {
    hasher: Blake2b512,
}

impl Transcript {
    pub fn new(domain: &[u8]) -> Self {
        let mut t = Self {
            hasher: Blake2b512::new(),
        };
        t.append_message(b"protocol", PROTOCOL);
        t.append_message(b"domain", domain);
        t
    }

    pub fn append_message(&mut self, label: &[u8], message: &[u8]) {
        self.absorb(label);
        self.absorb(message);
    }

    pub fn append_u64(&mut self, label: &[u8], value: u64) {
        self.append_message(label, &value.to_le_bytes());
    }

    /// points enter by their canonical compressed encoding
    pub fn append_point(&mut self, label: &[u8], point: &RistrettoPoint) {
        self.append_message(label, point.compress().as_bytes());
    }

    /// squeeze a challenge; it is absorbed back so the next one differs
    pub fn challenge_scalar(&mut self, label: &[u8]) -> Scalar {
        let mut squeeze = self.hasher.clone();
        squeeze.update(b"challenge");
        squeeze.update((label.len() as u64).to_le_bytes());
        squeeze.update(label);

        let mut wide = [0u8; 64];
        wide.copy_from_slice(&squeeze.finalize());
        let challenge = Scalar::from_bytes_mod_order_wide(&wide);

        self.append_message(label, challenge.as_bytes());
        challenge
    }

    fn absorb(&mut self, bytes: &[u8]) {
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }
}
