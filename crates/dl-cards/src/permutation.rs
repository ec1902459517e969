//! deck permutations (witness only, never sent to other players)

use rand::Rng;
use rand_core::{CryptoRng, RngCore};

use crate::{CardProtocolError, Result};

/// a bijection on 0..n
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    mapping: Vec<usize>,
}

impl Permutation {
    /// create a permutation from a mapping, rejecting anything that is not a bijection
    pub fn new(mapping: Vec<usize>) -> Result<Self> {
        let n = mapping.len();
        let mut seen = vec![false; n];

        for (i, &idx) in mapping.iter().enumerate() {
            if idx >= n {
                return Err(CardProtocolError::InvalidPermutation(format!(
                    "entry {} maps to {} outside 0..{}",
                    i, idx, n
                )));
            }
            if seen[idx] {
                return Err(CardProtocolError::InvalidPermutation(format!(
                    "index {} appears more than once",
                    idx
                )));
            }
            seen[idx] = true;
        }

        Ok(Self { mapping })
    }

    pub fn identity(n: usize) -> Self {
        Self {
            mapping: (0..n).collect(),
        }
    }

    /// uniformly random permutation (fisher-yates)
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R, n: usize) -> Self {
        let mut mapping: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = rng.gen_range(0..=i);
            mapping.swap(i, j);
        }
        Self { mapping }
    }

    /// apply permutation: output[i] = input[perm[i]]
    pub fn apply<T: Clone>(&self, input: &[T]) -> Result<Vec<T>> {
        if input.len() != self.len() {
            return Err(CardProtocolError::InvalidPermutation(format!(
                "permutation of {} applied to {} items",
                self.len(),
                input.len()
            )));
        }
        Ok(self.mapping.iter().map(|&i| input[i].clone()).collect())
    }

    /// inverse mapping: inverse[perm[i]] = i
    pub fn inverse(&self) -> Self {
        let mut mapping = vec![0; self.len()];
        for (i, &p) in self.mapping.iter().enumerate() {
            mapping[p] = i;
        }
        Self { mapping }
    }

    pub fn get(&self, i: usize) -> usize {
        self.mapping[i]
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn mapping(&self) -> &[usize] {
        &self.mapping
    }
}
