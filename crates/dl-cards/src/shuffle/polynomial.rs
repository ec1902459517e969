//! permutation polynomial
//!
//! p(x) = sum_i pi(i) * x^i, one coefficient per deck position.
//!
//! WARNING: the coefficients are the raw mapping. the shuffle proof opens
//! every coefficient commitment, so the permutation is visible to anyone
//! holding the proof.

use curve25519_dalek::scalar::Scalar;

use crate::permutation::Permutation;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermutationPolynomial {
    coefficients: Vec<Scalar>,
}

impl PermutationPolynomial {
    pub fn from_permutation(perm: &Permutation) -> Self {
        Self {
            coefficients: perm
                .mapping()
                .iter()
                .map(|&p| Scalar::from(p as u64))
                .collect(),
        }
    }

    pub fn coefficients(&self) -> &[Scalar] {
        &self.coefficients
    }

    /// horner evaluation
    pub fn evaluate(&self, x: &Scalar) -> Scalar {
        self.coefficients
            .iter()
            .rev()
            .fold(Scalar::ZERO, |acc, c| acc * x + c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate() {
        // p(x) = 2 + 0x + 1x^2
        let perm = Permutation::new(vec![2, 0, 1]).unwrap();
        let poly = PermutationPolynomial::from_permutation(&perm);
        let x = Scalar::from(3u64);
        assert_eq!(poly.evaluate(&x), Scalar::from(2u64 + 9));
        assert_eq!(poly.evaluate(&Scalar::ZERO), Scalar::from(2u64));
    }

    #[test]
    fn test_distinct_permutations_distinct_polynomials() {
        let a = PermutationPolynomial::from_permutation(&Permutation::new(vec![0, 1, 2]).unwrap());
        let b = PermutationPolynomial::from_permutation(&Permutation::new(vec![1, 0, 2]).unwrap());
        assert_ne!(a, b);
        assert_ne!(a.evaluate(&Scalar::from(5u64)), b.evaluate(&Scalar::from(5u64)));
    }
}
