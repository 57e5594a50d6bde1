//! Baby-step giant-step discrete logarithm solver.
//!
//! The homomorphic façade (`crate::homomorphic`) only ever needs to
//! decrypt a bounded non-negative integer, never an arbitrary group
//! element, so a full discrete-log oracle is unnecessary — this solves
//! it in `O(sqrt(max_value))` time and space.

use std::collections::HashMap;

use anyhow::{bail, ensure};

use super::group::{GroupElement, Scalar};

/// Baby steps are generated this many times denser than `sqrt(max_value)`,
/// trading memory for fewer giant steps when the same table is reused.
const DEFAULT_BALANCE: u64 = 2;

/// Precomputed baby-step table for solving a bounded discrete logarithm.
#[derive(Debug, Clone)]
pub struct BabyStepGiantStep {
    table: HashMap<GroupElement, u64>,
    baby_step_size: u64,
    giant_step: GroupElement,
}

impl BabyStepGiantStep {
    /// Build a solver for logarithms known to lie in `[0, max_value]`.
    ///
    /// Reuse the same instance across repeated decryptions bounded by the
    /// same `max_value`; building the table is the expensive part.
    ///
    /// # Errors
    /// Returns an error if `max_value` is zero.
    pub fn new(max_value: u64, balance: Option<u64>) -> anyhow::Result<Self> {
        let balance = balance.unwrap_or(DEFAULT_BALANCE);
        ensure!(
            max_value != 0,
            "max_value must be greater than zero, provided: {max_value}"
        );

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let sqrt_step_size = (max_value as f64).sqrt().ceil() as u64;
        let baby_step_size = sqrt_step_size.max(1) * balance.max(1);

        let mut table = HashMap::new();
        let mut e = GroupElement::identity();
        for baby_step in 0..=baby_step_size {
            let next = &e + &GroupElement::GENERATOR;
            table.insert(e, baby_step);
            e = next;
        }

        let giant_step = &GroupElement::GENERATOR * &Scalar::from(baby_step_size).negate();
        Ok(Self {
            table,
            baby_step_size,
            giant_step,
        })
    }

    /// Solve for `x` such that `point == x * GENERATOR`, `0 <= x <= max_value`.
    ///
    /// # Errors
    /// Returns an error if no such `x` exists within the configured bound.
    pub fn discrete_log(&self, mut point: GroupElement) -> anyhow::Result<u64> {
        for baby_step in 0..=self.baby_step_size {
            if let Some(x) = self.table.get(&point) {
                return Ok(baby_step * self.baby_step_size + x);
            }
            point = &point + &self.giant_step;
        }
        bail!("discrete log exceeds the configured max_value bound")
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Mul;

    use super::*;

    #[test]
    fn finds_known_logarithm() {
        let max_value = 5_000;
        let log = 1234;
        let ge = GroupElement::GENERATOR.mul(&Scalar::from(log));

        let solver = BabyStepGiantStep::new(max_value, None).unwrap();
        assert_eq!(solver.discrete_log(ge).unwrap(), log);
    }

    #[test]
    fn rejects_value_beyond_bound() {
        let solver = BabyStepGiantStep::new(10, None).unwrap();
        let ge = GroupElement::GENERATOR.mul(&Scalar::from(9_999u64));
        assert!(solver.discrete_log(ge).is_err());
    }

    #[test]
    fn zero_bound_is_rejected() {
        assert!(BabyStepGiantStep::new(0, None).is_err());
    }
}
