//! Six component stress tensor

use serde::{Deserialize, Serialize};

/// Component labels in deck order
pub const COMPONENT_LABELS: [&str; 6] = ["S11", "S22", "S33", "S12", "S13", "S23"];

/// Symmetric stress tensor stored as [S11, S22, S33, S12, S13, S23]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StressTensor(pub [f64; 6]);

impl StressTensor {
    pub const ZERO: StressTensor = StressTensor([0.0; 6]);

    /// Create a tensor from its six components
    pub fn new(components: [f64; 6]) -> Self {
        Self(components)
    }

    /// Get the components as an array
    pub fn components(&self) -> [f64; 6] {
        self.0
    }

    /// Multiply every component by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.map(|s| factor * s))
    }

    /// Root mean square difference between two tensors
    ///
    /// `sqrt(sum((a_i - b_i)^2) / 6)`
    pub fn deviation(&self, other: &StressTensor) -> f64 {
        let sum: f64 = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        (sum / 6.0).sqrt()
    }
}

impl From<[f64; 6]> for StressTensor {
    fn from(components: [f64; 6]) -> Self {
        Self(components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_deviation_of_equal_tensors_is_zero() {
        let a = StressTensor::new([1.0; 6]);
        let b = StressTensor::new([1.0; 6]);
        assert_eq!(a.deviation(&b), 0.0);
    }

    #[test]
    fn test_deviation_from_zero_to_unit() {
        let old = StressTensor::ZERO;
        let new = StressTensor::new([1.0; 6]);
        assert_relative_eq!(old.deviation(&new), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_deviation_single_component() {
        let old = StressTensor::ZERO;
        let new = StressTensor::new([0.0, 0.0, 6.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(old.deviation(&new), 6.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_scaled() {
        let s = StressTensor::new([1.0, -2.0, 3.0, 0.5, 0.0, -0.25]);
        assert_eq!(s.scaled(2.0).components(), [2.0, -4.0, 6.0, 1.0, 0.0, -0.5]);
        assert_eq!(s.scaled(0.0).components()[1], 0.0);
    }
}
