use serde::{Deserialize, Serialize};

/// Standardizes one numeric feature to zero mean and unit variance.
///
/// Uses the population variance; a constant feature keeps scale `1.0`
/// so it maps to zero instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self {
            mean: 0.0,
            scale: 1.0,
        }
    }
}

impl StandardScaler {
    #[must_use]
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std > f64::EPSILON * mean.abs().max(1.0) {
            std
        } else {
            1.0
        };
        Self { mean, scale }
    }

    #[must_use]
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_to_zero_mean_unit_variance() {
        let values = [0.0, 10.0, 20.0, 30.0];
        let scaler = StandardScaler::fit(&values);
        assert!((scaler.mean - 15.0).abs() < 1e-12);
        assert!((scaler.scale - 125.0f64.sqrt()).abs() < 1e-12);

        let scaled: Vec<f64> = values.iter().map(|&v| scaler.transform(v)).collect();
        let mean = scaled.iter().sum::<f64>() / 4.0;
        let var = scaled.iter().map(|v| v * v).sum::<f64>() / 4.0;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_feature_maps_to_zero() {
        let scaler = StandardScaler::fit(&[500.0, 500.0, 500.0]);
        assert_eq!(scaler.scale, 1.0);
        assert_eq!(scaler.transform(500.0), 0.0);
        assert_eq!(scaler.transform(501.0), 1.0);
    }

    #[test]
    fn empty_input_is_identity() {
        let scaler = StandardScaler::fit(&[]);
        assert_eq!(scaler.transform(42.0), 42.0);
    }
}
