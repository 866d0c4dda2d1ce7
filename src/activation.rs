use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use simple_error::SimpleError;

pub const LEAKY_RELU_SLOPE: f64 = 0.01;

pub const CURVE_SAMPLE_COUNT: usize = 100;
pub const CURVE_SAMPLE_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivationFunction {
    Linear,
    Sigmoid,
    Relu,
    Softplus,
    Tanh,
    LeakyRelu,
}

impl ActivationFunction {
    /// Table order, which is also the order of the selector options.
    pub const ALL: [ActivationFunction; 6] = [
        ActivationFunction::Linear,
        ActivationFunction::Sigmoid,
        ActivationFunction::Relu,
        ActivationFunction::Softplus,
        ActivationFunction::Tanh,
        ActivationFunction::LeakyRelu,
    ];

    pub fn identifier(&self) -> &'static str {
        match self {
            ActivationFunction::Linear => "linear",
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Relu => "relu",
            ActivationFunction::Softplus => "softplus",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::LeakyRelu => "leaky-relu",
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Linear => x,
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::Relu => x.max(0.0),
            ActivationFunction::Softplus => x.exp().ln_1p(),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    LEAKY_RELU_SLOPE * x
                }
            }
        }
    }

    /// Samples the curve on [-5, 5) in steps of 0.1.
    pub fn sample_curve(&self) -> Vec<(f64, f64)> {
        let half = (CURVE_SAMPLE_COUNT / 2) as f64;
        (0..CURVE_SAMPLE_COUNT)
            .map(|i| {
                let x = (i as f64 - half) * CURVE_SAMPLE_STEP;
                (x, self.apply(x))
            })
            .collect()
    }
}

impl Default for ActivationFunction {
    fn default() -> Self {
        ActivationFunction::Linear
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for ActivationFunction {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivationFunction::ALL
            .into_iter()
            .find(|activation| activation.identifier() == s)
            .ok_or_else(|| SimpleError::new(format!("unknown activation function: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use itertools::assert_equal;

    #[test]
    fn table_identifiers() {
        assert_equal(
            ActivationFunction::ALL.iter().map(|a| a.identifier()),
            ["linear", "sigmoid", "relu", "softplus", "tanh", "leaky-relu"],
        );
    }

    #[test]
    fn reference_values() {
        assert_approx_eq!(f64, ActivationFunction::Sigmoid.apply(0.0), 0.5);
        assert_approx_eq!(f64, ActivationFunction::Relu.apply(-3.0), 0.0);
        assert_approx_eq!(f64, ActivationFunction::Relu.apply(3.0), 3.0);
        assert_approx_eq!(f64, ActivationFunction::Tanh.apply(0.0), 0.0);
        assert_approx_eq!(f64, ActivationFunction::Softplus.apply(0.0), 2f64.ln());
        assert_approx_eq!(f64, ActivationFunction::LeakyRelu.apply(-10.0), -0.1);
        assert_approx_eq!(f64, ActivationFunction::LeakyRelu.apply(2.5), 2.5);
        assert_approx_eq!(f64, ActivationFunction::Linear.apply(-1.75), -1.75);
    }

    #[test]
    fn sigmoid_symmetry() {
        for x in [0.5, 1.0, 2.0, 4.5] {
            let sum = ActivationFunction::Sigmoid.apply(x) + ActivationFunction::Sigmoid.apply(-x);
            assert_approx_eq!(f64, sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn pure_functions() {
        for activation in ActivationFunction::ALL {
            for x in [-4.0, -0.3, 0.0, 0.7, 3.9] {
                assert_eq!(activation.apply(x).to_bits(), activation.apply(x).to_bits());
            }
        }
    }

    #[test]
    fn parse_identifiers() {
        for activation in ActivationFunction::ALL {
            assert_eq!(
                activation.identifier().parse::<ActivationFunction>().unwrap(),
                activation
            );
            assert_eq!(activation.to_string(), activation.identifier());
        }

        let result = "swish".parse::<ActivationFunction>();
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().as_str(),
            "unknown activation function: swish"
        );
    }

    #[test]
    fn serde_uses_identifiers() {
        assert_eq!(
            serde_json::to_string(&ActivationFunction::LeakyRelu).unwrap(),
            "\"leaky-relu\""
        );
        let parsed: ActivationFunction = serde_yaml::from_str("softplus").unwrap();
        assert_eq!(parsed, ActivationFunction::Softplus);
    }

    #[test]
    fn curve_sampling_window() {
        let curve = ActivationFunction::Relu.sample_curve();
        assert_eq!(curve.len(), 100);
        assert_approx_eq!(f64, curve[0].0, -5.0);
        assert_approx_eq!(f64, curve[50].0, 0.0);
        assert_approx_eq!(f64, curve[99].0, 4.9, epsilon = 1e-9);
        assert!(curve.iter().all(|(x, y)| *y == x.max(0.0)));
    }
}
