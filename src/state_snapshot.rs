use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub inputs: [f64; 2],
    pub weights: [f64; 2],
    pub activation: ActivationFunction,
    pub weighted_sum: f64,
    pub output: f64,
}
