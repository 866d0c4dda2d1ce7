use serde::{Deserialize, Serialize};
use simple_error::SimpleError;

use crate::util::OUTPUT_CONNECTOR_MARGIN;

pub const MAX_INPUT_NODES: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct VisualizationParams {
    pub width: f64,
    pub height: f64,
    pub neuron_radius: f64,
    #[serde(rename = "inputAngle1")]
    pub input_angle_1: f64,
    #[serde(rename = "inputAngle2")]
    pub input_angle_2: f64,
    pub line_stroke: String,
    pub line_width: f64,
    pub text_content: String,
    pub input_nodes: usize,
    pub interactive: bool,
    pub seed_override: Option<u64>,
}

impl Default for VisualizationParams {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 200.0,
            neuron_radius: 40.0,
            input_angle_1: 30.0,
            input_angle_2: -30.0,
            line_stroke: "black".to_string(),
            line_width: 2.0,
            text_content: "f".to_string(),
            input_nodes: 0,
            interactive: false,
            seed_override: None,
        }
    }
}

pub fn validate_visualization_params(params: &VisualizationParams) -> Result<(), SimpleError> {
    validate_positive("width", params.width)?;
    validate_positive("height", params.height)?;
    validate_positive("neuron_radius", params.neuron_radius)?;
    validate_positive("line_width", params.line_width)?;

    if params.neuron_radius >= params.width / 2.0 - OUTPUT_CONNECTOR_MARGIN {
        return Err(SimpleError::new(
            "neuron_radius leaves no room for the output connector",
        ));
    }

    if 2.0 * params.neuron_radius > params.height {
        return Err(SimpleError::new(
            "neuron body must fit into the canvas height",
        ));
    }

    if !params.input_angle_1.is_finite() || !params.input_angle_2.is_finite() {
        return Err(SimpleError::new("input angles must be finite"));
    }

    if params.line_stroke.trim().is_empty() {
        return Err(SimpleError::new("line_stroke must not be empty"));
    }

    if params.input_nodes > MAX_INPUT_NODES {
        return Err(SimpleError::new(format!(
            "input_nodes must not be greater than {}",
            MAX_INPUT_NODES
        )));
    }

    Ok(())
}

fn validate_positive(name: &str, value: f64) -> Result<(), SimpleError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimpleError::new(format!(
            "{} must be strictly positive",
            name
        )));
    }

    Ok(())
}
