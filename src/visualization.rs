use crate::activation::ActivationFunction;
use crate::input_node::{InputNode, NodeRole};
use crate::params::{self, VisualizationParams};
use crate::state_snapshot::StateSnapshot;
use crate::surface::{DrawingSurface, NodeId, Point};
use crate::util::{self, parse_or_zero, round_to_cents};
use itertools::Itertools;
use log::{debug, error, trace, warn};
use rand::{rngs::StdRng, SeedableRng};
use simple_error::SimpleResult;
use simple_error::{try_with, SimpleError};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const NEURON_FILL: &str = "white";
const GLYPH_FONT_SIZE: u32 = 20;
const CURVE_STROKE: &str = "#7fa3c8";
const CURVE_STROKE_WIDTH: f64 = 2.0;
const CURVE_SCALE_FACTOR: f64 = 0.2;
const OPERATING_POINT_RADIUS: f64 = 4.0;
const OPERATING_POINT_FILL: &str = "red";
const NUM_EDITABLE_INPUTS: usize = 2;

/// Creates a visualization mounted under `mount_point_id`. Never fails: if the mount point
/// is missing or the params are invalid, the error is logged and a detached instance is
/// returned that draws nothing and ignores all events.
pub fn create_visualization<S: DrawingSurface>(
    surface: &mut S,
    mount_point_id: &str,
    params: VisualizationParams,
) -> PerceptronVisualization {
    match try_create_visualization(surface, mount_point_id, params.clone()) {
        Ok(visualization) => visualization,
        Err(err) => {
            error!(
                "failed to initialize visualization in '{}': {}",
                mount_point_id, err
            );
            PerceptronVisualization::detached(params)
        }
    }
}

pub fn try_create_visualization<S: DrawingSurface>(
    surface: &mut S,
    mount_point_id: &str,
    params: VisualizationParams,
) -> SimpleResult<PerceptronVisualization> {
    try_with!(
        params::validate_visualization_params(&params),
        "invalid visualization parameters"
    );

    let mount_point = surface
        .mount_point(mount_point_id)
        .ok_or_else(|| SimpleError::new(format!("mount point not found: {}", mount_point_id)))?;

    let view = View::build(surface, mount_point, mount_point_id, &params);

    trace!(
        "created visualization in '{}' with {} input nodes",
        mount_point_id,
        view.input_nodes.len()
    );

    let mut visualization = PerceptronVisualization {
        params,
        state: PerceptronState::default(),
        view: Some(view),
    };

    if visualization.params.interactive {
        visualization.update(surface);
    }

    Ok(visualization)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlTarget {
    Input(usize),
    Weight(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerceptronState {
    pub inputs: [f64; 2],
    pub weights: [f64; 2],
    pub activation: ActivationFunction,
    pub output: f64,
}

impl PerceptronState {
    pub fn weighted_sum(&self) -> f64 {
        self.inputs
            .iter()
            .zip(&self.weights)
            .map(|(input, weight)| input * weight)
            .sum()
    }

    fn recompute(&mut self) -> f64 {
        let weighted_sum = self.weighted_sum();
        self.output = self.activation.apply(weighted_sum);
        weighted_sum
    }
}

impl Default for PerceptronState {
    fn default() -> Self {
        Self {
            inputs: [0.0, 0.0],
            weights: [1.0, 1.0],
            activation: ActivationFunction::default(),
            output: 0.0,
        }
    }
}

/// Depth layers of the drawing, bottom to top.
#[derive(Debug, Clone, Copy)]
pub struct Layers {
    pub background: NodeId,
    pub foreground: NodeId,
    pub activation: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct Controls {
    pub container: NodeId,
    pub activation_select: NodeId,
    pub inputs: [NodeId; 2],
    pub weights: [NodeId; 2],
    pub output_display: NodeId,
}

#[derive(Debug, Clone)]
struct View {
    mount_point: NodeId,
    svg: NodeId,
    marker_id: String,
    layers: Layers,
    controls: Option<Controls>,
    input_nodes: Vec<InputNode>,
}

impl View {
    fn build<S: DrawingSurface>(
        surface: &mut S,
        mount_point: NodeId,
        mount_point_id: &str,
        params: &VisualizationParams,
    ) -> Self {
        let center = Point::new(params.width / 2.0, params.height / 2.0);
        let marker_id = format!("arrowhead-{}", mount_point_id);

        let svg = surface
            .append(mount_point, "svg")
            .attr("xmlns", SVG_NAMESPACE)
            .attr("width", params.width)
            .attr("height", params.height)
            .id();

        define_arrowhead(surface, svg, &marker_id, &params.line_stroke);

        let layers = Layers {
            background: surface.append(svg, "g").attr("class", "background").id(),
            foreground: surface.append(svg, "g").attr("class", "foreground").id(),
            activation: surface.append(svg, "g").attr("class", "activation").id(),
        };

        let mut rng = match params.seed_override {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (controls, input_nodes) = if params.interactive {
            let controls = create_controls(surface, mount_point);
            let positions =
                util::input_node_positions(center, NUM_EDITABLE_INPUTS, params.neuron_radius);
            let input_nodes: Vec<InputNode> = positions
                .into_iter()
                .map(|position| {
                    InputNode::draw(
                        surface,
                        svg,
                        position,
                        params.neuron_radius,
                        NodeRole::Editable,
                        &mut rng,
                    )
                })
                .collect();
            (Some(controls), input_nodes)
        } else {
            let positions =
                util::input_node_positions(center, params.input_nodes, params.neuron_radius);
            let input_nodes: Vec<InputNode> = positions
                .into_iter()
                .enumerate()
                .map(|(i, position)| {
                    InputNode::draw(
                        surface,
                        svg,
                        position,
                        params.neuron_radius,
                        NodeRole::Label(format!("$x_{}$", i)),
                        &mut rng,
                    )
                })
                .collect();
            (None, input_nodes)
        };

        let view = View {
            mount_point,
            svg,
            marker_id,
            layers,
            controls,
            input_nodes,
        };

        view.draw_static(surface, params, center);
        view
    }

    fn draw_static<S: DrawingSurface>(
        &self,
        surface: &mut S,
        params: &VisualizationParams,
        center: Point,
    ) {
        for angle in [params.input_angle_1, params.input_angle_2] {
            let (start, end) =
                util::input_connector(center, angle, params.width, params.neuron_radius);
            self.draw_connector(surface, params, start, end);
        }

        surface
            .append(self.layers.foreground, "circle")
            .attr("cx", center.x)
            .attr("cy", center.y)
            .attr("r", params.neuron_radius)
            .attr("stroke", &params.line_stroke)
            .attr("stroke-width", params.line_width)
            .attr("fill", NEURON_FILL);

        let (start, end) = util::output_connector(center, params.width, params.neuron_radius);
        self.draw_connector(surface, params, start, end);

        if !params.interactive {
            surface
                .append(self.layers.foreground, "text")
                .attr("x", center.x)
                .attr("y", center.y)
                .attr("text-anchor", "middle")
                .attr("dominant-baseline", "middle")
                .attr("font-size", GLYPH_FONT_SIZE)
                .text(&params.text_content);
        }
    }

    fn draw_connector<S: DrawingSurface>(
        &self,
        surface: &mut S,
        params: &VisualizationParams,
        start: Point,
        end: Point,
    ) {
        surface
            .append(self.layers.background, "line")
            .attr("x1", start.x)
            .attr("y1", start.y)
            .attr("x2", end.x)
            .attr("y2", end.y)
            .attr("stroke", &params.line_stroke)
            .attr("stroke-width", params.line_width)
            .attr("marker-end", format!("url(#{})", self.marker_id));
    }

    /// Replaces the activation layer with the sampled curve and the operating point.
    fn redraw_activation<S: DrawingSurface>(
        &self,
        surface: &mut S,
        params: &VisualizationParams,
        activation: ActivationFunction,
        weighted_sum: f64,
    ) {
        surface.clear_children(self.layers.activation);

        let center = Point::new(params.width / 2.0, params.height / 2.0);
        let scale = params.neuron_radius * CURVE_SCALE_FACTOR;
        let to_canvas = |x: f64, y: f64| Point::new(center.x + x * scale, center.y - y * scale);

        let path = activation
            .sample_curve()
            .into_iter()
            .map(|(x, y)| {
                let point = to_canvas(x, y);
                format!("{},{}", point.x, point.y)
            })
            .join(" L ");

        surface
            .append(self.layers.activation, "path")
            .attr("d", format!("M {}", path))
            .attr("stroke", CURVE_STROKE)
            .attr("stroke-width", CURVE_STROKE_WIDTH)
            .attr("fill", "none");

        let operating_point = to_canvas(weighted_sum, activation.apply(weighted_sum));
        surface
            .append(self.layers.activation, "circle")
            .attr("cx", operating_point.x)
            .attr("cy", operating_point.y)
            .attr("r", OPERATING_POINT_RADIUS)
            .attr("fill", OPERATING_POINT_FILL);
    }
}

fn define_arrowhead<S: DrawingSurface>(surface: &mut S, svg: NodeId, marker_id: &str, fill: &str) {
    let defs = surface.append(svg, "defs").id();
    let marker = surface
        .append(defs, "marker")
        .attr("id", marker_id)
        .attr("markerWidth", 10)
        .attr("markerHeight", 7)
        .attr("refX", 9)
        .attr("refY", 3.5)
        .attr("orient", "auto")
        .id();
    surface
        .append(marker, "path")
        .attr("d", "M0,0 L0,7 L9,3.5 Z")
        .attr("fill", fill);
}

fn create_controls<S: DrawingSurface>(surface: &mut S, mount_point: NodeId) -> Controls {
    let container = surface
        .append(mount_point, "div")
        .attr("class", "perceptron-controls")
        .id();

    let activation_select = surface
        .append(container, "select")
        .attr("class", "activation-select")
        .attr("value", ActivationFunction::default())
        .id();
    for activation in ActivationFunction::ALL {
        surface
            .append(activation_select, "option")
            .attr("value", activation)
            .text(activation.identifier());
    }

    let steppers = [0, 1].map(|i| {
        (
            create_number_input(surface, container, "x", i, 0.0),
            create_number_input(surface, container, "w", i, 1.0),
        )
    });

    let output_display = surface
        .append(container, "div")
        .attr("class", "output-display")
        .id();

    Controls {
        container,
        activation_select,
        inputs: steppers.map(|(input, _)| input),
        weights: steppers.map(|(_, weight)| weight),
        output_display,
    }
}

fn create_number_input<S: DrawingSurface>(
    surface: &mut S,
    container: NodeId,
    symbol: &str,
    index: usize,
    initial_value: f64,
) -> NodeId {
    let wrapper = surface
        .append(container, "div")
        .attr("class", "input-wrapper")
        .id();
    surface
        .append(wrapper, "span")
        .text(&format!("{}{} = ", symbol, subscript(index)));
    surface
        .append(wrapper, "input")
        .attr("type", "number")
        .attr("step", "0.01")
        .attr("value", format!("{:.2}", initial_value))
        .id()
}

fn subscript(index: usize) -> String {
    index
        .to_string()
        .chars()
        .filter_map(|digit| digit.to_digit(10))
        .filter_map(|digit| char::from_u32(0x2080 + digit))
        .collect()
}

#[derive(Debug)]
pub struct PerceptronVisualization {
    params: VisualizationParams,
    state: PerceptronState,
    view: Option<View>,
}

impl PerceptronVisualization {
    fn detached(params: VisualizationParams) -> Self {
        Self {
            params,
            state: PerceptronState::default(),
            view: None,
        }
    }

    pub fn params(&self) -> &VisualizationParams {
        &self.params
    }

    pub fn state(&self) -> &PerceptronState {
        &self.state
    }

    pub fn is_attached(&self) -> bool {
        self.view.is_some()
    }

    pub fn svg(&self) -> Option<NodeId> {
        self.view.as_ref().map(|view| view.svg)
    }

    pub fn layers(&self) -> Option<Layers> {
        self.view.as_ref().map(|view| view.layers)
    }

    pub fn controls(&self) -> Option<Controls> {
        self.view.as_ref().and_then(|view| view.controls)
    }

    pub fn input_nodes(&self) -> &[InputNode] {
        self.view
            .as_ref()
            .map(|view| view.input_nodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn output_display_text<'a, S: DrawingSurface>(&self, surface: &'a S) -> Option<&'a str> {
        let controls = self.controls()?;
        surface.text_content(controls.output_display)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            inputs: self.state.inputs,
            weights: self.state.weights,
            activation: self.state.activation,
            weighted_sum: self.state.weighted_sum(),
            output: self.state.output,
        }
    }

    /// Re-reads every rendered text field under the mount point, recomputes the output and
    /// redraws the activation layer. The input steppers are synced to the values read.
    /// Connectors and the neuron body are left alone.
    pub fn update<S: DrawingSurface>(&mut self, surface: &mut S) {
        let view = match &self.view {
            Some(view) => view,
            None => return,
        };

        let field_values: Vec<f64> = surface
            .query_all(view.mount_point, "input", "type", "text")
            .into_iter()
            .map(|field| surface.attribute(field, "value").map_or(0.0, parse_or_zero))
            .collect();

        for (input, value) in self.state.inputs.iter_mut().zip(field_values) {
            *input = value;
        }

        let weighted_sum = self.state.recompute();

        debug!(
            "recomputed output: activation={} weighted_sum={} output={}",
            self.state.activation, weighted_sum, self.state.output
        );

        if let Some(controls) = view.controls {
            for (stepper, input) in controls.inputs.iter().zip(self.state.inputs) {
                surface.set_attribute(*stepper, "value", &format!("{:.2}", input));
            }

            let output_text = format!("{:.4}", self.state.output);
            surface.set_text_content(controls.output_display, &output_text);
            view.redraw_activation(surface, &self.params, self.state.activation, weighted_sum);
        }
    }

    pub fn on_activation_selected<S: DrawingSurface>(&mut self, surface: &mut S, identifier: &str) {
        let select = match &self.view {
            Some(view) => view.controls.map(|controls| controls.activation_select),
            None => {
                warn!("ignoring activation selection on detached visualization");
                return;
            }
        };

        match identifier.parse::<ActivationFunction>() {
            Ok(activation) => {
                self.state.activation = activation;
                if let Some(select) = select {
                    surface.set_attribute(select, "value", activation.identifier());
                }
                self.update(surface);
            }
            Err(err) => warn!("ignoring activation selection: {}", err),
        }
    }

    /// Handles an edit of one of the numeric steppers. The value is rounded to two decimals
    /// before it is stored and written back. Input steppers also overwrite the matching text
    /// field, which is what `update` reads.
    pub fn on_number_input_changed<S: DrawingSurface>(
        &mut self,
        surface: &mut S,
        target: ControlTarget,
        raw: &str,
    ) -> SimpleResult<()> {
        let view = match &self.view {
            Some(view) => view,
            None => {
                warn!("ignoring number input change on detached visualization");
                return Ok(());
            }
        };

        let controls = view
            .controls
            .ok_or_else(|| SimpleError::new("visualization is not interactive"))?;

        let value = round_to_cents(parse_or_zero(raw));

        match target {
            ControlTarget::Input(index) => {
                validate_index(index, "input")?;
                if let Some(node) = view.input_nodes.get(index) {
                    node.set_field_value(surface, value);
                }
                self.state.inputs[index] = value;
            }
            ControlTarget::Weight(index) => {
                validate_index(index, "weight")?;
                surface.set_attribute(controls.weights[index], "value", &format!("{:.2}", value));
                self.state.weights[index] = value;
            }
        }

        self.update(surface);
        Ok(())
    }

    /// Handles an edit of the text field overlaid on input node `index`. Like a stepper edit,
    /// the value is rounded to two decimals before it is written back and stored.
    pub fn on_input_field_changed<S: DrawingSurface>(
        &mut self,
        surface: &mut S,
        index: usize,
        raw: &str,
    ) -> SimpleResult<()> {
        let view = match &self.view {
            Some(view) => view,
            None => {
                warn!("ignoring input field change on detached visualization");
                return Ok(());
            }
        };

        let node = view
            .input_nodes
            .get(index)
            .filter(|node| node.field().is_some())
            .ok_or_else(|| SimpleError::new(format!("invalid input field index: {}", index)))?;

        node.set_field_value(surface, round_to_cents(parse_or_zero(raw)));

        self.update(surface);
        Ok(())
    }
}

fn validate_index(index: usize, kind: &str) -> SimpleResult<()> {
    if index >= NUM_EDITABLE_INPUTS {
        return Err(SimpleError::new(format!("invalid {} index: {}", kind, index)));
    }

    Ok(())
}
