use log::warn;
use rand::{distributions::Uniform, prelude::Distribution, Rng};

use crate::surface::{DrawingSurface, NodeId, Point};

const NODE_STROKE: &str = "black";
const NODE_STROKE_WIDTH: f64 = 2.0;
const LABEL_FONT_SIZE: u32 = 20;

const FIELD_WIDTH_PX: f64 = 40.0;
const FIELD_HEIGHT_PX: f64 = 20.0;
const FIELD_VALUE_MIN: f64 = -5.0;
const FIELD_VALUE_MAX: f64 = 5.0;

/// What an input node shows inside its circle. Exactly one feature per node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRole {
    Label(String),
    /// An editable numeric text field overlaid next to the drawing.
    Editable,
    /// Reserved, draws the bare circle.
    Activation,
}

#[derive(Debug, Clone)]
pub struct InputNode {
    position: Point,
    radius: f64,
    role: NodeRole,
    circle: NodeId,
    feature: Option<NodeId>,
}

impl InputNode {
    /// Draws the node into `svg`. An editable field goes into the parent of `svg`, positioned
    /// absolutely in pixels, so it sits outside the SVG coordinate space.
    pub fn draw<S, R>(
        surface: &mut S,
        svg: NodeId,
        position: Point,
        radius: f64,
        role: NodeRole,
        rng: &mut R,
    ) -> Self
    where
        S: DrawingSurface,
        R: Rng + ?Sized,
    {
        let circle = surface
            .append(svg, "circle")
            .attr("cx", position.x)
            .attr("cy", position.y)
            .attr("r", radius)
            .attr("stroke", NODE_STROKE)
            .attr("stroke-width", NODE_STROKE_WIDTH)
            .attr("fill", "white")
            .id();

        let feature = match &role {
            NodeRole::Label(label) => Some(
                surface
                    .append(svg, "text")
                    .attr("x", position.x)
                    .attr("y", position.y)
                    .attr("text-anchor", "middle")
                    .attr("dominant-baseline", "middle")
                    .attr("font-size", LABEL_FONT_SIZE)
                    .text(label)
                    .id(),
            ),
            NodeRole::Editable => match surface.parent(svg) {
                Some(overlay_parent) => {
                    let value = Uniform::new(FIELD_VALUE_MIN, FIELD_VALUE_MAX).sample(rng);
                    Some(draw_field(surface, overlay_parent, position, value))
                }
                None => {
                    warn!("drawing surface has no container, editable field not created");
                    None
                }
            },
            NodeRole::Activation => None,
        };

        Self {
            position,
            radius,
            role,
            circle,
            feature,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn role(&self) -> &NodeRole {
        &self.role
    }

    pub fn circle(&self) -> NodeId {
        self.circle
    }

    /// The editable text field, if this node has one.
    pub fn field(&self) -> Option<NodeId> {
        match self.role {
            NodeRole::Editable => self.feature,
            _ => None,
        }
    }

    pub fn label(&self) -> Option<NodeId> {
        match self.role {
            NodeRole::Label(_) => self.feature,
            _ => None,
        }
    }

    pub fn set_field_value<S: DrawingSurface>(&self, surface: &mut S, value: f64) {
        if let Some(field) = self.field() {
            surface.set_attribute(field, "value", &format!("{:.2}", value));
        }
    }
}

fn draw_field<S: DrawingSurface>(
    surface: &mut S,
    parent: NodeId,
    position: Point,
    value: f64,
) -> NodeId {
    let style = format!(
        "position: absolute; left: {}px; top: {}px; width: {}px; text-align: center; \
         border: 1px solid #ddd; border-radius: 3px; font-family: monospace",
        position.x - FIELD_WIDTH_PX / 2.0,
        position.y - FIELD_HEIGHT_PX / 2.0,
        FIELD_WIDTH_PX
    );

    surface
        .append(parent, "input")
        .attr("type", "text")
        .attr("value", format!("{:.2}", value))
        .attr("style", style)
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::util::parse_or_zero;
    use rand::{rngs::StdRng, SeedableRng};

    fn setup() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let mount = doc.add_mount_point("m");
        let svg = doc.append(mount, "svg").id();
        (doc, mount, svg)
    }

    #[test]
    fn label_node() {
        let (mut doc, mount, svg) = setup();
        let mut rng = StdRng::seed_from_u64(0);
        let sut = InputNode::draw(
            &mut doc,
            svg,
            Point::new(10.0, 20.0),
            40.0,
            NodeRole::Label("$x_0$".to_string()),
            &mut rng,
        );

        assert_eq!(
            doc.to_markup(sut.circle()),
            r#"<circle cx="10" cy="20" r="40" stroke="black" stroke-width="2" fill="white"/>"#
        );
        let label = sut.label().unwrap();
        assert_eq!(doc.text_content(label), Some("$x_0$"));
        assert_eq!(doc.parent(label), Some(svg));
        assert!(sut.field().is_none());
        assert!(doc.elements_by_tag(mount, "input").is_empty());
    }

    #[test]
    fn editable_node() {
        let (mut doc, mount, svg) = setup();
        let mut rng = StdRng::seed_from_u64(42);
        let sut = InputNode::draw(
            &mut doc,
            svg,
            Point::new(0.0, 40.0),
            40.0,
            NodeRole::Editable,
            &mut rng,
        );

        let field = sut.field().unwrap();
        assert_eq!(doc.parent(field), Some(mount));
        assert_eq!(doc.attribute(field, "type"), Some("text"));

        let raw = doc.attribute(field, "value").unwrap();
        let value = parse_or_zero(raw);
        assert!((-5.0..=5.0).contains(&value));
        assert_eq!(raw.split('.').nth(1).map(str::len), Some(2));

        let style = doc.attribute(field, "style").unwrap();
        assert!(style.starts_with("position: absolute; left: -20px; top: 30px; width: 40px"));
        assert!(doc.elements_by_tag(svg, "text").is_empty());
    }

    #[test]
    fn same_seed_same_prefill() {
        let values: Vec<String> = (0..2)
            .map(|_| {
                let (mut doc, _, svg) = setup();
                let mut rng = StdRng::seed_from_u64(7);
                let sut = InputNode::draw(
                    &mut doc,
                    svg,
                    Point::new(0.0, 0.0),
                    40.0,
                    NodeRole::Editable,
                    &mut rng,
                );
                doc.attribute(sut.field().unwrap(), "value")
                    .unwrap()
                    .to_string()
            })
            .collect();

        assert_eq!(values[0], values[1]);
    }

    #[test]
    fn reserved_activation_role_draws_circle_only() {
        let (mut doc, mount, svg) = setup();
        let mut rng = StdRng::seed_from_u64(0);
        let sut = InputNode::draw(
            &mut doc,
            svg,
            Point::new(5.0, 5.0),
            10.0,
            NodeRole::Activation,
            &mut rng,
        );

        assert_eq!(doc.children(svg), &[sut.circle()]);
        assert_eq!(doc.children(mount), &[svg]);
        assert!(sut.field().is_none());
        assert!(sut.label().is_none());
    }

    #[test]
    fn field_value_update() {
        let (mut doc, _, svg) = setup();
        let mut rng = StdRng::seed_from_u64(1);
        let sut = InputNode::draw(
            &mut doc,
            svg,
            Point::new(0.0, 0.0),
            40.0,
            NodeRole::Editable,
            &mut rng,
        );

        sut.set_field_value(&mut doc, 1.5);
        assert_eq!(doc.attribute(sut.field().unwrap(), "value"), Some("1.50"));
    }
}
