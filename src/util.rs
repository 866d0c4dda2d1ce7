use crate::surface::Point;

pub const INPUT_NODE_OFFSET_X: f64 = 200.0;
pub const INPUT_NODE_PITCH: f64 = 120.0;
pub const INPUT_NODE_MIN_GAP: f64 = 10.0;
pub const OUTPUT_CONNECTOR_MARGIN: f64 = 20.0;

/// Connector entering the neuron at `angle_deg`: from `width / 2 - radius` out along
/// (-cos, -sin) to the neuron boundary.
pub fn input_connector(center: Point, angle_deg: f64, width: f64, radius: f64) -> (Point, Point) {
    let radians = angle_deg.to_radians();
    let (sin, cos) = radians.sin_cos();
    let length = width / 2.0 - radius;

    (
        Point::new(center.x - length * cos, center.y - length * sin),
        Point::new(center.x - radius * cos, center.y - radius * sin),
    )
}

pub fn output_connector(center: Point, width: f64, radius: f64) -> (Point, Point) {
    (
        Point::new(center.x + radius, center.y),
        Point::new(center.x + width / 2.0 - OUTPUT_CONNECTOR_MARGIN, center.y),
    )
}

pub fn input_node_pitch(radius: f64) -> f64 {
    INPUT_NODE_PITCH.max(2.0 * radius + INPUT_NODE_MIN_GAP)
}

/// Centers of `count` input nodes, stacked symmetrically about the vertical center.
pub fn input_node_positions(center: Point, count: usize, radius: f64) -> Vec<Point> {
    let pitch = input_node_pitch(radius);
    let mid = (count as f64 - 1.0) / 2.0;

    (0..count)
        .map(|i| {
            Point::new(
                center.x - INPUT_NODE_OFFSET_X,
                center.y + (i as f64 - mid) * pitch,
            )
        })
        .collect()
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Lenient numeric parse for user-entered text: anything unparseable or non-finite is 0.
pub fn parse_or_zero(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::assert_point_approx_eq;
    use super::*;
    use float_cmp::assert_approx_eq;

    const CENTER: Point = Point { x: 200.0, y: 100.0 };

    #[test]
    fn input_connector_spans_edge_to_boundary() {
        let (start, end) = input_connector(CENTER, 30.0, 400.0, 40.0);
        let cos = 30f64.to_radians().cos();

        assert_point_approx_eq(start, Point::new(200.0 - 160.0 * cos, 80.0));
        assert_point_approx_eq(end, Point::new(200.0 - 40.0 * cos, 80.0));

        let dist_end = ((end.x - CENTER.x).powi(2) + (end.y - CENTER.y).powi(2)).sqrt();
        assert_approx_eq!(f64, dist_end, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn negative_angle_mirrors_vertically() {
        let (upper_start, upper_end) = input_connector(CENTER, 30.0, 400.0, 40.0);
        let (lower_start, lower_end) = input_connector(CENTER, -30.0, 400.0, 40.0);

        assert_approx_eq!(f64, upper_start.x, lower_start.x, epsilon = 1e-9);
        assert_approx_eq!(f64, upper_start.y - CENTER.y, CENTER.y - lower_start.y, epsilon = 1e-9);
        assert_approx_eq!(f64, upper_end.y - CENTER.y, CENTER.y - lower_end.y, epsilon = 1e-9);
    }

    #[test]
    fn output_connector_is_horizontal() {
        let (start, end) = output_connector(CENTER, 400.0, 40.0);
        assert_point_approx_eq(start, Point::new(240.0, 100.0));
        assert_point_approx_eq(end, Point::new(380.0, 100.0));
    }

    #[test]
    fn node_positions_are_centered() {
        let positions = input_node_positions(CENTER, 3, 40.0);
        assert_eq!(positions.len(), 3);
        assert_point_approx_eq(positions[0], Point::new(0.0, -20.0));
        assert_point_approx_eq(positions[1], Point::new(0.0, 100.0));
        assert_point_approx_eq(positions[2], Point::new(0.0, 220.0));

        let positions = input_node_positions(CENTER, 2, 40.0);
        assert_approx_eq!(f64, positions[0].y, 40.0);
        assert_approx_eq!(f64, positions[1].y, 160.0);

        assert!(input_node_positions(CENTER, 0, 40.0).is_empty());
    }

    #[test]
    fn pitch_grows_with_radius() {
        assert_approx_eq!(f64, input_node_pitch(40.0), 120.0);
        assert_approx_eq!(f64, input_node_pitch(60.0), 130.0);

        let positions = input_node_positions(CENTER, 4, 60.0);
        for pair in positions.windows(2) {
            assert!(pair[1].y - pair[0].y > 120.0);
        }
    }

    #[test]
    fn cents() {
        assert_approx_eq!(f64, round_to_cents(3.14159), 3.14);
        assert_approx_eq!(f64, round_to_cents(0.29), 0.29);
        assert_approx_eq!(f64, round_to_cents(-2.005), -2.0, epsilon = 0.011);
        assert_approx_eq!(f64, round_to_cents(7.0), 7.0);
    }

    #[test]
    fn lenient_parse() {
        assert_approx_eq!(f64, parse_or_zero("1.25"), 1.25);
        assert_approx_eq!(f64, parse_or_zero("  -3 "), -3.0);
        assert_approx_eq!(f64, parse_or_zero(""), 0.0);
        assert_approx_eq!(f64, parse_or_zero("abc"), 0.0);
        assert_approx_eq!(f64, parse_or_zero("NaN"), 0.0);
        assert_approx_eq!(f64, parse_or_zero("inf"), 0.0);
    }
}
