use bevy::prelude::*;

/// Fill of the polygon being drawn.
pub const SKETCH_FILL: Color = Color::srgba(1.0, 1.0, 1.0, 0.2);
pub const SKETCH_STROKE: Color = Color::srgba(0.0, 0.0, 0.0, 0.5);
/// Dash and gap lengths of the sketch outline, in pixels.
pub const SKETCH_DASH: [f32; 2] = [10.0, 10.0];
pub const SKETCH_VERTEX_RADIUS: f32 = 5.0;
pub const SKETCH_VERTEX_STROKE: Color = Color::srgba(0.0, 0.0, 0.0, 0.7);
pub const SKETCH_VERTEX_FILL: Color = Color::srgba(1.0, 1.0, 1.0, 0.2);

pub const FEATURE_FILL: Color = Color::srgba(1.0, 1.0, 1.0, 0.4);
// #3399CC
pub const FEATURE_STROKE: Color = Color::srgb(0.2, 0.6, 0.8);
pub const FEATURE_POINT_RADIUS: f32 = 5.0;

/// Z layers, tiles sit at 0.
pub const FEATURE_Z: f32 = 1.0;
pub const SKETCH_Z: f32 = 2.0;

/// Cuts a polyline into the visible dashes of a dash pattern.
pub fn dash_segments(points: &[Vec2], dash: f32, gap: f32) -> Vec<(Vec2, Vec2)> {
    let mut segments = Vec::new();
    if dash <= 0.0 {
        return segments;
    }
    let period = dash + gap.max(0.0);
    // Distance walked into the current period, carried across vertices.
    let mut phase = 0.0;

    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let length = start.distance(end);
        if length == 0.0 {
            continue;
        }
        let direction = (end - start) / length;
        let mut walked = 0.0;
        while walked < length {
            let step = if phase < dash { dash - phase } else { period - phase };
            let next = (walked + step).min(length);
            if phase < dash {
                segments.push((start + direction * walked, start + direction * next));
            }
            phase = (phase + next - walked) % period;
            walked = next;
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_is_cut_into_dashes() {
        let segments = dash_segments(&[Vec2::ZERO, Vec2::new(35.0, 0.0)], 10.0, 10.0);
        assert_eq!(
            segments,
            vec![
                (Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)),
                (Vec2::new(20.0, 0.0), Vec2::new(30.0, 0.0)),
            ]
        );
    }

    #[test]
    fn pattern_continues_around_corners() {
        let segments = dash_segments(
            &[Vec2::ZERO, Vec2::new(15.0, 0.0), Vec2::new(15.0, 15.0)],
            10.0,
            10.0,
        );
        // The gap that starts on the first edge ends 5 pixels up the second.
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], (Vec2::new(15.0, 5.0), Vec2::new(15.0, 15.0)));
    }

    #[test]
    fn degenerate_input_has_no_dashes() {
        assert!(dash_segments(&[Vec2::ONE], 10.0, 10.0).is_empty());
        assert!(dash_segments(&[Vec2::ONE, Vec2::ONE], 10.0, 10.0).is_empty());
        assert!(dash_segments(&[Vec2::ZERO, Vec2::X], 0.0, 10.0).is_empty());
    }
}
