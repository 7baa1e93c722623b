//! Planar outlines: flattening vector paths into closed contours and
//! grouping contours into fillable shapes.
//!
//! A shape is one outer contour plus the holes nested directly inside it.
//! Nesting is decided by containment parity, so the grouping matches the
//! solid fill of an SVG path or a glyph regardless of how the source wound
//! its sub-paths. Outer contours are normalized to counter-clockwise and
//! holes to clockwise (in a y-up frame), which the extruder relies on for
//! outward-facing side normals.

use lyon_path::iterator::PathIterator;
use lyon_path::math::point;
use lyon_path::{Path, PathEvent};

/// Curve flattening tolerance, in path units.
pub const DEFAULT_TOLERANCE: f32 = 0.05;

const EPSILON: f32 = 1e-6;

/// A closed polyline. The closing edge from the last point back to the first
/// is implicit.
pub type Contour = Vec<[f32; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Shape
{
        pub outer: Contour,
        pub holes: Vec<Contour>,
}

impl Shape
{
        pub fn rings(&self) -> impl Iterator<Item = &Contour>
        {
                std::iter::once(&self.outer).chain(self.holes.iter())
        }

        /// Builds a closed lyon path of the outer contour and its holes.
        pub fn to_path(&self) -> Path
        {
                let mut builder = Path::builder();

                for ring in self.rings()
                {
                        let mut points = ring.iter();

                        let Some(first) = points.next()
                        else
                        {
                                continue;
                        };

                        builder.begin(point(first[0], first[1]));

                        for p in points
                        {
                                builder.line_to(point(p[0], p[1]));
                        }

                        builder.end(true);
                }

                builder.build()
        }
}

/// Flattens every sub-path of `path` into a contour, dropping degenerate
/// ones (fewer than three distinct points or no area).
pub fn flatten(
        path: &Path,
        tolerance: f32,
) -> Vec<Contour>
{
        let mut contours = Vec::new();
        let mut current: Contour = Vec::new();

        for event in path.iter().flattened(tolerance)
        {
                match event
                {
                        PathEvent::Begin {
                                at,
                        } =>
                        {
                                current.clear();
                                current.push([at.x, at.y]);
                        }
                        PathEvent::Line {
                                to, ..
                        } =>
                        {
                                current.push([to.x, to.y]);
                        }
                        PathEvent::End {
                                ..
                        } =>
                        {
                                let contour = clean(std::mem::take(&mut current));

                                if contour.len() >= 3 && signed_area(&contour).abs() > EPSILON
                                {
                                        contours.push(contour);
                                }
                        }
                        // Flattening only yields lines.
                        PathEvent::Quadratic {
                                ..
                        }
                        | PathEvent::Cubic {
                                ..
                        } =>
                        {}
                }
        }

        contours
}

/// Groups contours into shapes by containment parity.
pub fn group_into_shapes(contours: Vec<Contour>) -> Vec<Shape>
{
        let contours: Vec<Contour> = contours.into_iter().filter(|c| c.len() >= 3).collect();

        let depths: Vec<usize> = contours
                .iter()
                .enumerate()
                .map(|(i, contour)| {
                        contours.iter()
                                .enumerate()
                                .filter(|(j, other)| *j != i && contains(other, contour[0]))
                                .count()
                })
                .collect();

        let mut parents: Vec<Option<usize>> = vec![None; contours.len()];

        for (i, contour) in contours.iter().enumerate()
        {
                if depths[i] % 2 == 0
                {
                        continue;
                }

                parents[i] = contours
                        .iter()
                        .enumerate()
                        .filter(|(j, other)| {
                                *j != i && depths[*j] + 1 == depths[i] && contains(other, contour[0])
                        })
                        .min_by(|(_, a), (_, b)| {
                                signed_area(a).abs().total_cmp(&signed_area(b).abs())
                        })
                        .map(|(j, _)| j);
        }

        let mut shapes: Vec<Shape> = Vec::new();
        let mut shape_of: Vec<Option<usize>> = vec![None; contours.len()];

        for (i, contour) in contours.iter().enumerate()
        {
                if depths[i] % 2 == 0
                {
                        shape_of[i] = Some(shapes.len());
                        shapes.push(Shape {
                                outer: oriented(contour.clone(), true),
                                holes: Vec::new(),
                        });
                }
        }

        for (i, contour) in contours.into_iter().enumerate()
        {
                let Some(parent) = parents[i]
                else
                {
                        continue;
                };

                if let Some(index) = shape_of[parent]
                {
                        shapes[index].holes.push(oriented(contour, false));
                }
        }

        shapes
}

/// Twice-halved shoelace area; positive for counter-clockwise in a y-up frame.
pub fn signed_area(contour: &[[f32; 2]]) -> f32
{
        let mut area = 0.0;

        for i in 0..contour.len()
        {
                let a = contour[i];
                let b = contour[(i + 1) % contour.len()];
                area += a[0] * b[1] - b[0] * a[1];
        }

        area * 0.5
}

/// Even-odd ray casting test.
pub fn contains(
        contour: &[[f32; 2]],
        p: [f32; 2],
) -> bool
{
        let mut inside = false;
        let mut j = contour.len().wrapping_sub(1);

        for i in 0..contour.len()
        {
                let a = contour[i];
                let b = contour[j];

                if (a[1] > p[1]) != (b[1] > p[1])
                {
                        let x = (b[0] - a[0]) * (p[1] - a[1]) / (b[1] - a[1]) + a[0];

                        if p[0] < x
                        {
                                inside = !inside;
                        }
                }

                j = i;
        }

        inside
}

fn oriented(
        mut contour: Contour,
        counter_clockwise: bool,
) -> Contour
{
        if (signed_area(&contour) > 0.0) != counter_clockwise
        {
                contour.reverse();
        }

        contour
}

fn clean(points: Contour) -> Contour
{
        let mut ring: Contour = Vec::with_capacity(points.len());

        for p in points
        {
                if let Some(last) = ring.last()
                {
                        if (last[0] - p[0]).abs() < EPSILON && (last[1] - p[1]).abs() < EPSILON
                        {
                                continue;
                        }
                }

                ring.push(p);
        }

        while ring.len() >= 2
        {
                let first = ring[0];
                let last = ring[ring.len() - 1];

                if (first[0] - last[0]).abs() < EPSILON && (first[1] - last[1]).abs() < EPSILON
                {
                        ring.pop();
                }
                else
                {
                        break;
                }
        }

        ring
}

#[cfg(test)]
mod tests
{
        use super::*;

        fn square(
                x: f32,
                y: f32,
                size: f32,
        ) -> Contour
        {
                vec![[x, y], [x + size, y], [x + size, y + size], [x, y + size]]
        }

        #[test]
        fn square_with_hole_is_one_shape()
        {
                let shapes = group_into_shapes(vec![square(0.0, 0.0, 10.0), square(2.0, 2.0, 6.0)]);

                assert_eq!(shapes.len(), 1);
                assert_eq!(shapes[0].holes.len(), 1);
                assert!(signed_area(&shapes[0].outer) > 0.0);
                assert!(signed_area(&shapes[0].holes[0]) < 0.0);
        }

        #[test]
        fn disjoint_contours_become_separate_shapes()
        {
                let shapes = group_into_shapes(vec![square(0.0, 0.0, 1.0), square(5.0, 0.0, 1.0)]);

                assert_eq!(shapes.len(), 2);
                assert!(shapes.iter().all(|s| s.holes.is_empty()));
        }

        #[test]
        fn island_inside_hole_is_its_own_shape()
        {
                let shapes = group_into_shapes(vec![
                        square(0.0, 0.0, 10.0),
                        square(1.0, 1.0, 8.0),
                        square(4.0, 4.0, 2.0),
                ]);

                assert_eq!(shapes.len(), 2);
                assert_eq!(shapes[0].holes.len(), 1);
                assert!(shapes[1].holes.is_empty());
        }

        #[test]
        fn clockwise_outer_is_normalized()
        {
                let mut cw = square(0.0, 0.0, 1.0);
                cw.reverse();

                let shapes = group_into_shapes(vec![cw]);

                assert!(signed_area(&shapes[0].outer) > 0.0);
        }

        #[test]
        fn flatten_drops_closing_duplicate_and_degenerate_paths()
        {
                let mut builder = Path::builder();
                builder.begin(point(0.0, 0.0));
                builder.line_to(point(4.0, 0.0));
                builder.line_to(point(4.0, 4.0));
                builder.line_to(point(0.0, 0.0));
                builder.end(true);

                builder.begin(point(10.0, 10.0));
                builder.line_to(point(11.0, 10.0));
                builder.end(true);

                let contours = flatten(&builder.build(), DEFAULT_TOLERANCE);

                assert_eq!(contours.len(), 1);
                assert_eq!(contours[0].len(), 3);
        }

        #[test]
        fn flatten_subdivides_curves()
        {
                let mut builder = Path::builder();
                builder.begin(point(0.0, 0.0));
                builder.quadratic_bezier_to(point(5.0, 10.0), point(10.0, 0.0));
                builder.end(true);

                let contours = flatten(&builder.build(), 0.1);

                assert_eq!(contours.len(), 1);
                assert!(contours[0].len() > 3);
        }

        #[test]
        fn ray_cast_containment()
        {
                let s = square(0.0, 0.0, 2.0);

                assert!(contains(&s, [1.0, 1.0]));
                assert!(!contains(&s, [3.0, 1.0]));
        }
}
