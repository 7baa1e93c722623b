//! Prism extrusion of planar shapes along +Z.
//!
//! Caps are tessellated with lyon under the even-odd rule, so a shape's
//! holes stay open. Side walls are quad strips following each ring; with a
//! bevel the strip bulges outward by the bevel size along a quarter-circle
//! profile and returns to the outline at both caps, which keeps the solid
//! closed.

use std::f32::consts::FRAC_PI_2;

use lyon_tessellation::{BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers};

use crate::geometry::GeometryError;
use crate::geometry::mesh::Mesh;
use crate::geometry::outline::{DEFAULT_TOLERANCE, Shape};
use crate::geometry::vertex::Vertex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bevel
{
        /// Depth the chamfer takes from each cap.
        pub thickness: f32,
        /// How far the chamfer pushes the wall outward.
        pub size: f32,
        pub segments: u32,
}

impl Default for Bevel
{
        fn default() -> Self
        {
                Self {
                        thickness: 0.2,
                        size: 0.1,
                        segments: 3,
                }
        }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeOptions
{
        pub depth: f32,
        pub bevel: Option<Bevel>,
        pub tolerance: f32,
}

impl ExtrudeOptions
{
        pub fn new(
                depth: f32,
                bevel: bool,
        ) -> Self
        {
                Self {
                        depth,
                        bevel: bevel.then(Bevel::default),
                        tolerance: DEFAULT_TOLERANCE,
                }
        }
}

/// Extrudes a single shape into vertex and index batches.
pub fn extrude_shape(
        shape: &Shape,
        options: &ExtrudeOptions,
) -> Result<(Vec<Vertex>, Vec<u32>), GeometryError>
{
        if !options.depth.is_finite() || options.depth <= 0.0
        {
                return Err(GeometryError::InvalidDepth(options.depth));
        }

        let mut cap: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();

        FillTessellator::new()
                .tessellate_path(
                        &shape.to_path(),
                        &FillOptions::tolerance(options.tolerance)
                                .with_fill_rule(FillRule::EvenOdd),
                        &mut BuffersBuilder::new(&mut cap, |vertex: FillVertex| {
                                let p = vertex.position();
                                [p.x, p.y]
                        }),
                )
                .map_err(|e| GeometryError::Tessellation(format!("{e:?}")))?;

        let mut vertices = Vec::with_capacity(cap.vertices.len() * 2);
        let mut indices = Vec::with_capacity(cap.indices.len() * 2);

        // Back cap at z = 0 facing -Z, front cap at z = depth facing +Z.
        for (z, normal, facing_up) in [(0.0, -1.0, false), (options.depth, 1.0, true)]
        {
                let base = vertices.len() as u32;

                vertices.extend(cap.vertices.iter().map(|p| Vertex::new([p[0], p[1], z], [0.0, 0.0, normal])));

                for tri in cap.indices.chunks_exact(3)
                {
                        let (a, b, c) = (tri[0], tri[1], tri[2]);

                        let ccw = triangle_area(
                                cap.vertices[a as usize],
                                cap.vertices[b as usize],
                                cap.vertices[c as usize],
                        ) > 0.0;

                        if ccw == facing_up
                        {
                                indices.extend_from_slice(&[base + a, base + b, base + c]);
                        }
                        else
                        {
                                indices.extend_from_slice(&[base + a, base + c, base + b]);
                        }
                }
        }

        let profile = side_profile(options.depth, options.bevel);

        for ring in shape.rings()
        {
                for i in 0..ring.len()
                {
                        add_side_strip(
                                &mut vertices,
                                &mut indices,
                                ring[i],
                                ring[(i + 1) % ring.len()],
                                &profile,
                        );
                }
        }

        Ok((vertices, indices))
}

/// Extrudes every shape into one combined mesh.
pub fn extrude_shapes(
        name: impl Into<String>,
        shapes: &[Shape],
        options: &ExtrudeOptions,
) -> Result<Mesh, GeometryError>
{
        let mut mesh = Mesh::empty(name);

        for shape in shapes
        {
                let (vertices, indices) = extrude_shape(shape, options)?;
                mesh.extend(vertices, indices);
        }

        Ok(mesh)
}

/// `(z, outward offset)` rings from the back cap to the front cap.
fn side_profile(
        depth: f32,
        bevel: Option<Bevel>,
) -> Vec<(f32, f32)>
{
        let Some(bevel) = bevel
        else
        {
                return vec![(0.0, 0.0), (depth, 0.0)];
        };

        let thickness = bevel.thickness.clamp(0.0, depth * 0.5);
        let segments = bevel.segments.max(1);

        let mut rings = Vec::with_capacity(segments as usize * 2 + 2);

        for k in 0..=segments
        {
                let angle = k as f32 / segments as f32 * FRAC_PI_2;
                rings.push((thickness * (1.0 - angle.cos()), bevel.size * angle.sin()));
        }

        for k in (0..=segments).rev()
        {
                let angle = k as f32 / segments as f32 * FRAC_PI_2;
                rings.push((depth - thickness * (1.0 - angle.cos()), bevel.size * angle.sin()));
        }

        rings.dedup_by(|a, b| (a.0 - b.0).abs() < f32::EPSILON && (a.1 - b.1).abs() < f32::EPSILON);

        rings
}

fn add_side_strip(
        vertices: &mut Vec<Vertex>,
        indices: &mut Vec<u32>,
        from: [f32; 2],
        to: [f32; 2],
        profile: &[(f32, f32)],
)
{
        let dx = to[0] - from[0];
        let dy = to[1] - from[1];
        let len = (dx * dx + dy * dy).sqrt();

        if len < 1e-6
        {
                return;
        }

        // Right-hand normal: outward for counter-clockwise outers and
        // clockwise holes.
        let n = [dy / len, -dx / len];
        let normal = [n[0], n[1], 0.0];

        for pair in profile.windows(2)
        {
                let (z0, off0) = pair[0];
                let (z1, off1) = pair[1];

                let start = vertices.len() as u32;

                vertices.push(Vertex::new([from[0] + n[0] * off0, from[1] + n[1] * off0, z0], normal));
                vertices.push(Vertex::new([to[0] + n[0] * off0, to[1] + n[1] * off0, z0], normal));
                vertices.push(Vertex::new([to[0] + n[0] * off1, to[1] + n[1] * off1, z1], normal));
                vertices.push(Vertex::new([from[0] + n[0] * off1, from[1] + n[1] * off1, z1], normal));

                indices.extend_from_slice(&[start, start + 1, start + 2, start, start + 2, start + 3]);
        }
}

fn triangle_area(
        a: [f32; 2],
        b: [f32; 2],
        c: [f32; 2],
) -> f32
{
        ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])) * 0.5
}

#[cfg(test)]
mod tests
{
        use super::*;
        use crate::geometry::outline::group_into_shapes;

        fn square_shape() -> Shape
        {
                group_into_shapes(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]).remove(0)
        }

        #[test]
        fn square_prism_counts()
        {
                let (vertices, indices) = extrude_shape(&square_shape(), &ExtrudeOptions::new(2.0, false)).unwrap();

                // Two caps of two triangles, four walls of one quad.
                assert_eq!(indices.len() / 3, 2 * 2 + 4 * 2);
                assert_eq!(vertices.len(), 4 * 2 + 4 * 4);
        }

        #[test]
        fn prism_spans_requested_depth()
        {
                let (vertices, _) = extrude_shape(&square_shape(), &ExtrudeOptions::new(8.0, false)).unwrap();

                let max_z = vertices.iter().map(|v| v.position[2]).fold(f32::MIN, f32::max);
                let min_z = vertices.iter().map(|v| v.position[2]).fold(f32::MAX, f32::min);

                assert_eq!(min_z, 0.0);
                assert_eq!(max_z, 8.0);
        }

        #[test]
        fn front_cap_faces_positive_z()
        {
                let (vertices, indices) = extrude_shape(&square_shape(), &ExtrudeOptions::new(1.0, false)).unwrap();

                for tri in indices.chunks_exact(3)
                {
                        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| vertices[i as usize]);

                        if a.normal == [0.0, 0.0, 1.0]
                        {
                                let area = triangle_area(
                                        [a.position[0], a.position[1]],
                                        [b.position[0], b.position[1]],
                                        [c.position[0], c.position[1]],
                                );
                                assert!(area > 0.0);
                        }
                }
        }

        #[test]
        fn side_normals_point_outward()
        {
                let (vertices, _) = extrude_shape(&square_shape(), &ExtrudeOptions::new(1.0, false)).unwrap();

                for v in vertices.iter().filter(|v| v.normal[2] == 0.0)
                {
                        // Outward from the square's center.
                        let to_vertex = [v.position[0] - 0.5, v.position[1] - 0.5];
                        assert!(to_vertex[0] * v.normal[0] + to_vertex[1] * v.normal[1] > 0.0);
                }
        }

        #[test]
        fn bevel_adds_rings_and_bulges_outward()
        {
                let plain = extrude_shape(&square_shape(), &ExtrudeOptions::new(1.0, false)).unwrap();
                let beveled = extrude_shape(&square_shape(), &ExtrudeOptions::new(1.0, true)).unwrap();

                assert!(beveled.1.len() > plain.1.len());

                let max_x = beveled.0.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
                assert!((max_x - 1.1).abs() < 1e-4);
        }

        #[test]
        fn hole_stays_open()
        {
                let shapes = group_into_shapes(vec![
                        vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]],
                        vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0]],
                ]);

                let (vertices, indices) = extrude_shape(&shapes[0], &ExtrudeOptions::new(1.0, false)).unwrap();

                for tri in indices.chunks_exact(3)
                {
                        let verts = [tri[0], tri[1], tri[2]].map(|i| vertices[i as usize]);

                        if verts[0].normal[2] != 0.0
                        {
                                let cx = verts.iter().map(|v| v.position[0]).sum::<f32>() / 3.0;
                                let cy = verts.iter().map(|v| v.position[1]).sum::<f32>() / 3.0;
                                assert!(!(cx > 4.0 && cx < 6.0 && cy > 4.0 && cy < 6.0));
                        }
                }
        }

        #[test]
        fn rejects_non_positive_depth()
        {
                assert!(matches!(
                        extrude_shape(&square_shape(), &ExtrudeOptions::new(0.0, false)),
                        Err(GeometryError::InvalidDepth(_))
                ));
        }
}
