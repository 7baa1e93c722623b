//! Static decorative geometry built from inline SVG path data.

use lyon_path::Path;
use lyon_path::math::point;
use usvg::tiny_skia_path::PathSegment;

use crate::geometry::GeometryError;
use crate::geometry::extrude::{ExtrudeOptions, extrude_shapes};
use crate::geometry::mesh::Mesh;
use crate::geometry::outline::{DEFAULT_TOLERANCE, flatten, group_into_shapes};
use crate::resource::Resources;
use crate::scene::graph::{Group, Material, MeshNode, Transform};

/// One piece of the decorative field geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorPathSpec
{
        pub name: &'static str,
        /// SVG path `d` attribute.
        pub path: &'static str,
        pub color: u32,
        pub extrude_depth: f32,
        pub bevel: bool,
        pub z_offset: f32,
}

pub const REFERENCE_PIECES: [VectorPathSpec; 3] = [
        VectorPathSpec {
                name: "top_bar",
                path: "M13 22.5V44H521V23C520.667 21.6667 519.5 18.5 517.5 16.5C515.5 14.5 513 14 512 14H21.5C20.3333 14.3333 17.5 15.5 15.5 17.5C13.5 19.5 13 21.6667 13 22.5Z",
                color: 0x222222,
                extrude_depth: 8.0,
                bevel: false,
                z_offset: 0.0,
        },
        VectorPathSpec {
                name: "body",
                path: "M13 70V44H521V52.5H146.5L111 70H13Z",
                color: 0x000000,
                extrude_depth: 12.0,
                bevel: false,
                z_offset: -2.0,
        },
        VectorPathSpec {
                name: "accent",
                path: "M521 54.5V52.5H146.5L121 65H359.5L372.576 54.5H521Z",
                color: 0x0000aa,
                extrude_depth: 8.0,
                bevel: false,
                z_offset: 0.0,
        },
];

impl VectorPathSpec
{
        /// Wraps the path data in a minimal SVG document.
        pub fn document(&self) -> String
        {
                format!(
                        r#"<svg xmlns="http://www.w3.org/2000/svg" width="1024" height="1024" viewBox="0 0 1024 1024"><path d="{}"/></svg>"#,
                        self.path
                )
        }

        /// Parses, flattens and extrudes the path into one mesh per shape.
        pub fn build_meshes(&self) -> Result<Vec<Mesh>, GeometryError>
        {
                let tree = usvg::Tree::from_str(&self.document(), &usvg::Options::default())?;

                let mut paths = Vec::new();
                collect_paths(tree.root(), &mut paths);

                let contours: Vec<_> = paths.iter().flat_map(|p| flatten(p, DEFAULT_TOLERANCE)).collect();
                let shapes = group_into_shapes(contours);

                if shapes.is_empty()
                {
                        return Err(GeometryError::EmptyShape(self.name.to_string()));
                }

                let options = ExtrudeOptions::new(self.extrude_depth, self.bevel);

                shapes.iter()
                        .enumerate()
                        .map(|(i, shape)| {
                                extrude_shapes(
                                        format!("{}#{}", self.name, i),
                                        std::slice::from_ref(shape),
                                        &options,
                                )
                        })
                        .collect()
        }
}

/// Turns vector path descriptors into static meshes in the root group.
pub struct GeometryBuilder;

impl GeometryBuilder
{
        /// Builds every spec in order, stopping at the first failure. Meshes
        /// from earlier specs stay in `group`. Returns the number of meshes
        /// added.
        pub fn build(
                specs: &[VectorPathSpec],
                resources: &mut Resources,
                group: &mut Group,
        ) -> Result<usize, GeometryError>
        {
                let mut added = 0;

                for spec in specs
                {
                        let meshes = spec.build_meshes()?;

                        for mesh in meshes
                        {
                                let name = mesh.name().to_string();
                                let geometry = resources.add(mesh);

                                group.add(MeshNode {
                                        name,
                                        geometry,
                                        material: Material::new(spec.color),
                                        transform: Transform::from_position(cgmath::Vector3::new(
                                                0.0,
                                                0.0,
                                                spec.z_offset,
                                        )),
                                });

                                added += 1;
                        }

                        log::debug!("Built static geometry `{}`", spec.name);
                }

                Ok(added)
        }
}

fn collect_paths(
        group: &usvg::Group,
        out: &mut Vec<Path>,
)
{
        for node in group.children()
        {
                match node
                {
                        usvg::Node::Group(group) => collect_paths(group, out),
                        usvg::Node::Path(path) =>
                        {
                                let data = path
                                        .data()
                                        .clone()
                                        .transform(path.abs_transform())
                                        .unwrap_or_else(|| path.data().clone());

                                out.push(to_lyon(&data));
                        }
                        _ =>
                        {}
                }
        }
}

fn to_lyon(data: &usvg::tiny_skia_path::Path) -> Path
{
        let mut builder = Path::builder();
        let mut open = false;
        let mut start = point(0.0, 0.0);

        for segment in data.segments()
        {
                if !open && !matches!(segment, PathSegment::MoveTo(_) | PathSegment::Close)
                {
                        builder.begin(start);
                        open = true;
                }

                match segment
                {
                        PathSegment::MoveTo(p) =>
                        {
                                if open
                                {
                                        builder.end(false);
                                }

                                start = point(p.x, p.y);
                                builder.begin(start);
                                open = true;
                        }
                        PathSegment::LineTo(p) =>
                        {
                                builder.line_to(point(p.x, p.y));
                        }
                        PathSegment::QuadTo(c, p) =>
                        {
                                builder.quadratic_bezier_to(point(c.x, c.y), point(p.x, p.y));
                        }
                        PathSegment::CubicTo(c1, c2, p) =>
                        {
                                builder.cubic_bezier_to(
                                        point(c1.x, c1.y),
                                        point(c2.x, c2.y),
                                        point(p.x, p.y),
                                );
                        }
                        PathSegment::Close =>
                        {
                                if open
                                {
                                        builder.end(true);
                                        open = false;
                                }
                        }
                }
        }

        if open
        {
                builder.end(false);
        }

        builder.build()
}

#[cfg(test)]
mod tests
{
        use super::*;

        #[test]
        fn each_reference_piece_is_a_single_mesh()
        {
                for spec in REFERENCE_PIECES
                {
                        let meshes = spec.build_meshes().unwrap();

                        assert_eq!(meshes.len(), 1, "{}", spec.name);
                        assert!(!meshes[0].is_empty());
                }
        }

        #[test]
        fn mesh_depth_matches_extrusion()
        {
                let meshes = REFERENCE_PIECES[1].build_meshes().unwrap();
                let (min, max) = meshes[0].bounds().unwrap();

                assert_eq!(min[2], 0.0);
                assert_eq!(max[2], 12.0);
                assert!((min[0] - 13.0).abs() < 1e-3);
                assert!((max[0] - 521.0).abs() < 1e-3);
        }

        #[test]
        fn builder_applies_color_and_z_offset()
        {
                let mut resources = Resources::new();
                let mut group = Group::new();

                let added = GeometryBuilder::build(&REFERENCE_PIECES, &mut resources, &mut group).unwrap();

                assert_eq!(added, 3);
                assert_eq!(group.len(), 3);
                assert_eq!(resources.live_count(), 3);

                let body = group.find("body#0").unwrap();
                assert_eq!(body.material.color, 0x000000);
                assert_eq!(body.transform.position.z, -2.0);

                let accent = group.find("accent#0").unwrap();
                assert_eq!(accent.material.color, 0x0000aa);
                assert_eq!(accent.transform.position.z, 0.0);
        }

        #[test]
        fn disjoint_subpaths_become_separate_meshes()
        {
                let spec = VectorPathSpec {
                        name: "pair",
                        path: "M0 0H10V10H0Z M20 0H30V10H20Z",
                        color: 0xffffff,
                        extrude_depth: 1.0,
                        bevel: true,
                        z_offset: 0.0,
                };

                assert_eq!(spec.build_meshes().unwrap().len(), 2);
        }

        #[test]
        fn malformed_piece_stops_construction_but_keeps_earlier_meshes()
        {
                let broken = VectorPathSpec {
                        name: "broken",
                        path: "not path data",
                        color: 0xff0000,
                        extrude_depth: 1.0,
                        bevel: false,
                        z_offset: 0.0,
                };

                let specs = [REFERENCE_PIECES[0], broken, REFERENCE_PIECES[2]];

                let mut resources = Resources::new();
                let mut group = Group::new();

                let result = GeometryBuilder::build(&specs, &mut resources, &mut group);

                assert!(result.is_err());
                assert_eq!(group.len(), 1);
                assert_eq!(group.nodes()[0].name, "top_bar#0");
        }

        #[test]
        fn broken_markup_is_a_parse_error()
        {
                let spec = VectorPathSpec {
                        name: "markup",
                        path: "M0 0\"<",
                        color: 0,
                        extrude_depth: 1.0,
                        bevel: false,
                        z_offset: 0.0,
                };

                assert!(matches!(spec.build_meshes(), Err(GeometryError::Svg(_))));
        }
}
