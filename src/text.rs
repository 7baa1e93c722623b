//! Extruded 3D text: the live input mesh and the two static labels.

use std::f32::consts::PI;

use cgmath::Vector3;

use crate::font::{Font, FontSlot};
use crate::geometry::GeometryError;
use crate::geometry::extrude::{ExtrudeOptions, extrude_shapes};
use crate::geometry::mesh::Mesh;
use crate::geometry::outline::{DEFAULT_TOLERANCE, flatten, group_into_shapes};
use crate::resource::Resources;
use crate::scene::graph::{Group, Material, MeshNode, NodeId, Transform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle
{
        pub size: f32,
        pub depth: f32,
}

pub const INPUT_STYLE: TextStyle = TextStyle {
        size: 15.0,
        depth: 7.0,
};

pub const LABEL_STYLE: TextStyle = TextStyle {
        size: 10.0,
        depth: 6.0,
};

pub const DESCRIPTION_STYLE: TextStyle = TextStyle {
        size: 7.0,
        depth: 6.0,
};

pub const INPUT_POSITION: [f32; 3] = [30.0, 37.0, 5.0];
pub const LABEL_POSITION: [f32; 3] = [30.0, 62.0, 3.0];
pub const DESCRIPTION_POSITION: [f32; 3] = [150.0, 62.0, 5.0];

pub const LABEL_TEXT: &str = "First Name";
pub const DESCRIPTION_TEXT: &str = "Type your first name";

pub const INPUT_NODE: &str = "text_input";
pub const LABEL_NODE: &str = "text_label";
pub const DESCRIPTION_NODE: &str = "text_description";

pub const TEXT_COLOR: u32 = 0xffffff;

/// Builds extruded geometry for `text`. Empty text gives an empty mesh.
pub fn build_text_geometry(
        font: &Font,
        text: &str,
        style: TextStyle,
        name: &str,
) -> Result<Mesh, GeometryError>
{
        let shapes = group_into_shapes(flatten(&font.text_path(text, style.size), DEFAULT_TOLERANCE));

        extrude_shapes(name, &shapes, &ExtrudeOptions::new(style.depth, false))
}

/// Glyphs are y-up while the field geometry is y-down, hence the half turn.
fn text_transform(position: [f32; 3]) -> Transform
{
        Transform {
                position: Vector3::from(position),
                rotation: Vector3::new(PI, 0.0, 0.0),
                ..Default::default()
        }
}

/// Owns the input text mesh and rebuilds it when the typed text changes.
#[derive(Debug, Default)]
pub struct TextMeshManager
{
        input: Option<NodeId>,
        rebuilds: u64,
}

impl TextMeshManager
{
        pub fn new() -> Self
        {
                Self::default()
        }

        pub fn input_node(&self) -> Option<NodeId>
        {
                self.input
        }

        pub fn is_built(&self) -> bool
        {
                self.input.is_some()
        }

        /// Number of times the input mesh has been rebuilt since creation.
        pub fn rebuilds(&self) -> u64
        {
                self.rebuilds
        }

        /// Builds the input mesh and both labels. Runs once; later calls fail.
        pub fn build_initial_meshes(
                &mut self,
                font: &Font,
                text: &str,
                resources: &mut Resources,
                group: &mut Group,
        ) -> anyhow::Result<()>
        {
                if self.input.is_some()
                {
                        anyhow::bail!("Text meshes were already built");
                }

                let material = Material::new(TEXT_COLOR);

                let pieces = [
                        (INPUT_NODE, text, INPUT_STYLE, INPUT_POSITION),
                        (LABEL_NODE, LABEL_TEXT, LABEL_STYLE, LABEL_POSITION),
                        (DESCRIPTION_NODE, DESCRIPTION_TEXT, DESCRIPTION_STYLE, DESCRIPTION_POSITION),
                ];

                // Build everything before touching the scene so a failure
                // leaves no partial text behind.
                let mut meshes = Vec::with_capacity(pieces.len());

                for (name, content, style, _) in pieces
                {
                        meshes.push(build_text_geometry(font, content, style, name)?);
                }

                for ((name, _, _, position), mesh) in pieces.into_iter().zip(meshes)
                {
                        let geometry = resources.add(mesh);

                        let id = group.add(MeshNode {
                                name: name.to_string(),
                                geometry,
                                material,
                                transform: text_transform(position),
                        });

                        if name == INPUT_NODE
                        {
                                self.input = Some(id);
                        }
                }

                log::info!("Built text meshes for {:?}", text);

                Ok(())
        }

        /// Swaps the input mesh's geometry for one built from `text`.
        ///
        /// A no-op returning `Ok(false)` unless the font is ready, the input
        /// mesh exists and the font is available.
        pub fn update_text_mesh(
                &mut self,
                fonts: &FontSlot,
                text: &str,
                resources: &mut Resources,
                group: &mut Group,
        ) -> Result<bool, GeometryError>
        {
                let (true, Some(id), Some(font)) = (fonts.is_ready(), self.input, fonts.font())
                else
                {
                        log::trace!("Skipping text update, font {}", fonts.describe());
                        return Ok(false);
                };

                let Some(node) = group.node_mut(id)
                else
                {
                        return Ok(false);
                };

                let mut mesh = build_text_geometry(font, text, INPUT_STYLE, INPUT_NODE)?;
                mesh.needs_upload = true;

                resources.dispose(node.geometry);
                node.geometry = resources.add(mesh);
                node.transform.position = Vector3::from(INPUT_POSITION);

                self.rebuilds += 1;

                Ok(true)
        }
}

#[cfg(test)]
mod tests
{
        use super::*;
        use crate::font::tests::test_font;

        fn ready_slot() -> FontSlot
        {
                let mut slot = FontSlot::new();
                slot.begin("test").unwrap();
                slot.resolve(Ok(test_font()));
                slot
        }

        #[test]
        fn empty_text_is_an_empty_mesh()
        {
                let mesh = build_text_geometry(&test_font(), "", INPUT_STYLE, "empty").unwrap();

                assert!(mesh.is_empty());
        }

        #[test]
        fn text_mesh_has_requested_depth()
        {
                let mesh = build_text_geometry(&test_font(), "IO", INPUT_STYLE, "io").unwrap();
                let (min, max) = mesh.bounds().unwrap();

                assert_eq!(min[2], 0.0);
                assert_eq!(max[2], 7.0);
        }

        #[test]
        fn initial_meshes_are_built_once()
        {
                let slot = ready_slot();
                let mut manager = TextMeshManager::new();
                let mut resources = Resources::new();
                let mut group = Group::new();

                let font = slot.font().unwrap();

                manager.build_initial_meshes(font, "IO", &mut resources, &mut group).unwrap();
                assert_eq!(group.len(), 3);

                assert!(manager.build_initial_meshes(font, "IO", &mut resources, &mut group).is_err());
                assert_eq!(group.len(), 3);
                assert_eq!(resources.live_count(), 3);

                let label = group.find(LABEL_NODE).unwrap();
                assert_eq!(label.transform.position, Vector3::new(30.0, 62.0, 3.0));
                assert_eq!(label.transform.rotation.x, PI);
                assert_eq!(label.material.color, TEXT_COLOR);
        }

        #[test]
        fn update_before_build_is_noop()
        {
                let slot = ready_slot();
                let mut manager = TextMeshManager::new();
                let mut resources = Resources::new();
                let mut group = Group::new();

                assert!(!manager.update_text_mesh(&slot, "I", &mut resources, &mut group).unwrap());
                assert_eq!(manager.rebuilds(), 0);
        }

        #[test]
        fn update_replaces_geometry_without_growth()
        {
                let slot = ready_slot();
                let mut manager = TextMeshManager::new();
                let mut resources = Resources::new();
                let mut group = Group::new();

                manager.build_initial_meshes(slot.font().unwrap(), "I", &mut resources, &mut group).unwrap();

                let id = manager.input_node().unwrap();
                let before = group.node(id).unwrap().geometry;

                for _ in 0..5
                {
                        assert!(manager.update_text_mesh(&slot, "IO", &mut resources, &mut group).unwrap());
                }

                let after = group.node(id).unwrap().geometry;

                assert_ne!(before, after);
                assert!(resources.get(before).is_none());
                assert!(resources.get(after).unwrap().needs_upload());
                assert_eq!(resources.live_count(), 3);
                assert_eq!(manager.rebuilds(), 5);
                assert_eq!(group.node(id).unwrap().transform.position, Vector3::new(30.0, 37.0, 5.0));
        }
}
