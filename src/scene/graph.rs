use cgmath::{Matrix4, Rad, Vector3};

use crate::resource::GeometryId;

/// Position, Euler rotation (radians, applied X then Y then Z in the
/// intrinsic sense) and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform
{
        pub position: Vector3<f32>,
        pub rotation: Vector3<f32>,
        pub scale: Vector3<f32>,
}

impl Default for Transform
{
        fn default() -> Self
        {
                Self {
                        position: Vector3::new(0.0, 0.0, 0.0),
                        rotation: Vector3::new(0.0, 0.0, 0.0),
                        scale: Vector3::new(1.0, 1.0, 1.0),
                }
        }
}

impl Transform
{
        pub fn from_position(position: Vector3<f32>) -> Self
        {
                Self {
                        position,
                        ..Default::default()
                }
        }

        pub fn rotation_matrix(&self) -> Matrix4<f32>
        {
                Matrix4::from_angle_x(Rad(self.rotation.x))
                        * Matrix4::from_angle_y(Rad(self.rotation.y))
                        * Matrix4::from_angle_z(Rad(self.rotation.z))
        }

        pub fn matrix(&self) -> Matrix4<f32>
        {
                Matrix4::from_translation(self.position)
                        * self.rotation_matrix()
                        * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
        }
}

/// Flat diffuse material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Material
{
        pub color: u32,
}

impl Material
{
        pub fn new(color: u32) -> Self
        {
                Self {
                        color,
                }
        }

        pub fn rgb(&self) -> [f32; 3]
        {
                hex_to_rgb(self.color)
        }
}

pub fn hex_to_rgb(color: u32) -> [f32; 3]
{
        [
                ((color >> 16) & 0xff) as f32 / 255.0,
                ((color >> 8) & 0xff) as f32 / 255.0,
                (color & 0xff) as f32 / 255.0,
        ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode
{
        pub name: String,
        pub geometry: GeometryId,
        pub material: Material,
        pub transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The root transform group. Nodes are only ever appended.
#[derive(Debug, Default)]
pub struct Group
{
        pub transform: Transform,
        nodes: Vec<MeshNode>,
}

impl Group
{
        pub fn new() -> Self
        {
                Self::default()
        }

        pub fn add(
                &mut self,
                node: MeshNode,
        ) -> NodeId
        {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
        }

        pub fn node(
                &self,
                id: NodeId,
        ) -> Option<&MeshNode>
        {
                self.nodes.get(id.0)
        }

        pub fn node_mut(
                &mut self,
                id: NodeId,
        ) -> Option<&mut MeshNode>
        {
                self.nodes.get_mut(id.0)
        }

        pub fn find(
                &self,
                name: &str,
        ) -> Option<&MeshNode>
        {
                self.nodes.iter().find(|n| n.name == name)
        }

        pub fn nodes(&self) -> &[MeshNode]
        {
                &self.nodes
        }

        pub fn len(&self) -> usize
        {
                self.nodes.len()
        }

        pub fn is_empty(&self) -> bool
        {
                self.nodes.is_empty()
        }

        pub fn matrix(&self) -> Matrix4<f32>
        {
                self.transform.matrix()
        }

        /// World matrix of a child node.
        pub fn world_matrix(
                &self,
                node: &MeshNode,
        ) -> Matrix4<f32>
        {
                self.matrix() * node.transform.matrix()
        }
}

#[cfg(test)]
mod tests
{
        use super::*;
        use cgmath::{InnerSpace, Vector4};
        use std::f32::consts::PI;

        fn apply(
                m: Matrix4<f32>,
                v: [f32; 3],
        ) -> Vector3<f32>
        {
                (m * Vector4::new(v[0], v[1], v[2], 1.0)).truncate()
        }

        #[test]
        fn rotation_by_pi_about_x_flips_y_and_z()
        {
                let transform = Transform {
                        rotation: Vector3::new(PI, 0.0, 0.0),
                        ..Default::default()
                };

                let p = apply(transform.matrix(), [1.0, 2.0, 3.0]);

                assert!((p - Vector3::new(1.0, -2.0, -3.0)).magnitude() < 1e-5);
        }

        #[test]
        fn translation_applies_after_rotation()
        {
                let transform = Transform {
                        position: Vector3::new(10.0, 0.0, 0.0),
                        rotation: Vector3::new(0.0, 0.0, PI / 2.0),
                        ..Default::default()
                };

                let p = apply(transform.matrix(), [1.0, 0.0, 0.0]);

                assert!((p - Vector3::new(10.0, 1.0, 0.0)).magnitude() < 1e-5);
        }

        #[test]
        fn euler_order_is_x_then_y_then_z()
        {
                let transform = Transform {
                        rotation: Vector3::new(0.3, -0.9, 0.2),
                        ..Default::default()
                };

                let expected = Matrix4::from_angle_x(Rad(0.3))
                        * Matrix4::from_angle_y(Rad(-0.9))
                        * Matrix4::from_angle_z(Rad(0.2));

                assert_eq!(transform.rotation_matrix(), expected);
        }

        #[test]
        fn hex_colors_unpack_to_unit_rgb()
        {
                assert_eq!(hex_to_rgb(0xffffff), [1.0, 1.0, 1.0]);
                assert_eq!(hex_to_rgb(0x0000aa), [0.0, 0.0, 170.0 / 255.0]);
                assert_eq!(Material::new(0x000000).rgb(), [0.0, 0.0, 0.0]);
        }
}
