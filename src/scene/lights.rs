use cgmath::{InnerSpace, Point3, Vector3};

use crate::scene::graph::hex_to_rgb;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight
{
        pub color: u32,
        pub intensity: f32,
}

/// Light arriving from `position` toward `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight
{
        pub color: u32,
        pub intensity: f32,
        pub position: Point3<f32>,
        pub target: Point3<f32>,
}

impl DirectionalLight
{
        /// Unit vector pointing from the target toward the light.
        pub fn direction(&self) -> Vector3<f32>
        {
                let dir = self.position - self.target;

                if dir.magnitude2() > 0.0
                {
                        dir.normalize()
                }
                else
                {
                        Vector3::unit_z()
                }
        }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights
{
        pub ambient: AmbientLight,
        pub directional: DirectionalLight,
}

impl Lights
{
        pub fn new() -> Self
        {
                Self {
                        ambient: AmbientLight {
                                color: 0x404040,
                                intensity: 1.0,
                        },
                        directional: DirectionalLight {
                                color: 0xffffff,
                                intensity: 0.5,
                                position: Point3::new(180.0, -20.0, 7.0),
                                target: Point3::new(0.0, 0.0, 0.0),
                        },
                }
        }

        pub fn uniform(&self) -> LightUniform
        {
                let ambient = hex_to_rgb(self.ambient.color).map(|c| c * self.ambient.intensity);
                let directional = hex_to_rgb(self.directional.color).map(|c| c * self.directional.intensity);
                let direction = self.directional.direction();

                LightUniform {
                        ambient: [ambient[0], ambient[1], ambient[2], 0.0],
                        color: [directional[0], directional[1], directional[2], 0.0],
                        direction: [direction.x, direction.y, direction.z, 0.0],
                }
        }
}

impl Default for Lights
{
        fn default() -> Self
        {
                Self::new()
        }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform
{
        pub ambient: [f32; 4],
        pub color: [f32; 4],
        pub direction: [f32; 4],
}

#[cfg(test)]
mod tests
{
        use super::*;

        #[test]
        fn directional_light_points_from_target_to_light()
        {
                let lights = Lights::new();
                let dir = lights.directional.direction();

                assert!((dir.magnitude() - 1.0).abs() < 1e-6);
                assert!(dir.x > 0.9);
                assert!(dir.y < 0.0);
        }

        #[test]
        fn uniform_premultiplies_intensity()
        {
                let uniform = Lights::new().uniform();

                assert_eq!(uniform.color[0], 0.5);
                assert!((uniform.ambient[0] - 64.0 / 255.0).abs() < 1e-6);
        }
}
