use std::collections::HashMap;

use crate::geometry::vertex::Vertex;
use crate::renderer::surface::DEPTH_FORMAT;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub enum FillMode
{
        #[default]
        Fill,
        Wireframe,
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum PipelineKind
{
        /// Lit, flat-colored meshes.
        Geometry,
}

#[derive(Debug, Default)]
pub struct PipelineManager
{
        pub render_pipelines: HashMap<PipelineKind, wgpu::RenderPipeline>,
}

impl PipelineManager
{
        pub fn new() -> Self
        {
                Self::default()
        }

        pub fn get(
                &self,
                kind: PipelineKind,
        ) -> Option<&wgpu::RenderPipeline>
        {
                self.render_pipelines.get(&kind)
        }

        /// Loads the shader module data from the `wgsl` file.
        pub fn load_shader_module(device: &wgpu::Device) -> wgpu::ShaderModule
        {
                device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some("Geometry Shader"),
                        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
                })
        }

        /// Wireframe falls back to fill when the device lacks line polygons.
        pub fn polygon_mode(
                device: &wgpu::Device,
                fill_mode: FillMode,
        ) -> wgpu::PolygonMode
        {
                match fill_mode
                {
                        FillMode::Fill => wgpu::PolygonMode::Fill,
                        FillMode::Wireframe =>
                        {
                                if device.features().contains(wgpu::Features::POLYGON_MODE_LINE)
                                {
                                        wgpu::PolygonMode::Line
                                }
                                else
                                {
                                        log::warn!("Wireframe unsupported on this device");
                                        wgpu::PolygonMode::Fill
                                }
                        }
                }
        }

        pub fn build_geometry_pipeline(
                &mut self,
                device: &wgpu::Device,
                format: wgpu::TextureFormat,
                bind_groups: &[&wgpu::BindGroupLayout],
                fill_mode: FillMode,
        )
        {
                let shader = Self::load_shader_module(device);

                let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                        label: Some("Geometry Pipeline Layout"),
                        bind_group_layouts: bind_groups,
                        push_constant_ranges: &[],
                });

                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Geometry Pipeline"),
                        layout: Some(&render_pipeline_layout),
                        vertex: wgpu::VertexState {
                                module: &shader,
                                entry_point: Some("vs_main"),
                                buffers: &[Vertex::get_desc()],
                                compilation_options: wgpu::PipelineCompilationOptions::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                                module: &shader,
                                entry_point: Some("fs_main"),
                                targets: &[Some(wgpu::ColorTargetState {
                                        format,
                                        blend: Some(wgpu::BlendState::REPLACE),
                                        write_mask: wgpu::ColorWrites::ALL,
                                })],
                                compilation_options: wgpu::PipelineCompilationOptions::default(),
                        }),
                        primitive: wgpu::PrimitiveState {
                                topology: wgpu::PrimitiveTopology::TriangleList,
                                strip_index_format: None,
                                front_face: wgpu::FrontFace::Ccw,
                                // Mirrored text and flipped caps are lit two-sided in the
                                // shader instead.
                                cull_mode: None,
                                polygon_mode: Self::polygon_mode(device, fill_mode),
                                conservative: false,
                                unclipped_depth: false,
                        },
                        depth_stencil: Some(wgpu::DepthStencilState {
                                format: DEPTH_FORMAT,
                                depth_write_enabled: true,
                                depth_compare: wgpu::CompareFunction::Less,
                                stencil: wgpu::StencilState::default(),
                                bias: wgpu::DepthBiasState::default(),
                        }),
                        multisample: wgpu::MultisampleState::default(),
                        multiview: None,
                        cache: None,
                });

                self.render_pipelines.insert(PipelineKind::Geometry, pipeline);
        }
}
