//! GPU side of the scene: surface, pipeline, uniforms and the debug overlay.
//!
//! Nothing here owns scene state. Each frame the [`Renderer`] reads the
//! director's root group, uploads whatever geometry changed and draws it.

pub mod pipeline;
pub mod surface;

use std::sync::Arc;

use cgmath::{Matrix, Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::{Camera, CameraUniform};
use crate::renderer::pipeline::{FillMode, PipelineKind, PipelineManager};
use crate::renderer::surface::SurfaceManager;
use crate::scene::director::SceneDirector;
use crate::scene::graph::hex_to_rgb;
use crate::scene::lights::{LightUniform, Lights};
use crate::ui::DebugOverlay;
use crate::ui::renderer::GuiRenderer;

/// Per-node transform and material, bound at group 2.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform
{
        pub model: [[f32; 4]; 4],
        pub normal: [[f32; 4]; 4],
        pub color: [f32; 4],
}

impl NodeUniform
{
        /// `color` is sRGB; the shader works in linear space.
        pub fn new(
                world: Matrix4<f32>,
                color: [f32; 3],
        ) -> Self
        {
                let normal = world.invert().map(|m| m.transpose()).unwrap_or_else(Matrix4::identity);

                let [r, g, b] = color.map(srgb_to_linear);

                Self {
                        model: world.into(),
                        normal: normal.into(),
                        color: [r, g, b, 1.0],
                }
        }
}

pub fn srgb_to_linear(c: f32) -> f32
{
        if c <= 0.04045
        {
                c / 12.92
        }
        else
        {
                ((c + 0.055) / 1.055).powf(2.4)
        }
}

pub fn clear_color(hex: u32) -> wgpu::Color
{
        let [r, g, b] = hex_to_rgb(hex).map(srgb_to_linear);

        wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
        }
}

#[derive(Debug)]
struct NodeBinding
{
        buffer: wgpu::Buffer,
        bind_group: wgpu::BindGroup,
}

/// Holds all GPU-related resources for rendering.
///
/// Created once the window exists; on the web this happens asynchronously
/// and the finished renderer is sent back through the event loop.
#[derive(Debug)]
pub struct Renderer
{
        pub surface: SurfaceManager,

        /// The handle to a physical graphics device.
        pub adapter: wgpu::Adapter,

        /// The GPU device handle used to submit rendering commands.
        pub device: wgpu::Device,

        pub queue: wgpu::Queue,

        pub pipelines: PipelineManager,

        pub gui: GuiRenderer,

        fill_mode: FillMode,

        camera_layout: wgpu::BindGroupLayout,
        camera_buffer: wgpu::Buffer,
        camera_bind_group: wgpu::BindGroup,

        light_layout: wgpu::BindGroupLayout,
        light_buffer: wgpu::Buffer,
        light_bind_group: wgpu::BindGroup,

        node_layout: wgpu::BindGroupLayout,
        nodes: Vec<NodeBinding>,
}

impl Renderer
{
        pub async fn new(window: Arc<Window>) -> anyhow::Result<Renderer>
        {
                let instance = Self::instance();

                let size = window.inner_size();

                let surface = instance.create_surface(window.clone())?;

                let adapter = Self::adapter(&instance, &surface).await?;

                log::info!("Adapter Info: {:#?}", adapter.get_info());

                let (device, queue) = Self::device_queue(&adapter).await?;

                let surface = SurfaceManager::new(surface, &adapter, &device, size);

                let camera_layout = Camera::get_bind_group_layout(&device);
                let light_layout = Self::uniform_layout(&device, "light_bind_group_layout");
                let node_layout = Self::uniform_layout(&device, "node_bind_group_layout");

                let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Camera Buffer"),
                        contents: bytemuck::cast_slice(&[CameraUniform::new()]),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });

                let camera_bind_group = Self::bind_group(&device, &camera_layout, &camera_buffer, "camera_bind_group");

                let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Light Buffer"),
                        contents: bytemuck::cast_slice(&[Lights::new().uniform()]),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });

                let light_bind_group = Self::bind_group(&device, &light_layout, &light_buffer, "light_bind_group");

                let mut pipelines = PipelineManager::new();

                pipelines.build_geometry_pipeline(
                        &device,
                        surface.format(),
                        &[&camera_layout, &light_layout, &node_layout],
                        FillMode::Fill,
                );

                let gui = GuiRenderer::new(&device, surface.format(), &window);

                Ok(Renderer {
                        surface,
                        adapter,
                        device,
                        queue,
                        pipelines,
                        gui,
                        fill_mode: FillMode::Fill,
                        camera_layout,
                        camera_buffer,
                        camera_bind_group,
                        light_layout,
                        light_buffer,
                        light_bind_group,
                        node_layout,
                        nodes: Vec::new(),
                })
        }

        fn instance() -> wgpu::Instance
        {
                wgpu::Instance::new(&wgpu::InstanceDescriptor {
                        #[cfg(not(target_arch = "wasm32"))]
                        backends: wgpu::Backends::PRIMARY,
                        #[cfg(target_arch = "wasm32")]
                        backends: wgpu::Backends::GL,
                        ..Default::default()
                })
        }

        async fn adapter(
                instance: &wgpu::Instance,
                surface: &wgpu::Surface<'static>,
        ) -> anyhow::Result<wgpu::Adapter>
        {
                let adapter = instance
                        .request_adapter(&wgpu::RequestAdapterOptions {
                                power_preference: wgpu::PowerPreference::HighPerformance,

                                // Tells wgpu to find an adapter that can present to the supplied
                                // surface.
                                compatible_surface: Some(surface),

                                force_fallback_adapter: false,
                        })
                        .await
                        .map_err(|e| anyhow::anyhow!(e))?;

                Ok(adapter)
        }

        async fn device_queue(adapter: &wgpu::Adapter) -> anyhow::Result<(wgpu::Device, wgpu::Queue)>
        {
                let required_features = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;

                let device_queue = adapter
                        .request_device(&wgpu::DeviceDescriptor {
                                label: None,
                                required_features,
                                // WebGL doesn't support all of wgpu's features, so if
                                // we're building for the web we'll have to disable some.
                                required_limits: if cfg!(target_arch = "wasm32")
                                {
                                        wgpu::Limits::downlevel_webgl2_defaults()
                                }
                                else
                                {
                                        wgpu::Limits::default()
                                },
                                memory_hints: Default::default(),
                                trace: wgpu::Trace::Off,
                        })
                        .await?;

                Ok(device_queue)
        }

        fn uniform_layout(
                device: &wgpu::Device,
                label: &str,
        ) -> wgpu::BindGroupLayout
        {
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        entries: &[wgpu::BindGroupLayoutEntry {
                                binding: 0,
                                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                                ty: wgpu::BindingType::Buffer {
                                        ty: wgpu::BufferBindingType::Uniform,
                                        has_dynamic_offset: false,
                                        min_binding_size: None,
                                },
                                count: None,
                        }],
                        label: Some(label),
                })
        }

        fn bind_group(
                device: &wgpu::Device,
                layout: &wgpu::BindGroupLayout,
                buffer: &wgpu::Buffer,
                label: &str,
        ) -> wgpu::BindGroup
        {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                        layout,
                        entries: &[wgpu::BindGroupEntry {
                                binding: 0,
                                resource: buffer.as_entire_binding(),
                        }],
                        label: Some(label),
                })
        }

        pub fn resize(
                &mut self,
                width: u32,
                height: u32,
        ) -> bool
        {
                self.surface.resize(&self.device, width, height)
        }

        /// Returns whether the overlay consumed the event.
        pub fn handle_input(
                &mut self,
                window: &Window,
                event: &winit::event::WindowEvent,
        ) -> bool
        {
                self.gui.handle_input(window, event)
        }

        fn set_fill_mode(
                &mut self,
                fill_mode: FillMode,
        )
        {
                if fill_mode == self.fill_mode
                {
                        return;
                }

                log::info!("Fill Mode: {:?}", fill_mode);

                self.pipelines.build_geometry_pipeline(
                        &self.device,
                        self.surface.format(),
                        &[&self.camera_layout, &self.light_layout, &self.node_layout],
                        fill_mode,
                );

                self.fill_mode = fill_mode;
        }

        /// One uniform buffer per node; nodes are only ever appended.
        fn ensure_node_bindings(
                &mut self,
                count: usize,
        )
        {
                while self.nodes.len() < count
                {
                        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                                label: Some(&format!("Node Buffer {}", self.nodes.len())),
                                size: std::mem::size_of::<NodeUniform>() as wgpu::BufferAddress,
                                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                                mapped_at_creation: false,
                        });

                        let bind_group = Self::bind_group(&self.device, &self.node_layout, &buffer, "node_bind_group");

                        self.nodes.push(NodeBinding {
                                buffer,
                                bind_group,
                        });
                }
        }

        fn write_uniforms(
                &mut self,
                director: &SceneDirector,
        )
        {
                if let Some(camera) = director.camera()
                {
                        self.queue
                                .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera.uniform()]));
                }

                if let Some(lights) = director.lights()
                {
                        let uniform: LightUniform = lights.uniform();

                        self.queue
                                .write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[uniform]));
                }

                let group = director.group();

                self.ensure_node_bindings(group.len());

                for (node, binding) in group.nodes().iter().zip(&self.nodes)
                {
                        let uniform = NodeUniform::new(group.world_matrix(node), node.material.rgb());

                        self.queue
                                .write_buffer(&binding.buffer, 0, bytemuck::cast_slice(&[uniform]));
                }
        }

        /// Draws one frame: the scene, then the overlay on top.
        pub fn render(
                &mut self,
                window: &Window,
                director: &mut SceneDirector,
                overlay: &mut DebugOverlay,
        ) -> anyhow::Result<()>
        {
                // The resize() method is called and sets this flag to true
                if !self.surface.is_surface_configured
                {
                        return Ok(());
                }

                director.resources_mut().upload_all(&self.device);

                self.write_uniforms(director);

                let (output, view, mut encoder) = self.surface.acquire_frame(&self.device)?;

                {
                        let group = director.group();
                        let resources = director.resources();

                        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                                label: Some("Scene Pass"),
                                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                        view: &view,
                                        resolve_target: None,
                                        ops: wgpu::Operations {
                                                load: wgpu::LoadOp::Clear(clear_color(director.background())),
                                                store: wgpu::StoreOp::Store,
                                        },
                                })],
                                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                                        view: &self.surface.depth,
                                        depth_ops: Some(wgpu::Operations {
                                                load: wgpu::LoadOp::Clear(1.0),
                                                store: wgpu::StoreOp::Store,
                                        }),
                                        stencil_ops: None,
                                }),
                                timestamp_writes: None,
                                occlusion_query_set: None,
                        });

                        if let Some(pipeline) = self.pipelines.get(PipelineKind::Geometry)
                        {
                                pass.set_pipeline(pipeline);
                                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                                pass.set_bind_group(1, &self.light_bind_group, &[]);

                                for (node, binding) in group.nodes().iter().zip(&self.nodes)
                                {
                                        let Some(mesh) = resources.get(node.geometry)
                                        else
                                        {
                                                continue;
                                        };

                                        // Empty text has no buffers.
                                        let (Ok(vertices), Ok(indices)) = (mesh.vertex_buffer(), mesh.index_buffer())
                                        else
                                        {
                                                continue;
                                        };

                                        pass.set_bind_group(2, &binding.bind_group, &[]);
                                        pass.set_vertex_buffer(0, vertices.slice(..));
                                        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                                        pass.draw_indexed(0..mesh.get_index_count(), 0, 0..1);
                                }
                        }
                }

                // ------------------ GUI ----------------------

                let (width, height) = self.surface.size();

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                        size_in_pixels: [width, height],
                        pixels_per_point: self.gui.current_pixels_per_point(window, overlay.ui_scale),
                };

                self.gui.begin_frame(window, overlay.ui_scale);

                let ctx = self.gui.context().clone();

                overlay.show(&ctx, director);

                self.set_fill_mode(overlay.fill_mode);

                self.gui.end_frame_and_draw(
                        &self.device,
                        &self.queue,
                        &mut encoder,
                        window,
                        &view,
                        screen_descriptor,
                )?;

                self.queue.submit(std::iter::once(encoder.finish()));

                output.present();

                Ok(())
        }
}

#[cfg(test)]
mod tests
{
        use super::*;
        use cgmath::Vector3;

        #[test]
        fn srgb_endpoints_are_fixed()
        {
                assert_eq!(srgb_to_linear(0.0), 0.0);
                assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
                assert!(srgb_to_linear(0.5) < 0.5);
        }

        #[test]
        fn background_is_linearised_grey()
        {
                let color = clear_color(0x444444);

                assert_eq!(color.r, color.g);
                assert_eq!(color.g, color.b);
                assert!(color.r > 0.05 && color.r < 0.06);
        }

        #[test]
        fn normal_matrix_undoes_non_uniform_scale()
        {
                let world = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
                let uniform = NodeUniform::new(world, [1.0, 1.0, 1.0]);

                assert_eq!(uniform.normal[0][0], 0.5);
                assert_eq!(uniform.color, [1.0, 1.0, 1.0, 1.0]);

                let translated = NodeUniform::new(Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)), [0.0; 3]);
                assert_eq!(translated.model[3], [1.0, 2.0, 3.0, 1.0]);
        }
}
