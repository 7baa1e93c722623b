pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The window surface, its configuration and the matching depth buffer.
#[derive(Debug)]
pub struct SurfaceManager
{
        pub surface: wgpu::Surface<'static>,
        pub configuration: wgpu::SurfaceConfiguration,
        pub depth: wgpu::TextureView,
        pub capabilities: wgpu::SurfaceCapabilities,
        pub is_surface_configured: bool,
}

impl SurfaceManager
{
        pub fn new(
                surface: wgpu::Surface<'static>,
                adapter: &wgpu::Adapter,
                device: &wgpu::Device,
                size: winit::dpi::PhysicalSize<u32>,
        ) -> Self
        {
                let capabilities = surface.get_capabilities(adapter);

                let configuration = Self::configuration(&capabilities, size.width.max(1), size.height.max(1));

                let depth = Self::create_depth_texture(device, &configuration);

                Self {
                        surface,
                        configuration,
                        depth,
                        capabilities,
                        is_surface_configured: false,
                }
        }

        pub fn format(&self) -> wgpu::TextureFormat
        {
                self.configuration.format
        }

        pub fn size(&self) -> (u32, u32)
        {
                (self.configuration.width, self.configuration.height)
        }

        fn configuration(
                capabilities: &wgpu::SurfaceCapabilities,
                width: u32,
                height: u32,
        ) -> wgpu::SurfaceConfiguration
        {
                let format = capabilities
                        .formats
                        .iter()
                        .find(|f| f.is_srgb())
                        .copied()
                        .unwrap_or(capabilities.formats[0]);

                wgpu::SurfaceConfiguration {
                        // RENDER_ATTACHMENT is guaranteed to be supported.
                        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                        format,
                        width,
                        height,
                        // The web only offers one present mode.
                        #[cfg(target_arch = "wasm32")]
                        present_mode: capabilities.present_modes[0],
                        #[cfg(not(target_arch = "wasm32"))]
                        present_mode: wgpu::PresentMode::AutoVsync,
                        desired_maximum_frame_latency: 2,
                        alpha_mode: capabilities.alpha_modes[0],
                        view_formats: vec![],
                }
        }

        /// Reconfigures the surface and recreates the depth buffer. Sizes are
        /// clamped to the device's texture limit; zero sizes are ignored.
        pub fn resize(
                &mut self,
                device: &wgpu::Device,
                width: u32,
                height: u32,
        ) -> bool
        {
                if width == 0 || height == 0
                {
                        return false;
                }

                // Clamping to max dim to prevent panic!
                let max_dim = device.limits().max_texture_dimension_2d;

                self.configuration.width = width.min(max_dim);
                self.configuration.height = height.min(max_dim);

                self.surface.configure(device, &self.configuration);
                self.depth = Self::create_depth_texture(device, &self.configuration);
                self.is_surface_configured = true;

                true
        }

        pub fn acquire_frame(
                &self,
                device: &wgpu::Device,
        ) -> anyhow::Result<(wgpu::SurfaceTexture, wgpu::TextureView, wgpu::CommandEncoder)>
        {
                let output = self.surface.get_current_texture().map_err(|e| match e
                {
                        wgpu::SurfaceError::Outdated => anyhow::anyhow!("Surface outdated"),
                        e => anyhow::anyhow!(e),
                })?;

                let view = output
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());

                let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("Main Render Encoder"),
                });

                Ok((output, view, encoder))
        }

        fn create_depth_texture(
                device: &wgpu::Device,
                config: &wgpu::SurfaceConfiguration,
        ) -> wgpu::TextureView
        {
                let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
                        label: Some("Depth Texture"),
                        size: wgpu::Extent3d {
                                width: config.width.max(1),
                                height: config.height.max(1),
                                depth_or_array_layers: 1,
                        },
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format: DEPTH_FORMAT,
                        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                        view_formats: &[],
                });

                depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
        }
}
