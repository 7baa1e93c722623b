use wgpu::util::{BufferInitDescriptor, DeviceExt};

use crate::geometry::vertex::Vertex;

/// Triangle mesh with CPU-side data and, once uploaded, its GPU buffers.
///
/// A mesh is never patched in place once it has been handed to the scene:
/// replacing geometry means building a new [`Mesh`] and releasing the old one
/// through [`crate::resource::Resources::dispose`].
#[derive(Debug, Default)]
pub struct Mesh
{
        name: String,

        // CPU-Side data
        vertices: Vec<Vertex>,
        indices: Vec<u32>,

        // GPU-Side data
        vertex_buffer: Option<wgpu::Buffer>,
        index_buffer: Option<wgpu::Buffer>,

        pub needs_upload: bool,
}

impl Mesh
{
        pub fn new(
                name: impl Into<String>,
                vertices: Vec<Vertex>,
                indices: Vec<u32>,
        ) -> Self
        {
                Self {
                        name: name.into(),
                        vertices,
                        indices,
                        vertex_buffer: None,
                        index_buffer: None,
                        needs_upload: true,
                }
        }

        pub fn empty(name: impl Into<String>) -> Self
        {
                Self::new(name, Vec::new(), Vec::new())
        }

        pub fn name(&self) -> &str
        {
                &self.name
        }

        pub fn vertices(&self) -> &[Vertex]
        {
                &self.vertices
        }

        pub fn indices(&self) -> &[u32]
        {
                &self.indices
        }

        pub fn is_empty(&self) -> bool
        {
                self.indices.is_empty()
        }

        pub fn get_index_count(&self) -> u32
        {
                self.indices.len() as u32
        }

        pub fn get_vertex_count(&self) -> u32
        {
                self.vertices.len() as u32
        }

        pub fn triangle_count(&self) -> usize
        {
                self.indices.len() / 3
        }

        pub fn needs_upload(&self) -> bool
        {
                self.needs_upload
        }

        pub fn is_uploaded(&self) -> bool
        {
                self.vertex_buffer.is_some() && self.index_buffer.is_some()
        }

        /// Appends another vertex/index batch, rebasing its indices.
        pub fn extend(
                &mut self,
                vertices: Vec<Vertex>,
                indices: Vec<u32>,
        )
        {
                let base = self.vertices.len() as u32;

                self.vertices.extend(vertices);
                self.indices.extend(indices.into_iter().map(|i| i + base));
                self.needs_upload = true;
        }

        /// Axis-aligned bounds of the CPU vertices, `None` for an empty mesh.
        pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])>
        {
                let first = self.vertices.first()?;

                let mut min = first.position;
                let mut max = first.position;

                for v in &self.vertices
                {
                        for axis in 0..3
                        {
                                min[axis] = min[axis].min(v.position[axis]);
                                max[axis] = max[axis].max(v.position[axis]);
                        }
                }

                Some((min, max))
        }

        pub fn vertex_buffer(&self) -> anyhow::Result<&wgpu::Buffer>
        {
                self.vertex_buffer
                        .as_ref()
                        .ok_or_else(|| anyhow::anyhow!("Vertex buffer not initialized"))
        }

        pub fn index_buffer(&self) -> anyhow::Result<&wgpu::Buffer>
        {
                self.index_buffer
                        .as_ref()
                        .ok_or_else(|| anyhow::anyhow!("Index buffer not initialized"))
        }

        /// Uploads CPU data to GPU buffers. Safe to call multiple times.
        ///
        /// Empty meshes get no buffers: wgpu refuses empty buffer slices, and
        /// there is nothing to draw anyway.
        pub fn upload(
                &mut self,
                device: &wgpu::Device,
                usage: wgpu::BufferUsages,
        )
        {
                if !self.needs_upload
                {
                        return;
                }

                self.release();

                if !self.is_empty()
                {
                        self.vertex_buffer =
                                Some(device.create_buffer_init(&BufferInitDescriptor {
                                        label: Some(&format!("mesh::{}::vertex_buffer", self.name)),
                                        contents: bytemuck::cast_slice(&self.vertices),
                                        usage: wgpu::BufferUsages::VERTEX | usage,
                                }));

                        self.index_buffer =
                                Some(device.create_buffer_init(&BufferInitDescriptor {
                                        label: Some(&format!("mesh::{}::index_buffer", self.name)),
                                        contents: bytemuck::cast_slice(&self.indices),
                                        usage: wgpu::BufferUsages::INDEX | usage,
                                }));
                }

                self.needs_upload = false;
        }

        /// Destroys the GPU buffers right away instead of waiting for drop.
        pub fn release(&mut self)
        {
                if let Some(buffer) = self.vertex_buffer.take()
                {
                        buffer.destroy();
                }

                if let Some(buffer) = self.index_buffer.take()
                {
                        buffer.destroy();
                }
        }
}

impl Drop for Mesh
{
        fn drop(&mut self)
        {
                self.release();
        }
}

#[cfg(test)]
mod tests
{
        use super::*;

        fn tri(z: f32) -> (Vec<Vertex>, Vec<u32>)
        {
                (
                        vec![
                                Vertex::new([0.0, 0.0, z], [0.0, 0.0, 1.0]),
                                Vertex::new([1.0, 0.0, z], [0.0, 0.0, 1.0]),
                                Vertex::new([0.0, 1.0, z], [0.0, 0.0, 1.0]),
                        ],
                        vec![0, 1, 2],
                )
        }

        #[test]
        fn extend_rebases_indices()
        {
                let mut mesh = Mesh::empty("batch");

                let (v, i) = tri(0.0);
                mesh.extend(v, i);

                let (v, i) = tri(1.0);
                mesh.extend(v, i);

                assert_eq!(mesh.get_vertex_count(), 6);
                assert_eq!(mesh.indices(), &[0, 1, 2, 3, 4, 5]);
                assert_eq!(mesh.triangle_count(), 2);
        }

        #[test]
        fn bounds_cover_all_vertices()
        {
                let mut mesh = Mesh::empty("bounds");
                assert!(mesh.bounds().is_none());

                let (v, i) = tri(-2.0);
                mesh.extend(v, i);

                let (v, i) = tri(3.0);
                mesh.extend(v, i);

                let (min, max) = mesh.bounds().unwrap();
                assert_eq!(min, [0.0, 0.0, -2.0]);
                assert_eq!(max, [1.0, 1.0, 3.0]);
        }

        #[test]
        fn new_mesh_is_pending_upload_without_buffers()
        {
                let (v, i) = tri(0.0);
                let mesh = Mesh::new("fresh", v, i);

                assert!(mesh.needs_upload());
                assert!(!mesh.is_uploaded());
                assert!(mesh.vertex_buffer().is_err());
        }
}
