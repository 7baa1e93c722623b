use std::collections::HashMap;

use crate::geometry::mesh::Mesh;

/// Handle to a geometry resource owned by [`Resources`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

/// Registry of every live geometry resource.
///
/// Geometry is allocated here, uploaded here and released here, so the
/// number of live resources is always observable through [`Resources::live_count`].
#[derive(Debug, Default)]
pub struct Resources
{
        meshes: HashMap<GeometryId, Mesh>,
        next_id: u64,
        disposed: u64,
}

impl Resources
{
        pub fn new() -> Self
        {
                Self::default()
        }

        pub fn add(
                &mut self,
                mesh: Mesh,
        ) -> GeometryId
        {
                let id = GeometryId(self.next_id);
                self.next_id += 1;

                log::debug!("Allocated geometry {:?} ({})", id, mesh.name());

                self.meshes.insert(id, mesh);
                id
        }

        pub fn get(
                &self,
                id: GeometryId,
        ) -> Option<&Mesh>
        {
                self.meshes.get(&id)
        }

        pub fn get_mut(
                &mut self,
                id: GeometryId,
        ) -> Option<&mut Mesh>
        {
                self.meshes.get_mut(&id)
        }

        /// Removes a geometry and destroys its GPU buffers immediately.
        ///
        /// Returns `false` if the id was already disposed.
        pub fn dispose(
                &mut self,
                id: GeometryId,
        ) -> bool
        {
                match self.meshes.remove(&id)
                {
                        Some(mut mesh) =>
                        {
                                mesh.release();
                                self.disposed += 1;
                                log::debug!("Disposed geometry {:?} ({})", id, mesh.name());
                                true
                        }
                        None =>
                        {
                                log::warn!("Geometry {:?} was already disposed", id);
                                false
                        }
                }
        }

        pub fn live_count(&self) -> usize
        {
                self.meshes.len()
        }

        pub fn disposed_count(&self) -> u64
        {
                self.disposed
        }

        pub fn pending_uploads(&self) -> usize
        {
                self.meshes.values().filter(|m| m.needs_upload()).count()
        }

        pub fn upload_all(
                &mut self,
                device: &wgpu::Device,
        )
        {
                let mut uploaded = 0;

                for mesh in self.meshes.values_mut()
                {
                        if mesh.needs_upload()
                        {
                                mesh.upload(device, wgpu::BufferUsages::COPY_DST);
                                uploaded += 1;
                        }
                }

                if uploaded > 0
                {
                        log::debug!("Uploaded {} geometry resource(s)", uploaded);
                }
        }
}

#[cfg(test)]
mod tests
{
        use super::*;

        #[test]
        fn dispose_releases_and_counts()
        {
                let mut resources = Resources::new();

                let a = resources.add(Mesh::empty("a"));
                let b = resources.add(Mesh::empty("b"));

                assert_ne!(a, b);
                assert_eq!(resources.live_count(), 2);

                assert!(resources.dispose(a));
                assert_eq!(resources.live_count(), 1);
                assert!(resources.get(a).is_none());
                assert!(resources.get(b).is_some());

                assert!(!resources.dispose(a));
                assert_eq!(resources.disposed_count(), 1);
        }

        #[test]
        fn ids_are_never_reused()
        {
                let mut resources = Resources::new();

                let first = resources.add(Mesh::empty("first"));
                resources.dispose(first);

                let second = resources.add(Mesh::empty("second"));

                assert!(second > first);
        }

        #[test]
        fn new_geometry_is_pending_upload()
        {
                let mut resources = Resources::new();
                resources.add(Mesh::empty("pending"));

                assert_eq!(resources.pending_uploads(), 1);
        }
}
