use cgmath::*;
use std::f32::consts::PI;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalPosition;
use winit::event::{MouseButton, MouseScrollDelta};

/// Perspective camera looking at a target point.
///
/// The projection matrix is cached; call [`Camera::update_projection_matrix`]
/// after touching `fov_y`, `aspect`, `near` or `far`.
#[derive(Debug)]
pub struct Camera
{
        pub position: Point3<f32>,
        pub target: Point3<f32>,
        pub fov_y: Deg<f32>,
        pub aspect: f32,
        pub near: f32,
        pub far: f32,
        projection: Matrix4<f32>,
}

impl Camera
{
        pub fn new(aspect: f32) -> Self
        {
                let mut camera = Self {
                        position: Point3::new(0.0, 0.0, 500.0),
                        target: Point3::new(0.0, 0.0, 0.0),
                        fov_y: Deg(75.0),
                        aspect,
                        near: 0.1,
                        far: 1000.0,
                        projection: Matrix4::identity(),
                };

                camera.update_projection_matrix();
                camera
        }

        pub fn ui(
                &mut self,
                ui: &mut egui::Ui,
        )
        {
                egui::CollapsingHeader::new("Camera")
                        .default_open(false)
                        .show(ui, |ui| {
                                egui::Grid::new("camera_grid")
                                        .num_columns(2)
                                        .spacing([40.0, 4.0])
                                        .show(ui, |ui| {
                                                ui.label("Aspect");
                                                ui.label(format!("{:.3}", self.aspect));
                                                ui.end_row();

                                                ui.label("FOV Y");
                                                if ui.add(egui::Slider::new(&mut self.fov_y.0, 10.0..=120.0))
                                                        .changed()
                                                {
                                                        self.update_projection_matrix();
                                                }
                                                ui.end_row();

                                                ui.label("Position");
                                                ui.label(format!(
                                                        "{:.1}, {:.1}, {:.1}",
                                                        self.position.x, self.position.y, self.position.z
                                                ));
                                                ui.end_row();

                                                ui.label("Target");
                                                ui.label(format!(
                                                        "{:.1}, {:.1}, {:.1}",
                                                        self.target.x, self.target.y, self.target.z
                                                ));
                                                ui.end_row();
                                        });

                                if ui.button("Reset view").clicked()
                                {
                                        self.position = Point3::new(0.0, 0.0, 500.0);
                                        self.target = Point3::new(0.0, 0.0, 0.0);
                                }
                        });
        }

        pub fn resize(
                &mut self,
                width: u32,
                height: u32,
        )
        {
                self.aspect = width as f32 / height as f32;
                self.update_projection_matrix();
        }

        pub fn update_projection_matrix(&mut self)
        {
                self.projection =
                        OPENGL_TO_WGPU_MATRIX * perspective(self.fov_y, self.aspect, self.near, self.far);
        }

        pub fn projection_matrix(&self) -> Matrix4<f32>
        {
                self.projection
        }

        pub fn view_matrix(&self) -> Matrix4<f32>
        {
                Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
        }

        pub fn view_projection(&self) -> Matrix4<f32>
        {
                self.projection * self.view_matrix()
        }

        pub fn uniform(&self) -> CameraUniform
        {
                let mut uniform = CameraUniform::new();
                uniform.update_view_proj(self);
                uniform
        }

        pub fn get_buffer(
                &self,
                device: &wgpu::Device,
        ) -> wgpu::Buffer
        {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Camera Buffer"),
                        contents: bytemuck::cast_slice(&[self.uniform()]),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                })
        }

        pub fn get_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout
        {
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        entries: &[wgpu::BindGroupLayoutEntry {
                                binding: 0,
                                visibility: wgpu::ShaderStages::VERTEX
                                        | wgpu::ShaderStages::FRAGMENT,
                                ty: wgpu::BindingType::Buffer {
                                        ty: wgpu::BufferBindingType::Uniform,
                                        has_dynamic_offset: false,
                                        min_binding_size: None,
                                },
                                count: None,
                        }],
                        label: Some("camera_bind_group_layout"),
                })
        }
}

// We need this for Rust to store our data correctly for the shaders
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform
{
        pub view_position: [f32; 4],
        pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform
{
        pub fn new() -> Self
        {
                Self {
                        view_proj: Matrix4::identity().into(),
                        view_position: [0.0; 4],
                }
        }

        pub fn update_view_proj(
                &mut self,
                camera: &Camera,
        )
        {
                self.view_position = camera.position.to_homogeneous().into();
                self.view_proj = camera.view_projection().into();
        }
}

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::from_cols(
    Vector4::new(1.0, 0.0, 0.0, 0.0),
    Vector4::new(0.0, 1.0, 0.0, 0.0),
    Vector4::new(0.0, 0.0, 0.5, 0.0),
    Vector4::new(0.0, 0.0, 0.5, 1.0),
);

const MIN_POLAR: f32 = 0.0001;

/// Free-look controller orbiting the camera around its target.
///
/// Left drag rotates, right drag pans, the wheel dollies. Input is
/// accumulated and applied once per frame by [`OrbitController::update_camera`].
#[derive(Debug)]
pub struct OrbitController
{
        pub rotate_speed: f32,
        pub pan_speed: f32,
        pub zoom_speed: f32,
        pub min_distance: f32,
        pub max_distance: f32,
        rotating: bool,
        panning: bool,
        last_cursor: Option<PhysicalPosition<f64>>,
        rotate_delta: Vector2<f32>,
        pan_delta: Vector2<f32>,
        scroll: f32,
        viewport_height: f32,
}

impl OrbitController
{
        pub fn new() -> Self
        {
                Self {
                        rotate_speed: 1.0,
                        pan_speed: 1.0,
                        zoom_speed: 1.0,
                        min_distance: 0.0,
                        max_distance: f32::INFINITY,
                        rotating: false,
                        panning: false,
                        last_cursor: None,
                        rotate_delta: Vector2::new(0.0, 0.0),
                        pan_delta: Vector2::new(0.0, 0.0),
                        scroll: 0.0,
                        viewport_height: 1.0,
                }
        }

        pub fn set_viewport_height(
                &mut self,
                height: u32,
        )
        {
                self.viewport_height = height.max(1) as f32;
        }

        pub fn is_dragging(&self) -> bool
        {
                self.rotating || self.panning
        }

        pub fn handle_mouse_button(
                &mut self,
                button: MouseButton,
                pressed: bool,
        ) -> bool
        {
                match button
                {
                        MouseButton::Left =>
                        {
                                self.rotating = pressed;
                                true
                        }
                        MouseButton::Right =>
                        {
                                self.panning = pressed;
                                true
                        }
                        _ => false,
                }
        }

        pub fn handle_cursor_moved(
                &mut self,
                position: PhysicalPosition<f64>,
        )
        {
                if let Some(last) = self.last_cursor
                {
                        self.handle_mouse(position.x - last.x, position.y - last.y);
                }

                self.last_cursor = Some(position);
        }

        pub fn handle_mouse(
                &mut self,
                mouse_dx: f64,
                mouse_dy: f64,
        )
        {
                let delta = Vector2::new(mouse_dx as f32, mouse_dy as f32);

                if self.rotating
                {
                        self.rotate_delta += delta;
                }
                else if self.panning
                {
                        self.pan_delta += delta;
                }
        }

        pub fn handle_scroll(
                &mut self,
                delta: &MouseScrollDelta,
        )
        {
                self.scroll += match delta
                {
                        MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                        MouseScrollDelta::PixelDelta(PhysicalPosition {
                                y: scroll, ..
                        }) => *scroll as f32 / 100.0,
                };
        }

        pub fn update_camera(
                &mut self,
                camera: &mut Camera,
        )
        {
                let mut offset = camera.position - camera.target;

                // Spherical coordinates around +Y.
                let mut radius = offset.magnitude();
                let mut theta = offset.x.atan2(offset.z);
                let mut phi = (offset.y / radius.max(f32::EPSILON)).clamp(-1.0, 1.0).acos();

                theta -= 2.0 * PI * self.rotate_delta.x / self.viewport_height * self.rotate_speed;
                phi -= 2.0 * PI * self.rotate_delta.y / self.viewport_height * self.rotate_speed;
                phi = phi.clamp(MIN_POLAR, PI - MIN_POLAR);

                if self.scroll != 0.0
                {
                        let scale = 0.95_f32.powf(self.zoom_speed * self.scroll.abs());

                        radius = if self.scroll > 0.0 { radius * scale } else { radius / scale };
                }

                radius = radius.clamp(self.min_distance, self.max_distance);

                offset = Vector3::new(radius * phi.sin() * theta.sin(), radius * phi.cos(), radius * phi.sin() * theta.cos());

                if self.pan_delta != Vector2::new(0.0, 0.0)
                {
                        // Pan so the scene follows the cursor at the target's depth.
                        let view = camera.view_matrix();
                        let right = Vector3::new(view.x.x, view.y.x, view.z.x);
                        let up = Vector3::new(view.x.y, view.y.y, view.z.y);

                        let target_distance = radius * (Rad::from(camera.fov_y).0 * 0.5).tan();
                        let per_pixel = 2.0 * target_distance / self.viewport_height * self.pan_speed;

                        let pan = right * (-self.pan_delta.x * per_pixel) + up * (self.pan_delta.y * per_pixel);
                        camera.target += pan;
                }

                camera.position = camera.target + offset;

                self.rotate_delta = Vector2::new(0.0, 0.0);
                self.pan_delta = Vector2::new(0.0, 0.0);
                self.scroll = 0.0;
        }
}

impl Default for OrbitController
{
        fn default() -> Self
        {
                Self::new()
        }
}

#[cfg(test)]
mod tests
{
        use super::*;

        #[test]
        fn defaults_match_scene_camera()
        {
                let camera = Camera::new(800.0 / 600.0);

                assert_eq!(camera.fov_y, Deg(75.0));
                assert_eq!(camera.near, 0.1);
                assert_eq!(camera.far, 1000.0);
                assert_eq!(camera.position.z, 500.0);
        }

        #[test]
        fn resize_recomputes_projection()
        {
                let mut camera = Camera::new(800.0 / 600.0);
                let before = camera.projection_matrix();

                camera.resize(1200, 800);

                assert_eq!(camera.aspect, 1.5);
                assert_ne!(camera.projection_matrix(), before);

                let expected = OPENGL_TO_WGPU_MATRIX * perspective(Deg(75.0), 1.5, 0.1, 1000.0);
                assert_eq!(camera.projection_matrix(), expected);
        }

        #[test]
        fn origin_projects_to_screen_center()
        {
                let camera = Camera::new(1.0);
                let clip = camera.view_projection() * Vector4::new(0.0, 0.0, 0.0, 1.0);

                assert!((clip.x / clip.w).abs() < 1e-5);
                assert!((clip.y / clip.w).abs() < 1e-5);
                assert!(clip.z / clip.w > 0.0 && clip.z / clip.w < 1.0);
        }

        #[test]
        fn drag_rotates_around_target_keeping_distance()
        {
                let mut camera = Camera::new(1.0);
                let mut controller = OrbitController::new();
                controller.set_viewport_height(600);

                controller.handle_mouse_button(MouseButton::Left, true);
                controller.handle_cursor_moved(PhysicalPosition::new(100.0, 100.0));
                controller.handle_cursor_moved(PhysicalPosition::new(160.0, 100.0));
                controller.update_camera(&mut camera);

                assert!((camera.position.to_vec().magnitude() - 500.0).abs() < 1e-2);
                assert!(camera.position.x.abs() > 1.0);
        }

        #[test]
        fn moves_without_button_do_nothing()
        {
                let mut camera = Camera::new(1.0);
                let mut controller = OrbitController::new();

                controller.handle_cursor_moved(PhysicalPosition::new(0.0, 0.0));
                controller.handle_cursor_moved(PhysicalPosition::new(50.0, 50.0));
                controller.update_camera(&mut camera);

                assert!((camera.position - Point3::new(0.0, 0.0, 500.0)).magnitude() < 1e-3);
        }

        #[test]
        fn wheel_dollies_toward_target()
        {
                let mut camera = Camera::new(1.0);
                let mut controller = OrbitController::new();

                controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 1.0));
                controller.update_camera(&mut camera);

                assert!(camera.position.z < 500.0);
        }

        #[test]
        fn right_drag_pans_target()
        {
                let mut camera = Camera::new(1.0);
                let mut controller = OrbitController::new();
                controller.set_viewport_height(600);

                controller.handle_mouse_button(MouseButton::Right, true);
                controller.handle_mouse(30.0, 0.0);
                controller.update_camera(&mut camera);

                assert!(camera.target.x < 0.0);
                assert!((camera.position.z - 500.0).abs() < 1e-2);
        }
}
