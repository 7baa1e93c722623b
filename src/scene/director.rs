//! Scene lifecycle: construction, start-up, per-frame work, resize and
//! tear-down.
//!
//! The director owns every piece of scene state and never touches the GPU,
//! so it can be driven headlessly. The engine feeds it window events and
//! asks it each frame whether anything should be drawn.

use std::time::Duration;

use cgmath::Vector3;

use crate::camera::{Camera, OrbitController};
use crate::config::{Config, SpinConfig};
use crate::font::{Font, FontError, FontSlot};
use crate::geometry::svg::{GeometryBuilder, REFERENCE_PIECES, VectorPathSpec};
use crate::input::{KeyInput, ListenerSet, TextCapture, TypedText};
use crate::resource::Resources;
use crate::scene::graph::Group;
use crate::scene::lights::Lights;
use crate::scene::render_loop::RenderLoop;
use crate::text::TextMeshManager;

/// Fixed offset applied to the root group when rendering starts.
pub const GROUP_ROTATION: [f32; 3] = [9.5, -0.9, 0.0];
pub const GROUP_POSITION: [f32; 3] = [-90.0, 50.0, 320.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase
{
        #[default]
        Uninitialized,
        Constructed,
        Rendering,
        TornDown,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectorError
{
        #[error("cannot {operation} while the scene is {phase:?}")]
        IllegalTransition
        {
                operation: &'static str,
                phase: Phase,
        },
}

/// Size of the render surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport
{
        pub width: u32,
        pub height: u32,
}

impl Viewport
{
        pub fn new(
                width: u32,
                height: u32,
        ) -> Self
        {
                Self {
                        width,
                        height,
                }
        }

        pub fn aspect(&self) -> f32
        {
                self.width as f32 / self.height.max(1) as f32
        }
}

/// Per-frame rotation of the root group. Inert unless enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinHook
{
        pub enabled: bool,
        pub x: f32,
        pub y: f32,
}

impl From<&SpinConfig> for SpinHook
{
        fn from(config: &SpinConfig) -> Self
        {
                Self {
                        enabled: config.enabled,
                        x: config.x,
                        y: config.y,
                }
        }
}

impl SpinHook
{
        fn apply(
                &self,
                group: &mut Group,
        )
        {
                if self.enabled
                {
                        group.transform.rotation.x += self.x;
                        group.transform.rotation.y += self.y;
                }
        }
}

/// The font the engine should fetch once the scene starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRequest
{
        pub path: String,
}

/// What the director needs from the configuration.
#[derive(Debug, Clone)]
pub struct SceneSettings
{
        pub font_path: String,
        pub initial_text: String,
        pub max_text_length: usize,
        pub background: u32,
        pub spin: SpinConfig,
        pub pieces: Vec<VectorPathSpec>,
}

impl Default for SceneSettings
{
        fn default() -> Self
        {
                Self::from(&Config::default())
        }
}

impl From<&Config> for SceneSettings
{
        fn from(config: &Config) -> Self
        {
                Self {
                        font_path: config.font_path.clone(),
                        initial_text: config.initial_text.clone(),
                        max_text_length: config.max_text_length,
                        background: config.background,
                        spin: config.spin.clone(),
                        pieces: REFERENCE_PIECES.to_vec(),
                }
        }
}

pub struct SceneDirector
{
        settings: SceneSettings,
        phase: Phase,
        viewport: Option<Viewport>,
        camera: Option<Camera>,
        controller: Option<OrbitController>,
        group: Group,
        resources: Resources,
        lights: Option<Lights>,
        fonts: FontSlot,
        text: TypedText,
        text_meshes: TextMeshManager,
        listeners: ListenerSet,
        render_loop: RenderLoop,
        capture: Box<dyn TextCapture>,
        spin: SpinHook,
}

impl std::fmt::Debug for SceneDirector
{
        fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
        ) -> std::fmt::Result
        {
                f.debug_struct("SceneDirector")
                        .field("phase", &self.phase)
                        .field("viewport", &self.viewport)
                        .field("text", &self.text.value())
                        .field("font", &self.fonts.describe())
                        .field("nodes", &self.group.len())
                        .field("listeners", &self.listeners)
                        .finish_non_exhaustive()
        }
}

impl SceneDirector
{
        pub fn new(
                settings: SceneSettings,
                capture: Box<dyn TextCapture>,
        ) -> Self
        {
                let text = TypedText::new(&settings.initial_text, settings.max_text_length);
                let spin = SpinHook::from(&settings.spin);

                Self {
                        settings,
                        phase: Phase::Uninitialized,
                        viewport: None,
                        camera: None,
                        controller: None,
                        group: Group::new(),
                        resources: Resources::new(),
                        lights: None,
                        fonts: FontSlot::new(),
                        text,
                        text_meshes: TextMeshManager::new(),
                        listeners: ListenerSet::none(),
                        render_loop: RenderLoop::new(),
                        capture,
                        spin,
                }
        }

        fn expect_phase(
                &self,
                expected: Phase,
                operation: &'static str,
        ) -> Result<(), DirectorError>
        {
                if self.phase != expected
                {
                        return Err(DirectorError::IllegalTransition {
                                operation,
                                phase: self.phase,
                        });
                }

                Ok(())
        }

        /// Allocates the camera, the surface description and an empty root
        /// group.
        pub fn construct(
                &mut self,
                viewport: Viewport,
        ) -> anyhow::Result<()>
        {
                self.expect_phase(Phase::Uninitialized, "construct")?;

                self.camera = Some(Camera::new(viewport.aspect()));
                self.viewport = Some(viewport);
                self.group = Group::new();
                self.phase = Phase::Constructed;

                log::info!("Scene constructed at {}x{}", viewport.width, viewport.height);

                Ok(())
        }

        /// Builds the static scene, wires up input and starts the render loop.
        ///
        /// Returns the font the caller must fetch and hand back through
        /// [`SceneDirector::on_font_loaded`].
        pub fn start(&mut self) -> anyhow::Result<FontRequest>
        {
                self.expect_phase(Phase::Constructed, "start")?;

                // A bad path stops the remaining pieces but not the scene.
                match GeometryBuilder::build(&self.settings.pieces, &mut self.resources, &mut self.group)
                {
                        Ok(count) => log::info!("Built {} static meshes", count),
                        Err(e) => log::error!("Static geometry failed: {}", e),
                }

                self.fonts.begin(self.settings.font_path.clone())?;

                self.lights = Some(Lights::new());

                let mut controller = OrbitController::new();

                if let Some(viewport) = self.viewport
                {
                        controller.set_viewport_height(viewport.height);
                }

                self.controller = Some(controller);
                self.listeners = ListenerSet::all();

                self.group.transform.rotation = Vector3::from(GROUP_ROTATION);
                self.group.transform.position = Vector3::from(GROUP_POSITION);

                self.render_loop.start();
                self.phase = Phase::Rendering;

                Ok(FontRequest {
                        path: self.settings.font_path.clone(),
                })
        }

        /// Settles the font load. On the first success the input and label
        /// meshes are built; returns whether that happened.
        pub fn on_font_loaded(
                &mut self,
                result: Result<Font, FontError>,
        ) -> anyhow::Result<bool>
        {
                let Some(font) = self.fonts.resolve(result)
                else
                {
                        return Ok(false);
                };

                if self.phase != Phase::Rendering
                {
                        log::warn!("Font arrived while the scene is {:?}", self.phase);
                        return Ok(false);
                }

                self.text_meshes.build_initial_meshes(
                        &font,
                        self.text.value(),
                        &mut self.resources,
                        &mut self.group,
                )?;

                Ok(true)
        }

        /// Applies a hardware key press. Returns whether the key was handled,
        /// which requires a running scene and a ready font.
        pub fn handle_key(
                &mut self,
                key: &KeyInput,
        ) -> anyhow::Result<bool>
        {
                if self.phase != Phase::Rendering || !self.listeners.keyboard
                {
                        return Ok(false);
                }

                if !self.fonts.is_ready()
                {
                        log::trace!("Dropping {:?}, font {}", key.key, self.fonts.describe());
                        return Ok(false);
                }

                self.text.apply(key.edit());
                self.update_text_mesh()?;

                Ok(true)
        }

        /// Replaces the typed text with the virtual field's value.
        pub fn handle_virtual_input(
                &mut self,
                value: String,
        ) -> anyhow::Result<bool>
        {
                if self.phase != Phase::Rendering || !self.listeners.virtual_input
                {
                        return Ok(false);
                }

                self.text.replace(value);
                self.update_text_mesh()?;

                Ok(true)
        }

        /// Click or touch-end on the render surface.
        pub fn activate_text_capture(&mut self) -> bool
        {
                if self.phase != Phase::Rendering || !self.listeners.pointer
                {
                        return false;
                }

                self.capture.activate();
                true
        }

        fn update_text_mesh(&mut self) -> anyhow::Result<bool>
        {
                Ok(self.text_meshes.update_text_mesh(
                        &self.fonts,
                        self.text.value(),
                        &mut self.resources,
                        &mut self.group,
                )?)
        }

        /// Forwards pointer input to the orbit controller while pointer
        /// listeners are installed.
        pub fn controller_mut(&mut self) -> Option<&mut OrbitController>
        {
                if !self.listeners.pointer
                {
                        return None;
                }

                self.controller.as_mut()
        }

        /// One scheduler tick. Returns whether a frame must be drawn.
        pub fn frame(
                &mut self,
                dt: Duration,
        ) -> bool
        {
                if self.phase != Phase::Rendering || !self.render_loop.tick(dt)
                {
                        return false;
                }

                self.spin.apply(&mut self.group);

                if let (Some(controller), Some(camera)) = (self.controller.as_mut(), self.camera.as_mut())
                {
                        controller.update_camera(camera);
                }

                true
        }

        /// Updates camera and surface size together. Zero sizes and resizes
        /// without an installed listener are ignored.
        pub fn resize(
                &mut self,
                width: u32,
                height: u32,
        ) -> bool
        {
                if !self.listeners.resize || width == 0 || height == 0
                {
                        return false;
                }

                let Some(camera) = self.camera.as_mut()
                else
                {
                        return false;
                };

                camera.resize(width, height);

                if let Some(controller) = self.controller.as_mut()
                {
                        controller.set_viewport_height(height);
                }

                self.viewport = Some(Viewport::new(width, height));

                true
        }

        /// Detaches listeners and stops the render loop.
        pub fn tear_down(&mut self) -> anyhow::Result<()>
        {
                self.expect_phase(Phase::Rendering, "tear down")?;

                self.listeners = ListenerSet::none();
                self.render_loop.stop();
                self.phase = Phase::TornDown;

                log::info!("Scene torn down after {} frames", self.render_loop.frames());

                Ok(())
        }

        pub fn phase(&self) -> Phase
        {
                self.phase
        }

        pub fn viewport(&self) -> Option<Viewport>
        {
                self.viewport
        }

        pub fn camera(&self) -> Option<&Camera>
        {
                self.camera.as_ref()
        }

        pub fn camera_mut(&mut self) -> Option<&mut Camera>
        {
                self.camera.as_mut()
        }

        pub fn group(&self) -> &Group
        {
                &self.group
        }

        pub fn resources(&self) -> &Resources
        {
                &self.resources
        }

        pub fn resources_mut(&mut self) -> &mut Resources
        {
                &mut self.resources
        }

        pub fn lights(&self) -> Option<&Lights>
        {
                self.lights.as_ref()
        }

        pub fn fonts(&self) -> &FontSlot
        {
                &self.fonts
        }

        pub fn text(&self) -> &TypedText
        {
                &self.text
        }

        pub fn text_meshes(&self) -> &TextMeshManager
        {
                &self.text_meshes
        }

        pub fn listeners(&self) -> ListenerSet
        {
                self.listeners
        }

        pub fn render_loop(&self) -> &RenderLoop
        {
                &self.render_loop
        }

        pub fn capture(&self) -> &dyn TextCapture
        {
                self.capture.as_ref()
        }

        /// Swaps the virtual text field, e.g. for a DOM input once the event
        /// loop exists.
        pub fn set_capture(
                &mut self,
                capture: Box<dyn TextCapture>,
        )
        {
                self.capture = capture;
        }

        pub fn spin_mut(&mut self) -> &mut SpinHook
        {
                &mut self.spin
        }

        pub fn background(&self) -> u32
        {
                self.settings.background
        }
}

#[cfg(test)]
mod tests
{
        use super::*;
        use crate::input::MemoryCapture;

        fn director() -> SceneDirector
        {
                SceneDirector::new(SceneSettings::default(), Box::new(MemoryCapture::new()))
        }

        #[test]
        fn viewport_aspect_survives_zero_height()
        {
                assert_eq!(Viewport::new(1200, 800).aspect(), 1.5);
                assert_eq!(Viewport::new(10, 0).aspect(), 10.0);
        }

        #[test]
        fn start_before_construct_is_rejected()
        {
                let mut director = director();

                assert!(director.start().is_err());
                assert_eq!(director.phase(), Phase::Uninitialized);
                assert!(!director.fonts().is_loading());
        }

        #[test]
        fn start_installs_everything()
        {
                let mut director = director();

                director.construct(Viewport::new(800, 600)).unwrap();
                assert_eq!(director.listeners(), ListenerSet::none());

                let request = director.start().unwrap();

                assert_eq!(request.path, SceneSettings::default().font_path);
                assert_eq!(director.phase(), Phase::Rendering);
                assert_eq!(director.listeners(), ListenerSet::all());
                assert!(director.lights().is_some());
                assert!(director.fonts().is_loading());
                assert!(director.render_loop().is_running());
                assert_eq!(director.group().transform.position, Vector3::new(-90.0, 50.0, 320.0));
                assert_eq!(director.group().transform.rotation, Vector3::new(9.5, -0.9, 0.0));
        }

        #[test]
        fn spin_is_inert_by_default()
        {
                let mut director = director();
                director.construct(Viewport::new(800, 600)).unwrap();
                director.start().unwrap();

                assert!(director.frame(Duration::from_millis(16)));
                assert_eq!(director.group().transform.rotation, Vector3::new(9.5, -0.9, 0.0));

                director.spin_mut().enabled = true;
                director.frame(Duration::from_millis(16));

                let rotation = director.group().transform.rotation;
                assert!((rotation.x - 9.501).abs() < 1e-5);
                assert!((rotation.y + 0.897).abs() < 1e-5);
        }

        #[test]
        fn broken_piece_keeps_earlier_ones()
        {
                let mut settings = SceneSettings::default();
                settings.pieces.insert(1, VectorPathSpec {
                        name: "broken",
                        path: "M 0 0",
                        ..REFERENCE_PIECES[0]
                });

                let mut director = SceneDirector::new(settings, Box::new(MemoryCapture::new()));
                director.construct(Viewport::new(800, 600)).unwrap();
                director.start().unwrap();

                assert_eq!(director.phase(), Phase::Rendering);
                assert!(director.group().nodes().iter().all(|n| n.name.starts_with("top_bar")));
                assert!(!director.group().is_empty());
        }
}
