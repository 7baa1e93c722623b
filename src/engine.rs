//! Engine Module
//!
//! Owns the window, the [`Renderer`] and the [`SceneDirector`], and routes
//! winit events between them:
//! - Engine construction via [`EngineBuilder`]
//! - Engine lifecycle management through [`EngineRunner`]
//! - Asynchronous work (GPU setup on the web, font loading everywhere)
//!   reporting back as [`AppEvent`]s
//!
//! # Platform Differences
//! - **Native targets**: GPU setup blocks on `pollster`; fonts are read on a
//!   worker thread.
//! - **WASM targets**: both are spawned with `wasm_bindgen_futures` and
//!   delivered through the event loop proxy.

use std::sync::Arc;

#[cfg(target_arch = "wasm32")]
use winit::platform::web::EventLoopExtWebSys;

use winit::{
        application::ApplicationHandler,
        event::{ElementState, MouseButton, TouchPhase, WindowEvent},
        event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
        keyboard::{Key, ModifiersState, NamedKey},
        window::{Window, WindowId},
};

use crate::{
        config::Config,
        font::{Font, FontError, load_font},
        input::{KeyInput, MemoryCapture},
        renderer::Renderer,
        scene::director::{FontRequest, SceneDirector, SceneSettings, Viewport},
        ui::DebugOverlay,
};

/// Events sent back into the event loop by asynchronous work.
#[derive(Debug)]
pub enum AppEvent
{
        FontLoaded(Result<Font, FontError>),

        /// The hidden text field changed.
        VirtualInput(String),

        /// GPU setup finished on the web.
        #[cfg(target_arch = "wasm32")]
        RendererReady(Box<Renderer>),
}

/// Runner for the [`Engine`].
pub struct EngineRunner
{
        pub engine: Option<Engine>,

        pub event_loop: EventLoop<AppEvent>,
}

impl EngineRunner
{
        /// Creates the `event_loop` and hands its proxy to the engine.
        pub fn new(mut engine: Engine) -> anyhow::Result<Self>
        {
                let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;

                engine.proxy = Some(event_loop.create_proxy());

                #[cfg(target_arch = "wasm32")]
                if let Some(proxy) = engine.proxy.clone()
                {
                        let input = crate::input::capture::HiddenInput::attach(proxy)?;

                        engine.director.set_capture(Box::new(input));
                }

                Ok(Self {
                        engine: Some(engine),
                        event_loop,
                })
        }

        /// Executes the `run_app()` function of `winit::EventLoop`.
        pub fn run(self) -> anyhow::Result<()>
        {
                #[allow(unused_mut)]
                let mut engine = match self.engine
                {
                        Some(e) => e,
                        None => anyhow::bail!("Engine doesn't exist."),
                };

                #[cfg(target_arch = "wasm32")]
                {
                        let engine = Box::leak(Box::new(engine));

                        self.event_loop.spawn_app(engine);
                }

                #[cfg(not(target_arch = "wasm32"))]
                self.event_loop.run_app(&mut engine)?;

                Ok(())
        }
}

/// To construct [`Engine`], use [`EngineBuilder`].
pub struct Engine
{
        pub config: Config,

        /// Sends asynchronous results back into the event loop.
        pub proxy: Option<EventLoopProxy<AppEvent>>,

        /// The OS/Browser window for rendering and input handling.
        pub window: Option<Arc<Window>>,

        /// `wgpu` internals. `None` until GPU setup finishes.
        pub renderer: Option<Renderer>,

        pub director: SceneDirector,

        pub overlay: DebugOverlay,

        modifiers: ModifiersState,

        /// The timestamp of the last frame, used for delta time calculations.
        time: Option<instant::Instant>,
}

impl std::fmt::Debug for Engine
{
        fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
        ) -> std::fmt::Result
        {
                f.debug_struct("Engine")
                        .field("window", &self.window.is_some())
                        .field("renderer", &self.renderer.is_some())
                        .field("director", &self.director)
                        .finish_non_exhaustive()
        }
}

impl Engine
{
        fn request_redraw(&self)
        {
                if let Some(window) = self.window.as_ref()
                {
                        window.request_redraw();
                }
        }

        #[cfg(target_arch = "wasm32")]
        fn get_body_size() -> Option<(u32, u32)>
        {
                let window = web_sys::window()?;

                let document = window.document()?;

                let body = document.body()?;

                let width = body.client_width() as u32;

                let height = body.client_height() as u32;

                log::info!("Body: {}, {}", width, height);

                Some((width, height))
        }

        fn window_size(window: &Window) -> (u32, u32)
        {
                #[cfg(target_arch = "wasm32")]
                if let Some(size) = Self::get_body_size()
                {
                        return size;
                }

                let size = window.inner_size();

                (size.width, size.height)
        }

        /// Constructs and starts the scene, then fetches its font.
        fn start_scene(
                &mut self,
                width: u32,
                height: u32,
        ) -> anyhow::Result<()>
        {
                self.director.construct(Viewport::new(width.max(1), height.max(1)))?;

                let request = self.director.start()?;

                self.load_font(request)
        }

        fn load_font(
                &self,
                request: FontRequest,
        ) -> anyhow::Result<()>
        {
                let Some(proxy) = self.proxy.clone()
                else
                {
                        anyhow::bail!("No event loop proxy to deliver the font through");
                };

                log::info!("Loading font from {}", request.path);

                #[cfg(not(target_arch = "wasm32"))]
                std::thread::Builder::new()
                        .name("font-loader".to_string())
                        .spawn(move || {
                                let result = pollster::block_on(load_font(&request.path));

                                if proxy.send_event(AppEvent::FontLoaded(result)).is_err()
                                {
                                        log::warn!("Event loop closed before the font arrived");
                                }
                        })?;

                #[cfg(target_arch = "wasm32")]
                wasm_bindgen_futures::spawn_local(async move {
                        let result = load_font(&request.path).await;

                        if proxy.send_event(AppEvent::FontLoaded(result)).is_err()
                        {
                                log::warn!("Event loop closed before the font arrived");
                        }
                });

                Ok(())
        }

        /// Director and surface are resized in the same turn.
        fn resize(
                &mut self,
                width: u32,
                height: u32,
        )
        {
                if !self.director.resize(width, height)
                {
                        return;
                }

                if let Some(renderer) = self.renderer.as_mut()
                {
                        renderer.resize(width, height);
                }
        }

        fn redraw(
                &mut self,
                event_loop: &ActiveEventLoop,
        )
        {
                let now = instant::Instant::now();
                let dt = self.time.map(|t| now - t).unwrap_or_default();
                self.time = Some(now);

                if !self.director.frame(dt)
                {
                        return;
                }

                let (Some(renderer), Some(window)) = (self.renderer.as_mut(), self.window.clone())
                else
                {
                        return;
                };

                match renderer.render(&window, &mut self.director, &mut self.overlay)
                {
                        Ok(()) => window.request_redraw(),
                        Err(e) =>
                        {
                                // Lost or outdated surfaces come back after a reconfigure.
                                log::warn!("Unable to render {}", e);

                                let (width, height) = renderer.surface.size();

                                if !renderer.resize(width, height)
                                {
                                        log::error!("Surface could not be recovered");
                                        event_loop.exit();
                                        return;
                                }

                                window.request_redraw();
                        }
                }
        }

        fn shut_down(
                &mut self,
                event_loop: &ActiveEventLoop,
        )
        {
                if let Err(e) = self.director.tear_down()
                {
                        log::warn!("{e}");
                }

                event_loop.exit();
        }
}

impl ApplicationHandler<AppEvent> for Engine
{
        fn resumed(
                &mut self,
                event_loop: &ActiveEventLoop,
        )
        {
                // Some systems (specifically Android) won't allow applications to
                // create a render surface until they are resumed.
                if self.window.is_some()
                {
                        log::info!("Engine already resumed, skipping initialization.");
                        return;
                }

                #[allow(unused_mut)]
                let mut window_attributes = Window::default_attributes().with_title(self.config.window_title.clone());

                #[cfg(target_arch = "wasm32")]
                {
                        use wasm_bindgen::JsCast;
                        use winit::platform::web::WindowAttributesExtWebSys;

                        const CANVAS_ID: &str = "canvas";

                        let canvas = web_sys::window()
                                .and_then(|w| w.document())
                                .and_then(|d| d.get_element_by_id(CANVAS_ID))
                                .map(|c| c.unchecked_into());

                        // Touch-end must not scroll or zoom the page.
                        window_attributes = window_attributes
                                .with_canvas(canvas)
                                .with_prevent_default(true);
                }

                let window = match event_loop.create_window(window_attributes)
                {
                        Ok(w) => Arc::new(w),
                        Err(e) =>
                        {
                                log::error!("Failed to create window: {e}");
                                event_loop.exit();
                                return;
                        }
                };

                self.window = Some(window.clone());

                let (width, height) = Self::window_size(&window);

                if let Err(e) = self.start_scene(width, height)
                {
                        log::error!("Failed to start scene: {e:#}");
                        event_loop.exit();
                        return;
                }

                #[cfg(not(target_arch = "wasm32"))]
                {
                        // Native builds can block on async state initialization.
                        match pollster::block_on(Renderer::new(window.clone()))
                        {
                                Ok(mut renderer) =>
                                {
                                        renderer.resize(width, height);
                                        self.renderer = Some(renderer);
                                        window.request_redraw();
                                }
                                Err(e) =>
                                {
                                        log::error!("GPU setup failed: {e:#}");
                                        event_loop.exit();
                                }
                        }
                }

                #[cfg(target_arch = "wasm32")]
                {
                        // In WASM builds, async tasks must be spawned without blocking.
                        let Some(proxy) = self.proxy.clone()
                        else
                        {
                                log::error!("Proxy is None, skipping async init");
                                return;
                        };

                        wasm_bindgen_futures::spawn_local(async move {
                                match Renderer::new(window).await
                                {
                                        Ok(renderer) =>
                                        {
                                                log::info!("Renderer initialized, sending event");

                                                if proxy.send_event(AppEvent::RendererReady(Box::new(renderer))).is_err()
                                                {
                                                        log::error!("Event loop closed during GPU setup");
                                                }
                                        }
                                        Err(e) => log::error!("GPU setup failed: {e:#}"),
                                }
                        });
                }
        }

        fn user_event(
                &mut self,
                _event_loop: &ActiveEventLoop,
                event: AppEvent,
        )
        {
                match event
                {
                        AppEvent::FontLoaded(result) =>
                        {
                                if let Err(e) = self.director.on_font_loaded(result)
                                {
                                        log::error!("Failed to build text meshes: {e:#}");
                                }

                                self.request_redraw();
                        }
                        AppEvent::VirtualInput(value) =>
                        {
                                if let Err(e) = self.director.handle_virtual_input(value)
                                {
                                        log::error!("Failed to update text mesh: {e:#}");
                                }
                        }
                        #[cfg(target_arch = "wasm32")]
                        AppEvent::RendererReady(renderer) =>
                        {
                                let mut renderer = *renderer;

                                if let Some(viewport) = self.director.viewport()
                                {
                                        renderer.resize(viewport.width, viewport.height);
                                }

                                self.renderer = Some(renderer);
                                self.request_redraw();
                        }
                }
        }

        fn window_event(
                &mut self,
                event_loop: &ActiveEventLoop,
                #[allow(unused_variables)] id: WindowId,
                event: WindowEvent,
        )
        {
                let overlay_consumed = match (self.renderer.as_mut(), self.window.as_ref())
                {
                        (Some(renderer), Some(window)) => renderer.handle_input(window, &event),
                        _ => false,
                };

                match event
                {
                        WindowEvent::CloseRequested =>
                        {
                                log::info!("The close button was pressed; stopping");
                                self.shut_down(event_loop);
                        }
                        WindowEvent::Resized(size) =>
                        {
                                self.resize(size.width, size.height);
                        }
                        WindowEvent::RedrawRequested =>
                        {
                                self.redraw(event_loop);
                        }
                        WindowEvent::ModifiersChanged(modifiers) =>
                        {
                                self.modifiers = modifiers.state();
                        }
                        WindowEvent::KeyboardInput {
                                event, ..
                        } =>
                        {
                                if event.state == ElementState::Pressed
                                        && !event.repeat
                                        && event.logical_key == Key::Named(NamedKey::F1)
                                {
                                        self.overlay.toggle();
                                        return;
                                }

                                let Some(key) = KeyInput::from_winit(&event, self.modifiers)
                                else
                                {
                                        return;
                                };

                                if let Err(e) = self.director.handle_key(&key)
                                {
                                        log::error!("Failed to update text mesh: {e:#}");
                                }
                        }
                        WindowEvent::MouseInput {
                                state, button, ..
                        } if !overlay_consumed =>
                        {
                                let pressed = state.is_pressed();

                                // A click lands on release.
                                if button == MouseButton::Left && !pressed
                                {
                                        self.director.activate_text_capture();
                                }

                                if let Some(controller) = self.director.controller_mut()
                                {
                                        controller.handle_mouse_button(button, pressed);
                                }
                        }
                        WindowEvent::CursorMoved {
                                position, ..
                        } =>
                        {
                                if let Some(controller) = self.director.controller_mut()
                                {
                                        controller.handle_cursor_moved(position);
                                }
                        }
                        WindowEvent::MouseWheel {
                                delta, ..
                        } if !overlay_consumed =>
                        {
                                if let Some(controller) = self.director.controller_mut()
                                {
                                        controller.handle_scroll(&delta);
                                }
                        }
                        WindowEvent::Touch(touch) if touch.phase == TouchPhase::Ended =>
                        {
                                self.director.activate_text_capture();
                        }
                        _ => (),
                }
        }
}

/// Prepares an [`Engine`]. The window and GPU state are created later, on
/// the first [`ApplicationHandler::resumed`].
#[derive(Debug)]
pub struct EngineBuilder
{
        config: Config,
        settings: Option<SceneSettings>,
}

impl EngineBuilder
{
        pub fn new(config: Config) -> Self
        {
                Self {
                        config,
                        settings: None,
                }
        }

        /// Overrides the scene settings derived from the config.
        pub fn with_settings(
                mut self,
                settings: SceneSettings,
        ) -> Self
        {
                self.settings = Some(settings);
                self
        }

        pub fn build(self) -> anyhow::Result<Engine>
        {
                if self.config.max_text_length == 0
                {
                        anyhow::bail!("max_text_length must be at least 1");
                }

                let settings = self.settings.unwrap_or_else(|| SceneSettings::from(&self.config));

                let director = SceneDirector::new(settings, Box::new(MemoryCapture::new()));

                Ok(Engine {
                        overlay: DebugOverlay::new(self.config.enable_debug),
                        config: self.config,
                        proxy: None,
                        window: None,
                        renderer: None,
                        director,
                        modifiers: ModifiersState::empty(),
                        time: None,
                })
        }
}

#[cfg(test)]
mod tests
{
        use super::*;

        #[test]
        fn build_defers_window_and_gpu()
        {
                let engine = EngineBuilder::new(Config::default()).build().unwrap();

                assert!(engine.window.is_none());
                assert!(engine.renderer.is_none());
                assert_eq!(engine.director.phase(), crate::scene::director::Phase::Uninitialized);
                assert!(!engine.overlay.visible);
        }

        #[test]
        fn zero_text_length_is_rejected()
        {
                let config = Config {
                        max_text_length: 0,
                        ..Default::default()
                };

                assert!(EngineBuilder::new(config).build().is_err());
        }

        #[test]
        fn settings_override_config()
        {
                let settings = SceneSettings {
                        initial_text: "Ana".to_string(),
                        ..SceneSettings::default()
                };

                let engine = EngineBuilder::new(Config::default())
                        .with_settings(settings)
                        .build()
                        .unwrap();

                assert_eq!(engine.director.text().value(), "Ana");
        }
}
