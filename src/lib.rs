//! typefield: a 3D input field you can type into
//!
//! A single scene, rendered with `wgpu`, that draws an extruded form field
//! built from SVG path data plus three pieces of extruded text: a label, a
//! description and the text the user is typing. Every accepted keystroke
//! rebuilds the typed text's mesh. Targets both native desktops and
//! WebAssembly.
//!
//! # Initialization model
//!
//! The engine is constructed internally by [`run()`]. Native builds ship a
//! tiny binary that calls it; on `wasm32` the exported start function calls
//! it when the module loads.
//!
//! ```no_run
//! fn main() {
//!     typefield::run().unwrap()
//! }
//! ```
//!
//! # Runtime lifecycle
//!
//! 1. Load `typefield.toml` (falling back to defaults) and set up logging.
//! 2. On the first `resumed` event, create the window, construct and start
//!    the [`scene::SceneDirector`] and begin loading the font.
//! 3. Each redraw ticks the director, uploads changed geometry and draws the
//!    root group plus the optional egui overlay (toggle with F1).
//! 4. When the font arrives, the label and input text meshes are built once;
//!    from then on keyboard and virtual-field input rebuild the input mesh.
//!
//! # Logging, errors, and diagnostics
//!
//! - Native logging goes through `env_logger`; set `RUST_LOG` to adjust
//!   verbosity. On the web, logs go to the browser console.
//! - [`run()`] returns `anyhow::Result<()>`. Asset failures (a missing font,
//!   a malformed path) are logged and leave the scene degraded, never
//!   crashed.
//!
//! # WebAssembly notes
//!
//! - Targets `wasm32` (32‑bit) for broad browser support.
//! - Expects a `<canvas id="canvas">` on the page; a hidden `<input>` is laid
//!   over it so touch devices get an on-screen keyboard.

pub mod camera;
pub mod config;
pub mod engine;
pub mod font;
pub mod geometry;
pub mod input;
pub mod renderer;
pub mod resource;
pub mod scene;
pub mod text;
pub mod ui;
pub mod utils;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Starts the runtime and blocks until the application exits.
///
/// Behavior:
/// - Initializes logging, loads the configuration and prints a startup
///   message.
/// - Builds the engine and enters the main loop; on native this call blocks
///   until the window is closed.
/// - Shows an exit message and returns.
///
/// # Returns
///
/// - `Ok(())` when the event loop exits cleanly.
/// - An error if engine construction or the runner encounter a failure.
pub fn run() -> anyhow::Result<()>
{
        utils::bootstrap::config_logging();

        let config = utils::bootstrap::create_config();

        utils::bootstrap::show_start_message(&config);

        let engine = engine::EngineBuilder::new(config.clone()).build()?;

        let runner = engine::EngineRunner::new(engine)?;

        runner.run()?;

        #[cfg(not(target_arch = "wasm32"))]
        {
                let msg = utils::exit::get_exit_message(&config);

                if !msg.is_empty()
                {
                        log::info!("{msg}");
                }
        }

        Ok(())
}

/// WebAssembly start entry point for the runtime.
///
/// Invoked automatically by the `wasm-bindgen` bootstrap when the module is
/// instantiated. Installs a panic hook so Rust panics are logged to the
/// browser console, then delegates to [`run()`]. Errors are mapped into a
/// `JsValue`, which makes module instantiation fail.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_typefield_wasm() -> Result<(), JsValue>
{
        console_error_panic_hook::set_once();

        run().map_err(|e| JsValue::from_str(&format!("typefield run failed: {e:#}")))
}
