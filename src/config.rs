use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "typefield.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig
{
        /// Per-frame root group rotation. Off unless asked for.
        pub enabled: bool,
        pub x: f32,
        pub y: f32,
}

impl Default for SpinConfig
{
        fn default() -> Self
        {
                Self {
                        enabled: false,
                        x: 0.001,
                        y: 0.003,
                }
        }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
        pub window_title: String,
        /// Typeface to load, `.ttf`/`.otf` or three.js `.typeface.json`.
        pub font_path: String,
        pub initial_text: String,
        pub max_text_length: usize,
        pub background: u32,
        pub spin: SpinConfig,
        pub enable_debug: bool,
        pub show_start_message: bool,
        pub show_exit_message: bool,
}

impl Default for Config
{
        fn default() -> Self
        {
                Self {
                        window_title: "typefield".to_string(),
                        font_path: "assets/fonts/DejaVuSans.ttf".to_string(),
                        initial_text: "Jesse".to_string(),
                        max_text_length: 20,
                        background: 0x444444,
                        spin: SpinConfig::default(),
                        enable_debug: false,
                        show_start_message: true,
                        show_exit_message: true,
                }
        }
}

impl Config
{
        pub fn from_toml(text: &str) -> anyhow::Result<Self>
        {
                Ok(toml::from_str(text)?)
        }

        #[cfg(not(target_arch = "wasm32"))]
        pub fn from_file() -> anyhow::Result<Self>
        {
                use anyhow::Context;

                let text = std::fs::read_to_string(CONFIG_FILE)
                        .with_context(|| format!("reading {}", CONFIG_FILE))?;

                Self::from_toml(&text).with_context(|| format!("parsing {}", CONFIG_FILE))
        }

        /// The web build has no filesystem; it always runs on defaults.
        #[cfg(target_arch = "wasm32")]
        pub fn from_file() -> anyhow::Result<Self>
        {
                Ok(Self::default())
        }
}
