use std::sync::Arc;

use crate::font::{Font, FontError};

/// Where a font load stands. `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Default)]
pub enum FontState
{
        #[default]
        Absent,
        Loading
        {
                path: String,
        },
        Ready(Arc<Font>),
        Failed(FontError),
}

/// Single-resolution holder for the scene's typeface.
#[derive(Debug, Default)]
pub struct FontSlot
{
        state: FontState,
}

impl FontSlot
{
        pub fn new() -> Self
        {
                Self::default()
        }

        pub fn state(&self) -> &FontState
        {
                &self.state
        }

        pub fn is_ready(&self) -> bool
        {
                matches!(self.state, FontState::Ready(_))
        }

        pub fn is_loading(&self) -> bool
        {
                matches!(self.state, FontState::Loading { .. })
        }

        pub fn font(&self) -> Option<&Arc<Font>>
        {
                match &self.state
                {
                        FontState::Ready(font) => Some(font),
                        _ => None,
                }
        }

        /// Marks the load as started. Only valid once, from `Absent`.
        pub fn begin(
                &mut self,
                path: impl Into<String>,
        ) -> anyhow::Result<()>
        {
                match self.state
                {
                        FontState::Absent =>
                        {
                                self.state = FontState::Loading {
                                        path: path.into(),
                                };
                                Ok(())
                        }
                        _ => anyhow::bail!("Font load already started ({})", self.describe()),
                }
        }

        /// Settles the load. Returns the font when this call made it ready;
        /// any resolution after the first is ignored.
        pub fn resolve(
                &mut self,
                result: Result<Font, FontError>,
        ) -> Option<Arc<Font>>
        {
                let FontState::Loading {
                        path,
                } = &self.state
                else
                {
                        log::warn!("Ignoring font resolution while {}", self.describe());
                        return None;
                };

                match result
                {
                        Ok(font) =>
                        {
                                log::info!("Font loaded correctly: `{}` from {}", font.family_name(), path);

                                let font = Arc::new(font);
                                self.state = FontState::Ready(Arc::clone(&font));
                                Some(font)
                        }
                        Err(e) =>
                        {
                                log::error!("Font failed to load from {}: {}", path, e);

                                self.state = FontState::Failed(e);
                                None
                        }
                }
        }

        pub fn describe(&self) -> &'static str
        {
                match self.state
                {
                        FontState::Absent => "absent",
                        FontState::Loading {
                                ..
                        } => "loading",
                        FontState::Ready(_) => "ready",
                        FontState::Failed(_) => "failed",
                }
        }
}

/// Fetches and parses a font.
///
/// Native builds read from disk, falling back to the crate directory for
/// relative paths. Web builds fetch relative to the page origin.
pub async fn load_font(path: &str) -> Result<Font, FontError>
{
        let bytes = load_binary(path).await?;
        Font::from_bytes(bytes)
}

#[cfg(not(target_arch = "wasm32"))]
async fn load_binary(path: &str) -> Result<Vec<u8>, FontError>
{
        let resolved = resolve_path(path);

        std::fs::read(&resolved).map_err(|e| FontError::Io {
                path: resolved.display().to_string(),
                reason: e.to_string(),
        })
}

#[cfg(not(target_arch = "wasm32"))]
fn resolve_path(path: &str) -> std::path::PathBuf
{
        let direct = std::path::PathBuf::from(path);

        if direct.exists() || direct.is_absolute()
        {
                return direct;
        }

        if let Ok(dir) = std::env::var("CARGO_MANIFEST_DIR")
        {
                let candidate = std::path::Path::new(&dir).join(path);

                if candidate.exists()
                {
                        return candidate;
                }
        }

        direct
}

#[cfg(target_arch = "wasm32")]
async fn load_binary(path: &str) -> Result<Vec<u8>, FontError>
{
        let io_error = |reason: String| FontError::Io {
                path: path.to_string(),
                reason,
        };

        let url = format_url(path).map_err(io_error)?;

        let response = reqwest::get(url).await.map_err(|e| io_error(e.to_string()))?;

        if !response.status().is_success()
        {
                return Err(io_error(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(|e| io_error(e.to_string()))?;

        Ok(bytes.to_vec())
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> Result<reqwest::Url, String>
{
        let window = web_sys::window().ok_or("no window")?;

        let origin = window
                .location()
                .origin()
                .map_err(|e| format!("no page origin: {:?}", e))?;

        let base = reqwest::Url::parse(&format!("{}/", origin)).map_err(|e| e.to_string())?;

        base.join(file_name).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests
{
        use super::*;
        use crate::font::tests::test_font;

        #[test]
        fn slot_goes_absent_loading_ready()
        {
                let mut slot = FontSlot::new();
                assert_eq!(slot.describe(), "absent");

                slot.begin("fonts/test.json").unwrap();
                assert!(slot.is_loading());
                assert!(slot.font().is_none());

                let font = slot.resolve(Ok(test_font()));
                assert!(font.is_some());
                assert!(slot.is_ready());
        }

        #[test]
        fn slot_resolves_only_once()
        {
                let mut slot = FontSlot::new();
                slot.begin("a").unwrap();

                assert!(slot.resolve(Err(FontError::Abandoned)).is_none());
                assert_eq!(slot.describe(), "failed");

                // Late success after failure stays failed.
                assert!(slot.resolve(Ok(test_font())).is_none());
                assert!(!slot.is_ready());
                assert!(slot.begin("a").is_err());
        }

        #[test]
        fn resolve_without_begin_is_ignored()
        {
                let mut slot = FontSlot::new();

                assert!(slot.resolve(Ok(test_font())).is_none());
                assert_eq!(slot.describe(), "absent");
        }

        #[test]
        fn loads_shipped_font_from_disk()
        {
                let font = pollster::block_on(load_font("assets/fonts/DejaVuSans.ttf")).unwrap();

                assert!(font.has_glyph('J'));
        }

        #[test]
        fn missing_file_is_an_io_error()
        {
                let result = pollster::block_on(load_font("assets/fonts/missing.typeface.json"));

                assert!(matches!(result, Err(FontError::Io { .. })));
        }
}
