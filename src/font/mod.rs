//! Typefaces and text outline layout.
//!
//! Two formats are understood: three.js typeface JSON and TrueType/OpenType.
//! Either way the font lays text out into a single lyon path in font space
//! scaled to the requested size, y-up, starting at the origin.

pub mod loader;
pub mod truetype;
pub mod typeface;

use lyon_path::Path;
use lyon_path::math::point;

pub use loader::{FontSlot, FontState, load_font};
pub use truetype::TrueTypeFont;
pub use typeface::TypefaceFont;

#[derive(Debug, Clone, thiserror::Error)]
pub enum FontError
{
        #[error("failed to read font `{path}`: {reason}")]
        Io
        {
                path: String,
                reason: String,
        },

        #[error("failed to parse typeface JSON: {0}")]
        Json(String),

        #[error("failed to parse TrueType font: {0}")]
        TrueType(String),

        #[error("bad outline for glyph `{glyph}`: {reason}")]
        Outline
        {
                glyph: String,
                reason: String,
        },

        #[error("font load was abandoned")]
        Abandoned,
}

#[derive(Debug)]
pub enum Font
{
        Typeface(TypefaceFont),
        TrueType(TrueTypeFont),
}

impl Font
{
        /// Picks the format by content: a JSON object is a typeface, anything
        /// else is handed to the TrueType parser.
        pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FontError>
        {
                let is_json = bytes
                        .iter()
                        .find(|b| !b.is_ascii_whitespace())
                        .is_some_and(|b| *b == b'{');

                if is_json
                {
                        Ok(Font::Typeface(TypefaceFont::from_slice(&bytes)?))
                }
                else
                {
                        Ok(Font::TrueType(TrueTypeFont::new(bytes)?))
                }
        }

        pub fn family_name(&self) -> &str
        {
                match self
                {
                        Font::Typeface(font) => font.family_name(),
                        Font::TrueType(font) => font.family_name(),
                }
        }

        fn units_per_em(&self) -> f32
        {
                match self
                {
                        Font::Typeface(font) => font.resolution(),
                        Font::TrueType(font) => font.units_per_em(),
                }
        }

        fn line_height(&self) -> f32
        {
                match self
                {
                        Font::Typeface(font) => font.line_height(),
                        Font::TrueType(font) => font.line_height(),
                }
        }

        pub fn has_glyph(
                &self,
                ch: char,
        ) -> bool
        {
                match self
                {
                        Font::Typeface(font) => font.has_glyph(ch),
                        Font::TrueType(font) => font.has_glyph(ch),
                }
        }

        /// Emits one glyph into `sink` and returns its advance in font units.
        fn draw_glyph(
                &self,
                ch: char,
                sink: &mut OutlineSink,
        ) -> f32
        {
                match self
                {
                        Font::Typeface(font) => font.draw_glyph(ch, sink),
                        Font::TrueType(font) => font.draw_glyph(ch, sink),
                }
        }

        /// Lays `text` out at `size` units per em.
        ///
        /// `\n` returns to x = 0 one line lower. A character the font lacks
        /// is drawn as `?`, or skipped when `?` is missing too.
        pub fn text_path(
                &self,
                text: &str,
                size: f32,
        ) -> Path
        {
                let scale = size / self.units_per_em();
                let line_height = self.line_height() * scale;

                let mut builder = Path::builder();
                let mut x = 0.0;
                let mut y = 0.0;

                for ch in text.chars()
                {
                        if ch == '\n'
                        {
                                x = 0.0;
                                y -= line_height;
                                continue;
                        }

                        let glyph = if self.has_glyph(ch)
                        {
                                ch
                        }
                        else if self.has_glyph('?')
                        {
                                '?'
                        }
                        else
                        {
                                log::error!(
                                        "Character `{}` does not exist in font `{}`",
                                        ch,
                                        self.family_name()
                                );
                                continue;
                        };

                        let mut sink = OutlineSink::new(&mut builder, scale, [x, y]);
                        let advance = self.draw_glyph(glyph, &mut sink);
                        sink.finish();

                        x += advance * scale;
                }

                builder.build()
        }
}

/// Collects glyph outline commands into a lyon path, scaling from font
/// units and translating to the pen position.
pub struct OutlineSink<'a>
{
        builder: &'a mut lyon_path::path::Builder,
        scale: f32,
        offset: [f32; 2],
        open: bool,
}

impl<'a> OutlineSink<'a>
{
        pub fn new(
                builder: &'a mut lyon_path::path::Builder,
                scale: f32,
                offset: [f32; 2],
        ) -> Self
        {
                Self {
                        builder,
                        scale,
                        offset,
                        open: false,
                }
        }

        fn map(
                &self,
                x: f32,
                y: f32,
        ) -> lyon_path::math::Point
        {
                point(self.offset[0] + x * self.scale, self.offset[1] + y * self.scale)
        }

        pub fn move_to(
                &mut self,
                x: f32,
                y: f32,
        )
        {
                self.close();

                let p = self.map(x, y);
                self.builder.begin(p);
                self.open = true;
        }

        pub fn line_to(
                &mut self,
                x: f32,
                y: f32,
        )
        {
                if self.open
                {
                        let p = self.map(x, y);
                        self.builder.line_to(p);
                }
        }

        pub fn quad_to(
                &mut self,
                x1: f32,
                y1: f32,
                x: f32,
                y: f32,
        )
        {
                if self.open
                {
                        let ctrl = self.map(x1, y1);
                        let to = self.map(x, y);
                        self.builder.quadratic_bezier_to(ctrl, to);
                }
        }

        pub fn curve_to(
                &mut self,
                x1: f32,
                y1: f32,
                x2: f32,
                y2: f32,
                x: f32,
                y: f32,
        )
        {
                if self.open
                {
                        let ctrl1 = self.map(x1, y1);
                        let ctrl2 = self.map(x2, y2);
                        let to = self.map(x, y);
                        self.builder.cubic_bezier_to(ctrl1, ctrl2, to);
                }
        }

        pub fn close(&mut self)
        {
                if self.open
                {
                        self.builder.end(true);
                        self.open = false;
                }
        }

        pub fn finish(mut self)
        {
                self.close();
        }
}

#[cfg(test)]
pub(crate) mod tests
{
        use super::*;
        use crate::geometry::outline::{DEFAULT_TOLERANCE, flatten, group_into_shapes};

        /// A tiny typeface: `I` is a bar, `O` a square ring, `?` a small box.
        pub(crate) fn test_typeface_json() -> String
        {
                serde_json::json!({
                        "familyName": "Test Sans",
                        "resolution": 1000,
                        "underlineThickness": 50,
                        "boundingBox": { "xMin": 0, "xMax": 800, "yMin": -200, "yMax": 800 },
                        "glyphs": {
                                "I": { "ha": 300, "o": "m 0 0 l 200 0 l 200 700 l 0 700 z" },
                                "O": { "ha": 800, "o": "m 0 0 l 700 0 l 700 700 l 0 700 z m 200 200 l 200 500 l 500 500 l 500 200 z" },
                                "?": { "ha": 500, "o": "m 0 0 l 400 0 l 400 400 l 0 400 z" },
                                " ": { "ha": 250 }
                        }
                })
                .to_string()
        }

        pub(crate) fn test_font() -> Font
        {
                Font::from_bytes(test_typeface_json().into_bytes()).unwrap()
        }

        #[test]
        fn detects_typeface_json_by_content()
        {
                assert!(matches!(test_font(), Font::Typeface(_)));
        }

        #[test]
        fn garbage_is_rejected_as_truetype()
        {
                assert!(matches!(Font::from_bytes(vec![0, 1, 2, 3]), Err(FontError::TrueType(_))));
        }

        #[test]
        fn glyph_advances_move_the_pen()
        {
                let font = test_font();
                let contours = flatten(&font.text_path("II", 10.0), DEFAULT_TOLERANCE);

                assert_eq!(contours.len(), 2);

                let second_min_x = contours[1].iter().map(|p| p[0]).fold(f32::MAX, f32::min);
                assert!((second_min_x - 3.0).abs() < 1e-4);
        }

        #[test]
        fn holes_are_grouped_inside_their_glyph()
        {
                let font = test_font();
                let shapes = group_into_shapes(flatten(&font.text_path("O", 10.0), DEFAULT_TOLERANCE));

                assert_eq!(shapes.len(), 1);
                assert_eq!(shapes[0].holes.len(), 1);
        }

        #[test]
        fn missing_glyph_falls_back_to_question_mark()
        {
                let font = test_font();
                let contours = flatten(&font.text_path("Z", 10.0), DEFAULT_TOLERANCE);

                assert_eq!(contours.len(), 1);

                let max_y = contours[0].iter().map(|p| p[1]).fold(f32::MIN, f32::max);
                assert!((max_y - 4.0).abs() < 1e-4);
        }

        #[test]
        fn newline_moves_down_one_line()
        {
                let font = test_font();
                let contours = flatten(&font.text_path("I\nI", 10.0), DEFAULT_TOLERANCE);

                let second_min_x = contours[1].iter().map(|p| p[0]).fold(f32::MAX, f32::min);
                let second_min_y = contours[1].iter().map(|p| p[1]).fold(f32::MAX, f32::min);

                // (800 - -200 + 50) / 1000 * 10
                assert!(second_min_x.abs() < 1e-4);
                assert!((second_min_y + 10.5).abs() < 1e-4);
        }

        #[test]
        fn space_has_advance_but_no_outline()
        {
                let font = test_font();
                let contours = flatten(&font.text_path(" I", 10.0), DEFAULT_TOLERANCE);

                assert_eq!(contours.len(), 1);

                let min_x = contours[0].iter().map(|p| p[0]).fold(f32::MAX, f32::min);
                assert!((min_x - 2.5).abs() < 1e-4);
        }
}
