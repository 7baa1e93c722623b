use ttf_parser::{Face, OutlineBuilder};

use crate::font::{FontError, OutlineSink};

impl OutlineBuilder for OutlineSink<'_>
{
        fn move_to(
                &mut self,
                x: f32,
                y: f32,
        )
        {
                OutlineSink::move_to(self, x, y);
        }

        fn line_to(
                &mut self,
                x: f32,
                y: f32,
        )
        {
                OutlineSink::line_to(self, x, y);
        }

        fn quad_to(
                &mut self,
                x1: f32,
                y1: f32,
                x: f32,
                y: f32,
        )
        {
                OutlineSink::quad_to(self, x1, y1, x, y);
        }

        fn curve_to(
                &mut self,
                x1: f32,
                y1: f32,
                x2: f32,
                y2: f32,
                x: f32,
                y: f32,
        )
        {
                OutlineSink::curve_to(self, x1, y1, x2, y2, x, y);
        }

        fn close(&mut self)
        {
                OutlineSink::close(self);
        }
}

/// A TrueType or OpenType font kept as raw bytes.
///
/// The face is re-parsed on each access; `Face::parse` only reads the table
/// directory, so this stays cheap.
#[derive(Debug)]
pub struct TrueTypeFont
{
        data: Vec<u8>,
        family_name: String,
        units_per_em: f32,
        line_height: f32,
}

impl TrueTypeFont
{
        pub fn new(data: Vec<u8>) -> Result<Self, FontError>
        {
                let face = Face::parse(&data, 0).map_err(|e| FontError::TrueType(e.to_string()))?;

                let family_name = face
                        .names()
                        .into_iter()
                        .find(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
                        .and_then(|name| name.to_string())
                        .unwrap_or_default();

                let bbox = face.global_bounding_box();
                let underline = face.underline_metrics().map(|m| m.thickness).unwrap_or(0);

                let units_per_em = face.units_per_em() as f32;
                let line_height = (bbox.y_max as f32 - bbox.y_min as f32) + underline as f32;

                log::debug!("Parsed TrueType font `{}` ({} units/em)", family_name, units_per_em);

                Ok(Self {
                        family_name,
                        units_per_em,
                        line_height,
                        data,
                })
        }

        fn face(&self) -> Option<Face<'_>>
        {
                Face::parse(&self.data, 0).ok()
        }

        pub fn family_name(&self) -> &str
        {
                &self.family_name
        }

        pub fn units_per_em(&self) -> f32
        {
                self.units_per_em
        }

        pub fn line_height(&self) -> f32
        {
                self.line_height
        }

        pub fn has_glyph(
                &self,
                ch: char,
        ) -> bool
        {
                self.face().and_then(|face| face.glyph_index(ch)).is_some()
        }

        pub fn draw_glyph(
                &self,
                ch: char,
                sink: &mut OutlineSink,
        ) -> f32
        {
                let Some(face) = self.face()
                else
                {
                        return 0.0;
                };

                let Some(id) = face.glyph_index(ch)
                else
                {
                        return 0.0;
                };

                // Whitespace glyphs have no outline, only an advance.
                let _ = face.outline_glyph(id, sink);

                face.glyph_hor_advance(id).unwrap_or(0) as f32
        }
}

#[cfg(test)]
mod tests
{
        use super::*;
        use crate::font::Font;
        use crate::geometry::outline::{DEFAULT_TOLERANCE, flatten, group_into_shapes};

        fn dejavu() -> Vec<u8>
        {
                std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/fonts/DejaVuSans.ttf")).unwrap()
        }

        #[test]
        fn loads_shipped_font()
        {
                let font = TrueTypeFont::new(dejavu()).unwrap();

                assert_eq!(font.family_name(), "DejaVu Sans");
                assert_eq!(font.units_per_em(), 2048.0);
                assert!(font.line_height() > font.units_per_em());
                assert!(font.has_glyph('J'));
        }

        #[test]
        fn letter_with_counter_has_a_hole()
        {
                let font = Font::from_bytes(dejavu()).unwrap();
                let shapes = group_into_shapes(flatten(&font.text_path("o", 15.0), DEFAULT_TOLERANCE));

                assert_eq!(shapes.len(), 1);
                assert_eq!(shapes[0].holes.len(), 1);
        }

        #[test]
        fn glyph_outline_is_scaled_to_size()
        {
                let font = Font::from_bytes(dejavu()).unwrap();
                let contours = flatten(&font.text_path("H", 15.0), DEFAULT_TOLERANCE);

                let max_y = contours
                        .iter()
                        .flat_map(|c| c.iter())
                        .map(|p| p[1])
                        .fold(f32::MIN, f32::max);

                // Cap height sits a bit under the em size.
                assert!(max_y > 8.0 && max_y < 15.0);
        }
}
