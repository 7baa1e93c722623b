use std::collections::HashMap;

use serde::Deserialize;

use crate::font::{FontError, OutlineSink};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypefaceFile
{
        glyphs: HashMap<String, GlyphFile>,
        resolution: f32,
        bounding_box: BoundingBox,
        #[serde(default)]
        underline_thickness: f32,
        #[serde(default)]
        family_name: String,
}

#[derive(Debug, Deserialize)]
struct GlyphFile
{
        ha: f32,
        #[serde(default)]
        o: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox
{
        pub x_min: f32,
        pub x_max: f32,
        pub y_min: f32,
        pub y_max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlyphCommand
{
        MoveTo([f32; 2]),
        LineTo([f32; 2]),
        QuadTo
        {
                ctrl: [f32; 2],
                to: [f32; 2],
        },
        CubicTo
        {
                ctrl1: [f32; 2],
                ctrl2: [f32; 2],
                to: [f32; 2],
        },
        Close,
}

#[derive(Debug, Clone)]
pub struct TypefaceGlyph
{
        pub advance: f32,
        pub commands: Vec<GlyphCommand>,
}

/// A font in three.js typeface JSON form, with outlines parsed up front.
#[derive(Debug)]
pub struct TypefaceFont
{
        family_name: String,
        resolution: f32,
        bounding_box: BoundingBox,
        underline_thickness: f32,
        glyphs: HashMap<char, TypefaceGlyph>,
}

impl TypefaceFont
{
        pub fn from_slice(bytes: &[u8]) -> Result<Self, FontError>
        {
                let file: TypefaceFile =
                        serde_json::from_slice(bytes).map_err(|e| FontError::Json(e.to_string()))?;

                if file.resolution.is_nan() || file.resolution <= 0.0
                {
                        return Err(FontError::Json(format!(
                                "resolution must be positive, got {}",
                                file.resolution
                        )));
                }

                let mut glyphs = HashMap::with_capacity(file.glyphs.len());

                for (key, glyph) in file.glyphs
                {
                        let mut chars = key.chars();

                        let (Some(ch), None) = (chars.next(), chars.next())
                        else
                        {
                                log::warn!("Skipping typeface glyph with multi-character key `{}`", key);
                                continue;
                        };

                        let commands = match glyph.o.as_deref()
                        {
                                Some(outline) => parse_outline(outline).map_err(|reason| {
                                        FontError::Outline {
                                                glyph: key.clone(),
                                                reason,
                                        }
                                })?,
                                None => Vec::new(),
                        };

                        glyphs.insert(
                                ch,
                                TypefaceGlyph {
                                        advance: glyph.ha,
                                        commands,
                                },
                        );
                }

                log::debug!("Parsed typeface `{}` with {} glyphs", file.family_name, glyphs.len());

                Ok(Self {
                        family_name: file.family_name,
                        resolution: file.resolution,
                        bounding_box: file.bounding_box,
                        underline_thickness: file.underline_thickness,
                        glyphs,
                })
        }

        pub fn family_name(&self) -> &str
        {
                &self.family_name
        }

        pub fn resolution(&self) -> f32
        {
                self.resolution
        }

        pub fn bounding_box(&self) -> BoundingBox
        {
                self.bounding_box
        }

        pub fn line_height(&self) -> f32
        {
                self.bounding_box.y_max - self.bounding_box.y_min + self.underline_thickness
        }

        pub fn glyph(
                &self,
                ch: char,
        ) -> Option<&TypefaceGlyph>
        {
                self.glyphs.get(&ch)
        }

        pub fn has_glyph(
                &self,
                ch: char,
        ) -> bool
        {
                self.glyphs.contains_key(&ch)
        }

        pub fn draw_glyph(
                &self,
                ch: char,
                sink: &mut OutlineSink,
        ) -> f32
        {
                let Some(glyph) = self.glyphs.get(&ch)
                else
                {
                        return 0.0;
                };

                for command in &glyph.commands
                {
                        match *command
                        {
                                GlyphCommand::MoveTo([x, y]) => sink.move_to(x, y),
                                GlyphCommand::LineTo([x, y]) => sink.line_to(x, y),
                                GlyphCommand::QuadTo {
                                        ctrl,
                                        to,
                                } => sink.quad_to(ctrl[0], ctrl[1], to[0], to[1]),
                                GlyphCommand::CubicTo {
                                        ctrl1,
                                        ctrl2,
                                        to,
                                } => sink.curve_to(ctrl1[0], ctrl1[1], ctrl2[0], ctrl2[1], to[0], to[1]),
                                GlyphCommand::Close => sink.close(),
                        }
                }

                glyph.advance
        }
}

/// Parses an outline command string.
///
/// `m x y` and `l x y` take one point. `q` lists the end point before its
/// control point, `b` lists the end point before both control points.
/// `z` closes the current contour.
pub fn parse_outline(outline: &str) -> Result<Vec<GlyphCommand>, String>
{
        let mut tokens = outline.split_whitespace();
        let mut commands = Vec::new();

        while let Some(op) = tokens.next()
        {
                let command = match op
                {
                        "m" => GlyphCommand::MoveTo(next_point(&mut tokens, op)?),
                        "l" => GlyphCommand::LineTo(next_point(&mut tokens, op)?),
                        "q" =>
                        {
                                let to = next_point(&mut tokens, op)?;
                                let ctrl = next_point(&mut tokens, op)?;

                                GlyphCommand::QuadTo {
                                        ctrl,
                                        to,
                                }
                        }
                        "b" =>
                        {
                                let to = next_point(&mut tokens, op)?;
                                let ctrl1 = next_point(&mut tokens, op)?;
                                let ctrl2 = next_point(&mut tokens, op)?;

                                GlyphCommand::CubicTo {
                                        ctrl1,
                                        ctrl2,
                                        to,
                                }
                        }
                        "z" => GlyphCommand::Close,
                        other => return Err(format!("unknown command `{}`", other)),
                };

                commands.push(command);
        }

        Ok(commands)
}

fn next_point<'a>(
        tokens: &mut impl Iterator<Item = &'a str>,
        op: &str,
) -> Result<[f32; 2], String>
{
        let mut coord = || -> Result<f32, String> {
                let token = tokens
                        .next()
                        .ok_or_else(|| format!("`{}` is missing a coordinate", op))?;

                token.parse::<f32>()
                        .map_err(|_| format!("`{}` has a bad coordinate `{}`", op, token))
        };

        let x = coord()?;
        let y = coord()?;

        Ok([x, y])
}

#[cfg(test)]
mod tests
{
        use super::*;
        use crate::font::tests::test_typeface_json;

        #[test]
        fn parses_all_command_kinds()
        {
                let commands = parse_outline("m 1 2 l 3 4 q 5 6 7 8 b 9 10 11 12 13 14 z").unwrap();

                assert_eq!(
                        commands,
                        vec![
                                GlyphCommand::MoveTo([1.0, 2.0]),
                                GlyphCommand::LineTo([3.0, 4.0]),
                                GlyphCommand::QuadTo {
                                        ctrl: [7.0, 8.0],
                                        to: [5.0, 6.0],
                                },
                                GlyphCommand::CubicTo {
                                        ctrl1: [11.0, 12.0],
                                        ctrl2: [13.0, 14.0],
                                        to: [9.0, 10.0],
                                },
                                GlyphCommand::Close,
                        ]
                );
        }

        #[test]
        fn rejects_truncated_and_unknown_commands()
        {
                assert!(parse_outline("m 1").is_err());
                assert!(parse_outline("x 1 2").is_err());
                assert!(parse_outline("l 1 two").is_err());
                assert_eq!(parse_outline("").unwrap(), Vec::new());
        }

        #[test]
        fn loads_metrics_and_glyphs()
        {
                let font = TypefaceFont::from_slice(test_typeface_json().as_bytes()).unwrap();

                assert_eq!(font.family_name(), "Test Sans");
                assert_eq!(font.resolution(), 1000.0);
                assert_eq!(font.line_height(), 1050.0);
                assert_eq!(font.glyph('I').unwrap().advance, 300.0);
                assert!(font.glyph(' ').unwrap().commands.is_empty());
                assert!(!font.has_glyph('Z'));
        }

        #[test]
        fn bad_outline_names_the_glyph()
        {
                let json = r#"{ "resolution": 1000, "boundingBox": { "xMin": 0, "xMax": 1, "yMin": 0, "yMax": 1 },
                        "glyphs": { "A": { "ha": 10, "o": "m 0" } } }"#;

                match TypefaceFont::from_slice(json.as_bytes())
                {
                        Err(FontError::Outline {
                                glyph, ..
                        }) => assert_eq!(glyph, "A"),
                        other => panic!("unexpected result: {:?}", other),
                }
        }

        #[test]
        fn missing_fields_are_json_errors()
        {
                assert!(matches!(
                        TypefaceFont::from_slice(br#"{ "glyphs": {} }"#),
                        Err(FontError::Json(_))
                ));
        }
}
