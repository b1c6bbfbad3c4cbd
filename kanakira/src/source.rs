//! Read-only access to the two input fonts

use kurbo::{BezPath, Rect, Shape};
use skrifa::{
    charmap::Charmap,
    instance::{LocationRef, Size},
    metrics::GlyphMetrics,
    outline::DrawSettings,
    FontRef, GlyphId, MetadataProvider, OutlineGlyphCollection,
};

use crate::{
    error::{Error, SourceRole},
    pen::QuadPathPen,
};

/// A glyph borrowed from one of the input fonts, in that font's units.
#[derive(Clone, Debug)]
pub struct SourceGlyph {
    pub gid: GlyphId,
    /// The outline, made only of line and quadratic segments
    pub path: BezPath,
    pub advance: f64,
}

impl SourceGlyph {
    /// The tight bounds of the outline, or `None` if it has no ink.
    pub fn bounds(&self) -> Option<Rect> {
        (!self.path.elements().is_empty()).then(|| self.path.bounding_box())
    }
}

/// A character with no outline in the font it was requested from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MissingGlyph {
    pub ch: char,
    pub role: SourceRole,
}

impl MissingGlyph {
    /// Attach the grapheme that needed this glyph.
    pub fn in_grapheme(self, grapheme: &str) -> Error {
        Error::MissingGlyph {
            grapheme: grapheme.to_owned(),
            ch: self.ch,
            role: self.role,
        }
    }
}

/// One parsed input font.
///
/// Outlines are always drawn unhinted at the font's design size, so all
/// coordinates and advances are in font units.
pub struct SourceFont<'a> {
    role: SourceRole,
    data: &'a [u8],
    font: FontRef<'a>,
    charmap: Charmap<'a>,
    outlines: OutlineGlyphCollection<'a>,
    metrics: GlyphMetrics<'a>,
}

impl<'a> SourceFont<'a> {
    /// Parse font data.
    ///
    /// For font collections the first font is used. Fails if the data is not
    /// a font, or if the font has neither `glyf` nor CFF outlines.
    pub fn new(role: SourceRole, data: &'a [u8]) -> Result<Self, String> {
        let font = FontRef::from_index(data, 0).map_err(|e| e.to_string())?;
        let outlines = font.outline_glyphs();
        if outlines.format().is_none() {
            return Err("font has no glyf or CFF outlines".into());
        }
        Ok(SourceFont {
            role,
            data,
            charmap: font.charmap(),
            metrics: font.glyph_metrics(Size::unscaled(), LocationRef::default()),
            outlines,
            font,
        })
    }

    pub fn role(&self) -> SourceRole {
        self.role
    }

    /// The raw font data, for copying tables.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn units_per_em(&self) -> u16 {
        self.font
            .metrics(Size::unscaled(), LocationRef::default())
            .units_per_em
    }

    /// The outline and advance of the glyph mapped to `ch`.
    ///
    /// A character that is unmapped, or whose glyph has no outline, is a
    /// [`MissingGlyph`].
    pub fn fetch(&self, ch: char) -> Result<SourceGlyph, MissingGlyph> {
        let missing = MissingGlyph { ch, role: self.role };
        let gid = self.charmap.map(ch).ok_or(missing)?;
        let glyph = self.glyph(gid).ok_or(missing)?;
        if glyph.path.elements().is_empty() {
            return Err(missing);
        }
        Ok(glyph)
    }

    /// The glyph with the given id, which may have an empty outline.
    ///
    /// Returns `None` if the glyph does not exist or cannot be drawn.
    pub fn glyph(&self, gid: GlyphId) -> Option<SourceGlyph> {
        let outline = self.outlines.get(gid)?;
        let mut pen = QuadPathPen::new();
        let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
        if let Err(e) = outline.draw(settings, &mut pen) {
            log::warn!("{} source: unable to draw glyph {gid}: {e}", self.role);
            return None;
        }
        Some(SourceGlyph {
            gid,
            path: pen.into_inner(),
            advance: self.metrics.advance_width(gid).unwrap_or_default() as f64,
        })
    }
}

impl std::fmt::Debug for SourceFont<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFont")
            .field("role", &self.role)
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use kanakira_test_data as test_data;

    use super::*;

    #[test]
    fn fetch_outline_and_advance() {
        let data = test_data::katakana_font();
        let font = SourceFont::new(SourceRole::Japanese, &data).unwrap();
        assert_eq!(font.units_per_em(), test_data::UNITS_PER_EM);

        let glyph = font.fetch('カ').unwrap();
        assert_eq!(glyph.advance, test_data::KANA_ADVANCE as f64);
        let bounds = glyph.bounds().unwrap();
        assert_eq!(bounds, test_data::kana_bounds('カ'));
    }

    #[test]
    fn unmapped_char_is_missing() {
        let data = test_data::romaji_font();
        let font = SourceFont::new(SourceRole::Romaji, &data).unwrap();
        assert!(font.fetch('K').is_ok());
        assert_eq!(
            font.fetch('カ').unwrap_err(),
            MissingGlyph {
                ch: 'カ',
                role: SourceRole::Romaji
            }
        );
    }

    #[test]
    fn empty_outline_is_missing() {
        let data = test_data::romaji_font();
        let font = SourceFont::new(SourceRole::Romaji, &data).unwrap();
        // space is mapped but has no contours
        assert!(font.fetch(' ').is_err());
        let notdef = font.glyph(GlyphId::NOTDEF).unwrap();
        assert_eq!(notdef.advance, test_data::MONO_ADVANCE as f64);
    }

    #[test]
    fn not_a_font() {
        assert!(SourceFont::new(SourceRole::Japanese, b"not a font").is_err());
    }

    #[test]
    fn missing_glyph_error_names_grapheme() {
        let err = MissingGlyph {
            ch: 'ア',
            role: SourceRole::Japanese,
        }
        .in_grapheme("ア");
        let msg = err.to_string();
        assert!(msg.contains("'ア'"), "{msg}");
        assert!(msg.contains("U+30A2"), "{msg}");
    }
}
