//! Stacking a Romaji run above a Katakana glyph

use kurbo::{Affine, BezPath, Rect, Shape, Vec2};

use crate::{
    config::Config,
    error::Error,
    source::{SourceFont, SourceGlyph},
};

/// Placement parameters for every composite.
///
/// Distances are in output font units, except `ref_height` which is measured
/// in the unscaled Japanese source and scaled by `kana_scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub kana_scale: f64,
    pub romaji_scale: f64,
    pub gap: f64,
    pub ref_height: f64,
    pub vertical_offset: f64,
    pub horizontal_offset: f64,
}

impl From<&Config> for Layout {
    fn from(config: &Config) -> Self {
        Layout {
            kana_scale: config.scaling.kana_scale,
            romaji_scale: config.scaling.romaji_scale,
            gap: config.positioning.gap,
            ref_height: config.positioning.ref_height,
            vertical_offset: config.positioning.vertical_offset,
            horizontal_offset: config.positioning.horizontal_offset,
        }
    }
}

impl Layout {
    /// The height of the Romaji baseline above the Katakana baseline,
    /// before any lift needed to clear a tall Katakana.
    pub fn romaji_baseline(&self) -> f64 {
        self.ref_height * self.kana_scale + self.gap + self.vertical_offset
    }
}

/// A synthesized glyph: a scaled Katakana with its Romaji above it.
///
/// All geometry is final, in output font units.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeGlyph {
    /// The character this glyph is mapped from
    pub codepoint: char,
    pub romaji: String,
    /// Katakana contours followed by Romaji contours
    pub path: BezPath,
    pub advance: f64,
    /// Ink bounds of the Katakana part, `None` if it has no ink
    pub kana_bounds: Option<Rect>,
    /// Ink bounds of the Romaji run
    pub romaji_bounds: Rect,
}

impl CompositeGlyph {
    /// The glyph name used in the `post` table.
    pub fn name(&self) -> String {
        glyph_name(self.codepoint)
    }

    /// The grapheme this glyph renders.
    pub fn grapheme(&self) -> String {
        self.codepoint.to_string()
    }

    /// Ink bounds of the whole composite.
    pub fn bounds(&self) -> Rect {
        match self.kana_bounds {
            Some(kana) => kana.union(self.romaji_bounds),
            None => self.romaji_bounds,
        }
    }
}

/// The `post` name for the composite of `ch`, e.g. `kana_30AB`.
pub fn glyph_name(ch: char) -> String {
    format!("kana_{:04X}", ch as u32)
}

/// Builds composite glyphs from the two source fonts.
#[derive(Debug)]
pub struct Compositor<'a> {
    kana: &'a SourceFont<'a>,
    romaji: &'a SourceFont<'a>,
    layout: Layout,
}

impl<'a> Compositor<'a> {
    pub fn new(kana: &'a SourceFont<'a>, romaji: &'a SourceFont<'a>, layout: Layout) -> Self {
        Compositor {
            kana,
            romaji,
            layout,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Composite the Katakana `ch` with the Romaji text `romaji`.
    ///
    /// Fails with [`Error::MissingGlyph`] if `ch` is not in the Japanese
    /// source or any letter of `romaji` is not in the Romaji source, and
    /// with [`Error::EmptyRomaji`] if `romaji` is empty.
    pub fn composite(&self, ch: char, romaji: &str) -> Result<CompositeGlyph, Error> {
        let grapheme = ch.to_string();
        if romaji.is_empty() {
            return Err(Error::EmptyRomaji { grapheme });
        }
        let kana_glyph = self
            .kana
            .fetch(ch)
            .map_err(|missing| missing.in_grapheme(&grapheme))?;
        let letters = romaji
            .chars()
            .map(|c| self.romaji.fetch(c))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|missing| missing.in_grapheme(&grapheme))?;

        let layout = &self.layout;
        let mut kana_path = kana_glyph.path;
        kana_path.apply_affine(Affine::scale(layout.kana_scale));
        let kana_advance = kana_glyph.advance * layout.kana_scale;
        let kana_bounds = (!kana_path.elements().is_empty()).then(|| kana_path.bounding_box());

        let mut run = self.romaji_run(&letters);
        let run_bounds = run.bounding_box();

        let kana_mid = kana_bounds
            .map(|b| b.center().x)
            .unwrap_or(kana_advance / 2.0);
        let dx = kana_mid - run_bounds.center().x + layout.horizontal_offset;
        let mut dy = layout.romaji_baseline();
        if let Some(kana) = kana_bounds {
            let clearance = run_bounds.min_y() + dy - kana.max_y();
            if clearance < layout.gap {
                let lift = layout.gap - clearance;
                log::warn!(
                    "'{grapheme}': lifting Romaji by {lift:.1} units to keep clear of the Katakana"
                );
                dy += lift;
            }
        }
        run.apply_affine(Affine::translate((dx, dy)));
        let mut romaji_bounds = run_bounds + Vec2::new(dx, dy);

        // widen the glyph box if the run overhangs it
        let mut advance = kana_advance;
        let overhang_left = (-romaji_bounds.min_x()).max(0.0).ceil();
        let mut kana_bounds = kana_bounds;
        if overhang_left > 0.0 {
            let shift = Affine::translate((overhang_left, 0.0));
            kana_path.apply_affine(shift);
            run.apply_affine(shift);
            romaji_bounds = romaji_bounds + Vec2::new(overhang_left, 0.0);
            kana_bounds = kana_bounds.map(|b| b + Vec2::new(overhang_left, 0.0));
            advance += overhang_left;
        }
        if romaji_bounds.max_x() > advance {
            advance = romaji_bounds.max_x().ceil();
        }
        if advance != kana_advance {
            log::debug!("'{grapheme}': advance widened from {kana_advance:.1} to {advance:.1}");
        }

        let mut path = kana_path;
        path.extend(run.elements().iter().copied());
        log::debug!("'{grapheme}' ({romaji}): romaji at ({dx:.1}, {dy:.1}), advance {advance:.1}");
        Ok(CompositeGlyph {
            codepoint: ch,
            romaji: romaji.to_owned(),
            path,
            advance,
            kana_bounds,
            romaji_bounds,
        })
    }

    /// Scale the letters and set them left to right on their own advances,
    /// with the first pen position at the origin.
    fn romaji_run(&self, letters: &[SourceGlyph]) -> BezPath {
        let scale = self.layout.romaji_scale;
        let mut run = BezPath::new();
        let mut x = 0.0;
        for letter in letters {
            let transform = Affine::translate((x, 0.0)) * Affine::scale(scale);
            run.extend(letter.path.elements().iter().map(|el| transform * *el));
            x += letter.advance * scale;
        }
        run
    }
}
