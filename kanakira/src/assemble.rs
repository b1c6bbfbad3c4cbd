//! Compiling composite glyphs into a font binary
//!
//! The output inherits its global tables (`head`, `hhea`, `maxp`, `OS/2`,
//! `post` and `name`) from the Japanese source, and then brings every value
//! that depends on the glyph set up to date. The glyph set is `.notdef`
//! followed by the composites, in the order they were added.

use std::{collections::HashMap, path::Path};

use kurbo::BezPath;
use skrifa::GlyphId as SourceGlyphId;
use write_fonts::{
    from_obj::ToOwnedTable,
    read::{FontRef, ReadError, TableProvider},
    tables::{
        cmap::Cmap,
        glyf::{Bbox, GlyfLocaBuilder, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
        os2::Os2,
        post::Post,
    },
    types::{FWord, Fixed, GlyphId, Tag, UfWord},
    BuilderError, FontBuilder,
};

use crate::{
    composite::CompositeGlyph,
    config::FontInfo,
    error::Error,
    names,
    source::SourceFont,
};

/// Extra room above the tallest glyph before the ascender is raised.
const ASCENDER_PADDING: i32 = 20;

const NOTDEF: &str = ".notdef";

/// A finished font binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFont {
    pub data: Vec<u8>,
    pub num_glyphs: u16,
}

impl OutputFont {
    /// Write the font to `path`, replacing any existing file and creating
    /// missing parent directories.
    pub fn write_to(&self, path: &Path) -> Result<(), Error> {
        let write_err = |source| Error::Write {
            path: path.to_owned(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, &self.data).map_err(write_err)
    }
}

/// Collects composite glyphs and compiles them into a font.
#[derive(Debug)]
pub struct FontAssembler<'a> {
    source: &'a SourceFont<'a>,
    info: &'a FontInfo,
    glyphs: Vec<CompositeGlyph>,
    by_codepoint: HashMap<char, usize>,
}

impl<'a> FontAssembler<'a> {
    /// Create an assembler that inherits tables from `source`, the Japanese
    /// source font.
    pub fn new(source: &'a SourceFont<'a>, info: &'a FontInfo) -> Self {
        FontAssembler {
            source,
            info,
            glyphs: Vec::new(),
            by_codepoint: HashMap::new(),
        }
    }

    /// Register a composite glyph.
    ///
    /// Fails with [`Error::DuplicateGrapheme`] if a glyph was already
    /// registered for the same codepoint.
    pub fn add(&mut self, glyph: CompositeGlyph) -> Result<(), Error> {
        if let Some(&existing) = self.by_codepoint.get(&glyph.codepoint) {
            let first = &self.glyphs[existing];
            return Err(Error::DuplicateGrapheme {
                key: glyph.codepoint,
                first: format!("{} ({})", first.grapheme(), first.romaji),
                second: format!("{} ({})", glyph.grapheme(), glyph.romaji),
            });
        }
        self.by_codepoint.insert(glyph.codepoint, self.glyphs.len());
        self.glyphs.push(glyph);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Compile every table and assemble the font.
    pub fn build(self) -> Result<OutputFont, Error> {
        let source = FontRef::from_index(self.source.data(), 0)
            .map_err(|e| table_error(Tag::new(b"head"), e))?;

        let notdef = match self.source.glyph(SourceGlyphId::NOTDEF) {
            Some(glyph) => OutputGlyph::compile(NOTDEF, &glyph.path, glyph.advance)?,
            None => {
                log::warn!("Japanese source has no drawable .notdef, writing an empty one");
                OutputGlyph::compile(NOTDEF, &BezPath::new(), 0.0)?
            }
        };
        let mut glyphs = vec![notdef];
        for composite in &self.glyphs {
            glyphs.push(OutputGlyph::compile(
                &composite.grapheme(),
                &composite.path,
                composite.advance,
            )?);
        }
        let num_glyphs = u16::try_from(glyphs.len()).map_err(|_| Error::Table {
            tag: Tag::new(b"maxp"),
            reason: format!("{} glyphs exceed the 65535 glyph limit", glyphs.len()),
        })?;
        let names: Vec<String> = std::iter::once(NOTDEF.to_string())
            .chain(self.glyphs.iter().map(CompositeGlyph::name))
            .collect();
        let stats = GlyphStats::new(&glyphs);

        let mut builder = GlyfLocaBuilder::new();
        for glyph in &glyphs {
            builder.add_glyph(&glyph.simple).map_err(|e| Error::MalformedOutline {
                grapheme: glyph.grapheme.clone(),
                reason: e.to_string(),
            })?;
        }
        let (glyf, loca, loca_format) = builder.build();

        let hmtx = Hmtx::new(
            glyphs
                .iter()
                .map(|g| LongMetric::new(g.advance, g.bbox.map(|b| b.x_min).unwrap_or(0)))
                .collect(),
            Vec::new(),
        );

        let mut head: Head = source
            .head()
            .map_err(|e| table_error(Tag::new(b"head"), e))?
            .to_owned_table();
        head.font_revision = Fixed::from_f64(self.info.revision()?);
        head.checksum_adjustment = 0;
        head.index_to_loc_format = loca_format as i16;
        let bbox = stats.bbox.unwrap_or_default();
        head.x_min = bbox.x_min;
        head.y_min = bbox.y_min;
        head.x_max = bbox.x_max;
        head.y_max = bbox.y_max;

        let mut hhea: Hhea = source
            .hhea()
            .map_err(|e| table_error(Tag::new(b"hhea"), e))?
            .to_owned_table();
        hhea.number_of_h_metrics = num_glyphs;
        hhea.advance_width_max = UfWord::new(stats.advance_max);
        hhea.min_left_side_bearing = FWord::new(stats.min_lsb);
        hhea.min_right_side_bearing = FWord::new(stats.min_rsb);
        hhea.x_max_extent = FWord::new(stats.max_extent);

        let mut os2: Option<Os2> = match source.os2() {
            Ok(os2) => Some(os2.to_owned_table()),
            Err(ReadError::TableIsMissing(_)) => {
                log::warn!("Japanese source has no OS/2 table, none will be written");
                None
            }
            Err(e) => return Err(table_error(Tag::new(b"OS/2"), e)),
        };
        if let Some(os2) = os2.as_mut() {
            os2.x_avg_char_width = stats.avg_advance;
            let codepoints = self.glyphs.iter().map(|g| g.codepoint as u32);
            // these are clamped to the BMP
            os2.us_first_char_index = codepoints.clone().min().unwrap_or(0).min(0xFFFF) as u16;
            os2.us_last_char_index = codepoints.max().unwrap_or(0).min(0xFFFF) as u16;
        }

        // keep the Romaji above the line so it is not clipped
        let ascender = hhea.ascender.to_i16() as i32;
        let needed = bbox.y_max as i32 + ASCENDER_PADDING;
        if needed > ascender {
            let raise = needed - ascender;
            log::info!("raising ascender by {raise} units to {needed}");
            hhea.ascender = FWord::new(clamp_i16(needed));
            if let Some(os2) = os2.as_mut() {
                os2.s_typo_ascender = clamp_i16(os2.s_typo_ascender as i32 + raise);
                os2.us_win_ascent =
                    (os2.us_win_ascent as i32 + raise).clamp(0, u16::MAX as i32) as u16;
            }
        }

        let source_zones = source
            .maxp()
            .map_err(|e| table_error(Tag::new(b"maxp"), e))?
            .max_zones();
        if source_zones.is_none() {
            log::debug!("upgrading maxp to version 1.0 for glyf outlines");
        }
        // glyf outlines need a version 1.0 maxp; no hinting is carried over
        let maxp = Maxp {
            num_glyphs,
            max_points: Some(stats.max_points),
            max_contours: Some(stats.max_contours),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(source_zones.unwrap_or(1).max(1)),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };

        let post = inherited_post(&source, names.iter().map(String::as_str))?;

        let name = match source.name() {
            Ok(name) => Some(name.to_owned_table()),
            Err(ReadError::TableIsMissing(_)) => None,
            Err(e) => return Err(table_error(Tag::new(b"name"), e)),
        };
        let name = names::build_name(name, self.info);

        let cmap = Cmap::from_mappings(
            self.glyphs
                .iter()
                .enumerate()
                .map(|(i, g)| (g.codepoint, GlyphId::new(i as u32 + 1))),
        )
        .map_err(|e| Error::Table {
            tag: Tag::new(b"cmap"),
            reason: e.to_string(),
        })?;

        let mut font = FontBuilder::new();
        font.add_table(&head)
            .and_then(|b| b.add_table(&hhea))
            .and_then(|b| b.add_table(&maxp))
            .and_then(|b| b.add_table(&hmtx))
            .and_then(|b| b.add_table(&cmap))
            .and_then(|b| b.add_table(&loca))
            .and_then(|b| b.add_table(&glyf))
            .and_then(|b| b.add_table(&post))
            .and_then(|b| b.add_table(&name))
            .map_err(builder_error)?;
        if let Some(os2) = &os2 {
            font.add_table(os2).map_err(builder_error)?;
        }
        let data = font.build();
        log::info!(
            "assembled {num_glyphs} glyphs ({} bytes, {loca_format:?} loca)",
            data.len()
        );
        Ok(OutputFont { data, num_glyphs })
    }
}

/// One glyph ready for `glyf`.
struct OutputGlyph {
    grapheme: String,
    simple: SimpleGlyph,
    advance: u16,
    /// `None` for a glyph with no contours
    bbox: Option<Bbox>,
    num_points: usize,
}

impl OutputGlyph {
    fn compile(grapheme: &str, path: &BezPath, advance: f64) -> Result<Self, Error> {
        let simple = if path.elements().is_empty() {
            SimpleGlyph::default()
        } else {
            SimpleGlyph::from_bezpath(path).map_err(|e| Error::MalformedOutline {
                grapheme: grapheme.to_owned(),
                reason: format!("{e:?}"),
            })?
        };
        let bbox = (!simple.contours.is_empty()).then_some(simple.bbox);
        Ok(OutputGlyph {
            grapheme: grapheme.to_owned(),
            num_points: simple.contours.iter().map(|c| c.len()).sum(),
            advance: advance.round().clamp(0.0, u16::MAX as f64) as u16,
            bbox,
            simple,
        })
    }
}

/// Values of `head`, `hhea`, `maxp` and `OS/2` that summarize the glyph set.
#[derive(Debug, Default)]
struct GlyphStats {
    bbox: Option<Bbox>,
    advance_max: u16,
    avg_advance: i16,
    min_lsb: i16,
    min_rsb: i16,
    max_extent: i16,
    max_points: u16,
    max_contours: u16,
}

impl GlyphStats {
    fn new(glyphs: &[OutputGlyph]) -> Self {
        let mut stats = GlyphStats {
            min_lsb: i16::MAX,
            min_rsb: i16::MAX,
            max_extent: i16::MIN,
            ..Default::default()
        };
        let mut advance_sum = 0u64;
        let mut advance_count = 0u64;
        for glyph in glyphs {
            stats.advance_max = stats.advance_max.max(glyph.advance);
            if glyph.advance > 0 {
                advance_sum += glyph.advance as u64;
                advance_count += 1;
            }
            stats.max_points = stats.max_points.max(clamp_u16(glyph.num_points));
            stats.max_contours = stats
                .max_contours
                .max(clamp_u16(glyph.simple.contours.len()));
            let Some(bbox) = glyph.bbox else {
                continue;
            };
            stats.bbox = Some(stats.bbox.map_or(bbox, |b| b.union(bbox)));
            stats.min_lsb = stats.min_lsb.min(bbox.x_min);
            let rsb = glyph.advance as i32 - bbox.x_max as i32;
            stats.min_rsb = stats.min_rsb.min(clamp_i16(rsb));
            stats.max_extent = stats.max_extent.max(bbox.x_max);
        }
        if stats.bbox.is_none() {
            stats.min_lsb = 0;
            stats.min_rsb = 0;
            stats.max_extent = 0;
        }
        if advance_count > 0 {
            let avg = (advance_sum + advance_count / 2) / advance_count;
            stats.avg_advance = clamp_i16(avg as i32);
        }
        stats
    }
}

/// A version 2 `post` with the given glyph names, keeping the source's
/// italic angle, underline and fixed pitch values.
fn inherited_post<'a>(
    source: &FontRef,
    glyph_names: impl IntoIterator<Item = &'a str>,
) -> Result<Post, Error> {
    let names = Post::new_v2(glyph_names);
    let post = match source.post() {
        Ok(post) => post,
        Err(ReadError::TableIsMissing(_)) => return Ok(names),
        Err(e) => return Err(table_error(Tag::new(b"post"), e)),
    };
    Ok(Post {
        italic_angle: post.italic_angle(),
        underline_position: post.underline_position(),
        underline_thickness: post.underline_thickness(),
        is_fixed_pitch: post.is_fixed_pitch(),
        ..names
    })
}

fn table_error(tag: Tag, error: ReadError) -> Error {
    Error::Table {
        tag,
        reason: format!("unreadable in the Japanese source: {error}"),
    }
}

fn builder_error(error: BuilderError) -> Error {
    Error::Table {
        tag: error.tag,
        reason: error.inner.to_string(),
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn clamp_u16(value: usize) -> u16 {
    value.min(u16::MAX as usize) as u16
}
