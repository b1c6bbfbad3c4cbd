//! Synthetic source fonts for the kanakira tests.
//!
//! Both fonts are tiny TrueType fonts whose glyphs are plain rectangles, so
//! tests can reason about exact outline bounds.

use kurbo::{Rect, Shape};
use write_fonts::{
    tables::{
        cmap::Cmap,
        glyf::{GlyfLocaBuilder, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::Os2,
        post::Post,
    },
    types::{FWord, GlyphId, NameId, UfWord},
    FontBuilder,
};

pub const UNITS_PER_EM: u16 = 1000;

/// Advance of every glyph in [`katakana_font`]
pub const KANA_ADVANCE: u16 = 1000;

/// Advance of every glyph in [`romaji_font`]
pub const MONO_ADVANCE: u16 = 600;

/// Cap height of the letters in [`romaji_font`]
pub const LETTER_HEIGHT: u16 = 700;

pub const ASCENDER: i16 = 880;
pub const DESCENDER: i16 = -120;

pub const COPYRIGHT: &str = "Copyright (c) kanakira test data";

const SMALL_KANA: &str = "ァィゥェォッャュョヮヵヶ";
const PROLONGED_SOUND_MARK: char = 'ー';

/// A Katakana whose ink sits left of the middle of its advance.
pub const OFF_CENTER_KANA: char = 'ヌ';

/// Ink bounds of the Katakana glyph for `ch` in [`katakana_font`].
pub fn kana_bounds(ch: char) -> Rect {
    if ch == OFF_CENTER_KANA {
        Rect::new(150.0, -20.0, 700.0, 700.0)
    } else if ch == PROLONGED_SOUND_MARK {
        Rect::new(100.0, 300.0, 900.0, 400.0)
    } else if SMALL_KANA.contains(ch) {
        Rect::new(200.0, 0.0, 800.0, 500.0)
    } else {
        Rect::new(100.0, -20.0, 900.0, 700.0)
    }
}

/// Ink bounds of every letter A-Z in [`romaji_font`].
///
/// The right side bearing is wider than the left one.
pub fn letter_bounds() -> Rect {
    Rect::new(40.0, 0.0, 500.0, LETTER_HEIGHT as f64)
}

/// Ink bounds of the hyphen in [`romaji_font`].
pub fn hyphen_bounds() -> Rect {
    Rect::new(100.0, 250.0, 500.0, 330.0)
}

/// Every character [`katakana_font`] maps: U+30A1..=U+30FA plus 'ー'.
pub fn katakana() -> impl Iterator<Item = char> {
    ('\u{30A1}'..='\u{30FA}').chain(std::iter::once(PROLONGED_SOUND_MARK))
}

/// A Katakana font covering the whole syllabary.
pub fn katakana_font() -> Vec<u8> {
    build_katakana_font(&[], MaxpVersion::V1)
}

/// Like [`katakana_font`], with no glyph for `missing`.
pub fn katakana_font_without(missing: char) -> Vec<u8> {
    build_katakana_font(&[missing], MaxpVersion::V1)
}

/// Like [`katakana_font`], with the version 0.5 `maxp` a CFF font carries.
pub fn katakana_font_with_short_maxp() -> Vec<u8> {
    build_katakana_font(&[], MaxpVersion::V0_5)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MaxpVersion {
    V0_5,
    V1,
}

fn build_katakana_font(missing: &[char], maxp: MaxpVersion) -> Vec<u8> {
    let glyphs = katakana()
        .filter(|ch| !missing.contains(ch))
        .map(|ch| TestGlyph {
            name: format!("uni{:04X}", ch as u32),
            ch: Some(ch),
            ink: Some(kana_bounds(ch)),
            advance: KANA_ADVANCE,
        });
    build_font(
        "Test Kana",
        false,
        maxp,
        TestGlyph::notdef(Rect::new(100.0, 0.0, 900.0, 700.0), KANA_ADVANCE),
        glyphs,
    )
}

/// A monospace Latin font with A-Z, '-' and an empty space glyph.
pub fn romaji_font() -> Vec<u8> {
    let letters = ('A'..='Z').map(|ch| TestGlyph {
        name: ch.to_string(),
        ch: Some(ch),
        ink: Some(letter_bounds()),
        advance: MONO_ADVANCE,
    });
    let punctuation = [
        TestGlyph {
            name: "hyphen".into(),
            ch: Some('-'),
            ink: Some(hyphen_bounds()),
            advance: MONO_ADVANCE,
        },
        TestGlyph {
            name: "space".into(),
            ch: Some(' '),
            ink: None,
            advance: MONO_ADVANCE,
        },
    ];
    build_font(
        "Test Mono",
        true,
        MaxpVersion::V1,
        TestGlyph::notdef(letter_bounds(), MONO_ADVANCE),
        letters.chain(punctuation),
    )
}

struct TestGlyph {
    name: String,
    ch: Option<char>,
    ink: Option<Rect>,
    advance: u16,
}

impl TestGlyph {
    fn notdef(ink: Rect, advance: u16) -> Self {
        TestGlyph {
            name: ".notdef".into(),
            ch: None,
            ink: Some(ink),
            advance,
        }
    }

    fn simple_glyph(&self) -> SimpleGlyph {
        match self.ink {
            Some(rect) => SimpleGlyph::from_bezpath(&rect.to_path(0.1))
                .expect("rectangles are valid outlines"),
            None => SimpleGlyph::default(),
        }
    }
}

fn build_font(
    family: &str,
    monospace: bool,
    maxp_version: MaxpVersion,
    notdef: TestGlyph,
    glyphs: impl IntoIterator<Item = TestGlyph>,
) -> Vec<u8> {
    let glyphs: Vec<_> = std::iter::once(notdef).chain(glyphs).collect();
    let num_glyphs = glyphs.len() as u16;

    let mut glyf_builder = GlyfLocaBuilder::new();
    for glyph in &glyphs {
        glyf_builder
            .add_glyph(&glyph.simple_glyph())
            .expect("rectangles always compile");
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let hmtx = Hmtx::new(
        glyphs
            .iter()
            .map(|g| LongMetric::new(g.advance, g.ink.map(|r| r.x0 as i16).unwrap_or(0)))
            .collect(),
        Vec::new(),
    );

    let inked: Vec<Rect> = glyphs.iter().filter_map(|g| g.ink).collect();
    let bbox = inked
        .iter()
        .copied()
        .reduce(|a, b| a.union(b))
        .unwrap_or_default();
    let advance_max = glyphs.iter().map(|g| g.advance).max().unwrap_or(0);

    let head = Head {
        units_per_em: UNITS_PER_EM,
        x_min: bbox.x0 as i16,
        y_min: bbox.y0 as i16,
        x_max: bbox.x1 as i16,
        y_max: bbox.y1 as i16,
        index_to_loc_format: loca_format as i16,
        ..Default::default()
    };
    let hhea = Hhea {
        ascender: FWord::new(ASCENDER),
        descender: FWord::new(DESCENDER),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(advance_max),
        min_left_side_bearing: FWord::new(inked.iter().map(|r| r.x0 as i16).min().unwrap_or(0)),
        x_max_extent: FWord::new(bbox.x1 as i16),
        caret_slope_rise: 1,
        number_of_h_metrics: num_glyphs,
        ..Default::default()
    };
    let maxp = match maxp_version {
        MaxpVersion::V0_5 => Maxp {
            num_glyphs,
            ..Default::default()
        },
        MaxpVersion::V1 => full_maxp(num_glyphs),
    };
    let chars: Vec<u32> = glyphs.iter().filter_map(|g| g.ch).map(u32::from).collect();
    let os2 = Os2 {
        x_avg_char_width: advance_max as i16,
        us_weight_class: 400,
        us_width_class: 5,
        us_first_char_index: chars.iter().copied().min().unwrap_or(0) as u16,
        us_last_char_index: chars.iter().copied().max().unwrap_or(0) as u16,
        s_typo_ascender: ASCENDER,
        us_win_ascent: ASCENDER as u16,
        us_win_descent: DESCENDER.unsigned_abs(),
        ..Default::default()
    };

    let post = Post {
        underline_position: FWord::new(-100),
        underline_thickness: FWord::new(50),
        is_fixed_pitch: monospace as u32,
        ..Post::new_v2(glyphs.iter().map(|g| g.name.as_str()))
    };

    let record = |platform, encoding, language, id, text: &str| {
        NameRecord::new(platform, encoding, language, id, text.to_string().into())
    };
    let name = Name {
        name_record: vec![
            // legacy Macintosh Roman
            record(1, 0, 0, NameId::FAMILY_NAME, family),
            record(3, 1, 0x409, NameId::COPYRIGHT_NOTICE, COPYRIGHT),
            record(3, 1, 0x409, NameId::FAMILY_NAME, family),
        ],
        ..Default::default()
    };

    let cmap = Cmap::from_mappings(
        glyphs
            .iter()
            .enumerate()
            .filter_map(|(gid, g)| Some((g.ch?, GlyphId::new(gid as u32)))),
    )
    .expect("each test char is mapped once");

    let mut builder = FontBuilder::new();
    builder
        .add_table(&head)
        .and_then(|b| b.add_table(&hhea))
        .and_then(|b| b.add_table(&maxp))
        .and_then(|b| b.add_table(&os2))
        .and_then(|b| b.add_table(&hmtx))
        .and_then(|b| b.add_table(&cmap))
        .and_then(|b| b.add_table(&loca))
        .and_then(|b| b.add_table(&glyf))
        .and_then(|b| b.add_table(&post))
        .and_then(|b| b.add_table(&name))
        .expect("test tables compile");
    builder.build()
}

fn full_maxp(num_glyphs: u16) -> Maxp {
    Maxp {
        num_glyphs,
        max_points: Some(4),
        max_contours: Some(1),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(2),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    }
}
