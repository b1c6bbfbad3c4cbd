//! Build a Katakana font with Romaji ruby stacked above every glyph.
//!
//! Two source fonts go in: a Japanese font for the Katakana outlines and a
//! monospace Latin font for the Romaji letters. For every single Katakana
//! in the [`RomajiTable`], the [`Compositor`] scales the Katakana, sets its
//! romanization above it and produces one [`CompositeGlyph`]; the
//! [`FontAssembler`] then compiles all of them into a TrueType font.
//!
//! ```no_run
//! let config = kanakira::Config::load("config.json")?;
//! kanakira::run(&config)?;
//! # Ok::<_, kanakira::Error>(())
//! ```

pub mod assemble;
pub mod composite;
pub mod config;
mod error;
pub mod names;
mod pen;
pub mod romaji;
pub mod source;

use std::path::Path;

pub use assemble::{FontAssembler, OutputFont};
pub use composite::{CompositeGlyph, Compositor, Layout};
pub use config::{Config, FontInfo};
pub use error::{ConfigError, Error, SourceRole};
pub use romaji::RomajiTable;
pub use source::SourceFont;

/// Build the font described by `config` with the standard Hepburn table.
pub fn build_font(config: &Config) -> Result<OutputFont, Error> {
    build_font_with_table(config, &RomajiTable::hepburn())
}

/// Build the font described by `config`, with one composite per
/// single-character entry of `table`.
pub fn build_font_with_table(config: &Config, table: &RomajiTable) -> Result<OutputFont, Error> {
    let paths = &config.fonts.input;
    log::info!("loading Japanese source '{}'", paths.japanese.display());
    let kana_data = read_source(SourceRole::Japanese, &paths.japanese)?;
    log::info!("loading Romaji source '{}'", paths.romaji.display());
    let romaji_data = read_source(SourceRole::Romaji, &paths.romaji)?;

    let kana = parse_source(SourceRole::Japanese, &paths.japanese, &kana_data)?;
    let romaji = parse_source(SourceRole::Romaji, &paths.romaji, &romaji_data)?;
    if kana.units_per_em() != romaji.units_per_em() {
        log::warn!(
            "sources have different units per em ({} and {}), romaji_scale is applied as is",
            kana.units_per_em(),
            romaji.units_per_em()
        );
    }

    let compositor = Compositor::new(&kana, &romaji, Layout::from(config));
    let mut assembler = FontAssembler::new(&kana, &config.font_info);
    log::info!("compositing glyphs");
    for (ch, entry) in table.glyph_entries() {
        let glyph = compositor.composite(ch, &entry.romaji)?;
        assembler.add(glyph)?;
    }
    log::info!("assembling {} glyphs", assembler.len());
    assembler.build()
}

/// Build the font described by `config` and write it to `fonts.output`.
///
/// Nothing is written unless the whole font was built.
pub fn run(config: &Config) -> Result<OutputFont, Error> {
    let font = build_font(config)?;
    let output = &config.fonts.output;
    font.write_to(output)?;
    log::info!(
        "saved '{}' ({} glyphs, {} bytes)",
        output.display(),
        font.num_glyphs,
        font.data.len()
    );
    Ok(font)
}

fn read_source(role: SourceRole, path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| Error::SourceFont {
        role,
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

fn parse_source<'a>(
    role: SourceRole,
    path: &Path,
    data: &'a [u8],
) -> Result<SourceFont<'a>, Error> {
    SourceFont::new(role, data).map_err(|reason| Error::SourceFont {
        role,
        path: path.to_owned(),
        reason,
    })
}
