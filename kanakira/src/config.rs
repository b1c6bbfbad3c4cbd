//! Build settings, loaded once from a JSON file

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// The file name used when no config path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

const MAX_POSTSCRIPT_NAME_LEN: usize = 63;
const MAX_NAME_LEN: usize = 127;
// characters the PostScript name may not contain, in addition to spaces
const POSTSCRIPT_FORBIDDEN: &[char] = &['[', ']', '(', ')', '{', '}', '<', '>', '/', '%'];

/// All settings for a build.
///
/// A `Config` is never mutated after [`Config::load`] returns.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub fonts: FontPaths,
    pub scaling: Scaling,
    pub positioning: Positioning,
    pub font_info: FontInfo,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontPaths {
    pub input: InputFonts,
    pub output: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputFonts {
    /// The font providing the Katakana outlines
    pub japanese: PathBuf,
    /// The monospace font providing the Latin outlines
    pub romaji: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scaling {
    pub kana_scale: f64,
    pub romaji_scale: f64,
}

/// Placement of the Romaji run, in Japanese-source font units.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Positioning {
    /// Vertical distance between the Katakana and the Romaji run
    pub gap: f64,
    /// Height of a typical Katakana in the unscaled Japanese source
    pub ref_height: f64,
    #[serde(default)]
    pub vertical_offset: f64,
    #[serde(default)]
    pub horizontal_offset: f64,
}

/// Naming and version information copied into the output font.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontInfo {
    pub family_name: String,
    pub full_name: String,
    pub postscript_name: String,
    pub version: String,
    #[serde(default = "default_subfamily")]
    pub subfamily_name: String,
}

fn default_subfamily() -> String {
    "Regular".into()
}

impl Config {
    /// Read, parse and validate the config at `path`.
    ///
    /// Relative font paths are resolved against the directory containing
    /// the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut config = Config::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_owned(),
                source,
            },
            other => other,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse and validate a config from JSON text.
    ///
    /// Paths are left exactly as written.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Make relative font paths relative to `base` instead of the working directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.fonts.input.japanese,
            &mut self.fonts.input.romaji,
            &mut self.fonts.output,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Check every field, reporting the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_scale("scaling.kana_scale", self.scaling.kana_scale)?;
        check_scale("scaling.romaji_scale", self.scaling.romaji_scale)?;
        check_finite("positioning.gap", self.positioning.gap)?;
        check_finite("positioning.ref_height", self.positioning.ref_height)?;
        if self.positioning.ref_height <= 0.0 {
            return Err(ConfigError::field(
                "positioning.ref_height",
                "must be greater than zero",
            ));
        }
        check_finite(
            "positioning.vertical_offset",
            self.positioning.vertical_offset,
        )?;
        check_finite(
            "positioning.horizontal_offset",
            self.positioning.horizontal_offset,
        )?;
        check_path("fonts.input.japanese", &self.fonts.input.japanese)?;
        check_path("fonts.input.romaji", &self.fonts.input.romaji)?;
        check_path("fonts.output", &self.fonts.output)?;
        self.font_info.validate()
    }
}

impl FontInfo {
    fn validate(&self) -> Result<(), ConfigError> {
        check_name("font_info.family_name", &self.family_name, MAX_NAME_LEN)?;
        check_name("font_info.full_name", &self.full_name, MAX_NAME_LEN)?;
        check_name(
            "font_info.subfamily_name",
            &self.subfamily_name,
            MAX_NAME_LEN,
        )?;
        check_name(
            "font_info.postscript_name",
            &self.postscript_name,
            MAX_POSTSCRIPT_NAME_LEN,
        )?;
        if let Some(c) = self
            .postscript_name
            .chars()
            .find(|c| *c == ' ' || POSTSCRIPT_FORBIDDEN.contains(c))
        {
            return Err(ConfigError::field(
                "font_info.postscript_name",
                format!("may not contain {c:?}"),
            ));
        }
        self.revision()?;
        Ok(())
    }

    /// The version as a number suitable for `head.fontRevision`.
    pub fn revision(&self) -> Result<f64, ConfigError> {
        let invalid = || {
            ConfigError::field(
                "font_info.version",
                format!("expected a number like '1.000', found '{}'", self.version),
            )
        };
        let (major, minor) = self
            .version
            .split_once('.')
            .unwrap_or((self.version.as_str(), "0"));
        if major.is_empty()
            || minor.is_empty()
            || !major.bytes().chain(minor.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let value: f64 = self.version.parse().map_err(|_| invalid())?;
        // head.fontRevision is a signed 16.16 fixed
        if value >= i16::MAX as f64 {
            return Err(ConfigError::field(
                "font_info.version",
                format!("'{}' is too large", self.version),
            ));
        }
        Ok(value)
    }
}

fn check_scale(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::field(
            field,
            format!("must be greater than zero, found {value}"),
        ));
    }
    Ok(())
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::field(field, "must be a finite number"));
    }
    Ok(())
}

fn check_path(field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::field(field, "must not be empty"));
    }
    Ok(())
}

fn check_name(field: &'static str, name: &str, max_len: usize) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::field(field, "must not be empty"));
    }
    if let Some(c) = name.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(ConfigError::field(
            field,
            format!("{c:?} is not printable ASCII"),
        ));
    }
    if name.len() > max_len {
        return Err(ConfigError::field(
            field,
            format!("longer than {max_len} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: &str = r#"{
        "fonts": {
            "input": { "japanese": "NotoSansJP-Regular.ttf", "romaji": "NotoSansMono-Regular.ttf" },
            "output": "out/KanaKira-Regular.ttf"
        },
        "scaling": { "kana_scale": 0.7, "romaji_scale": 0.35 },
        "positioning": { "gap": 50, "ref_height": 700, "vertical_offset": 10 },
        "font_info": {
            "family_name": "KanaKira",
            "full_name": "KanaKira Regular",
            "postscript_name": "KanaKira-Regular",
            "version": "1.000"
        }
    }"#;

    fn field_of(err: ConfigError) -> &'static str {
        match err {
            ConfigError::Field { field, .. } => field,
            other => panic!("expected field error, found {other}"),
        }
    }

    fn edited(from: &str, to: &str) -> String {
        assert!(SAMPLE.contains(from), "sample has no {from}");
        SAMPLE.replacen(from, to, 1)
    }

    #[test]
    fn parse_sample() {
        let config = Config::from_json(SAMPLE).unwrap();
        assert_eq!(config.scaling.kana_scale, 0.7);
        assert_eq!(config.positioning.gap, 50.0);
        assert_eq!(config.positioning.vertical_offset, 10.0);
        assert_eq!(config.positioning.horizontal_offset, 0.0);
        assert_eq!(config.font_info.subfamily_name, "Regular");
        assert_eq!(config.font_info.revision().unwrap(), 1.0);
    }

    #[test]
    fn example_config_is_valid() {
        let config = Config::from_json(include_str!("../config.example.json")).unwrap();
        assert_eq!(config.font_info.postscript_name, "KanaKira-Regular");
    }

    #[test]
    fn missing_field_is_named() {
        let text = edited(r#""romaji_scale": 0.35"#, r#""romaji_scal": 0.35"#);
        let err = Config::from_json(&text).unwrap_err();
        assert!(err.to_string().contains("romaji_scal"), "{err}");
    }

    #[test]
    fn scales_must_be_positive() {
        let text = edited(r#""kana_scale": 0.7"#, r#""kana_scale": 0"#);
        let err = Config::from_json(&text).unwrap_err();
        assert_eq!(field_of(err), "scaling.kana_scale");

        let text = edited(r#""romaji_scale": 0.35"#, r#""romaji_scale": -0.35"#);
        let err = Config::from_json(&text).unwrap_err();
        assert_eq!(field_of(err), "scaling.romaji_scale");
    }

    #[test]
    fn ref_height_must_be_positive() {
        let text = edited(r#""ref_height": 700"#, r#""ref_height": 0"#);
        let err = Config::from_json(&text).unwrap_err();
        assert_eq!(field_of(err), "positioning.ref_height");
    }

    #[test]
    fn postscript_name_rules() {
        let text = edited("\"KanaKira-Regular\"", "\"KanaKira Regular\"");
        let err = Config::from_json(&text).unwrap_err();
        assert_eq!(field_of(err), "font_info.postscript_name");

        let text = edited("\"KanaKira-Regular\"", "\"Kana(Kira)\"");
        assert!(Config::from_json(&text).is_err());

        let long = format!("\"{}\"", "K".repeat(64));
        let text = edited("\"KanaKira-Regular\"", &long);
        assert!(Config::from_json(&text).is_err());
    }

    #[test]
    fn names_are_ascii() {
        let text = edited("\"family_name\": \"KanaKira\"", "\"family_name\": \"カナキラ\"");
        let err = Config::from_json(&text).unwrap_err();
        assert_eq!(field_of(err), "font_info.family_name");
    }

    #[test]
    fn version_format() {
        for bad in ["\"\"", "\"v1\"", "\"1.\"", "\"1.2.3\"", "\"40000.0\""] {
            let text = edited("\"1.000\"", bad);
            let err = Config::from_json(&text).unwrap_err();
            assert_eq!(field_of(err), "font_info.version", "{bad}");
        }
        let text = edited("\"1.000\"", "\"2\"");
        let config = Config::from_json(&text).unwrap();
        assert_eq!(config.font_info.revision().unwrap(), 2.0);
    }

    #[test]
    fn unknown_keys_rejected() {
        let text = edited(r#""gap": 50"#, r#""gap": 50, "gapp": 1"#);
        assert!(matches!(
            Config::from_json(&text),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.fonts.input.japanese,
            dir.path().join("NotoSansJP-Regular.ttf")
        );
        assert_eq!(
            config.fonts.output,
            dir.path().join("out/KanaKira-Regular.ttf")
        );
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("missing.json"));

        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(&err, ConfigError::Parse { path: p, .. } if p == &path));
    }
}
