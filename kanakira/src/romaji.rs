//! Katakana to Hepburn romanization
//!
//! The table holds single Katakana and the two-character digraphs formed
//! with small vowels and small ャ/ュ/ョ. Only the single-character entries
//! become glyphs (see [`RomajiTable::glyph_entries`]); digraphs and
//! geminates are rendered as the sequence of their characters' glyphs, and
//! are only combined when romanizing text.

use thiserror::Error;

/// The small tsu, which doubles the consonant that follows it.
pub const SOKUON: char = 'ッ';

/// The standard table, in the order glyphs are added to the output font.
#[rustfmt::skip]
static HEPBURN: &[(&str, &str)] = &[
    ("ア", "A"),   ("イ", "I"),   ("ウ", "U"),   ("エ", "E"),   ("オ", "O"),
    ("カ", "KA"),  ("キ", "KI"),  ("ク", "KU"),  ("ケ", "KE"),  ("コ", "KO"),
    ("サ", "SA"),  ("シ", "SHI"), ("ス", "SU"),  ("セ", "SE"),  ("ソ", "SO"),
    ("タ", "TA"),  ("チ", "CHI"), ("ツ", "TSU"), ("テ", "TE"),  ("ト", "TO"),
    ("ナ", "NA"),  ("ニ", "NI"),  ("ヌ", "NU"),  ("ネ", "NE"),  ("ノ", "NO"),
    ("ハ", "HA"),  ("ヒ", "HI"),  ("フ", "FU"),  ("ヘ", "HE"),  ("ホ", "HO"),
    ("マ", "MA"),  ("ミ", "MI"),  ("ム", "MU"),  ("メ", "ME"),  ("モ", "MO"),
    ("ヤ", "YA"),  ("ユ", "YU"),  ("ヨ", "YO"),
    ("ラ", "RA"),  ("リ", "RI"),  ("ル", "RU"),  ("レ", "RE"),  ("ロ", "RO"),
    ("ワ", "WA"),  ("ヲ", "WO"),  ("ン", "N"),
    ("ガ", "GA"),  ("ギ", "GI"),  ("グ", "GU"),  ("ゲ", "GE"),  ("ゴ", "GO"),
    ("ザ", "ZA"),  ("ジ", "JI"),  ("ズ", "ZU"),  ("ゼ", "ZE"),  ("ゾ", "ZO"),
    ("ダ", "DA"),  ("ヂ", "JI"),  ("ヅ", "ZU"),  ("デ", "DE"),  ("ド", "DO"),
    ("バ", "BA"),  ("ビ", "BI"),  ("ブ", "BU"),  ("ベ", "BE"),  ("ボ", "BO"),
    ("パ", "PA"),  ("ピ", "PI"),  ("プ", "PU"),  ("ペ", "PE"),  ("ポ", "PO"),
    ("ァ", "A"),   ("ィ", "I"),   ("ゥ", "U"),   ("ェ", "E"),   ("ォ", "O"),
    ("ャ", "YA"),  ("ュ", "YU"),  ("ョ", "YO"),
    ("ッ", "TSU"), ("ー", "-"),   ("ヴ", "VU"),
    // yōon
    ("キャ", "KYA"), ("キュ", "KYU"), ("キョ", "KYO"),
    ("シャ", "SHA"), ("シュ", "SHU"), ("ショ", "SHO"),
    ("チャ", "CHA"), ("チュ", "CHU"), ("チョ", "CHO"),
    ("ニャ", "NYA"), ("ニュ", "NYU"), ("ニョ", "NYO"),
    ("ヒャ", "HYA"), ("ヒュ", "HYU"), ("ヒョ", "HYO"),
    ("ミャ", "MYA"), ("ミュ", "MYU"), ("ミョ", "MYO"),
    ("リャ", "RYA"), ("リュ", "RYU"), ("リョ", "RYO"),
    ("ギャ", "GYA"), ("ギュ", "GYU"), ("ギョ", "GYO"),
    ("ジャ", "JA"),  ("ジュ", "JU"),  ("ジョ", "JO"),
    ("ヂャ", "JA"),  ("ヂュ", "JU"),  ("ヂョ", "JO"),
    ("ビャ", "BYA"), ("ビュ", "BYU"), ("ビョ", "BYO"),
    ("ピャ", "PYA"), ("ピュ", "PYU"), ("ピョ", "PYO"),
    // extended combinations for loanwords
    ("シェ", "SHE"), ("ジェ", "JE"),  ("チェ", "CHE"),
    ("ティ", "TI"),  ("ディ", "DI"),  ("トゥ", "TU"),  ("ドゥ", "DU"),
    ("ファ", "FA"),  ("フィ", "FI"),  ("フェ", "FE"),  ("フォ", "FO"),
    ("ウィ", "WI"),  ("ウェ", "WE"),  ("ウォ", "WO"),
    ("ヴァ", "VA"),  ("ヴィ", "VI"),  ("ヴェ", "VE"),  ("ヴォ", "VO"),
];

/// The longest Katakana sequence a single entry may hold.
const MAX_ENTRY_CHARS: usize = 2;

/// An entry rejected by [`RomajiTable::from_entries`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Invalid romanization entry '{kana}' -> '{romaji}': {reason}")]
pub struct InvalidEntry {
    pub kana: String,
    pub romaji: String,
    pub reason: &'static str,
}

/// One Katakana grapheme and its romanization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub kana: String,
    pub romaji: String,
}

/// A run of input text romanized as one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    /// The slice of the input this segment covers
    pub text: &'a str,
    /// `None` if the text is not in the table
    pub romaji: Option<String>,
}

/// An immutable Katakana to Romaji mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RomajiTable {
    entries: Vec<Entry>,
}

impl Default for RomajiTable {
    fn default() -> Self {
        Self::hepburn()
    }
}

impl RomajiTable {
    /// The built in Hepburn table.
    pub fn hepburn() -> Self {
        RomajiTable {
            entries: HEPBURN
                .iter()
                .map(|(kana, romaji)| Entry {
                    kana: (*kana).into(),
                    romaji: (*romaji).into(),
                })
                .collect(),
        }
    }

    /// Build a table from custom entries.
    ///
    /// Each Katakana sequence must be one or two Katakana characters, and
    /// each romanization must be non-empty and made of ASCII uppercase
    /// letters or '-'.
    ///
    /// Repeated Katakana are not rejected here: the first entry wins for
    /// lookups, and the font assembler refuses to register a second glyph
    /// for the same character.
    pub fn from_entries<K, R>(
        entries: impl IntoIterator<Item = (K, R)>,
    ) -> Result<Self, InvalidEntry>
    where
        K: Into<String>,
        R: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(kana, romaji)| {
                let entry = Entry {
                    kana: kana.into(),
                    romaji: romaji.into(),
                };
                entry.check().map(|_| entry)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RomajiTable { entries })
    }

    /// All entries, in table order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The romanization of a grapheme, if it is in the table.
    pub fn lookup(&self, grapheme: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.kana == grapheme)
            .map(|entry| entry.romaji.as_str())
    }

    /// The single-character entries; these are exactly the graphemes that
    /// receive a composite glyph.
    pub fn glyph_entries(&self) -> impl Iterator<Item = (char, &Entry)> + '_ {
        self.entries.iter().filter_map(|entry| {
            let mut chars = entry.kana.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some((c, entry)),
                _ => None,
            }
        })
    }

    /// Split text into graphemes using greedy longest match.
    ///
    /// A small tsu followed by a consonant-initial grapheme is merged with it
    /// into a geminate. Characters not in the table form their own segment
    /// with no romanization.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            let rest = &text[pos..];
            let segment = self.geminate_at(rest).unwrap_or_else(|| self.longest_at(rest));
            pos += segment.text.len();
            segments.push(segment);
        }
        segments
    }

    /// Romanize text, passing through anything not in the table.
    pub fn romanize(&self, text: &str) -> String {
        self.segment(text)
            .into_iter()
            .map(|seg| seg.romaji.unwrap_or_else(|| seg.text.to_owned()))
            .collect()
    }

    // the longest table entry at the start of `text`, or its first char
    fn longest_at<'a>(&self, text: &'a str) -> Segment<'a> {
        let ends = text
            .char_indices()
            .skip(1)
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .take(MAX_ENTRY_CHARS);
        let mut best = None;
        for end in ends {
            let candidate = &text[..end];
            if let Some(romaji) = self.lookup(candidate) {
                best = Some(Segment {
                    text: candidate,
                    romaji: Some(romaji.to_owned()),
                });
            }
        }
        best.unwrap_or_else(|| {
            let len = text.chars().next().map(char::len_utf8).unwrap_or(text.len());
            Segment {
                text: &text[..len],
                romaji: None,
            }
        })
    }

    fn geminate_at<'a>(&self, text: &'a str) -> Option<Segment<'a>> {
        let rest = text.strip_prefix(SOKUON)?;
        // a repeated small tsu reads on its own
        if rest.is_empty() || rest.starts_with(SOKUON) {
            return None;
        }
        let next = self.longest_at(rest);
        let romaji = geminate(next.romaji.as_deref()?)?;
        let len = SOKUON.len_utf8() + next.text.len();
        Some(Segment {
            text: &text[..len],
            romaji: Some(romaji),
        })
    }
}

/// Double the leading consonant of a romanization, Hepburn style.
fn geminate(romaji: &str) -> Option<String> {
    if romaji.starts_with("CH") {
        return Some(format!("T{romaji}"));
    }
    let first = romaji.chars().next()?;
    // a lone 'N' (ン) is not a consonant onset
    if !first.is_ascii_uppercase() || "AEIOU".contains(first) || romaji == "N" {
        return None;
    }
    Some(format!("{first}{romaji}"))
}

impl Entry {
    fn check(&self) -> Result<(), InvalidEntry> {
        let reject = |reason| InvalidEntry {
            kana: self.kana.clone(),
            romaji: self.romaji.clone(),
            reason,
        };
        let len = self.kana.chars().count();
        if len == 0 || len > MAX_ENTRY_CHARS {
            return Err(reject("Katakana must be one or two characters"));
        }
        if !self.kana.chars().all(is_katakana) {
            return Err(reject("not Katakana"));
        }
        if self.romaji.is_empty()
            || !self
                .romaji
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '-')
        {
            return Err(reject("romanization must be ASCII uppercase letters"));
        }
        Ok(())
    }
}

/// `true` for characters in the Katakana block (U+30A0..=U+30FF).
pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let table = RomajiTable::hepburn();
        for entry in table.entries() {
            entry.check().unwrap();
        }
        let unique: HashSet<_> = table.entries().iter().map(|e| e.kana.as_str()).collect();
        assert_eq!(unique.len(), table.entries().len(), "duplicate Katakana");
    }

    #[test]
    fn builtin_table_covers_syllabary() {
        let table = RomajiTable::hepburn();
        let glyphs: HashSet<char> = table.glyph_entries().map(|(c, _)| c).collect();
        // basic, voiced, semi-voiced, small vowels and small y
        for c in "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン\
                  ガギグゲゴザジズゼゾダヂヅデドバビブベボパピプペポァィゥェォャュョッーヴ"
            .chars()
        {
            assert!(glyphs.contains(&c), "missing {c}");
        }
        assert_eq!(glyphs.len(), 82);
    }

    #[test]
    fn digraph_characters_all_have_glyphs() {
        // digraphs are drawn as a sequence of single-character glyphs
        let table = RomajiTable::hepburn();
        let glyphs: HashSet<char> = table.glyph_entries().map(|(c, _)| c).collect();
        for entry in table.entries() {
            for c in entry.kana.chars() {
                assert!(glyphs.contains(&c), "{c} in '{}' has no glyph", entry.kana);
            }
        }
    }

    #[test]
    fn glyph_entries_skip_digraphs() {
        let table = RomajiTable::hepburn();
        assert!(table.glyph_entries().all(|(_, e)| e.kana.chars().count() == 1));
        assert_eq!(
            table.glyph_entries().next().map(|(c, e)| (c, e.romaji.as_str())),
            Some(('ア', "A"))
        );
    }

    #[rstest]
    #[case("カ", Some("KA"))]
    #[case("キャ", Some("KYA"))]
    #[case("ー", Some("-"))]
    #[case("ヴォ", Some("VO"))]
    #[case("か", None)]
    #[case("キャキ", None)]
    fn lookup(#[case] grapheme: &str, #[case] expected: Option<&str>) {
        assert_eq!(RomajiTable::hepburn().lookup(grapheme), expected);
    }

    #[rstest]
    #[case("カタカナ", "KATAKANA")]
    #[case("キャ", "KYA")]
    #[case("キヤ", "KIYA")]
    #[case("ッチ", "TCHI")]
    #[case("マッチャ", "MATCHA")]
    #[case("ニッキョ", "NIKKYO")]
    #[case("キット", "KITTO")]
    #[case("ッ", "TSU")]
    #[case("ッア", "TSUA")]
    #[case("ッッ", "TSUTSU")]
    #[case("ッッカ", "TSUKKA")]
    #[case("ラーメン", "RA-MEN")]
    #[case("ファイル", "FAIRU")]
    #[case("トウキョウ2", "TOUKYOU2")]
    fn romanize(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(RomajiTable::hepburn().romanize(text), expected);
    }

    #[test]
    fn greedy_segments() {
        let table = RomajiTable::hepburn();
        let segments = table.segment("ショッチュウx");
        let texts: Vec<_> = segments.iter().map(|s| s.text).collect();
        assert_eq!(texts, ["ショ", "ッチュ", "ウ", "x"]);
        assert_eq!(segments[1].romaji.as_deref(), Some("TCHU"));
        assert_eq!(segments[3].romaji, None);
    }

    #[test]
    fn custom_entries() {
        let table = RomajiTable::from_entries([("カ", "KA"), ("カ", "GA")]).unwrap();
        assert_eq!(table.lookup("カ"), Some("KA"));
        assert_eq!(table.glyph_entries().count(), 2);

        let err = RomajiTable::from_entries([("カ", "ka")]).unwrap_err();
        assert_eq!(err.kana, "カ");
        assert!(RomajiTable::from_entries([("キャキ", "KYAKI")]).is_err());
        assert!(RomajiTable::from_entries([("A", "A")]).is_err());
        assert!(RomajiTable::from_entries([("ア", "")]).is_err());
    }
}
