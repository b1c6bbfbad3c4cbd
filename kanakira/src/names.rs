//! The output font's naming table

use write_fonts::{
    tables::name::{Name, NameRecord},
    types::NameId,
};

use crate::config::FontInfo;

/// Platform, encoding and language of every record we write.
const TARGETS: [(u16, u16, u16); 2] = [
    // Unicode, BMP only
    (0, 3, 0),
    // Windows, Unicode BMP, English (US)
    (3, 1, 0x409),
];

const REPLACED_IDS: [NameId; 8] = [
    NameId::FAMILY_NAME,
    NameId::SUBFAMILY_NAME,
    NameId::UNIQUE_ID,
    NameId::FULL_NAME,
    NameId::VERSION_STRING,
    NameId::POSTSCRIPT_NAME,
    NameId::TYPOGRAPHIC_FAMILY_NAME,
    NameId::TYPOGRAPHIC_SUBFAMILY_NAME,
];

/// The strings we write, by name id.
pub fn name_strings(info: &FontInfo) -> Vec<(NameId, String)> {
    vec![
        (NameId::FAMILY_NAME, info.family_name.clone()),
        (NameId::SUBFAMILY_NAME, info.subfamily_name.clone()),
        (NameId::UNIQUE_ID, format!("{};{}", info.version, info.postscript_name)),
        (NameId::FULL_NAME, info.full_name.clone()),
        (NameId::VERSION_STRING, format!("Version {}", info.version)),
        (NameId::POSTSCRIPT_NAME, info.postscript_name.clone()),
        (NameId::TYPOGRAPHIC_FAMILY_NAME, info.family_name.clone()),
        (NameId::TYPOGRAPHIC_SUBFAMILY_NAME, info.subfamily_name.clone()),
    ]
}

/// Build the `name` table.
///
/// Records of `source` that we do not replace are kept if they are stored in
/// a Unicode encoding; the rest are dropped.
pub fn build_name(source: Option<Name>, info: &FontInfo) -> Name {
    let mut name = source.unwrap_or_default();
    let mut records: Vec<NameRecord> = std::mem::take(&mut name.name_record)
        .into_iter()
        .filter(|record| !REPLACED_IDS.contains(&record.name_id))
        .filter(|record| {
            let keep = is_unicode(record.platform_id, record.encoding_id);
            if !keep {
                log::debug!(
                    "dropping name {} for platform {} encoding {}",
                    record.name_id,
                    record.platform_id,
                    record.encoding_id
                );
            }
            keep
        })
        .collect();

    for (platform, encoding, language) in TARGETS {
        records.extend(name_strings(info).into_iter().map(|(id, string)| {
            NameRecord::new(platform, encoding, language, id, string.into())
        }));
    }
    records.sort_by_key(sort_key);
    records.dedup_by_key(|record| sort_key(record));
    name.name_record = records;
    name
}

fn sort_key(record: &NameRecord) -> (u16, u16, u16, NameId) {
    (
        record.platform_id,
        record.encoding_id,
        record.language_id,
        record.name_id,
    )
}

fn is_unicode(platform: u16, encoding: u16) -> bool {
    matches!((platform, encoding), (0, _) | (3, 1) | (3, 10))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn info() -> FontInfo {
        FontInfo {
            family_name: "KanaKira".into(),
            full_name: "KanaKira Regular".into(),
            postscript_name: "KanaKira-Regular".into(),
            version: "1.000".into(),
            subfamily_name: "Regular".into(),
        }
    }

    fn strings(name: &Name, platform: u16) -> Vec<(NameId, String)> {
        name.name_record
            .iter()
            .filter(|r| r.platform_id == platform)
            .map(|r| (r.name_id, r.string.as_str().to_owned()))
            .collect()
    }

    #[test]
    fn writes_all_ids_for_both_platforms() {
        let name = build_name(None, &info());
        let expected = vec![
            (NameId::FAMILY_NAME, "KanaKira".to_string()),
            (NameId::SUBFAMILY_NAME, "Regular".into()),
            (NameId::UNIQUE_ID, "1.000;KanaKira-Regular".into()),
            (NameId::FULL_NAME, "KanaKira Regular".into()),
            (NameId::VERSION_STRING, "Version 1.000".into()),
            (NameId::POSTSCRIPT_NAME, "KanaKira-Regular".into()),
            (NameId::TYPOGRAPHIC_FAMILY_NAME, "KanaKira".into()),
            (NameId::TYPOGRAPHIC_SUBFAMILY_NAME, "Regular".into()),
        ];
        assert_eq!(strings(&name, 0), expected);
        assert_eq!(strings(&name, 3), expected);
        assert_eq!(name.name_record.len(), 16);
    }

    #[test]
    fn keeps_other_source_records() {
        let record = |platform, encoding, language, id, text: &str| {
            NameRecord::new(platform, encoding, language, id, text.to_string().into())
        };
        let source = Name {
            name_record: vec![
                record(3, 1, 0x409, NameId::COPYRIGHT_NOTICE, "(c) Somebody"),
                record(3, 1, 0x409, NameId::FAMILY_NAME, "Source Sans JP"),
                record(1, 0, 0, NameId::COPYRIGHT_NOTICE, "(c) Somebody"),
            ],
            ..Default::default()
        };
        let name = build_name(Some(source), &info());

        let windows = strings(&name, 3);
        assert_eq!(windows[0], (NameId::COPYRIGHT_NOTICE, "(c) Somebody".into()));
        assert_eq!(windows[1], (NameId::FAMILY_NAME, "KanaKira".into()));
        // mac records are dropped
        assert!(strings(&name, 1).is_empty());
    }

    #[test]
    fn records_sorted_and_unique() {
        let name = build_name(Some(build_name(None, &info())), &info());
        let keys: Vec<_> = name.name_record.iter().map(sort_key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(keys, sorted);
    }
}
