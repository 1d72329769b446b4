use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, error};

use crate::error::{Result, TrainerError};

static VOCAB_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/vocab");

const EMBEDDED_FILE: &str = "vocabulary.csv";
const MIN_FIELDS: usize = 4;

/// A single row of the word list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub day: u32,
    pub idx: String,
    pub en: String,
    pub ko: String,
}

impl WordRecord {
    /// True when any space-separated word of the source text is 10+ chars,
    /// which the renderer lays out with a smaller font.
    pub fn has_long_word(&self) -> bool {
        self.en.split(' ').any(|w| w.chars().count() >= 10)
    }
}

/// Ordered, index-stable list of words loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabularySet {
    words: Vec<WordRecord>,
}

impl VocabularySet {
    pub fn new(words: Vec<WordRecord>) -> Self {
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WordRecord> {
        self.words.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WordRecord> {
        self.words.iter()
    }

    pub fn as_slice(&self) -> &[WordRecord] {
        &self.words
    }

    /// Largest day present, or 0 for an empty set.
    pub fn max_day(&self) -> u32 {
        self.words.iter().map(|w| w.day).max().unwrap_or(0)
    }

    /// Words whose day falls in `start..=end`, in their original order.
    pub fn filter_days(&self, start: u32, end: u32) -> VocabularySet {
        self.words
            .iter()
            .filter(|w| w.day >= start && w.day <= end)
            .cloned()
            .collect()
    }

    /// Substring match on either side against the lowercased query; the
    /// source text is lowercased too. A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&WordRecord> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let lowered = query.to_lowercase();
        self.words
            .iter()
            .filter(|w| w.en.to_lowercase().contains(&lowered) || w.ko.contains(&lowered))
            .collect()
    }
}

impl FromIterator<WordRecord> for VocabularySet {
    fn from_iter<I: IntoIterator<Item = WordRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a VocabularySet {
    type Item = &'a WordRecord;
    type IntoIter = std::slice::Iter<'a, WordRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.iter()
    }
}

/// Parse `day,idx,en,ko` rows.
///
/// Quoted fields may hold commas and line breaks. A first row whose first
/// cell is not a number is treated as a header. Rows with fewer than four
/// fields, or without a positive day, are skipped.
pub fn parse(text: &str) -> VocabularySet {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .filter_map(|r| r.ok())
        .filter(|r| r.len() >= MIN_FIELDS)
        .collect();

    let skip_header = rows
        .first()
        .and_then(|r| r.get(0))
        .is_some_and(|cell| parse_day(cell).is_none());

    let words: VocabularySet = rows
        .iter()
        .skip(usize::from(skip_header))
        .filter_map(|r| {
            let day = parse_day(&r[0]).filter(|d| *d >= 1)?;
            Some(WordRecord {
                day,
                idx: r[1].trim().to_string(),
                en: clean_field(&r[2]),
                ko: clean_field(&r[3]),
            })
        })
        .collect();

    debug!(rows = rows.len(), words = words.len(), skip_header, "parsed vocabulary");
    words
}

/// Read and parse a word list; `None` selects the bundled sample list.
pub fn load(path: Option<&Path>) -> Result<VocabularySet> {
    let text = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            error!(path = %path.display(), "failed to read vocabulary: {e}");
            TrainerError::DataLoad {
                origin: path.display().to_string(),
                reason: e.to_string(),
            }
        })?,
        None => embedded_text()?.to_string(),
    };
    Ok(parse(&text))
}

fn embedded_text() -> Result<&'static str> {
    VOCAB_DIR
        .get_file(EMBEDDED_FILE)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| TrainerError::DataLoad {
            origin: format!("<bundled {EMBEDDED_FILE}>"),
            reason: "missing or not utf-8".to_string(),
        })
}

/// Leading integer of a cell, the way a lenient integer parse reads it.
fn parse_day(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    let cell = cell.strip_prefix('+').unwrap_or(cell);
    let digits: String = cell.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn clean_field(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix('"').unwrap_or(s);
    let s = s.strip_suffix('"').unwrap_or(s);
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_plain_rows() {
        let words = parse("1,001,apple,사과\n2,002,banana,바나나\n");
        assert_eq!(words.len(), 2);
        assert_eq!(
            words.get(0),
            Some(&WordRecord {
                day: 1,
                idx: "001".into(),
                en: "apple".into(),
                ko: "사과".into(),
            })
        );
        assert_eq!(words.get(1).map(|w| w.day), Some(2));
    }

    #[test]
    fn drops_header_row() {
        let words = parse("day,idx,en,ko\n3,010,cat,고양이\n");
        assert_eq!(words.len(), 1);
        assert_eq!(words.get(0).unwrap().en, "cat");
    }

    #[test]
    fn keeps_first_row_when_numeric() {
        let words = parse("1,1,a,b\n1,2,c,d");
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn quoted_fields_keep_commas_and_newlines() {
        let text = "1,7,\"look up, look into\",\"찾아보다\n조사하다\"\r\n2,8,dog,개\r\n";
        let words = parse(text);
        assert_eq!(words.len(), 2);
        let first = words.get(0).unwrap();
        assert_eq!(first.en, "look up, look into");
        assert_eq!(first.ko, "찾아보다\n조사하다");
        assert_eq!(words.get(1).unwrap().ko, "개");
    }

    #[test]
    fn short_and_blank_rows_are_dropped() {
        let words = parse("1,1,only-three\n\n\n2,2,ok,좋아\n3,3\n");
        assert_eq!(words.len(), 1);
        assert_eq!(words.get(0).unwrap().en, "ok");
    }

    #[test]
    fn fields_are_trimmed() {
        let words = parse(" 4 , 12 ,  spaced out  ,  띄어쓰기 ");
        let w = words.get(0).unwrap();
        assert_eq!(w.day, 4);
        assert_eq!(w.idx, "12");
        assert_eq!(w.en, "spaced out");
        assert_eq!(w.ko, "띄어쓰기");
    }

    #[test]
    fn rows_without_positive_day_are_dropped() {
        let words = parse("1,1,a,b\nx,2,c,d\n0,3,e,f\n2,4,g,h");
        let days: Vec<u32> = words.iter().map(|w| w.day).collect();
        assert_eq!(days, vec![1, 2]);
    }

    #[test]
    fn empty_text_yields_empty_set() {
        assert!(parse("").is_empty());
        assert!(parse("day,idx,en,ko\n").is_empty());
    }

    #[test]
    fn max_day_and_filter() {
        let words = parse("1,1,a,b\n5,2,c,d\n3,3,e,f\n");
        assert_eq!(words.max_day(), 5);
        let filtered = words.filter_days(2, 5);
        let ens: Vec<&str> = filtered.iter().map(|w| w.en.as_str()).collect();
        assert_eq!(ens, vec!["c", "e"]);
        assert_eq!(VocabularySet::default().max_day(), 0);
    }

    #[test]
    fn search_matches_both_sides() {
        let words = parse("1,1,Apple pie,사과 파이\n1,2,banana,바나나\n");
        assert_eq!(words.search("apple").len(), 1);
        assert_eq!(words.search("APPLE").len(), 1);
        assert_eq!(words.search("바나").len(), 1);
        assert!(words.search("   ").is_empty());
        assert!(words.search("cherry").is_empty());
    }

    #[test]
    fn search_lowercases_query_for_target_too() {
        let words = parse("1,1,remote,tv 리모컨\n1,2,radio,FM 라디오\n");
        assert_eq!(words.search("TV").len(), 1);
        assert_eq!(words.search("TV")[0].en, "remote");
        // the target text itself is not lowercased
        assert!(words.search("FM 라디오").is_empty());
        assert_eq!(words.search("라디오").len(), 1);
    }

    #[test]
    fn long_word_detection() {
        let mut w = WordRecord {
            day: 1,
            idx: "1".into(),
            en: "take place".into(),
            ko: "개최되다".into(),
        };
        assert!(!w.has_long_word());
        w.en = "accommodate".into();
        assert!(w.has_long_word());
    }

    #[test]
    fn load_missing_file_is_data_load_error() {
        let err = load(Some(Path::new("/definitely/not/here.csv"))).unwrap_err();
        assert_matches!(err, TrainerError::DataLoad { .. });
    }

    #[test]
    fn load_bundled_list() {
        let words = load(None).unwrap();
        assert!(!words.is_empty());
        assert!(words.max_day() >= 1);
    }
}
