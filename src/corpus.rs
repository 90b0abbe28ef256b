//! Sentence rows and a small text corpus reader.
//!
//! # Corpus Format
//!
//! Labelled corpora hold one sentence per line, prefixed with its dialect
//! and a tab:
//! ```text
//! # Comments start with #
//! ch_be	i ha di gärn
//! ch_zh	ich han di gern
//! ```
//!
//! Unlabelled input is just one sentence per line. Blank lines and `#`
//! comments are skipped in both cases. Every sentence is lowercased and
//! stripped of the configured symbols before its n-grams are taken.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ngram::ngrams_sentence;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::BufRead;

/// A preprocessed sentence with its n-grams precomputed per order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    text: String,
    ngrams: BTreeMap<usize, Vec<String>>,
}

impl Sentence {
    pub fn new(text: impl Into<String>, orders: &[usize]) -> Self {
        let text = text.into();
        let ngrams = orders
            .iter()
            .map(|&n| (n, ngrams_sentence(&text, n)))
            .collect();
        Self { text, ngrams }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// N-grams of order `n`; computed on the fly if `n` was not precomputed.
    pub fn ngrams(&self, n: usize) -> Cow<'_, [String]> {
        match self.ngrams.get(&n) {
            Some(grams) => Cow::Borrowed(grams.as_slice()),
            None => Cow::Owned(ngrams_sentence(&self.text, n)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub dialect: String,
    pub sentence: Sentence,
}

impl TrainingRow {
    pub fn new(dialect: impl Into<String>, text: impl Into<String>, orders: &[usize]) -> Self {
        Self {
            dialect: dialect.into(),
            sentence: Sentence::new(text, orders),
        }
    }
}

/// A sentence to classify. `dialect` holds the gold label when known.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRow {
    pub id: usize,
    pub sentence: Sentence,
    pub dialect: Option<String>,
}

impl TestRow {
    pub fn new(id: usize, text: impl Into<String>, orders: &[usize]) -> Self {
        Self {
            id,
            sentence: Sentence::new(text, orders),
            dialect: None,
        }
    }

    pub fn labelled(self, dialect: impl Into<String>) -> Self {
        Self {
            dialect: Some(dialect.into()),
            ..self
        }
    }
}

/// Lowercase `text` and remove every occurrence of each symbol.
pub fn preprocess(text: &str, symbols: &[String]) -> String {
    let mut cleaned = text.to_lowercase();
    for symbol in symbols.iter().filter(|s| !s.is_empty()) {
        if cleaned.contains(symbol.as_str()) {
            cleaned = cleaned.replace(symbol.as_str(), "");
        }
    }
    cleaned
}

fn content_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<(usize, String)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    None
                } else {
                    Some(Ok((i + 1, trimmed.to_string())))
                }
            }
            Err(err) => Some(Err(Error::Io(err))),
        })
}

/// Read `dialect<TAB>sentence` lines.
///
/// # Errors
/// Returns [`Error::Corpus`] with the 1-based line number for a line
/// without a tab or with an empty label.
pub fn read_labelled<R: BufRead>(reader: R, config: &Config) -> Result<Vec<(String, String)>> {
    let mut rows = Vec::new();
    for entry in content_lines(reader) {
        let (line, content) = entry?;
        let (dialect, text) = content.split_once('\t').ok_or_else(|| Error::Corpus {
            line,
            message: "expected 'dialect<TAB>sentence'".into(),
        })?;
        let dialect = dialect.trim();
        if dialect.is_empty() {
            return Err(Error::Corpus {
                line,
                message: "empty dialect label".into(),
            });
        }
        rows.push((dialect.to_string(), preprocess(text, &config.symbols_to_remove)));
    }
    Ok(rows)
}

/// Read a labelled corpus as training rows.
pub fn read_training<R: BufRead>(reader: R, config: &Config) -> Result<Vec<TrainingRow>> {
    Ok(read_labelled(reader, config)?
        .into_iter()
        .map(|(dialect, text)| TrainingRow::new(dialect, text, &config.orders))
        .collect())
}

/// Read a labelled corpus as test rows, numbered in file order from 0.
pub fn read_test<R: BufRead>(reader: R, config: &Config) -> Result<Vec<TestRow>> {
    Ok(read_labelled(reader, config)?
        .into_iter()
        .enumerate()
        .map(|(id, (dialect, text))| TestRow::new(id, text, &config.orders).labelled(dialect))
        .collect())
}

/// Read one sentence per line, numbered in file order from 0.
pub fn read_unlabelled<R: BufRead>(reader: R, config: &Config) -> Result<Vec<TestRow>> {
    let mut rows = Vec::new();
    for entry in content_lines(reader) {
        let (_, content) = entry?;
        let text = preprocess(&content, &config.symbols_to_remove);
        rows.push(TestRow::new(rows.len(), text, &config.orders));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_preprocess() {
        let symbols = Config::default().symbols_to_remove;
        assert_eq!(preprocess("«Grüezi», Mitenand!", &symbols), "grüezi mitenand");
        assert_eq!(preprocess("(A) & [B]?", &symbols), "a  b");
    }

    #[test]
    fn test_sentence_ngrams() {
        let sentence = Sentence::new("der hund", &[1, 2]);
        assert_eq!(sentence.ngrams(1).len(), 7);
        assert_eq!(sentence.ngrams(2).len(), 9);
        assert!(matches!(sentence.ngrams(2), Cow::Borrowed(_)));
        // Order 3 was not precomputed.
        assert_eq!(&*sentence.ngrams(3), ngrams_sentence("der hund", 3).as_slice());
    }

    #[test]
    fn test_read_labelled() {
        let config = Config::with_dialects(&["ch_be", "ch_zh"], &[2], 2);
        let input = "# header\nch_be\tI ha di gärn.\n\nch_zh\tIch han di gern!\n";
        let rows = read_training(Cursor::new(input), &config).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].dialect, "ch_be");
        assert_eq!(rows[0].sentence.text(), "i ha di gärn");
        assert_eq!(rows[1].sentence.text(), "ich han di gern");
    }

    #[test]
    fn test_read_labelled_reports_line() {
        let config = Config::default();
        let input = "ch_be\tok\nno tab here\n";
        match read_labelled(Cursor::new(input), &config) {
            Err(Error::Corpus { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected corpus error, got {other:?}"),
        }
        assert!(read_labelled(Cursor::new("\tsentence\n"), &config).is_err());
    }

    #[test]
    fn test_read_test_and_unlabelled_ids() {
        let config = Config::with_dialects(&["a", "b"], &[1], 1);
        let rows = read_test(Cursor::new("a\tx\nb\ty\n"), &config).unwrap();
        assert_eq!(rows[1].id, 1);
        assert_eq!(rows[1].dialect.as_deref(), Some("b"));

        let rows = read_unlabelled(Cursor::new("first\n\n# skip\nsecond\n"), &config).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, 1);
        assert_eq!(rows[1].sentence.text(), "second");
        assert_eq!(rows[1].dialect, None);
    }
}
