//! Per-dialect character n-gram statistics.
//!
//! The model keeps, for every dialect and every configured order `n`, a
//! table of raw counts and a table of derived *values*:
//!
//! ```text
//! value(g) = -log10(count(g) / T)
//! ```
//!
//! where `T` is the number of distinct n-grams of that dialect and order.
//! Frequent n-grams get a value close to (or below) zero, rare ones a
//! large positive value. Scoring adds values up, so lower is better.
//!
//! # Lifecycle
//!
//! Training runs one counting pass over all rows, then one value pass.
//! After that the model is only read, except by the adaptive classifier,
//! which folds accepted test sentences back in through
//! [`DialectModel::merge`] on its own copy.

use crate::config::Config;
use crate::corpus::{Sentence, TrainingRow};
use crate::error::{Error, Result};
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;

/// Counts and values of one (dialect, order) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NGramTable {
    counts: AHashMap<String, u64>,
    values: AHashMap<String, f64>,
}

impl NGramTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from persisted counts and values.
    pub(crate) fn from_parts(counts: AHashMap<String, u64>, values: AHashMap<String, f64>) -> Self {
        Self { counts, values }
    }

    /// Count one more occurrence of `ngram`.
    ///
    /// Values are left untouched until [`NGramTable::rebuild_values`].
    pub fn record(&mut self, ngram: &str) {
        if let Some(count) = self.counts.get_mut(ngram) {
            *count += 1;
        } else {
            self.counts.insert(ngram.to_string(), 1);
        }
    }

    /// Recompute every value from the current counts.
    pub fn rebuild_values(&mut self) {
        let distinct = self.counts.len() as f64;
        self.values.clear();
        self.values.reserve(self.counts.len());
        for (ngram, &count) in &self.counts {
            self.values
                .insert(ngram.clone(), -(count as f64 / distinct).log10());
        }
    }

    pub fn value(&self, ngram: &str) -> Option<f64> {
        self.values.get(ngram).copied()
    }

    pub fn count(&self, ngram: &str) -> u64 {
        self.counts.get(ngram).copied().unwrap_or(0)
    }

    /// Number of distinct n-grams seen (`T`).
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &AHashMap<String, u64> {
        &self.counts
    }

    pub fn values(&self) -> &AHashMap<String, f64> {
        &self.values
    }
}

/// Tables of one dialect, keyed by order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DialectTables {
    pub(crate) label: String,
    pub(crate) tables: BTreeMap<usize, NGramTable>,
}

/// The trained state: one [`NGramTable`] per dialect and order.
///
/// Dialects keep the configured order, which is also the order in which
/// they are scored.
#[derive(Debug, Clone, PartialEq)]
pub struct DialectModel {
    orders: Vec<usize>,
    dialects: Vec<DialectTables>,
    index: AHashMap<String, usize>,
}

impl DialectModel {
    /// Create an empty model for the configured dialects and orders.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the configuration does not validate.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let orders = config.distinct_orders();
        let dialects = config
            .dialects
            .iter()
            .map(|label| DialectTables {
                label: label.clone(),
                tables: orders.iter().map(|&n| (n, NGramTable::new())).collect(),
            })
            .collect();
        Ok(Self::assemble(orders, dialects))
    }

    pub(crate) fn assemble(orders: Vec<usize>, dialects: Vec<DialectTables>) -> Self {
        let index = dialects
            .iter()
            .enumerate()
            .map(|(i, d)| (d.label.clone(), i))
            .collect();
        Self {
            orders,
            dialects,
            index,
        }
    }

    /// Train a model: one counting pass, then one value pass.
    ///
    /// Rows labelled with a dialect outside the configured set are skipped.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] for an invalid configuration (checked first).
    /// - [`Error::EmptyTable`] if some dialect ends up without any n-gram
    ///   of some order.
    ///
    /// # Example
    /// ```rust
    /// use heli_dialect::{Config, DialectModel, TrainingRow};
    ///
    /// let config = Config::with_dialects(&["de", "ch"], &[2], 2);
    /// let rows = vec![
    ///     TrainingRow::new("de", "der hund", &config.orders),
    ///     TrainingRow::new("ch", "der hung", &config.orders),
    /// ];
    /// let model = DialectModel::train(&config, &rows).unwrap();
    /// assert_eq!(model.table("de", 2).unwrap().distinct(), 9);
    /// ```
    pub fn train(config: &Config, rows: &[TrainingRow]) -> Result<Self> {
        let mut model = Self::new(config)?;

        let mut skipped = 0usize;
        for row in rows {
            if model.count_row(&row.dialect, &row.sentence).is_err() {
                log::debug!("skipping row with unconfigured dialect '{}'", row.dialect);
                skipped += 1;
            }
        }

        model.check_coverage()?;
        model.rebuild_values();

        log::info!(
            "trained {} dialects on {} rows ({} skipped), orders {:?}",
            model.dialects.len(),
            rows.len() - skipped,
            skipped,
            model.orders
        );
        Ok(model)
    }

    /// Add every n-gram of `sentence` to the counts of `dialect`, all orders.
    fn count_row(&mut self, dialect: &str, sentence: &Sentence) -> Result<()> {
        let i = self.dialect_index(dialect)?;
        for (&n, table) in self.dialects[i].tables.iter_mut() {
            for ngram in sentence.ngrams(n).iter() {
                table.record(ngram);
            }
        }
        Ok(())
    }

    fn check_coverage(&self) -> Result<()> {
        for dialect in &self.dialects {
            for (&order, table) in &dialect.tables {
                if table.is_empty() {
                    return Err(Error::EmptyTable {
                        dialect: dialect.label.clone(),
                        order,
                    });
                }
            }
        }
        Ok(())
    }

    /// Recompute the values of every table from its counts.
    pub fn rebuild_values(&mut self) {
        for dialect in &mut self.dialects {
            for table in dialect.tables.values_mut() {
                table.rebuild_values();
            }
        }
    }

    /// Fold a sentence into one dialect and refresh only that dialect's values.
    ///
    /// Every order is updated; no other dialect is touched.
    pub fn merge(&mut self, dialect: &str, sentence: &Sentence) -> Result<()> {
        self.count_row(dialect, sentence)?;
        let i = self.dialect_index(dialect)?;
        for table in self.dialects[i].tables.values_mut() {
            table.rebuild_values();
        }
        Ok(())
    }

    pub fn table(&self, dialect: &str, n: usize) -> Result<&NGramTable> {
        let i = self.dialect_index(dialect)?;
        self.dialects[i].tables.get(&n).ok_or(Error::UnknownOrder(n))
    }

    /// Table of the `i`-th dialect in configured order.
    pub(crate) fn table_at(&self, i: usize, n: usize) -> Result<&NGramTable> {
        self.dialects[i].tables.get(&n).ok_or(Error::UnknownOrder(n))
    }

    pub fn dialect_index(&self, dialect: &str) -> Result<usize> {
        self.index
            .get(dialect)
            .copied()
            .ok_or_else(|| Error::UnknownDialect(dialect.to_string()))
    }

    /// Dialect labels in configured order.
    pub fn dialects(&self) -> impl Iterator<Item = &str> {
        self.dialects.iter().map(|d| d.label.as_str())
    }

    pub fn dialect_count(&self) -> usize {
        self.dialects.len()
    }

    pub fn orders(&self) -> &[usize] {
        &self.orders
    }

    /// Check that the model was built for exactly the configured dialects and orders.
    pub fn matches_config(&self, config: &Config) -> bool {
        let configured: AHashSet<usize> = config.orders.iter().copied().collect();
        let own: AHashSet<usize> = self.orders.iter().copied().collect();
        configured == own && self.dialects().eq(config.dialects.iter().map(String::as_str))
    }

    pub(crate) fn dialect_tables(&self) -> &[DialectTables] {
        &self.dialects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(count: u64, distinct: usize) -> f64 {
        -(count as f64 / distinct as f64).log10()
    }

    fn scenario() -> (Config, Vec<TrainingRow>) {
        let config = Config::with_dialects(&["de", "ch"], &[1, 2], 2);
        let rows = vec![
            TrainingRow::new("de", "der hund", &config.orders),
            TrainingRow::new("ch", "der hung", &config.orders),
        ];
        (config, rows)
    }

    #[test]
    fn test_record_and_values() {
        let mut table = NGramTable::new();
        for g in ["ab", "ab", "bc", "cd"] {
            table.record(g);
        }
        assert_eq!(table.count("ab"), 2);
        assert_eq!(table.value("ab"), None);

        table.rebuild_values();
        assert_eq!(table.distinct(), 3);
        assert_eq!(table.value("ab"), Some(value(2, 3)));
        assert_eq!(table.value("bc"), Some(value(1, 3)));
        assert_eq!(table.value("zz"), None);
    }

    #[test]
    fn test_values_can_go_negative() {
        let mut table = NGramTable::new();
        for _ in 0..5 {
            table.record("a");
        }
        table.record("b");
        table.rebuild_values();
        // 5 / 2 > 1, so the most frequent n-gram is rewarded below zero.
        assert!(table.value("a").unwrap() < 0.0);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let (config, rows) = scenario();
        let mut model = DialectModel::train(&config, &rows).unwrap();
        let before = model.clone();
        model.rebuild_values();
        model.rebuild_values();
        assert_eq!(model, before);
    }

    #[test]
    fn test_train_hand_computed_tables() {
        let (config, rows) = scenario();
        let model = DialectModel::train(&config, &rows).unwrap();

        let de = model.table("de", 2).unwrap();
        assert_eq!(de.distinct(), 9);
        for g in [" d", "de", "er", "r ", " h", "hu", "un", "nd", "d "] {
            assert_eq!(de.count(g), 1);
            assert_eq!(de.value(g), Some(value(1, 9)));
        }

        let ch = model.table("ch", 1).unwrap();
        assert_eq!(ch.distinct(), 7);
        assert_eq!(ch.value("g"), Some(value(1, 7)));
    }

    #[test]
    fn test_unknown_dialect_rows_are_skipped() {
        let (config, mut rows) = scenario();
        rows.push(TrainingRow::new("fr", "le chien", &config.orders));
        let model = DialectModel::train(&config, &rows).unwrap();
        assert_eq!(model.dialect_count(), 2);
        assert_eq!(model.table("de", 2).unwrap().count("ch"), 0);
        assert!(matches!(model.table("fr", 2), Err(Error::UnknownDialect(_))));
    }

    #[test]
    fn test_dialect_without_data_fails() {
        let config = Config::with_dialects(&["de", "ch"], &[2], 2);
        let rows = vec![TrainingRow::new("de", "der hund", &config.orders)];
        match DialectModel::train(&config, &rows) {
            Err(Error::EmptyTable { dialect, order }) => {
                assert_eq!(dialect, "ch");
                assert_eq!(order, 2);
            }
            other => panic!("expected EmptyTable, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_config_fails_before_training() {
        let mut config = Config::with_dialects(&["de"], &[2], 2);
        config.cutoff = 2.0;
        assert!(matches!(
            DialectModel::train(&config, &[]),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_merge_touches_one_dialect() {
        let (config, rows) = scenario();
        let mut model = DialectModel::train(&config, &rows).unwrap();
        let before = model.clone();

        let sentence = Sentence::new("hund", &config.orders);
        model.merge("ch", &sentence).unwrap();

        assert_eq!(model.table("de", 1).unwrap(), before.table("de", 1).unwrap());
        assert_eq!(model.table("de", 2).unwrap(), before.table("de", 2).unwrap());

        let ch = model.table("ch", 2).unwrap();
        assert_eq!(ch.distinct(), 11);
        assert_eq!(ch.count(" h"), 2);
        assert_eq!(ch.value("nd"), Some(value(1, 11)));
        assert_eq!(ch.value(" h"), Some(value(2, 11)));
        // Unigram tables of the dialect are refreshed as well.
        assert_eq!(model.table("ch", 1).unwrap().count("d"), 2);
    }

    #[test]
    fn test_matches_config() {
        let (config, rows) = scenario();
        let model = DialectModel::train(&config, &rows).unwrap();
        assert!(model.matches_config(&config));
        let reordered = Config::with_dialects(&["ch", "de"], &[1, 2], 2);
        assert!(!model.matches_config(&reordered));
    }
}
