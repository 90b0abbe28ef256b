//! Dialect classifiers built on the HeLi scorer.
//!
//! - [`BasicClassifier`]: scores a sentence against every dialect and picks
//!   the lowest cost. When two dialects tie exactly, the one listed first
//!   in the configuration wins.
//! - [`AdaptiveClassifier`]: see [`crate::adaptive`].
//!
//! [`Classifier`] selects between the two from [`Config::model`].

use crate::adaptive::AdaptiveClassifier;
use crate::config::{Config, ModelKind};
use crate::corpus::{Sentence, TestRow, TrainingRow};
use crate::error::{Error, Result};
use crate::model::DialectModel;
use crate::scorer::{argmin, HeliScorer};
use ahash::AHashSet;
use std::collections::BTreeMap;

/// Sentence id → predicted dialect. Every test row appears exactly once.
pub type Predictions = BTreeMap<usize, String>;

/// Check that a model fits the configuration it is used with.
pub(crate) fn check_model(config: &Config, model: &DialectModel) -> Result<()> {
    config.validate()?;
    if !model.matches_config(config) {
        return Err(Error::InvalidConfig(format!(
            "model was trained for dialects {:?} and orders {:?}, configuration asks for {:?} and {:?}",
            model.dialects().collect::<Vec<_>>(),
            model.orders(),
            config.dialects,
            config.orders
        )));
    }
    Ok(())
}

pub(crate) fn check_unique_ids(rows: &[TestRow]) -> Result<()> {
    let mut seen = AHashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.id) {
            return Err(Error::DuplicateSentence(row.id));
        }
    }
    Ok(())
}

/// Index of the lowest-cost dialect for `sentence`.
pub(crate) fn best_dialect(scorer: &HeliScorer<'_>, sentence: &Sentence, n: usize) -> Result<usize> {
    let scores = scorer.scores(sentence, n)?;
    // A validated model always has at least one dialect.
    argmin(&scores).ok_or_else(|| Error::InvalidConfig("dialect set is empty".into()))
}

/// One-shot cost minimisation over all dialects.
#[derive(Debug, Clone)]
pub struct BasicClassifier {
    config: Config,
    model: DialectModel,
}

impl BasicClassifier {
    /// Wrap an already trained model.
    ///
    /// # Errors
    /// Fails if the configuration is invalid or the model was trained for
    /// other dialects or orders.
    pub fn new(config: Config, model: DialectModel) -> Result<Self> {
        check_model(&config, &model)?;
        Ok(Self { config, model })
    }

    pub fn train(config: Config, rows: &[TrainingRow]) -> Result<Self> {
        let model = DialectModel::train(&config, rows)?;
        Ok(Self { config, model })
    }

    /// Lowest-cost dialect for `sentence` using order-`n` n-grams.
    ///
    /// # Example
    /// ```rust
    /// use heli_dialect::{BasicClassifier, Config, TrainingRow};
    ///
    /// let config = Config::with_dialects(&["de", "ch"], &[2], 2);
    /// let rows = vec![
    ///     TrainingRow::new("de", "der hund", &config.orders),
    ///     TrainingRow::new("ch", "dr chatz", &config.orders),
    /// ];
    /// let classifier = BasicClassifier::train(config, &rows).unwrap();
    /// assert_eq!(classifier.classify("hund", 2).unwrap(), "de");
    /// ```
    pub fn classify(&self, sentence: &str, n: usize) -> Result<&str> {
        self.classify_sentence(&Sentence::new(sentence, &[]), n)
    }

    pub fn classify_sentence(&self, sentence: &Sentence, n: usize) -> Result<&str> {
        let scorer = HeliScorer::new(&self.model, self.config.penalty);
        let best = best_dialect(&scorer, sentence, n)?;
        Ok(self.config.dialects[best].as_str())
    }

    /// Classify every row with order `n_eval`.
    pub fn predict(&self, rows: &[TestRow]) -> Result<Predictions> {
        check_unique_ids(rows)?;
        rows.iter()
            .map(|row| {
                let dialect = self.classify_sentence(&row.sentence, self.config.n_eval)?;
                Ok((row.id, dialect.to_string()))
            })
            .collect()
    }

    pub fn scorer(&self) -> HeliScorer<'_> {
        HeliScorer::new(&self.model, self.config.penalty)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &DialectModel {
        &self.model
    }

    pub fn into_model(self) -> DialectModel {
        self.model
    }
}

/// The closed set of classifier variants.
#[derive(Debug, Clone)]
pub enum Classifier {
    Basic(BasicClassifier),
    Adaptive(AdaptiveClassifier),
}

impl Classifier {
    /// Train a model and wrap it in the variant named by `config.model`.
    pub fn train(config: Config, rows: &[TrainingRow]) -> Result<Self> {
        let model = DialectModel::train(&config, rows)?;
        Self::from_model(config, model)
    }

    /// Wrap a trained (or loaded) model in the variant named by `config.model`.
    pub fn from_model(config: Config, model: DialectModel) -> Result<Self> {
        Ok(match config.model {
            ModelKind::Heli => Classifier::Basic(BasicClassifier::new(config, model)?),
            ModelKind::AdaptiveHeli => Classifier::Adaptive(AdaptiveClassifier::new(config, model)?),
        })
    }

    /// Predict every test row. The stored model is never modified.
    pub fn predict(&self, rows: &[TestRow]) -> Result<Predictions> {
        match self {
            Classifier::Basic(classifier) => classifier.predict(rows),
            Classifier::Adaptive(classifier) => Ok(classifier.predict(rows)?.predictions),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Classifier::Basic(_) => ModelKind::Heli,
            Classifier::Adaptive(_) => ModelKind::AdaptiveHeli,
        }
    }

    pub fn config(&self) -> &Config {
        match self {
            Classifier::Basic(classifier) => classifier.config(),
            Classifier::Adaptive(classifier) => classifier.config(),
        }
    }

    pub fn model(&self) -> &DialectModel {
        match self {
            Classifier::Basic(classifier) => classifier.model(),
            Classifier::Adaptive(classifier) => classifier.model(),
        }
    }
}
