//! HeLi word and sentence costs.
//!
//! # Word Cost
//!
//! For a word and a dialect's order-`n` table:
//! - Take the word's n-grams and keep those present in the table.
//! - If none is present, the word costs the backoff penalty `P`.
//! - Otherwise it costs the mean value of the present n-grams. Unknown
//!   n-grams are skipped, not penalised one by one.
//!
//! # Sentence Cost
//!
//! The sum of the word costs over the whitespace-separated tokens. The
//! best dialect is the one with the *lowest* cost.

use crate::corpus::Sentence;
use crate::error::Result;
use crate::model::{DialectModel, NGramTable};
use crate::ngram::ngrams;

/// Read-only scorer over a trained [`DialectModel`].
pub struct HeliScorer<'m> {
    model: &'m DialectModel,
    penalty: f64,
}

impl<'m> HeliScorer<'m> {
    pub fn new(model: &'m DialectModel, penalty: f64) -> Self {
        Self { model, penalty }
    }

    pub fn model(&self) -> &'m DialectModel {
        self.model
    }

    /// Cost of a single word for `dialect`, using order-`n` n-grams.
    ///
    /// # Errors
    /// Returns an error if the model has no such dialect or order.
    pub fn word_score(&self, word: &str, n: usize, dialect: &str) -> Result<f64> {
        Ok(self.table_word_score(self.model.table(dialect, n)?, word, n))
    }

    /// Sum of [`HeliScorer::word_score`] over the tokens of `sentence`.
    pub fn sentence_score(&self, sentence: &str, n: usize, dialect: &str) -> Result<f64> {
        Ok(self.table_sentence_score(self.model.table(dialect, n)?, sentence, n))
    }

    /// Sentence cost for every dialect, in the model's dialect order.
    pub fn scores(&self, sentence: &Sentence, n: usize) -> Result<Vec<f64>> {
        (0..self.model.dialect_count())
            .map(|i| self.score_at(i, sentence, n))
            .collect()
    }

    /// Sentence cost for the `i`-th dialect of the model.
    pub(crate) fn score_at(&self, i: usize, sentence: &Sentence, n: usize) -> Result<f64> {
        Ok(self.table_sentence_score(self.model.table_at(i, n)?, sentence.text(), n))
    }

    fn table_sentence_score(&self, table: &NGramTable, sentence: &str, n: usize) -> f64 {
        sentence
            .split_whitespace()
            .map(|word| self.table_word_score(table, word, n))
            .sum()
    }

    fn table_word_score(&self, table: &NGramTable, word: &str, n: usize) -> f64 {
        let mut recognized = 0usize;
        let mut total = 0.0;
        for gram in ngrams(word, n) {
            if let Some(value) = table.value(&gram) {
                recognized += 1;
                total += value;
            }
        }

        if recognized == 0 {
            self.penalty
        } else {
            total / recognized as f64
        }
    }
}

/// Index of the lowest score; the earliest index wins exact ties.
pub fn argmin(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some(b) if scores[b] <= score => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Best index and the gap between the second-lowest and the lowest score.
///
/// With a single score the margin is `0.0`.
pub fn best_with_margin(scores: &[f64]) -> Option<(usize, f64)> {
    let best = argmin(scores)?;
    let runner_up = scores
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != best)
        .map(|(_, &score)| score)
        .fold(None, |acc: Option<f64>, score| match acc {
            Some(low) if low <= score => Some(low),
            _ => Some(score),
        });
    let margin = runner_up.map_or(0.0, |second| second - scores[best]);
    Some((best, margin))
}
