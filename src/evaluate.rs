//! Confusion matrix and per-dialect precision, recall and F1.

use crate::classifier::Predictions;
use crate::error::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of gold instances of the dialect.
    pub support: usize,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    dialects: Vec<String>,
    /// `matrix[actual][predicted]`
    matrix: Vec<Vec<usize>>,
    scores: Vec<ClassScores>,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl Evaluation {
    /// Compare predictions against gold labels `(id, dialect)`.
    ///
    /// # Errors
    /// Fails if a gold id has no prediction, or a label is outside `dialects`.
    pub fn new(dialects: &[String], gold: &[(usize, String)], predictions: &Predictions) -> Result<Self> {
        let position = |label: &str| {
            dialects
                .iter()
                .position(|d| d == label)
                .ok_or_else(|| Error::UnknownDialect(label.to_string()))
        };

        let mut matrix = vec![vec![0usize; dialects.len()]; dialects.len()];
        for (id, actual) in gold {
            let predicted = predictions.get(id).ok_or_else(|| {
                Error::InvalidConfig(format!("sentence {id} has no prediction"))
            })?;
            matrix[position(actual)?][position(predicted)?] += 1;
        }

        let scores = (0..dialects.len())
            .map(|i| {
                let true_positives = matrix[i][i];
                let support: usize = matrix[i].iter().sum();
                let predicted: usize = matrix.iter().map(|row| row[i]).sum();
                let precision = ratio(true_positives, predicted);
                let recall = ratio(true_positives, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassScores {
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        Ok(Self {
            dialects: dialects.to_vec(),
            matrix,
            scores,
        })
    }

    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        self.matrix[actual][predicted]
    }

    pub fn scores(&self) -> impl Iterator<Item = (&str, &ClassScores)> {
        self.dialects.iter().map(String::as_str).zip(&self.scores)
    }

    /// Unweighted mean of precision, recall and F1 over all dialects.
    pub fn macro_average(&self) -> (f64, f64, f64) {
        let n = self.scores.len().max(1) as f64;
        let sum = |f: fn(&ClassScores) -> f64| self.scores.iter().map(f).sum::<f64>() / n;
        (sum(|s| s.precision), sum(|s| s.recall), sum(|s| s.f1))
    }

    pub fn accuracy(&self) -> f64 {
        let correct = (0..self.dialects.len()).map(|i| self.matrix[i][i]).sum();
        let total = self.matrix.iter().flatten().sum();
        ratio(correct, total)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Confusion matrix (rows: actual, columns: predicted)")?;
        write!(f, "{:<10}", "")?;
        for dialect in &self.dialects {
            write!(f, "{dialect:>8}")?;
        }
        writeln!(f)?;
        for (dialect, row) in self.dialects.iter().zip(&self.matrix) {
            write!(f, "{dialect:<10}")?;
            for count in row {
                write!(f, "{count:>8}")?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:<10} {:>10} {:>10} {:>10} {:>8}",
            "", "Precision", "Recall", "F1-score", "n"
        )?;
        for (dialect, s) in self.scores() {
            writeln!(
                f,
                "{:<10} {:>10.4} {:>10.4} {:>10.4} {:>8}",
                dialect, s.precision, s.recall, s.f1, s.support
            )?;
        }
        let (precision, recall, f1) = self.macro_average();
        writeln!(
            f,
            "\n{:<10} {:>10.4} {:>10.4} {:>10.4}",
            "Average", precision, recall, f1
        )?;
        write!(f, "Accuracy   {:.4}", self.accuracy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["be".to_string(), "zh".to_string(), "bs".to_string()]
    }

    #[test]
    fn test_counts_and_scores() {
        let gold: Vec<(usize, String)> = [(0, "be"), (1, "be"), (2, "zh"), (3, "zh")]
            .iter()
            .map(|(i, d)| (*i, d.to_string()))
            .collect();
        let predictions: Predictions = [(0, "be"), (1, "zh"), (2, "zh"), (3, "zh")]
            .iter()
            .map(|(i, d)| (*i, d.to_string()))
            .collect();

        let eval = Evaluation::new(&labels(), &gold, &predictions).unwrap();
        assert_eq!(eval.count(0, 1), 1);
        assert_eq!(eval.count(1, 1), 2);

        let scores: Vec<ClassScores> = eval.scores().map(|(_, s)| *s).collect();
        assert_eq!(scores[0].precision, 1.0);
        assert_eq!(scores[0].recall, 0.5);
        assert_eq!(scores[1].precision, 2.0 / 3.0);
        assert_eq!(scores[1].recall, 1.0);
        // No gold and no predicted "bs": zeros rather than NaN.
        assert_eq!(scores[2], ClassScores { precision: 0.0, recall: 0.0, f1: 0.0, support: 0 });
        assert_eq!(eval.accuracy(), 0.75);

        let report = eval.to_string();
        assert!(report.contains("Average"));
        assert!(report.contains("F1-score"));
    }

    #[test]
    fn test_missing_prediction() {
        let gold = vec![(0, "be".to_string())];
        assert!(Evaluation::new(&labels(), &gold, &Predictions::new()).is_err());
    }
}
