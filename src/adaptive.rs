//! Adaptive HeLi: self-training on the test set.
//!
//! Every test sentence starts out *pending*. While more than
//! `floor(cutoff * N)` sentences are pending, one round runs:
//!
//! 1. Score every pending sentence against every dialect.
//! 2. The confidence of a sentence is the gap between its second-lowest
//!    and lowest cost. The most confident sentence is accepted with its
//!    best dialect (earliest sentence on equal confidence).
//! 3. The accepted sentence's n-grams, all orders, are merged into that
//!    dialect only, and that dialect's values are recomputed.
//!
//! The sentences still pending at the end are classified in one plain
//! HeLi pass against the adapted model.
//!
//! A round only changes one dialect's tables, so the costs of all other
//! dialects are carried over from the previous round and only the
//! changed dialect's column is rescored. Both are produced by the same
//! function over the same tables, so the result is the same as a full
//! rescoring.

use crate::classifier::{best_dialect, check_model, check_unique_ids, Predictions};
use crate::config::Config;
use crate::corpus::{TestRow, TrainingRow};
use crate::error::Result;
use crate::model::DialectModel;
use crate::scorer::{best_with_margin, HeliScorer};

/// A sentence taken over into the model during the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Acceptance {
    pub id: usize,
    pub dialect: String,
    pub margin: f64,
}

/// Outcome of a full adaptive run.
#[derive(Debug, Clone)]
pub struct AdaptiveRun {
    pub predictions: Predictions,
    /// In acceptance order.
    pub accepted: Vec<Acceptance>,
    /// Ids left to the final plain pass, in input order.
    pub residual: Vec<usize>,
    /// The working model as of loop termination.
    pub model: DialectModel,
}

struct Pending {
    row: usize,
    scores: Vec<f64>,
}

/// Step-by-step driver of the adaptive loop over one test set.
pub struct AdaptiveSession<'r> {
    config: Config,
    model: DialectModel,
    rows: &'r [TestRow],
    pending: Vec<Pending>,
    accepted: Vec<Acceptance>,
    target: usize,
}

impl<'r> AdaptiveSession<'r> {
    /// Start a session on a working copy of the model.
    ///
    /// # Errors
    /// Fails before any scoring if the configuration is invalid, the model
    /// does not match it, or two rows share an id.
    pub fn new(config: &Config, model: DialectModel, rows: &'r [TestRow]) -> Result<Self> {
        check_model(config, &model)?;
        check_unique_ids(rows)?;

        let target = (config.cutoff * rows.len() as f64).floor() as usize;
        let pending = {
            let scorer = HeliScorer::new(&model, config.penalty);
            rows.iter()
                .enumerate()
                .map(|(row, test)| {
                    Ok(Pending {
                        row,
                        scores: scorer.scores(&test.sentence, config.n_eval)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?
        };

        log::info!(
            "adaptive run: {} sentences, {} to accept, n_eval={}, cutoff={}, penalty={}",
            rows.len(),
            rows.len() - target,
            config.n_eval,
            config.cutoff,
            config.penalty
        );

        Ok(Self {
            config: config.clone(),
            model,
            rows,
            pending,
            accepted: Vec::new(),
            target,
        })
    }

    /// Number of sentences left to the final plain pass.
    pub fn target(&self) -> usize {
        self.target
    }

    pub fn is_done(&self) -> bool {
        self.pending.len() <= self.target
    }

    /// Still-pending rows, in input order.
    pub fn pending(&self) -> impl Iterator<Item = &'r TestRow> + '_ {
        let rows = self.rows;
        self.pending.iter().map(move |p| &rows[p.row])
    }

    pub fn accepted(&self) -> &[Acceptance] {
        &self.accepted
    }

    pub fn model(&self) -> &DialectModel {
        &self.model
    }

    /// Current per-dialect costs of a pending sentence.
    pub fn pending_scores(&self, id: usize) -> Option<&[f64]> {
        self.pending
            .iter()
            .find(|p| self.rows[p.row].id == id)
            .map(|p| p.scores.as_slice())
    }

    /// Run one round. Returns `None` once the cutoff is reached.
    pub fn step(&mut self) -> Result<Option<Acceptance>> {
        if self.is_done() {
            return Ok(None);
        }

        let remaining = self.pending.len() - self.target;
        if remaining % 100 == 0 {
            log::info!("{remaining} sentences left to accept");
        }

        let mut chosen: Option<(usize, usize, f64)> = None;
        for (pos, pending) in self.pending.iter().enumerate() {
            if let Some((best, margin)) = best_with_margin(&pending.scores) {
                match chosen {
                    Some((_, _, top)) if margin <= top => {}
                    _ => chosen = Some((pos, best, margin)),
                }
            }
        }
        let Some((pos, dialect, margin)) = chosen else {
            return Ok(None);
        };

        let taken = self.pending.remove(pos);
        let row = &self.rows[taken.row];
        let label = self.config.dialects[dialect].clone();
        self.model.merge(&label, &row.sentence)?;

        let scorer = HeliScorer::new(&self.model, self.config.penalty);
        for pending in self.pending.iter_mut() {
            pending.scores[dialect] =
                scorer.score_at(dialect, &self.rows[pending.row].sentence, self.config.n_eval)?;
        }

        log::debug!("accepted sentence {} as {} (margin {:.4})", row.id, label, margin);
        let acceptance = Acceptance {
            id: row.id,
            dialect: label,
            margin,
        };
        self.accepted.push(acceptance.clone());
        Ok(Some(acceptance))
    }

    /// Finish the loop and classify the remaining sentences.
    pub fn finish(mut self) -> Result<AdaptiveRun> {
        while self.step()?.is_some() {}

        let mut predictions: Predictions = self
            .accepted
            .iter()
            .map(|a| (a.id, a.dialect.clone()))
            .collect();

        let scorer = HeliScorer::new(&self.model, self.config.penalty);
        let mut residual = Vec::with_capacity(self.pending.len());
        for pending in &self.pending {
            let row = &self.rows[pending.row];
            let best = best_dialect(&scorer, &row.sentence, self.config.n_eval)?;
            predictions.insert(row.id, self.config.dialects[best].clone());
            residual.push(row.id);
        }

        log::info!(
            "adaptive run done: {} accepted, {} by plain pass",
            self.accepted.len(),
            residual.len()
        );

        Ok(AdaptiveRun {
            predictions,
            accepted: self.accepted,
            residual,
            model: self.model,
        })
    }
}

/// HeLi with test-time self-training.
#[derive(Debug, Clone)]
pub struct AdaptiveClassifier {
    config: Config,
    model: DialectModel,
}

impl AdaptiveClassifier {
    pub fn new(config: Config, model: DialectModel) -> Result<Self> {
        check_model(&config, &model)?;
        Ok(Self { config, model })
    }

    pub fn train(config: Config, rows: &[TrainingRow]) -> Result<Self> {
        let model = DialectModel::train(&config, rows)?;
        Ok(Self { config, model })
    }

    /// Run the adaptive loop on a copy of the trained model.
    pub fn predict(&self, rows: &[TestRow]) -> Result<AdaptiveRun> {
        self.session(rows)?.finish()
    }

    /// Run the adaptive loop and keep the adapted model.
    pub fn predict_in_place(&mut self, rows: &[TestRow]) -> Result<Predictions> {
        let run = self.predict(rows)?;
        self.model = run.model;
        Ok(run.predictions)
    }

    pub fn session<'r>(&self, rows: &'r [TestRow]) -> Result<AdaptiveSession<'r>> {
        AdaptiveSession::new(&self.config, self.model.clone(), rows)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &DialectModel {
        &self.model
    }
}
