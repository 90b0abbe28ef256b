use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const APP_NAME: &str = "heli-dialect";

/// Which classifier variant [`crate::classifier::Classifier`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// One-shot cost minimisation over all dialects.
    Heli,
    /// Self-training loop over the test set, then the basic method.
    AdaptiveHeli,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelKind,
    /// Closed label set. Order matters: it breaks exact score ties.
    pub dialects: Vec<String>,
    pub orders: Vec<usize>,
    pub n_eval: usize,
    pub penalty: f64,
    pub cutoff: f64,
    pub symbols_to_remove: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelKind::Heli,
            dialects: ["ch_sg", "ch_be", "ch_gr", "ch_zh", "ch_vs", "ch_bs", "ch_ag", "ch_lu"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            orders: vec![1, 2, 3, 4],
            n_eval: 4,
            penalty: 5.8,
            cutoff: 0.0,
            symbols_to_remove: ["\"", "«", "»", ".", ",", "?", "!", "(", ")", "[", "]", "&"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Build a config for the given labels and orders, keeping the other defaults.
    pub fn with_dialects<S: AsRef<str>>(dialects: &[S], orders: &[usize], n_eval: usize) -> Self {
        Self {
            dialects: dialects.iter().map(|d| d.as_ref().to_string()).collect(),
            orders: orders.to_vec(),
            n_eval,
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        match confy::load::<Self>(APP_NAME, Some("config")) {
            Ok(config) => Ok(config),
            Err(err) => {
                log::warn!("Failed to load config, using defaults: {err}");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(confy::load_path(path)?)
    }

    pub fn save(&self) -> Result<()> {
        Ok(confy::store(APP_NAME, Some("config"), self)?)
    }

    /// Check every setting before any training or scoring starts.
    pub fn validate(&self) -> Result<()> {
        if self.dialects.is_empty() {
            return Err(Error::InvalidConfig("dialect set is empty".into()));
        }
        for (i, dialect) in self.dialects.iter().enumerate() {
            if dialect.trim().is_empty() {
                return Err(Error::InvalidConfig("dialect labels must not be blank".into()));
            }
            if self.dialects[..i].contains(dialect) {
                return Err(Error::InvalidConfig(format!("dialect '{dialect}' is listed twice")));
            }
        }

        if self.orders.is_empty() {
            return Err(Error::InvalidConfig("no n-gram orders configured".into()));
        }
        if self.orders.contains(&0) {
            return Err(Error::InvalidConfig("n-gram orders must be positive".into()));
        }
        if !self.orders.contains(&self.n_eval) {
            return Err(Error::InvalidConfig(format!(
                "n_eval = {} is not one of the trained orders {:?}",
                self.n_eval, self.orders
            )));
        }

        if !self.penalty.is_finite() || self.penalty < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "penalty must be a finite non-negative number, got {}",
                self.penalty
            )));
        }
        // Written this way so that NaN is rejected too.
        if !(0.0..=1.0).contains(&self.cutoff) {
            return Err(Error::InvalidConfig(format!(
                "cutoff must lie in [0, 1], got {}",
                self.cutoff
            )));
        }

        Ok(())
    }

    /// Orders with duplicates removed, in configured order.
    pub fn distinct_orders(&self) -> Vec<usize> {
        let mut orders = Vec::with_capacity(self.orders.len());
        for &n in &self.orders {
            if !orders.contains(&n) {
                orders.push(n);
            }
        }
        orders
    }
}
