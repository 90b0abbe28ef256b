//! HeLi dialect identification.
//!
//! Identifies which dialect of a closed label set a short text belongs to
//! from character n-gram statistics.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────────┐
//! │ Training rows   │ ← dialect + sentence, n-grams per order (corpus.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ DialectModel    │ ← counts → -log10(count / distinct) (model.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ HeliScorer      │ ← word and sentence costs, lower is better (scorer.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Classifier      │ ← basic argmin, or adaptive self-training (classifier.rs, adaptive.rs)
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - `ngram`: character n-gram extraction
//! - `model`: count and value tables per dialect and order
//! - `scorer`: HeLi word and sentence costs
//! - `classifier`: basic classifier and the variant factory
//! - `adaptive`: adaptive classifier and its step-by-step session
//! - `corpus`: sentence rows and a tab-separated corpus reader
//! - `persistence`: JSON model files
//! - `evaluate`: confusion matrix and precision/recall/F1
//! - `config`: settings, stored with `confy`

pub mod adaptive;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod ngram;
pub mod persistence;
pub mod scorer;

pub use crate::adaptive::{AdaptiveClassifier, AdaptiveRun, AdaptiveSession};
pub use crate::classifier::{BasicClassifier, Classifier, Predictions};
pub use crate::config::{Config, ModelKind};
pub use crate::corpus::{Sentence, TestRow, TrainingRow};
pub use crate::error::{Error, Result};
pub use crate::model::{DialectModel, NGramTable};
pub use crate::scorer::HeliScorer;
