//! Saving and loading trained models.
//!
//! Only the n-gram tables and the configuration that produced them are
//! written, as JSON. Floats are written and parsed with exact
//! round-tripping, so a loaded model scores bit for bit like the saved
//! one. Files are written to a temporary file next to the target and then
//! renamed over it.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{DialectModel, DialectTables, NGramTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct TableState {
    counts: BTreeMap<String, u64>,
    values: BTreeMap<String, f64>,
}

#[derive(Serialize, Deserialize)]
struct DialectState {
    dialect: String,
    tables: BTreeMap<usize, TableState>,
}

#[derive(Serialize, Deserialize)]
struct SerializableState {
    version: u32,
    config: Config,
    dialects: Vec<DialectState>,
}

impl SerializableState {
    fn capture(config: &Config, model: &DialectModel) -> Self {
        let dialects = model
            .dialect_tables()
            .iter()
            .map(|d| DialectState {
                dialect: d.label.clone(),
                tables: d
                    .tables
                    .iter()
                    .map(|(&n, table)| {
                        let state = TableState {
                            counts: table.counts().iter().map(|(g, &c)| (g.clone(), c)).collect(),
                            values: table.values().iter().map(|(g, &v)| (g.clone(), v)).collect(),
                        };
                        (n, state)
                    })
                    .collect(),
            })
            .collect();

        Self {
            version: FORMAT_VERSION,
            config: config.clone(),
            dialects,
        }
    }

    fn restore(self, path: &Path) -> Result<(Config, DialectModel)> {
        let invalid = |message: String| Error::Model {
            path: path.to_path_buf(),
            message,
        };

        if self.version != FORMAT_VERSION {
            return Err(invalid(format!("unsupported format version {}", self.version)));
        }
        self.config.validate()?;

        let dialects = self
            .dialects
            .into_iter()
            .map(|d| DialectTables {
                label: d.dialect,
                tables: d
                    .tables
                    .into_iter()
                    .map(|(n, t)| {
                        let table = NGramTable::from_parts(
                            t.counts.into_iter().collect(),
                            t.values.into_iter().collect(),
                        );
                        (n, table)
                    })
                    .collect(),
            })
            .collect();
        let model = DialectModel::assemble(self.config.distinct_orders(), dialects);

        if !model.matches_config(&self.config) {
            return Err(invalid("tables do not match the stored configuration".into()));
        }
        for (dialect, tables) in model.dialect_tables().iter().map(|d| (&d.label, &d.tables)) {
            let complete = tables.len() == model.orders().len()
                && model.orders().iter().all(|n| tables.contains_key(n));
            if !complete {
                return Err(invalid(format!("dialect '{dialect}' is missing n-gram orders")));
            }
        }

        Ok((self.config, model))
    }
}

/// Write `model` and the configuration that produced it to `path`.
pub fn save_model(path: &Path, config: &Config, model: &DialectModel) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let state = SerializableState::capture(config, model);

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer(&mut writer, &state)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| Error::Io(e.error))?;

    log::info!("saved model to {}", path.display());
    Ok(())
}

/// Read a model written by [`save_model`].
pub fn load_model(path: &Path) -> Result<(Config, DialectModel)> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let state: SerializableState = serde_json::from_reader(reader)?;
    state.restore(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Sentence, TrainingRow};
    use crate::scorer::HeliScorer;

    fn trained() -> (Config, DialectModel) {
        let config = Config::with_dialects(&["ch_be", "ch_zh"], &[1, 2, 3], 3);
        let rows = vec![
            TrainingRow::new("ch_be", "i ha no nüt gässe", &config.orders),
            TrainingRow::new("ch_zh", "ich han no nüt ggässe", &config.orders),
            TrainingRow::new("ch_zh", "mir gönd hüt", &config.orders),
        ];
        let model = DialectModel::train(&config, &rows).unwrap();
        (config, model)
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let (config, model) = trained();

        save_model(&path, &config, &model).unwrap();
        let (loaded_config, loaded) = load_model(&path).unwrap();

        assert_eq!(loaded_config, config);
        assert_eq!(loaded, model);

        let sentence = Sentence::new("ich ha nüt gässe", &config.orders);
        let before = HeliScorer::new(&model, config.penalty).scores(&sentence, 3).unwrap();
        let after = HeliScorer::new(&loaded, config.penalty).scores(&sentence, 3).unwrap();
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_rejects_mismatched_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let (config, model) = trained();
        save_model(&path, &config, &model).unwrap();

        let mut state: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        state["config"]["dialects"] = serde_json::json!(["ch_zh", "ch_be"]);
        fs::write(&path, state.to_string()).unwrap();

        assert!(matches!(load_model(&path), Err(Error::Model { .. })));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_model(&dir.path().join("absent.json")),
            Err(Error::Io(_))
        ));
    }
}
