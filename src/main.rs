//! heli-dialect - train and run HeLi dialect classifiers from the command line.
//!
//! # Commands
//!
//! - `train`: count n-grams of a labelled corpus and save the model
//! - `classify`: label one sentence per line of a text file
//! - `evaluate`: classify a labelled corpus and report precision/recall/F1
//!
//! Labelled corpora are `dialect<TAB>sentence` lines. Settings come from
//! the `confy` config file (or `--config`); a saved model carries the
//! settings it was trained with, and `classify`/`evaluate` reuse them.

use clap::{Parser, Subcommand};
use heli_dialect::corpus::{read_test, read_training, read_unlabelled};
use heli_dialect::evaluate::Evaluation;
use heli_dialect::persistence::{load_model, save_model};
use heli_dialect::{Classifier, Config, DialectModel, ModelKind};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "heli-dialect")]
#[command(about = "Character n-gram dialect identification")]
#[command(version)]
struct Args {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model from a labelled corpus
    Train {
        /// Labelled corpus (dialect<TAB>sentence per line)
        #[arg(long)]
        corpus: PathBuf,

        /// Where to write the model
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Classify one sentence per line
    Classify {
        #[command(flatten)]
        run: RunArgs,

        /// Sentences to classify
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Classify a labelled corpus and report scores
    Evaluate {
        #[command(flatten)]
        run: RunArgs,

        /// Labelled test corpus
        #[arg(short, long)]
        test: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Model written by `train`
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Use the adaptive classifier
    #[arg(long)]
    adaptive: bool,

    /// Fraction of sentences left to the final plain pass (adaptive only)
    #[arg(long)]
    cutoff: Option<f64>,
}

/// `<data dir>/heli-dialect/model.json`, or `model.json` in the current directory.
fn default_model_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(mut path) => {
            path.push("heli-dialect");
            path.push("model.json");
            path
        }
        None => PathBuf::from("model.json"),
    }
}

fn load_config(path: Option<&Path>) -> heli_dialect::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => {
            let config = Config::load()?;
            // Persist defaults so users get a concrete config file on first run.
            if let Err(err) = config.save() {
                log::warn!("Failed to persist config defaults: {err}");
            }
            Ok(config)
        }
    }
}

/// Load a saved model and build the classifier asked for on the command line.
fn load_classifier(run: &RunArgs) -> Result<Classifier, Box<dyn std::error::Error>> {
    let path = run.model.clone().unwrap_or_else(default_model_path);
    let (mut config, model): (Config, DialectModel) = load_model(&path)?;

    if run.adaptive {
        config.model = ModelKind::AdaptiveHeli;
    }
    if let Some(cutoff) = run.cutoff {
        if config.model != ModelKind::AdaptiveHeli {
            log::warn!("--cutoff only affects the adaptive classifier");
        }
        config.cutoff = cutoff;
    }

    log::info!("loaded {:?} model from {}", config.model, path.display());
    Ok(Classifier::from_model(config, model)?)
}

fn open(path: &Path) -> Result<BufReader<File>, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    Ok(BufReader::new(file))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Train { corpus, output } => {
            let config = load_config(args.config.as_deref())?;
            config.validate()?;
            let rows = read_training(open(&corpus)?, &config)?;
            let model = DialectModel::train(&config, &rows)?;

            let output = output.unwrap_or_else(default_model_path);
            save_model(&output, &config, &model)?;
            println!("Model trained on {} sentences, saved to {}", rows.len(), output.display());
        }
        Command::Classify { run, input } => {
            let classifier = load_classifier(&run)?;
            let rows = read_unlabelled(open(&input)?, classifier.config())?;
            let predictions = classifier.predict(&rows)?;

            for row in &rows {
                if let Some(dialect) = predictions.get(&row.id) {
                    println!("{}\t{}\t{}", row.id, dialect, row.sentence.text());
                }
            }
        }
        Command::Evaluate { run, test } => {
            let classifier = load_classifier(&run)?;
            let config = classifier.config();
            let rows = read_test(open(&test)?, config)?;
            let predictions = classifier.predict(&rows)?;

            let gold: Vec<(usize, String)> = rows
                .iter()
                .filter_map(|row| row.dialect.clone().map(|d| (row.id, d)))
                .collect();
            let evaluation = Evaluation::new(&config.dialects, &gold, &predictions)?;

            println!(
                "Results for {:?} with n_eval={}, cutoff={}, penalty={}\n",
                config.model, config.n_eval, config.cutoff, config.penalty
            );
            println!("{evaluation}");
        }
    }

    Ok(())
}
