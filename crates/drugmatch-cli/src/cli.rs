//! CLI argument definitions for drugmatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "drugmatch",
    version,
    about = "Reconcile drug names between a source dataset and a reference dataset",
    long_about = "Reconcile drug names between a source dataset and a reference dataset.\n\n\
                  Cleans and splits combination products, attaches RxNorm identifiers,\n\
                  and links records by identifier or by consensus fuzzy matching."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (TOML) with thresholds and column names.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Strip dosage forms, normalize dates and drop duplicate names.
    Clean(CleanArgs),

    /// Build the ingredient vocabulary from a reference dataset.
    Vocab(VocabArgs),

    /// Print the ingredients found in one or more product names.
    Split(SplitArgs),

    /// Write one record per ingredient of each combination product.
    Explode(ExplodeArgs),

    /// Attach RxNorm identifiers using RxNav and a local cache.
    Identify(IdentifyArgs),

    /// Propose synonyms for source names that found no match.
    Synonyms(SynonymsArgs),

    /// Report which names a synonym map rewrote and whether they matched.
    SynonymCheck(SynonymCheckArgs),

    /// Match source records against reference records.
    Match(MatchArgs),

    /// Count matches across a grid of thresholds.
    Sweep(SweepArgs),
}

/// Which column preset a dataset is read with.
#[derive(Clone, Copy, ValueEnum)]
pub enum DatasetRole {
    Source,
    Reference,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Dataset to clean (CSV or Parquet).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Cleaned CSV to write.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Column preset of the input dataset.
    #[arg(long = "role", value_enum, default_value = "source")]
    pub role: DatasetRole,
}

#[derive(Args)]
pub struct VocabArgs {
    /// Reference dataset providing single-ingredient names.
    #[arg(value_name = "REFERENCE")]
    pub reference: PathBuf,

    /// Vocabulary JSON to write.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,
}

/// Where the vocabulary comes from.
#[derive(Args)]
pub struct VocabularySource {
    /// Saved vocabulary JSON.
    #[arg(long = "vocab", value_name = "PATH")]
    pub vocab: Option<PathBuf>,

    /// Reference dataset used to build the vocabulary when no saved one exists.
    #[arg(long = "reference", value_name = "PATH")]
    pub reference: Option<PathBuf>,
}

#[derive(Args)]
pub struct SplitArgs {
    /// Product names to split.
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    #[command(flatten)]
    pub vocabulary: VocabularySource,
}

#[derive(Args)]
pub struct ExplodeArgs {
    /// Cleaned source dataset.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Exploded CSV to write.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub vocabulary: VocabularySource,
}

#[derive(Args)]
pub struct IdentifyArgs {
    /// Dataset to annotate.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Annotated CSV to write.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Column preset of the input dataset.
    #[arg(long = "role", value_enum, default_value = "source")]
    pub role: DatasetRole,

    /// Identifier cache (JSON, created when missing).
    #[arg(long = "cache", value_name = "PATH", default_value = "rxnorm_cache.json")]
    pub cache: PathBuf,

    /// RxNav endpoint override.
    #[arg(long = "rxnav-url", value_name = "URL")]
    pub rxnav_url: Option<String>,
}

/// Matching threshold overrides; unset flags keep the configured values.
#[derive(Args)]
pub struct ThresholdArgs {
    /// Minimum Jaro-Winkler similarity (0-1).
    #[arg(long = "jaro-winkler", value_name = "SCORE")]
    pub jaro_winkler: Option<f64>,

    /// Minimum Jaccard token overlap for candidates (0-1).
    #[arg(long = "jaccard", value_name = "SCORE")]
    pub jaccard: Option<f64>,

    /// Minimum token-set ratio (0-100).
    #[arg(long = "token-set", value_name = "SCORE")]
    pub token_set: Option<f64>,

    /// Minimum Levenshtein ratio (0-100).
    #[arg(long = "ratio", value_name = "SCORE")]
    pub ratio: Option<f64>,
}

/// Datasets compared by match, synonyms and sweep.
#[derive(Args)]
pub struct DatasetPair {
    /// Source dataset.
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Reference dataset.
    #[arg(value_name = "REFERENCE")]
    pub reference: PathBuf,

    /// Synonym map applied to source names (JSON).
    #[arg(long = "synonyms", value_name = "PATH")]
    pub synonyms: Option<PathBuf>,
}

#[derive(Args)]
pub struct MatchArgs {
    #[command(flatten)]
    pub datasets: DatasetPair,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Match report CSV to write.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Also write unmatched source names, one per line.
    #[arg(long = "unmatched", value_name = "PATH")]
    pub unmatched: Option<PathBuf>,
}

#[derive(Args)]
pub struct SynonymsArgs {
    #[command(flatten)]
    pub datasets: DatasetPair,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Synonym JSON to write.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Minimum token-set ratio for a proposed synonym (0-100).
    #[arg(long = "min-score", value_name = "SCORE")]
    pub min_score: Option<f64>,
}

#[derive(Args)]
pub struct SynonymCheckArgs {
    #[command(flatten)]
    pub datasets: DatasetPair,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Raw names to check, one per line (defaults to every source name).
    #[arg(long = "names", value_name = "PATH")]
    pub names: Option<PathBuf>,

    /// Also write the report as JSON.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct SweepArgs {
    #[command(flatten)]
    pub datasets: DatasetPair,

    /// Jaro-Winkler thresholds to try.
    #[arg(long = "jw", value_name = "SCORE", value_delimiter = ',')]
    pub jaro_winkler: Vec<f64>,

    /// Jaccard thresholds to try.
    #[arg(long = "jaccard", value_name = "SCORE", value_delimiter = ',')]
    pub jaccard: Vec<f64>,

    /// Also write the sweep rows as JSON.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
