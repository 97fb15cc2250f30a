use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span, warn};

use drugmatch_cli::summary::{
    MatchSummary, print_coverage_summary, print_sweep_summary, unmatched_names,
};
use drugmatch_ingest::{
    IngestError, clean_records, explode_combinations, load_dataset, load_vocabulary,
    save_vocabulary, write_atomically, write_matches, write_records,
};
use drugmatch_map::{
    IdentityResolver, SweepGrid, SynonymMap, generate_synonyms, sweep, synonym_coverage,
};
use drugmatch_model::{
    ColumnMapping, DrugRecord, DrugmatchConfig, MatchResult, MatchThresholds,
};
use drugmatch_rxnorm::{CachedLookup, RxNavClient};
use drugmatch_split::{CombinationSplitter, Vocabulary};

use crate::cli::{
    CleanArgs, DatasetPair, DatasetRole, ExplodeArgs, IdentifyArgs, MatchArgs, SplitArgs,
    SweepArgs, SynonymCheckArgs, SynonymsArgs, ThresholdArgs, VocabArgs, VocabularySource,
};

/// Loads the settings file, or defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<DrugmatchConfig> {
    match path {
        Some(path) => {
            let config = DrugmatchConfig::load(path)
                .with_context(|| format!("load config {}", path.display()))?;
            info!(path = %path.display(), "loaded settings");
            Ok(config)
        }
        None => Ok(DrugmatchConfig::default()),
    }
}

pub fn run_clean(config: &DrugmatchConfig, args: &CleanArgs) -> Result<()> {
    let mapping = columns(config, args.role);
    let _span = info_span!("clean", input = %args.input.display()).entered();
    let records = load_dataset(&args.input, mapping).context("load dataset")?;
    let (cleaned, report) = clean_records(records);
    write_records(&args.output, &cleaned, mapping).context("write cleaned dataset")?;
    println!(
        "Cleaned {} records into {} ({} duplicates dropped, {} without indication, {} without date, {} orphan-designated)",
        report.input,
        report.output,
        report.duplicates,
        report.missing_indication,
        report.missing_date,
        report.orphan
    );
    Ok(())
}

pub fn run_vocab(config: &DrugmatchConfig, args: &VocabArgs) -> Result<()> {
    let _span = info_span!("vocab", reference = %args.reference.display()).entered();
    let reference = load_dataset(&args.reference, &config.reference_columns)
        .context("load reference dataset")?;
    let vocabulary = Vocabulary::from_records(&reference);
    save_vocabulary(&args.output, &vocabulary).context("save vocabulary")?;
    println!(
        "Wrote {} ingredient terms to {}",
        vocabulary.len(),
        args.output.display()
    );
    Ok(())
}

pub fn run_split(config: &DrugmatchConfig, args: &SplitArgs) -> Result<()> {
    let vocabulary = resolve_vocabulary(config, &args.vocabulary)?;
    let splitter = CombinationSplitter::new(&vocabulary);
    let mut stdout = io::stdout().lock();
    for name in &args.names {
        let components = splitter.split(name);
        writeln!(stdout, "{name} => {}", components.join(" | "))?;
    }
    Ok(())
}

pub fn run_explode(config: &DrugmatchConfig, args: &ExplodeArgs) -> Result<()> {
    let _span = info_span!("explode", input = %args.input.display()).entered();
    let vocabulary = resolve_vocabulary(config, &args.vocabulary)?;
    let records = load_dataset(&args.input, &config.source_columns).context("load dataset")?;
    let exploded = explode_combinations(&records, &vocabulary).context("explode combinations")?;
    write_records(&args.output, &exploded, &config.source_columns)
        .context("write exploded dataset")?;
    let components = exploded.iter().filter(|r| r.is_combination).count();
    println!(
        "Wrote {} records ({} combination components) to {}",
        exploded.len(),
        components,
        args.output.display()
    );
    Ok(())
}

pub fn run_identify(config: &DrugmatchConfig, args: &IdentifyArgs) -> Result<()> {
    let mapping = columns(config, args.role);
    let _span = info_span!("identify", input = %args.input.display()).entered();
    let records = load_dataset(&args.input, mapping).context("load dataset")?;

    let client = match &args.rxnav_url {
        Some(url) => RxNavClient::with_base_url(url.clone()),
        None => RxNavClient::new(),
    }
    .context("create RxNav client")?;
    let mut lookup = CachedLookup::open(client, &args.cache);

    let progress = progress_bar(records.len());
    let mut identified = Vec::with_capacity(records.len());
    for record in &records {
        progress.set_message(record.name.clone());
        identified.push(lookup.assign(record));
        progress.inc(1);
    }
    progress.finish_and_clear();

    lookup.save().context("save identifier cache")?;
    write_records(&args.output, &identified, mapping).context("write identified dataset")?;
    let found = identified.iter().filter(|r| r.identifier.is_some()).count();
    println!(
        "{found} of {} records have an RxCUI; wrote {}",
        identified.len(),
        args.output.display()
    );
    Ok(())
}

pub fn run_synonyms(config: &DrugmatchConfig, args: &SynonymsArgs) -> Result<()> {
    let _span = info_span!("synonyms").entered();
    let (sources, targets) = load_pair(config, &args.datasets)?;
    let synonyms = load_synonyms(args.datasets.synonyms.as_deref())?;
    let thresholds = thresholds(config, &args.thresholds)?;

    let results = IdentityResolver::new(thresholds, &synonyms).resolve(&sources, &targets);
    let unmatched = unmatched_names(&sources, &results);
    let min_score = args.min_score.unwrap_or(config.synonym_min_score);
    let proposed = generate_synonyms(
        &unmatched,
        targets.iter().map(|r| r.name.as_str()),
        min_score,
    );
    proposed.save(&args.output).context("save synonyms")?;
    println!(
        "Proposed {} synonyms for {} unmatched names; wrote {}",
        proposed.len(),
        unmatched.len(),
        args.output.display()
    );
    Ok(())
}

pub fn run_synonym_check(config: &DrugmatchConfig, args: &SynonymCheckArgs) -> Result<()> {
    let _span = info_span!("synonym_check").entered();
    let Some(synonyms_path) = args.datasets.synonyms.as_deref() else {
        bail!("synonym-check needs --synonyms");
    };
    let synonyms = load_synonyms(Some(synonyms_path))?;
    let (sources, targets) = load_pair(config, &args.datasets)?;
    let thresholds = thresholds(config, &args.thresholds)?;
    let results = IdentityResolver::new(thresholds, &synonyms).resolve(&sources, &targets);

    let names: Vec<String> = match &args.names {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("read names {}", path.display()))?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        None => sources.iter().map(|r| r.name.clone()).collect(),
    };
    let coverage = synonym_coverage(&synonyms, &names, &results);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&coverage)?;
        write_text(path, &json).context("write synonym coverage")?;
    }
    print_coverage_summary(&coverage);
    Ok(())
}

pub fn run_match(config: &DrugmatchConfig, args: &MatchArgs) -> Result<MatchSummary> {
    let started = Instant::now();
    let (sources, targets) = load_pair(config, &args.datasets)?;
    let synonyms = load_synonyms(args.datasets.synonyms.as_deref())?;
    let thresholds = thresholds(config, &args.thresholds)?;

    let results: Vec<MatchResult> = info_span!("resolve")
        .in_scope(|| IdentityResolver::new(thresholds, &synonyms).resolve(&sources, &targets));
    write_matches(&args.output, &results).context("write match report")?;

    if let Some(path) = &args.unmatched {
        let names = unmatched_names(&sources, &results);
        write_lines(path, &names)?;
        info!(path = %path.display(), names = names.len(), "wrote unmatched names");
    }

    let summary = MatchSummary::new(&sources, &targets, &results);
    info!(
        matches = summary.matches,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "matching complete"
    );
    Ok(summary)
}

pub fn run_sweep(config: &DrugmatchConfig, args: &SweepArgs) -> Result<()> {
    let (sources, targets) = load_pair(config, &args.datasets)?;
    let synonyms = load_synonyms(args.datasets.synonyms.as_deref())?;
    let mut grid = SweepGrid::default();
    if !args.jaro_winkler.is_empty() {
        grid.jaro_winkler.clone_from(&args.jaro_winkler);
    }
    if !args.jaccard.is_empty() {
        grid.jaccard.clone_from(&args.jaccard);
    }
    for &value in grid.jaro_winkler.iter().chain(&grid.jaccard) {
        if !(0.0..=1.0).contains(&value) {
            bail!("sweep threshold {value} is outside 0-1");
        }
    }

    let rows = sweep(&sources, &targets, config.thresholds, &grid, &synonyms);
    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&rows)?;
        write_text(path, &json).context("write sweep results")?;
    }
    print_sweep_summary(&rows);
    Ok(())
}

fn columns(config: &DrugmatchConfig, role: DatasetRole) -> &ColumnMapping {
    match role {
        DatasetRole::Source => &config.source_columns,
        DatasetRole::Reference => &config.reference_columns,
    }
}

/// Applies flag overrides on top of the configured thresholds.
fn thresholds(
    config: &DrugmatchConfig,
    args: &ThresholdArgs,
) -> Result<MatchThresholds> {
    let mut thresholds = config.thresholds;
    if let Some(value) = args.jaro_winkler {
        thresholds = thresholds.with_jaro_winkler(value);
    }
    if let Some(value) = args.jaccard {
        thresholds = thresholds.with_jaccard(value);
    }
    if let Some(value) = args.token_set {
        thresholds = thresholds.with_token_set(value);
    }
    if let Some(value) = args.ratio {
        thresholds = thresholds.with_ratio(value);
    }
    thresholds.validate().context("invalid thresholds")?;
    Ok(thresholds)
}

fn load_pair(
    config: &DrugmatchConfig,
    datasets: &DatasetPair,
) -> Result<(Vec<DrugRecord>, Vec<DrugRecord>)> {
    let _span = info_span!("ingest").entered();
    let sources = load_dataset(&datasets.source, &config.source_columns)
        .with_context(|| format!("load source dataset {}", datasets.source.display()))?;
    let targets = load_dataset(&datasets.reference, &config.reference_columns)
        .with_context(|| format!("load reference dataset {}", datasets.reference.display()))?;
    Ok((sources, targets))
}

fn load_synonyms(path: Option<&Path>) -> Result<SynonymMap> {
    match path {
        Some(path) => SynonymMap::load(path).context("load synonyms"),
        None => Ok(SynonymMap::default()),
    }
}

/// Loads the saved vocabulary, rebuilding and saving it from the reference
/// dataset when the file is missing.
fn resolve_vocabulary(config: &DrugmatchConfig, source: &VocabularySource) -> Result<Vocabulary> {
    if let Some(path) = &source.vocab
        && let Some(vocabulary) = load_vocabulary(path).context("load vocabulary")?
    {
        return Ok(vocabulary);
    }
    let Some(reference) = &source.reference else {
        bail!("no vocabulary available; pass --vocab with a saved vocabulary or --reference");
    };
    let records = load_dataset(reference, &config.reference_columns)
        .context("load reference dataset")?;
    let vocabulary = Vocabulary::from_records(&records);
    match &source.vocab {
        Some(path) => save_vocabulary(path, &vocabulary).context("save vocabulary")?,
        None => warn!("vocabulary rebuilt without --vocab; it will not be saved"),
    }
    Ok(vocabulary)
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut text = lines.join("\n");
    text.push('\n');
    write_text(path, &text).with_context(|| format!("write {}", path.display()))
}

fn write_text(path: &Path, text: &str) -> Result<(), IngestError> {
    write_atomically(path, |writer| {
        writer
            .write_all(text.as_bytes())
            .map_err(|source| IngestError::FileWrite {
                path: path.to_path_buf(),
                source,
            })
    })
}

fn progress_bar(len: usize) -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len as u64).with_style(style)
}
