// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! `rrx`: run a rule file against a text file.
//!
//! `rrx apply` performs the batch replace and writes the result; `rrx scan`
//! prints the spans the highlight engine would decorate, with timings.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use replace_rules::highlight::VisibleWindow;
use replace_rules::{BatchReplacer, EngineConfig, HighlightEngine, MatchSource, PreviewPattern, RuleStore};

#[derive(Debug, Parser)]
#[command(name = "rrx", version, about = "Ordered regex find/replace rules")]
struct Cli {
    /// JSON rule list: [{"find": ..., "replace": ..., "flags": ..., "enabled": ...}]
    #[arg(short, long, global = true)]
    rules: Option<PathBuf>,

    /// JSON engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply every enabled rule, in order, to a file
    Apply {
        input: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Rewrite the input file
        #[arg(long, conflicts_with = "output")]
        in_place: bool,
    },
    /// List the spans the rules (and an optional preview pattern) highlight
    Scan {
        input: PathBuf,
        /// Preview pattern to highlight alongside the rules, plain or as
        /// /pattern/flags
        #[arg(long)]
        preview: Option<String>,
        /// Byte range to treat as visible, as START..END (defaults to the whole file)
        #[arg(long, value_parser = parse_range)]
        visible: Vec<std::ops::Range<usize>>,
    },
}

fn parse_range(value: &str) -> Result<std::ops::Range<usize>, String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {value:?}"))?;
    let start = start.trim().parse::<usize>().map_err(|e| e.to_string())?;
    let end = end.trim().parse::<usize>().map_err(|e| e.to_string())?;
    if end < start {
        return Err(format!("range end {end} is before start {start}"));
    }
    Ok(start..end)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json(&read(path)?)
            .with_context(|| format!("invalid config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let store = match &cli.rules {
        Some(path) => RuleStore::from_json(&read(path)?)
            .with_context(|| format!("invalid rule list {}", path.display()))?,
        None => RuleStore::new(),
    };

    match cli.command {
        Command::Apply {
            input,
            output,
            in_place,
        } => apply(&store, &input, output.as_deref(), in_place),
        Command::Scan {
            input,
            preview,
            visible,
        } => {
            let preview = preview.as_deref().and_then(PreviewPattern::parse_input);
            scan(&store, &config, &input, preview.as_ref(), &visible)
        }
    }
}

/// `RUST_LOG` when it is set and parses, `info` otherwise.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn apply(store: &RuleStore, input: &Path, output: Option<&Path>, in_place: bool) -> Result<()> {
    let text = read(input)?;
    let started = Instant::now();
    let outcome = BatchReplacer::compile(store.rules())?.apply(&text);
    info!(
        applied = outcome.applied,
        replacements = outcome.replacements,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch replace finished"
    );

    let target = if in_place { Some(input) } else { output };
    match target {
        Some(path) => fs::write(path, &outcome.text)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => io::stdout().write_all(outcome.text.as_bytes())?,
    }
    Ok(())
}

fn scan(
    store: &RuleStore,
    config: &EngineConfig,
    input: &Path,
    preview: Option<&PreviewPattern>,
    visible: &[std::ops::Range<usize>],
) -> Result<()> {
    if store.is_empty() && preview.is_none() {
        bail!("nothing to scan: pass --rules and/or --preview");
    }
    let text = read(input)?;
    let visible = if visible.is_empty() {
        VisibleWindow::whole(&text).ranges().to_vec()
    } else {
        visible.to_vec()
    };

    let engine = HighlightEngine::new(config);
    let started = Instant::now();
    let result = engine.recompute(&text, store.rules(), preview, &visible);
    let elapsed = started.elapsed();

    let mut out = io::stdout().lock();
    for (style, spans) in &result.spans {
        for span in spans {
            let source = match span.source {
                MatchSource::Rule(index) => format!("rule#{}", index + 1),
                MatchSource::Preview => "preview".to_string(),
            };
            writeln!(out, "{source}\t{}..{}\t{:?}", span.start, span.end, span.text)?;
        }
        if spans.is_empty() {
            writeln!(out, "# {style:?}: no matches")?;
        }
    }
    for notice in &result.notices {
        writeln!(out, "# {}: {}", notice.kind, notice.message)?;
    }
    if let Some(err) = &result.preview_error {
        writeln!(out, "# warning: invalid preview pattern: {err}")?;
    }

    info!(
        spans = result.span_count(),
        rules = result.summary.rules_scanned,
        invalid = result.summary.invalid_rules,
        window = result.summary.window_len,
        elapsed_us = elapsed.as_micros() as u64,
        "scan finished"
    );
    Ok(())
}
