//! pathlog-worker - Batch character attribution over a parsed client log.
//!
//! Reads a JSON array of timestamp-sorted log events, runs the attribution
//! build and prints a report of the owned characters, their level
//! segmentation and any diagnostics.
//!
//! Usage: pathlog-worker <events.json> [config.toml] [--text]
//!
//! Output: JSON to stdout, or a plain table with `--text`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pathlog_core::context::{EngineContext, load_config_or_default};
use pathlog_core::{
    BuildOutcome, CharacterSummary, Diagnostic, LogEvent, RangeList, build_with_context,
};
use pathlog_types::formatting::{format_duration_ms, format_level, format_playtime};
use serde::Serialize;
use tracing_subscriber::filter::EnvFilter;

/// Report written to stdout in JSON mode.
#[derive(Debug, Serialize)]
struct WorkerOutput<'a> {
    event_count: usize,
    elapsed_ms: u128,
    characters: &'a [CharacterSummary],
    foreign: Vec<&'a str>,
    /// Per character, per level time ranges
    segmentation: BTreeMap<&'a str, BTreeMap<u8, &'a RangeList>>,
    diagnostics: &'a [Diagnostic],
}

impl<'a> WorkerOutput<'a> {
    fn from_outcome(outcome: &'a BuildOutcome, event_count: usize, elapsed_ms: u128) -> Self {
        let agg = &outcome.aggregation;
        let segmentation = agg
            .owned_characters()
            .filter_map(|name| {
                let seg = agg.segmentation(name)?;
                Some((name, seg.populated().collect()))
            })
            .collect();

        Self {
            event_count,
            elapsed_ms,
            characters: agg.summaries(),
            foreign: agg.foreign().sorted(),
            segmentation,
            diagnostics: outcome.diagnostics.entries(),
        }
    }
}

struct Args {
    events_path: PathBuf,
    config_path: Option<PathBuf>,
    text: bool,
}

fn parse_args() -> Option<Args> {
    let mut text = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--text" {
            text = true;
        } else {
            positional.push(PathBuf::from(arg));
        }
    }
    let mut positional = positional.into_iter();
    let events_path = positional.next()?;
    let config_path = positional.next();
    if positional.next().is_some() {
        return None;
    }
    Some(Args {
        events_path,
        config_path,
        text,
    })
}

/// Initialize logging, writing to PATHLOG_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("PATHLOG_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let Some(args) = parse_args() else {
        tracing::error!("Usage: pathlog-worker <events.json> [config.toml] [--text]");
        std::process::exit(1);
    };

    let config = match load_config_or_default(args.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load config");
            std::process::exit(1);
        }
    };
    let context = EngineContext::from_config(config);

    let events = match read_events(&args.events_path) {
        Ok(events) => events,
        Err(e) => {
            tracing::error!(error = %e, path = ?args.events_path, "Failed to read events");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start runtime");
            std::process::exit(1);
        }
    };

    let timer = std::time::Instant::now();
    let outcome = match runtime.block_on(build_with_context(&events, &context)) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Attribution failed");
            std::process::exit(1);
        }
    };
    let elapsed_ms = timer.elapsed().as_millis();
    tracing::info!(
        events = events.len(),
        characters = outcome.aggregation.summaries().len(),
        diagnostics = outcome.diagnostics.len(),
        elapsed_ms,
        "Build finished"
    );

    if args.text {
        print!("{}", render_text(&outcome));
        return;
    }

    let output = WorkerOutput::from_outcome(&outcome, events.len(), elapsed_ms);
    match serde_json::to_string(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize report");
            std::process::exit(1);
        }
    }
}

fn read_events(path: &Path) -> Result<Vec<LogEvent>, String> {
    let contents = fs::read_to_string(path).map_err(|e| format!("Failed to open file: {}", e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Invalid event JSON: {}", e))
}

fn format_date(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Plain table of characters followed by their time per level.
fn render_text(outcome: &BuildOutcome) -> String {
    let agg = &outcome.aggregation;
    let mut out = String::new();

    out.push_str(&format!(
        "{:<24} {:<20} {:<17} {:<17} {:>8}\n",
        "CHARACTER", "LEVEL", "CREATED", "LAST PLAYED", "PLAYED"
    ));
    for summary in agg.summaries().iter().rev() {
        out.push_str(&format!(
            "{:<24} {:<20} {:<17} {:<17} {:>8}\n",
            summary.name,
            format_level(summary.level, summary.ascendancy.as_deref()),
            format_date(summary.created_datetime()),
            format_date(summary.last_played_datetime()),
            format_playtime(summary.played_ms()),
        ));
    }

    for summary in agg.summaries().iter().rev() {
        let Some(seg) = agg.segmentation(&summary.name) else {
            continue;
        };
        out.push_str(&format!("\n{}\n", summary.name));
        for (level, ranges) in seg.populated() {
            out.push_str(&format!(
                "  {:>3}  {}\n",
                level,
                format_duration_ms(ranges.total_duration())
            ));
        }
    }

    if !outcome.diagnostics.is_empty() {
        out.push_str(&format!("\n{} warnings\n", outcome.diagnostics.len()));
    }
    out
}
