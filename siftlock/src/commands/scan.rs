// siftlock/src/commands/scan.rs
//! `scan` command implementation: one-shot sanitization of a file or stdin.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use siftlock_core::{RedactionMap, ScanConfig};

use crate::cli::{OutputFormat, ScanCommand};

/// One detected entity as it appears in a report. The original value is
/// only present when explicitly requested.
#[derive(Debug, Serialize)]
struct EntityReport {
    entity_type: String,
    source: String,
    start: usize,
    end: usize,
    confidence: f64,
    placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_text: Option<String>,
}

/// The full JSON report for one scan.
#[derive(Debug, Serialize)]
struct ScanReport {
    redacted_text: String,
    total_entities: usize,
    entity_counts: BTreeMap<String, usize>,
    entities: Vec<EntityReport>,
}

fn build_report(map: &RedactionMap, show_values: bool) -> ScanReport {
    let mut entity_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut entities = Vec::with_capacity(map.entities.len());
    for entity in &map.entities {
        *entity_counts.entry(entity.entity_type.clone()).or_insert(0) += 1;
        entities.push(EntityReport {
            entity_type: entity.entity_type.clone(),
            source: entity.source.to_string(),
            start: entity.start,
            end: entity.end,
            confidence: entity.confidence,
            placeholder: entity.placeholder.clone(),
            original_text: show_values.then(|| entity.original_text.clone()),
        });
    }
    ScanReport {
        redacted_text: map.redacted_text.clone(),
        total_entities: map.entities.len(),
        entity_counts,
        entities,
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_summary(report: &ScanReport, quiet: bool) {
    if quiet {
        return;
    }
    let mut stderr = io::stderr();
    let color = stderr.is_terminal();
    let heading = format!("{} entities redacted", report.total_entities);
    if color {
        let _ = writeln!(stderr, "{}", heading.bold());
    } else {
        let _ = writeln!(stderr, "{}", heading);
    }
    for (entity_type, count) in &report.entity_counts {
        let _ = writeln!(stderr, "  {}: {}", entity_type, count);
    }
}

/// Runs the `scan` command end to end.
pub fn run(cmd: &ScanCommand, config: ScanConfig, quiet: bool) -> Result<()> {
    info!("Starting scan.");
    let input = read_input(cmd.input_file.as_ref())?;
    debug!("Read {} bytes of input.", input.len());

    let map = siftlock_core::sanitize_text(&config, &input)?;
    let report = build_report(&map, cmd.show_values);

    let rendered = match cmd.format {
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            json.push('\n');
            json
        }
        OutputFormat::Text => report.redacted_text.clone(),
    };

    match &cmd.output {
        Some(path) => std::fs::write(path, &rendered)
            .with_context(|| format!("Failed to write output file {}", path.display()))?,
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    if cmd.format == OutputFormat::Text {
        print_summary(&report, quiet);
    }
    Ok(())
}
