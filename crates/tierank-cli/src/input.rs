//! Loading weight matrices from CSV or JSON files.
//!
//! CSV layout: a header row whose first cell is ignored and whose remaining
//! cells name the entities, then one row per entity starting with its name.
//! Empty cells parse as zero. JSON layout: `{"names": [...], "weights":
//! [[...]]}`.

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::borrow::Cow;
use std::path::Path;
use tierank_core::graph::WeightedDigraph;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct JsonMatrix {
    #[serde(default)]
    names: Option<Vec<String>>,
    weights: Vec<Vec<f64>>,
}

/// Read `path`, choosing the parser from its extension (`.json` or CSV).
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or does not
/// describe a valid square weight matrix.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_graph(path: &Path) -> Result<WeightedDigraph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let graph = if is_json {
        parse_json(&content)
    } else {
        parse_csv(&content)
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    debug!(entities = graph.node_count(), arcs = graph.arc_count(), "graph loaded");
    Ok(graph)
}

/// Parse the JSON layout.
///
/// # Errors
///
/// Returns an error on malformed JSON or an invalid matrix.
pub fn parse_json(content: &str) -> Result<WeightedDigraph> {
    let doc: JsonMatrix = serde_json::from_str(content)?;
    Ok(WeightedDigraph::from_matrix(doc.weights, doc.names)?)
}

/// Parse the CSV layout.
///
/// # Errors
///
/// Returns an error if the header is missing, a row label disagrees with
/// the header, a cell is not numeric, or the matrix is invalid.
pub fn parse_csv(content: &str) -> Result<WeightedDigraph> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next().ok_or_else(|| anyhow!("empty input"))?;
    let names: Vec<String> = split_record(header)
        .context("header")?
        .into_iter()
        .skip(1)
        .collect();

    let mut rows = Vec::with_capacity(names.len());
    for (index, line) in lines.enumerate() {
        let mut cells = split_record(line)
            .with_context(|| format!("row {}", index + 1))?
            .into_iter();
        let label = cells.next().unwrap_or_default();
        let mismatch = names
            .get(index)
            .filter(|expected| !label.is_empty() && label != **expected);
        if let Some(expected) = mismatch {
            bail!("row {} is labelled {label:?} but the header says {expected:?}", index + 1);
        }
        let row = cells
            .enumerate()
            .map(|(column, cell)| parse_cell(&cell, index, column))
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    Ok(WeightedDigraph::from_matrix(rows, Some(names))?)
}

fn parse_cell(cell: &str, row: usize, column: usize) -> Result<f64> {
    if cell.is_empty() {
        return Ok(0.0);
    }
    cell.parse::<f64>()
        .with_context(|| format!("cell ({}, {}) is not a number: {cell:?}", row + 1, column + 1))
}

/// Split one CSV record. Fields may be wrapped in double quotes, in which
/// case they can hold commas and `""` stands for a literal quote. Records
/// never span lines.
fn split_record(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut was_quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c != '"' {
                field.push(c);
            } else if chars.peek() == Some(&'"') {
                chars.next();
                field.push('"');
            } else {
                in_quotes = false;
            }
            continue;
        }
        match c {
            ',' => {
                fields.push(finish_field(&mut field, was_quoted));
                was_quoted = false;
            }
            '"' if !was_quoted && field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
                was_quoted = true;
            }
            c if was_quoted && c.is_whitespace() => {}
            c => field.push(c),
        }
    }

    if in_quotes {
        bail!("unterminated quoted field");
    }
    fields.push(finish_field(&mut field, was_quoted));
    Ok(fields)
}

fn finish_field(field: &mut String, was_quoted: bool) -> String {
    let taken = std::mem::take(field);
    if was_quoted {
        taken
    } else {
        taken.trim().to_string()
    }
}

/// Quote `field` when it could not be read back verbatim as a bare CSV
/// field.
pub fn quote_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) || field.trim() != field {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Keep only the named entities, in the order given.
///
/// # Errors
///
/// Returns an error naming the first entity not present in `graph`.
pub fn select(graph: &WeightedDigraph, only: &[String]) -> Result<WeightedDigraph> {
    if only.is_empty() {
        return Ok(graph.clone());
    }
    let keep = only
        .iter()
        .map(|name| {
            graph
                .index_of(name)
                .ok_or_else(|| anyhow!("unknown entity {name:?}"))
        })
        .collect::<Result<Vec<usize>>>()?;
    Ok(graph.subgraph(&keep)?)
}
