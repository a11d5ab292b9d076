//! In-memory beam snapshot assembled from one or more shards.

use std::path::{Path, PathBuf};

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::PhaseSpace;
use csv::ReaderBuilder;
use log::{debug, info};

use crate::shard::wrap_csv;

/// Particle table indexed by id with named floating-point columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeamTable {
    ids: Vec<u64>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

fn parse_error(code: &str, path: &Path, message: impl Into<String>) -> BeamError {
    BeamError::Parse(
        ErrorInfo::new(code, message).with_context("path", path.display().to_string()),
    )
}

impl BeamTable {
    /// Creates an empty table with the given non-id columns.
    pub fn with_columns<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let columns = vec![Vec::new(); names.len()];
        Self {
            ids: Vec::new(),
            names,
            columns,
        }
    }

    /// Builds a table with the six phase-space columns.
    pub fn from_particles<'a>(particles: impl IntoIterator<Item = (u64, &'a PhaseSpace)>) -> Self {
        let mut table = Self::with_columns(["x", "y", "t", "px", "py", "pt"]);
        for (id, p) in particles {
            table.ids.push(id);
            for (column, value) in table.columns.iter_mut().zip(p.to_array()) {
                column.push(value);
            }
        }
        table
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Particle identifiers in row order.
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    /// Column names excluding `id`.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Values of a named column.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Fails unless every name in `names` is a column.
    pub fn require_columns(&self, names: &[&str]) -> Result<(), BeamError> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| self.column(name).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BeamError::Parse(
                ErrorInfo::new("missing-columns", "beam table lacks required columns")
                    .with_context("missing", missing.join(","))
                    .with_context("available", self.names.join(",")),
            ))
        }
    }

    /// Appends the rows of `other`.
    ///
    /// Columns are matched by name, so shards may list them in any order, but
    /// both tables must have the same set of columns.
    pub fn append(&mut self, other: BeamTable) -> Result<(), BeamError> {
        if self.names.is_empty() && self.ids.is_empty() {
            *self = other;
            return Ok(());
        }
        let mismatch = || {
            BeamError::Parse(
                ErrorInfo::new("column-mismatch", "shards have different columns")
                    .with_context("expected", self.names.join(","))
                    .with_context("found", other.names.join(",")),
            )
        };
        if self.names.len() != other.names.len() {
            return Err(mismatch());
        }
        let order = self
            .names
            .iter()
            .map(|name| other.names.iter().position(|n| n == name))
            .collect::<Option<Vec<usize>>>()
            .ok_or_else(mismatch)?;

        let BeamTable { ids, mut columns, .. } = other;
        self.ids.extend(ids);
        for (column, idx) in self.columns.iter_mut().zip(order) {
            column.append(&mut columns[idx]);
        }
        Ok(())
    }

    /// Reads a single whitespace-delimited shard with a header row.
    pub fn read_shard(path: impl AsRef<Path>) -> Result<Self, BeamError> {
        let path = path.as_ref();
        let mut rdr = ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|err| wrap_csv("shard-open", path, err))?;

        let mut records = rdr.records();
        let header: Vec<String> = loop {
            match records.next() {
                Some(record) => {
                    let record = record.map_err(|err| wrap_csv("shard-read", path, err))?;
                    let fields: Vec<String> = split_fields(&record).map(str::to_string).collect();
                    if !fields.is_empty() {
                        break fields;
                    }
                }
                None => return Err(parse_error("missing-header", path, "shard has no header row")),
            }
        };
        let id_col = header
            .iter()
            .position(|name| name == "id")
            .ok_or_else(|| parse_error("missing-id", path, "shard header has no 'id' column"))?;

        let names: Vec<String> = header
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != id_col)
            .map(|(_, name)| name.clone())
            .collect();
        let mut table = Self::with_columns(names);

        for (row, record) in records.enumerate() {
            let record = record.map_err(|err| wrap_csv("shard-read", path, err))?;
            let fields: Vec<&str> = split_fields(&record).collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != header.len() {
                return Err(BeamError::Parse(
                    ErrorInfo::new("ragged-row", "row width differs from header")
                        .with_context("path", path.display().to_string())
                        .with_context("row", (row + 2).to_string())
                        .with_context("expected", header.len().to_string())
                        .with_context("found", fields.len().to_string()),
                ));
            }
            let mut column = 0;
            for (idx, field) in fields.iter().enumerate() {
                if idx == id_col {
                    let id = parse_id(field).ok_or_else(|| {
                        parse_error("bad-id", path, format!("invalid particle id '{field}'"))
                    })?;
                    table.ids.push(id);
                } else {
                    let value = field.parse::<f64>().map_err(|_| {
                        BeamError::Parse(
                            ErrorInfo::new("bad-number", "unparsable value")
                                .with_context("path", path.display().to_string())
                                .with_context("row", (row + 2).to_string())
                                .with_context("column", header[idx].clone())
                                .with_context("value", field.to_string()),
                        )
                    })?;
                    table.columns[column].push(value);
                    column += 1;
                }
            }
        }
        debug!("read {} particles from {}", table.len(), path.display());
        Ok(table)
    }
}

fn split_fields(record: &csv::StringRecord) -> impl Iterator<Item = &str> + '_ {
    record.iter().flat_map(str::split_whitespace)
}

/// Accepts integral ids written either as integers or as floats.
fn parse_id(field: &str) -> Option<u64> {
    field.parse::<u64>().ok().or_else(|| {
        let value = field.parse::<f64>().ok()?;
        (value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64).then(|| value as u64)
    })
}

/// Resolves `pattern` to a sorted, non-empty list of files.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>, BeamError> {
    let entries = glob::glob(pattern).map_err(|err| {
        BeamError::Config(
            ErrorInfo::new("bad-pattern", err.to_string()).with_context("pattern", pattern),
        )
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| {
            BeamError::io("glob-entry", err.path().to_path_buf(), err.into_error())
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(BeamError::Io(
            ErrorInfo::new("no-match", "no files match the pattern").with_context("pattern", pattern),
        ));
    }
    paths.sort();
    Ok(paths)
}

/// Reads every file matching `pattern` and concatenates the rows.
pub fn read_all_files(pattern: &str) -> Result<BeamTable, BeamError> {
    read_matching(pattern).map(|(table, _)| table)
}

/// Like [`read_all_files`], also returning the shards that were read.
pub fn read_matching(pattern: &str) -> Result<(BeamTable, Vec<PathBuf>), BeamError> {
    let paths = discover(pattern)?;
    let mut table = BeamTable::default();
    for path in &paths {
        table.append(BeamTable::read_shard(path)?)?;
    }
    info!(
        "loaded {} particles from {} file(s) matching {pattern}",
        table.len(),
        paths.len()
    );
    Ok((table, paths))
}
