//! Whitespace-delimited particle shards, one file per decomposition rank.

use std::fs;
use std::path::{Path, PathBuf};

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::{ParticleBunch, ParticleTile};
use csv::WriterBuilder;
use log::debug;

/// Column header written at the top of every shard.
pub const SHARD_COLUMNS: [&str; 7] = ["id", "x", "y", "t", "px", "py", "pt"];

pub(crate) fn wrap_csv(code: &str, path: &Path, err: csv::Error) -> BeamError {
    BeamError::Io(
        ErrorInfo::new(code, "particle shard I/O failure")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), BeamError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| BeamError::io("diag-mkdir", parent, err))?;
        }
    }
    Ok(())
}

/// Writes one tile as `id x y t px py pt` rows separated by single spaces.
pub fn write_shard(path: impl AsRef<Path>, tile: &ParticleTile) -> Result<(), BeamError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut wtr = WriterBuilder::new()
        .delimiter(b' ')
        .from_path(path)
        .map_err(|err| wrap_csv("shard-create", path, err))?;
    wtr.write_record(SHARD_COLUMNS)
        .map_err(|err| wrap_csv("shard-write", path, err))?;
    for (id, p) in tile.iter() {
        wtr.write_record([
            id.to_string(),
            format!("{:e}", p.x),
            format!("{:e}", p.y),
            format!("{:e}", p.t),
            format!("{:e}", p.px),
            format!("{:e}", p.py),
            format!("{:e}", p.pt),
        ])
        .map_err(|err| wrap_csv("shard-write", path, err))?;
    }
    wtr.flush()
        .map_err(|err| BeamError::io("shard-flush", path, err))?;
    debug!("wrote {} particles to {}", tile.len(), path.display());
    Ok(())
}

/// Writes `<dir>/<stem>.<rank>` for every tile of `bunch`.
pub fn write_shards(
    dir: impl AsRef<Path>,
    stem: &str,
    bunch: &ParticleBunch,
) -> Result<Vec<PathBuf>, BeamError> {
    let dir = dir.as_ref();
    let mut paths = Vec::with_capacity(bunch.ranks());
    for (rank, tile) in bunch.tiles().iter().enumerate() {
        let path = dir.join(format!("{stem}.{rank}"));
        write_shard(&path, tile)?;
        paths.push(path);
    }
    Ok(paths)
}
