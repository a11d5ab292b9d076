//! Per-step log of the reference particle.

use std::fs::File;
use std::path::{Path, PathBuf};

use beam_core::errors::BeamError;
use beam_core::RefPart;
use csv::{Writer, WriterBuilder};

use crate::shard::{ensure_parent, wrap_csv};

/// File name of the reference particle log inside the diagnostics directory.
pub const REF_PARTICLE_FILE: &str = "ref_particle";

/// Appends one `step s x y z t px py pz pt` row per slice step.
pub struct RefParticleLog {
    path: PathBuf,
    wtr: Writer<File>,
    rows: usize,
}

impl RefParticleLog {
    /// Creates `<dir>/ref_particle` and writes the header.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, BeamError> {
        let path = dir.as_ref().join(REF_PARTICLE_FILE);
        ensure_parent(&path)?;
        let mut wtr = WriterBuilder::new()
            .delimiter(b' ')
            .from_path(&path)
            .map_err(|err| wrap_csv("reflog-create", &path, err))?;
        wtr.write_record(["step", "s", "x", "y", "z", "t", "px", "py", "pz", "pt"])
            .map_err(|err| wrap_csv("reflog-write", &path, err))?;
        Ok(Self { path, wtr, rows: 0 })
    }

    /// Records the reference particle after `step`.
    pub fn append(&mut self, step: usize, refpart: &RefPart) -> Result<(), BeamError> {
        let values = [
            refpart.s, refpart.x, refpart.y, refpart.z, refpart.t, refpart.px, refpart.py,
            refpart.pz, refpart.pt,
        ];
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(step.to_string());
        record.extend(values.iter().map(|v| format!("{v:e}")));
        self.wtr
            .write_record(&record)
            .map_err(|err| wrap_csv("reflog-write", &self.path, err))?;
        self.rows += 1;
        Ok(())
    }

    /// Number of rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffered rows to disk.
    pub fn flush(&mut self) -> Result<(), BeamError> {
        self.wtr
            .flush()
            .map_err(|err| BeamError::io("reflog-flush", &self.path, err))
    }
}
