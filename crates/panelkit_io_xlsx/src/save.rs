//! File-save collaborators and clocks used by the emitter.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::conf::TUP_FILE_NAME_ILLEGAL;
use crate::error::ExportError;
use crate::spec::SpecExportFile;

////////////////////////////////////////////////////////////////////////////////
// #region FileSavers

/// Receives the finished download.
pub trait FileSaver {
    fn save(&mut self, file: &SpecExportFile) -> Result<(), ExportError>;
}

impl<S: FileSaver + ?Sized> FileSaver for &mut S {
    fn save(&mut self, file: &SpecExportFile) -> Result<(), ExportError> {
        (**self).save(file)
    }
}

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirFileSaver {
    dir_out: PathBuf,
    l_paths_saved: Vec<PathBuf>,
}

impl DirFileSaver {
    pub fn new(dir_out: impl Into<PathBuf>) -> Self {
        Self {
            dir_out: dir_out.into(),
            l_paths_saved: Vec::new(),
        }
    }

    /// Target directory.
    pub fn dir_out(&self) -> &Path {
        &self.dir_out
    }

    /// Paths written so far, in save order.
    pub fn paths_saved(&self) -> &[PathBuf] {
        &self.l_paths_saved
    }

    /// Path a file name maps to; separators and other characters illegal in
    /// file names (`:` from the timestamp included) become `_`.
    pub fn derive_path_out(&self, file_name: &str) -> PathBuf {
        let c_file_name: String = file_name
            .chars()
            .map(|chr| {
                if TUP_FILE_NAME_ILLEGAL.contains(&chr) {
                    '_'
                } else {
                    chr
                }
            })
            .collect();
        self.dir_out.join(c_file_name)
    }
}

impl FileSaver for DirFileSaver {
    fn save(&mut self, file: &SpecExportFile) -> Result<(), ExportError> {
        let path_out = self.derive_path_out(&file.file_name);
        std::fs::write(&path_out, &file.content).map_err(|err| ExportError::FileSave {
            file_name: file.file_name.clone(),
            message: format!("{}: {err}", path_out.display()),
        })?;
        tracing::info!(path = %path_out.display(), n_bytes = file.content.len(), "Saved export");
        self.l_paths_saved.push(path_out);
        Ok(())
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSaver {
    l_files: Vec<SpecExportFile>,
}

impl MemoryFileSaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files received so far, in save order.
    pub fn files(&self) -> &[SpecExportFile] {
        &self.l_files
    }

    pub fn into_files(self) -> Vec<SpecExportFile> {
        self.l_files
    }
}

impl FileSaver for MemoryFileSaver {
    fn save(&mut self, file: &SpecExportFile) -> Result<(), ExportError> {
        self.l_files.push(file.clone());
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Clocks

/// "Current time" provider for file-name timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
