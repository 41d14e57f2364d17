use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::load_file;
use super::model::Table;

// ---------------------------------------------------------------------------
// Artifact – the outcome of looking for one file
// ---------------------------------------------------------------------------

/// What a render pass knows about one backing file.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// File present and parsed.
    Loaded(Arc<Table>),
    /// No file at the expected path. Expected and non-fatal.
    Missing,
    /// File present but could not be read or parsed.
    Unreadable(String),
}

impl Artifact {
    /// Check the path and load it if present.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("{} not found", path.display());
            return Artifact::Missing;
        }
        match load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with columns {:?} from {}",
                    table.len(),
                    table.column_names(),
                    path.display()
                );
                Artifact::Loaded(Arc::new(table))
            }
            Err(e) => {
                log::warn!("Failed to load {}: {e:#}", path.display());
                Artifact::Unreadable(format!("{e:#}"))
            }
        }
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            Artifact::Loaded(table) => Some(table.as_ref()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CachedArtifact – reload only when the file changes
// ---------------------------------------------------------------------------

/// File identity used to decide whether a reload is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

fn fingerprint(path: &Path) -> Option<Fingerprint> {
    let meta = std::fs::metadata(path).ok()?;
    Some(Fingerprint {
        modified: meta.modified().ok(),
        len: meta.len(),
    })
}

/// One artifact path with its last loaded state.
#[derive(Debug)]
pub struct CachedArtifact {
    path: PathBuf,
    seen: Option<Option<Fingerprint>>,
    artifact: Artifact,
}

impl CachedArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CachedArtifact {
            path: path.into(),
            seen: None,
            artifact: Artifact::Missing,
        }
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Stat the file and reload it when presence, size or mtime changed.
    /// Returns `true` when the held artifact was replaced.
    pub fn refresh(&mut self) -> bool {
        let current = fingerprint(&self.path);
        if self.seen == Some(current) {
            log::trace!("{} unchanged", self.path.display());
            return false;
        }

        self.artifact = match current {
            Some(_) => Artifact::load(&self.path),
            None => {
                log::info!("{} not found", self.path.display());
                Artifact::Missing
            }
        };
        self.seen = Some(current);
        true
    }
}
