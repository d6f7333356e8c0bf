//! Identifier checkpointing: the ordered list, one identifier per line.
//!
//! Written every `checkpoint_every` new identifiers and once more when
//! collection stops, so a crashed run can be resumed through the manual list.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use jobscout_crawler::{CollectProgress, StopReason};
use jobscout_shared::{Identifier, JobScoutError, Result};

/// Writes collected identifiers to a file as a [`CollectProgress`] observer.
#[derive(Debug, Clone)]
pub struct CheckpointWriter {
    path: PathBuf,
    every: usize,
}

impl CheckpointWriter {
    /// `every == 0` disables periodic writes; the final write still happens.
    pub fn new(path: impl Into<PathBuf>, every: usize) -> Self {
        Self {
            path: path.into(),
            every,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the checkpoint file with `ids`.
    pub fn write(&self, ids: &[Identifier]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| JobScoutError::io(parent, e))?;
        }
        let mut content = String::new();
        for id in ids {
            content.push_str(id.as_str());
            content.push('\n');
        }
        std::fs::write(&self.path, content).map_err(|e| JobScoutError::io(&self.path, e))?;
        debug!(path = %self.path.display(), count = ids.len(), "checkpoint written");
        Ok(())
    }

    fn write_logged(&self, ids: &[Identifier]) {
        if let Err(e) = self.write(ids) {
            warn!(path = %self.path.display(), error = %e, "checkpoint write failed");
        }
    }
}

impl CollectProgress for CheckpointWriter {
    fn on_identifier(&self, collected: &[Identifier]) {
        if self.every > 0 && collected.len() % self.every == 0 {
            self.write_logged(collected);
        }
    }

    fn on_finished(&self, collected: &[Identifier], _reason: StopReason) {
        self.write_logged(collected);
    }
}

/// Read a checkpoint (or any one-per-line identifier file). Blank lines are skipped.
pub fn read_checkpoint(path: &Path) -> Result<Vec<Identifier>> {
    let content = std::fs::read_to_string(path).map_err(|e| JobScoutError::io(path, e))?;
    Ok(content.lines().filter_map(Identifier::new).collect())
}
