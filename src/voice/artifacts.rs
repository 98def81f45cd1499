//! Transient synthesized-audio files
//!
//! Every spoken reply is written to a `voice_<uuid>.mp3` file before it is
//! played and removed right after. Files left behind by a crash or an
//! interrupted playback are swept on shutdown.

use std::path::{Path, PathBuf};

use crate::Result;

const PREFIX: &str = "voice_";
const EXTENSION: &str = "mp3";

/// Directory of transient audio files
#[derive(Debug, Clone)]
pub struct AudioArtifacts {
    dir: PathBuf,
}

impl AudioArtifacts {
    /// Use `dir` for artifacts
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the artifacts
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `data` to a fresh artifact file and return its path
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written
    pub fn write(&self, data: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self
            .dir
            .join(format!("{PREFIX}{}.{EXTENSION}", uuid::Uuid::new_v4()));
        std::fs::write(&path, data)?;
        Ok(path)
    }

    /// Remove one artifact, ignoring a file that is already gone
    pub fn remove(&self, path: &Path) {
        if let Err(e) = std::fs::remove_file(path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove audio file");
        }
    }

    /// Remove every artifact in the directory, returning how many were removed
    pub fn sweep(&self) -> usize {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return 0;
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if is_artifact(&path) && std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(removed, dir = %self.dir.display(), "cleaned up audio files");
        }
        removed
    }

    /// Guard that sweeps the directory when dropped
    #[must_use]
    pub fn guard(&self) -> ArtifactGuard {
        ArtifactGuard {
            artifacts: self.clone(),
        }
    }
}

/// Sweeps audio artifacts on drop, whatever way the session ended
#[derive(Debug)]
pub struct ArtifactGuard {
    artifacts: AudioArtifacts,
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        self.artifacts.sweep();
    }
}

fn is_artifact(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == EXTENSION)
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = AudioArtifacts::new(dir.path());

        let path = artifacts.write(b"mp3").unwrap();
        assert!(path.exists());
        assert!(is_artifact(&path));

        artifacts.remove(&path);
        assert!(!path.exists());
        artifacts.remove(&path);
    }

    #[test]
    fn test_sweep_only_touches_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = AudioArtifacts::new(dir.path());

        artifacts.write(b"a").unwrap();
        artifacts.write(b"b").unwrap();
        std::fs::write(dir.path().join("notes.mp3"), b"keep").unwrap();
        std::fs::write(dir.path().join("voice_x.txt"), b"keep").unwrap();

        assert_eq!(artifacts.sweep(), 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_guard_sweeps_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = AudioArtifacts::new(dir.path());
        let path = artifacts.write(b"a").unwrap();

        drop(artifacts.guard());
        assert!(!path.exists());
    }

    #[test]
    fn test_sweep_missing_dir() {
        let artifacts = AudioArtifacts::new("/nonexistent/vox-test-artifacts");
        assert_eq!(artifacts.sweep(), 0);
    }
}
