//! Saved download path: `{"download_path": ".."}` under the XDG config dir.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    pub download_path: PathBuf,
}

impl SessionFile {
    /// Default path: `~/.config/assetq/session.json`.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("assetq")?;
        Ok(xdg_dirs.place_config_file("session.json")?)
    }

    /// Load from `path`. Missing or unparsable files yield None so the caller can ask again.
    pub fn load(path: &Path) -> Result<Option<SessionFile>> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read session: {}", path.display())),
        };
        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable session file: {}", e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string(self).context("serialize session")?;
        std::fs::write(path, json).with_context(|| format!("write session: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        assert_eq!(SessionFile::load(&path).unwrap(), None);

        let session = SessionFile {
            download_path: PathBuf::from("/data/textures"),
        };
        session.save(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"download_path":"/data/textures"}"#
        );
        assert_eq!(SessionFile::load(&path).unwrap(), Some(session));
    }

    #[test]
    fn garbage_is_treated_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{").unwrap();
        assert_eq!(SessionFile::load(&path).unwrap(), None);
    }
}
