//! Resolve the download directory: `--download-dir`, else the saved session, else ask once.

use anyhow::{Context, Result};
use assetq_core::store::SessionFile;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Returns an existing download directory, creating and remembering it as needed.
pub fn resolve(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let session_path = SessionFile::default_path()?;
    resolve_with(explicit, &session_path, || prompt("Enter download path: "))
}

/// Download directory from the saved session only; never prompts.
pub fn saved() -> Result<Option<PathBuf>> {
    let session_path = SessionFile::default_path()?;
    Ok(SessionFile::load(&session_path)?
        .map(|s| s.download_path)
        .filter(|p| p.is_dir()))
}

fn resolve_with(
    explicit: Option<PathBuf>,
    session_path: &Path,
    ask: impl FnOnce() -> Result<String>,
) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return remember(dir, session_path);
    }
    if let Some(session) = SessionFile::load(session_path)? {
        if session.download_path.is_dir() {
            println!("Using remembered path: {}", session.download_path.display());
            return Ok(session.download_path);
        }
        tracing::warn!(
            path = %session.download_path.display(),
            "remembered download path no longer exists"
        );
    }
    let answer = clean_path_input(&ask()?);
    if answer.is_empty() {
        anyhow::bail!("download path cannot be empty");
    }
    remember(PathBuf::from(answer), session_path)
}

fn remember(dir: PathBuf, session_path: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create download dir: {}", dir.display()))?;
    SessionFile {
        download_path: dir.clone(),
    }
    .save(session_path)?;
    tracing::info!(path = %dir.display(), "download path saved");
    Ok(dir)
}

/// Strips surrounding whitespace and the quotes a pasted path often carries.
fn clean_path_input(input: &str) -> String {
    input.trim().replace(['"', '\''], "")
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_is_created_and_saved() {
        let tmp = tempfile::tempdir().unwrap();
        let session = tmp.path().join("session.json");
        let dir = tmp.path().join("textures");
        let got = resolve_with(Some(dir.clone()), &session, || panic!("no prompt")).unwrap();
        assert_eq!(got, dir);
        assert!(dir.is_dir());
        assert_eq!(SessionFile::load(&session).unwrap().unwrap().download_path, dir);
    }

    #[test]
    fn remembered_dir_skips_prompt() {
        let tmp = tempfile::tempdir().unwrap();
        let session = tmp.path().join("session.json");
        SessionFile {
            download_path: tmp.path().to_path_buf(),
        }
        .save(&session)
        .unwrap();
        let got = resolve_with(None, &session, || panic!("no prompt")).unwrap();
        assert_eq!(got, tmp.path());
    }

    #[test]
    fn prompt_answer_is_cleaned() {
        let tmp = tempfile::tempdir().unwrap();
        let session = tmp.path().join("session.json");
        let dir = tmp.path().join("dl");
        let answer = format!("  \"{}\"\n", dir.display());
        let got = resolve_with(None, &session, || Ok(answer)).unwrap();
        assert_eq!(got, dir);
    }

    #[test]
    fn empty_answer_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let session = tmp.path().join("session.json");
        assert!(resolve_with(None, &session, || Ok("\n".to_string())).is_err());
    }
}
