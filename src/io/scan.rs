use std::fs;
use std::path::{Path, PathBuf};

use crate::model::status::StatusConfig;
use crate::model::task::TaskRecord;
use crate::parse::parse_document;

/// Error type for vault scanning
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Every markdown note under `root`, relative to it, in sorted order.
/// Hidden files and directories (leading `.`) are skipped.
pub fn list_notes(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut notes = Vec::new();
    collect_notes(root, root, &mut notes)?;
    notes.sort();
    Ok(notes)
}

fn collect_notes(root: &Path, dir: &Path, notes: &mut Vec<PathBuf>) -> Result<(), ScanError> {
    let entries = fs::read_dir(dir).map_err(|e| ScanError::ReadError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ScanError::ReadError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            continue;
        }
        if path.is_dir() {
            collect_notes(root, &path, notes)?;
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(root) {
            notes.push(relative.to_path_buf());
        }
    }
    Ok(())
}

/// Parse every task in the vault, note by note in path order
pub fn scan_vault(
    root: &Path,
    statuses: Option<&StatusConfig>,
) -> Result<Vec<TaskRecord>, ScanError> {
    let mut tasks = Vec::new();
    for relative in list_notes(root)? {
        let full = root.join(&relative);
        let text = fs::read_to_string(&full).map_err(|e| ScanError::ReadError {
            path: full.clone(),
            source: e,
        })?;
        tasks.extend(parse_document(&relative, &text, statuses));
    }
    tracing::debug!(root = %root.display(), tasks = tasks.len(), "scanned vault");
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_vault(dir: &Path) {
        fs::create_dir_all(dir.join("projects")).unwrap();
        fs::create_dir_all(dir.join(".obsidian")).unwrap();
        fs::write(dir.join("Notes.md"), "- [ ] Buy milk #errand\n").unwrap();
        fs::write(
            dir.join("projects/site.md"),
            "# Site\n\n- [/] Draft copy\n- [x] Buy domain\n",
        )
        .unwrap();
        fs::write(dir.join("projects/readme.txt"), "- [ ] ignored\n").unwrap();
        fs::write(dir.join(".obsidian/hidden.md"), "- [ ] hidden\n").unwrap();
    }

    #[test]
    fn test_list_notes_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        create_vault(tmp.path());
        let notes = list_notes(tmp.path()).unwrap();
        assert_eq!(
            notes,
            vec![PathBuf::from("Notes.md"), PathBuf::from("projects/site.md")]
        );
    }

    #[test]
    fn test_scan_vault() {
        let tmp = TempDir::new().unwrap();
        create_vault(tmp.path());
        let tasks = scan_vault(tmp.path(), None).unwrap();
        let descriptions: Vec<&str> = tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Buy milk #errand", "Draft copy", "Buy domain"]);
        assert_eq!(tasks[1].location.path, PathBuf::from("projects/site.md"));
        assert_eq!(tasks[1].location.line, 2);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(scan_vault(&tmp.path().join("nope"), None).is_err());
    }
}
