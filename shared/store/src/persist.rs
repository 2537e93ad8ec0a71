//! Whole-file JSON replacement.

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use tendersheet_utils::{TenderError, TenderResult};

/// Writes `contents` to a uniquely named file beside `path` and renames it
/// over `path`. Readers see either the old file or the new one. Callers
/// serialise writers to the same path.
pub fn replace_file(path: &Path, contents: &str) -> TenderResult<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let mut staging = NamedTempFile::new_in(parent)?;
    staging.write_all(contents.as_bytes())?;
    staging.as_file().sync_all()?;
    staging.persist(path).map_err(|e| {
        TenderError::internal(format!("Failed to save {}: {}", path.display(), e.error))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        replace_file(&path, "{\"a\":1}").unwrap();
        replace_file(&path, "{\"a\":2}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":2}");
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
