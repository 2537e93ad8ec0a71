//! Zip bundling of a generated batch.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use tendersheet_utils::{TenderError, TenderResult};

fn archive_error(e: impl std::fmt::Display) -> TenderError {
    TenderError::generation("archive", e.to_string())
}

/// Writes `files` into a flat zip at `zip_path`, each stored under its base
/// name.
pub fn write_archive(files: &[PathBuf], zip_path: &Path) -> TenderResult<()> {
    let mut writer = ZipWriter::new(File::create(zip_path).map_err(archive_error)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| archive_error(format!("not a file: {}", path.display())))?;
        writer.start_file(name, options).map_err(archive_error)?;
        let mut source = File::open(path).map_err(archive_error)?;
        io::copy(&mut source, &mut writer).map_err(archive_error)?;
    }

    writer.finish().map_err(archive_error)?;
    info!(path = %zip_path.display(), files = files.len(), "Archive written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;

    #[test]
    fn test_archive_holds_base_names() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("batch");
        fs::create_dir_all(&nested).unwrap();
        let a = nested.join("comparison_template.xlsx");
        let b = nested.join("award_template.xlsx");
        fs::write(&a, b"first").unwrap();
        fs::write(&b, b"second").unwrap();

        let zip_path = dir.path().join("batch.zip");
        write_archive(&[a, b], &zip_path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        let mut contents = String::new();
        archive
            .by_name("award_template.xlsx")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "second");
    }

    #[test]
    fn test_missing_source_is_a_generation_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_archive(&[dir.path().join("gone.xlsx")], &dir.path().join("out.zip"))
            .unwrap_err();
        assert_eq!(err.error_code(), "GENERATION_ERROR");
    }
}
