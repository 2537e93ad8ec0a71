//! One generation run: the four documents in a fresh batch directory under
//! the output root, plus a zip of them beside it.

use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use tendersheet_models::TenderRecord;
use tendersheet_utils::TenderResult;

use crate::archive::write_archive;
use crate::writer::TemplateGenerator;

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedBundle {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
    pub archive: PathBuf,
}

impl GeneratedBundle {
    pub fn archive_name(&self) -> String {
        base_name(&self.archive)
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|p| base_name(p)).collect()
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `templates_{YYYYmmdd_HHMMSS}_{8 hex}`. The random suffix keeps two runs in
/// the same second apart.
pub fn batch_name() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "templates_{}_{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        &suffix[..8]
    )
}

impl TemplateGenerator {
    pub fn generate_bundle(&self, record: &TenderRecord, output_root: &Path) -> TenderResult<GeneratedBundle> {
        let name = batch_name();
        let directory = output_root.join(&name);
        let archive = output_root.join(format!("{}.zip", name));

        let files = self.generate_all(record, &directory)?;

        if let Err(e) = write_archive(&files, &archive) {
            if let Err(cleanup) = fs::remove_dir_all(&directory) {
                warn!(path = %directory.display(), error = %cleanup, "Could not remove batch directory");
            }
            let _ = fs::remove_file(&archive);
            return Err(e);
        }

        info!(
            directory = %directory.display(),
            archive = %archive.display(),
            works = record.works.len(),
            "Templates generated"
        );

        Ok(GeneratedBundle {
            directory,
            files,
            archive,
        })
    }
}
