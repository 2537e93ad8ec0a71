//! Tender Sheet Parser
//!
//! Recovers the NIT number and the list of works from a sheet whose layout is
//! not fixed. Two passes over the grid: the first finds the NIT number, the
//! second collects every work row.

use std::fs;
use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Reader};
use tendersheet_models::{NitInfo, TenderRecord, WorkItem};
use tracing::{debug, error, info};

use super::grid::{contains_token, has_digit, row_text, Cell, Grid};
use crate::config::ParserConfig;
use crate::error::{TenderError, TenderResult};
use crate::progress::{task_id_for_path, ProgressTracker};
use crate::validation::{validate_file_size, validate_file_type};

/// Number of progress checkpoints per parse.
pub const PARSE_STEPS: u32 = 5;

const NIT_TOKEN: &str = "NIT";
const NIT_QUALIFIER: &str = "NUMBER";
const WORK_TOKEN: &str = "WORK";

pub struct TenderParser {
    max_file_size: u64,
    allowed_extensions: Vec<String>,
    progress: Option<ProgressTracker>,
}

impl Default for TenderParser {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

impl TenderParser {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            allowed_extensions: config.allowed_extensions.clone(),
            progress: None,
        }
    }

    /// Reports checkpoints to `tracker` under the task id derived from the path.
    pub fn with_progress(mut self, tracker: ProgressTracker) -> Self {
        self.progress = Some(tracker);
        self
    }

    /// Parse the first sheet of the workbook at `path`.
    pub fn parse_file(&self, path: &Path) -> TenderResult<TenderRecord> {
        let started = Instant::now();
        let task_id = task_id_for_path(path);

        if let Some(tracker) = &self.progress {
            tracker.start_task(&task_id, PARSE_STEPS);
        }

        let result = self.run_checkpoints(path, &task_id);
        let elapsed = started.elapsed().as_secs_f64();

        if let Some(tracker) = &self.progress {
            tracker.complete_task(&task_id, result.is_ok());
        }

        match result {
            Ok(mut record) => {
                record.parse_duration = elapsed;
                info!(
                    file = %path.display(),
                    works = record.works.len(),
                    nit_number = record.nit_number().unwrap_or("N/A"),
                    "File parsed successfully in {:.2}s",
                    elapsed
                );
                Ok(record)
            }
            Err(e) => {
                error!(file = %path.display(), error = ?e, "Error parsing file");
                Err(e)
            }
        }
    }

    fn run_checkpoints(&self, path: &Path, task_id: &str) -> TenderResult<TenderRecord> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        validate_file_type(&file_name, &self.allowed_extensions)?;
        if !path.is_file() {
            return Err(TenderError::input(format!("File not found: {}", path.display())));
        }
        self.checkpoint(task_id, 1, "File found, checking size...");

        let size = fs::metadata(path)?.len();
        validate_file_size(size, self.max_file_size)?;
        self.checkpoint(task_id, 2, "Reading spreadsheet...");

        let grid = read_first_sheet(path)?;
        self.checkpoint(task_id, 3, "Extracting NIT information...");

        let nit_number = extract_nit_number(&grid);
        self.checkpoint(task_id, 4, "Extracting works data...");

        let works = extract_works(&grid);
        self.checkpoint(task_id, 5, "Validation complete...");

        let mut record = build_record(nit_number, works)?;
        record.source_filename = file_name;
        Ok(record)
    }

    /// Parse an already-loaded grid. Pure: no file access, no progress.
    pub fn parse_grid(&self, grid: &Grid) -> TenderResult<TenderRecord> {
        build_record(extract_nit_number(grid), extract_works(grid))
    }

    fn checkpoint(&self, task_id: &str, step: u32, message: &str) {
        debug!(task_id, step, "{}", message);
        if let Some(tracker) = &self.progress {
            tracker.update_progress(task_id, step, message);
        }
    }
}

fn build_record(nit_number: Option<String>, works: Vec<WorkItem>) -> TenderResult<TenderRecord> {
    if works.is_empty() {
        return Err(TenderError::parse("No works data found in the file"));
    }
    Ok(TenderRecord {
        nit_info: NitInfo { nit_number },
        works,
        source_filename: String::new(),
        parse_duration: 0.0,
    })
}

/// Loads the first worksheet, without treating any row as a header.
pub fn read_first_sheet(path: &Path) -> TenderResult<Grid> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TenderError::input("Failed to read Excel file: workbook has no sheets"))??;
    Ok(Grid::from_range(&range))
}

/// First row mentioning both "NIT" and "NUMBER" decides the result. Its first
/// text cell holding a digit is the NIT number; failing that, the row below is
/// tried. Later matching rows are never looked at. Values split over several
/// cells are not joined: only the first qualifying cell is taken.
pub fn extract_nit_number(grid: &Grid) -> Option<String> {
    for (position, (_, row)) in grid.rows().enumerate() {
        let text = row_text(row);
        if contains_token(&text, NIT_TOKEN) && contains_token(&text, NIT_QUALIFIER) {
            return first_numbered_text(row)
                .or_else(|| grid.row(position + 1).and_then(first_numbered_text));
        }
    }
    None
}

/// One work per row that mentions "WORK" and carries a digit anywhere.
pub fn extract_works(grid: &Grid) -> Vec<WorkItem> {
    grid.rows()
        .filter_map(|(row_index, row)| {
            let text = row_text(row);
            if !contains_token(&text, WORK_TOKEN) || !has_digit(&text) {
                return None;
            }
            row.iter()
                .filter_map(Cell::as_text)
                .find(|cell| contains_token(cell, WORK_TOKEN))
                .map(|name| WorkItem::new(name.trim(), row_index))
        })
        .collect()
}

fn first_numbered_text(row: &[Cell]) -> Option<String> {
    row.iter()
        .filter_map(Cell::as_text)
        .find(|text| has_digit(text))
        .map(|text| text.trim().to_string())
}
