//! Template writer
//!
//! Each document is rendered into memory first. Files are only written once
//! all four have rendered, and a failed write removes what was already
//! written, so a batch either lands completely or not at all.

use rust_xlsxwriter::{Image, ObjectMovement, Workbook, Worksheet, XlsxError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use tendersheet_models::TenderRecord;
use tendersheet_utils::{TenderError, TenderResult};

use crate::layout::{
    Orientation, TemplateFormats, TemplateKind, COLUMN_HEADERS, COLUMN_WIDTHS, FIRST_DATA_ROW,
    HEADER_ROW, ILLUSTRATION_GAP, ILLUSTRATION_OFFSET, ILLUSTRATION_SCALE, NIT_ROW, PAPER_A4,
    TITLE_ROW,
};

const MISSING_NIT: &str = "N/A";

#[derive(Debug, Clone, Default)]
pub struct TemplateGenerator {
    illustration_path: Option<PathBuf>,
}

impl TemplateGenerator {
    pub fn new(illustration_path: Option<PathBuf>) -> Self {
        Self { illustration_path }
    }

    pub fn illustration_path(&self) -> Option<&Path> {
        self.illustration_path.as_deref()
    }

    /// Renders one document to xlsx bytes.
    pub fn render(&self, kind: TemplateKind, record: &TenderRecord) -> TenderResult<Vec<u8>> {
        render_workbook(kind, record, self.illustration_path.as_deref())
            .map_err(|e| TenderError::generation(kind.as_str(), e.to_string()))
    }

    /// Writes the four documents into `output_dir` and returns their paths in
    /// generation order.
    pub fn generate_all(&self, record: &TenderRecord, output_dir: &Path) -> TenderResult<Vec<PathBuf>> {
        let rendered = TemplateKind::ALL
            .iter()
            .map(|kind| self.render(*kind, record).map(|bytes| (*kind, bytes)))
            .collect::<TenderResult<Vec<_>>>()
            .map_err(|e| {
                error!(error = %e, "Error generating templates");
                e
            })?;

        fs::create_dir_all(output_dir).map_err(|e| {
            TenderError::generation("all", format!("cannot create {}: {}", output_dir.display(), e))
        })?;

        let mut written = Vec::with_capacity(rendered.len());
        for (kind, bytes) in rendered {
            let path = output_dir.join(kind.file_name());
            if let Err(e) = fs::write(&path, &bytes) {
                error!(template = %kind, path = %path.display(), error = %e, "Error writing template");
                discard(&written, output_dir);
                return Err(TenderError::generation(kind.as_str(), e.to_string()));
            }
            info!(template = %kind, path = %path.display(), "Template created");
            written.push(path);
        }

        Ok(written)
    }
}

fn discard(written: &[PathBuf], output_dir: &Path) {
    for path in written {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Could not remove partial template");
        }
    }
    // Only succeeds when nothing else lives in the directory.
    let _ = fs::remove_dir(output_dir);
}

fn render_workbook(
    kind: TemplateKind,
    record: &TenderRecord,
    illustration: Option<&Path>,
) -> Result<Vec<u8>, XlsxError> {
    let formats = TemplateFormats::new();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    match kind.orientation() {
        Orientation::Landscape => worksheet.set_landscape(),
        Orientation::Portrait => worksheet.set_portrait(),
    };
    let (wide, tall) = kind.fit_to_pages();
    worksheet.set_paper_size(PAPER_A4);
    worksheet.set_print_fit_to_pages(wide, tall);

    let last_col = (COLUMN_HEADERS.len() - 1) as u16;
    worksheet.merge_range(TITLE_ROW, 0, TITLE_ROW, last_col, &kind.title(), &formats.header)?;

    worksheet.write_string_with_format(NIT_ROW, 0, "NIT Number:", &formats.header)?;
    worksheet.write_string_with_format(
        NIT_ROW,
        1,
        record.nit_number().unwrap_or(MISSING_NIT),
        &formats.cell,
    )?;

    for (col, header) in COLUMN_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(HEADER_ROW, col as u16, *header, &formats.header)?;
    }

    let mut row = FIRST_DATA_ROW;
    for work in &record.works {
        worksheet.write_string_with_format(row, 0, &work.name, &formats.cell)?;
        // Left blank for evaluators to fill in.
        worksheet.write_blank(row, 1, &formats.number)?;
        worksheet.write_blank(row, 2, &formats.cell)?;
        worksheet.write_blank(row, 3, &formats.cell)?;
        row += 1;
    }

    if kind.has_illustration() {
        insert_illustration(worksheet, illustration, row + ILLUSTRATION_GAP);
    }

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    workbook.save_to_buffer()
}

/// Best effort: a missing or unreadable image never fails the document.
fn insert_illustration(worksheet: &mut Worksheet, path: Option<&Path>, row: u32) {
    let Some(path) = path else {
        return;
    };
    if !path.is_file() {
        warn!(path = %path.display(), "Illustration not found");
        return;
    }

    let (x_offset, y_offset) = ILLUSTRATION_OFFSET;
    let inserted = Image::new(path).and_then(|image| {
        let image = image
            .set_scale_width(ILLUSTRATION_SCALE)
            .set_scale_height(ILLUSTRATION_SCALE)
            .set_object_movement(ObjectMovement::MoveAndSizeWithCells);
        worksheet
            .insert_image_with_offset(row, 0, &image, x_offset, y_offset)
            .map(|_| ())
    });

    match inserted {
        Ok(()) => info!(row, path = %path.display(), "Illustration added to comparison sheet"),
        Err(e) => error!(path = %path.display(), error = %e, "Error adding illustration"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{DataType, Reader, Xlsx};
    use std::io::{Cursor, Read};
    use tendersheet_models::{BidderEntry, WorkItem};

    /// 1x1 transparent PNG.
    const PIXEL_PNG: [u8; 67] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
        0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78,
        0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
        0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn record(nit: Option<&str>, works: usize) -> TenderRecord {
        let works = (0..works)
            .map(|i| {
                let mut work = WorkItem::new(format!("Work {}", i + 1), i + 3);
                work.bidders.push(BidderEntry {
                    name: "Acme".to_string(),
                    address: None,
                    percentile: 1.5,
                });
                work
            })
            .collect();
        TenderRecord::new(nit.map(str::to_string), works)
    }

    fn first_sheet(bytes: &[u8]) -> calamine::Range<DataType> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec())).unwrap();
        workbook.worksheet_range_at(0).unwrap().unwrap()
    }

    fn sheet_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut xml = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    fn text(range: &calamine::Range<DataType>, row: u32, col: u32) -> String {
        range
            .get_value((row, col))
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_layout_reads_back() {
        let generator = TemplateGenerator::default();
        let bytes = generator.render(TemplateKind::Scrutiny, &record(Some("07/2026"), 3)).unwrap();
        let range = first_sheet(&bytes);

        assert_eq!(text(&range, 0, 0), "SCRUTINY TEMPLATE");
        assert_eq!(text(&range, 2, 0), "NIT Number:");
        assert_eq!(text(&range, 2, 1), "07/2026");
        for (col, header) in COLUMN_HEADERS.iter().enumerate() {
            assert_eq!(text(&range, 4, col as u32), *header);
        }
        for i in 0..3 {
            assert_eq!(text(&range, 5 + i, 0), format!("Work {}", i + 1));
            for col in 1..4 {
                assert_eq!(text(&range, 5 + i, col), "");
            }
        }
        assert_eq!(text(&range, 8, 0), "");
    }

    #[test]
    fn test_missing_nit_renders_placeholder() {
        let bytes = TemplateGenerator::default()
            .render(TemplateKind::Award, &record(None, 1))
            .unwrap();
        assert_eq!(text(&first_sheet(&bytes), 2, 1), "N/A");
    }

    #[test]
    fn test_orientation_follows_kind() {
        let generator = TemplateGenerator::default();
        let record = record(Some("1"), 1);

        let comparison = sheet_xml(&generator.render(TemplateKind::Comparison, &record).unwrap());
        assert!(comparison.contains(r#"orientation="landscape""#));
        assert!(comparison.contains(r#"paperSize="9""#));

        let evaluation = sheet_xml(&generator.render(TemplateKind::Evaluation, &record).unwrap());
        assert!(evaluation.contains(r#"orientation="portrait""#));
    }

    #[test]
    fn test_illustration_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("box.png");
        fs::write(&image, PIXEL_PNG).unwrap();
        let record = record(Some("1"), 2);

        let with_image = TemplateGenerator::new(Some(image));
        let bytes = with_image.render(TemplateKind::Comparison, &record).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.file_names().any(|name| name.starts_with("xl/media/")));

        let bytes = with_image.render(TemplateKind::Award, &record).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(!archive.file_names().any(|name| name.starts_with("xl/media/")));

        let missing = TemplateGenerator::new(Some(dir.path().join("absent.png")));
        assert!(missing.render(TemplateKind::Comparison, &record).is_ok());
    }

    #[test]
    fn test_generate_all_writes_four_documents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("batch");
        let files = TemplateGenerator::default()
            .generate_all(&record(Some("1"), 2), &out)
            .unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "comparison_template.xlsx",
                "scrutiny_template.xlsx",
                "evaluation_template.xlsx",
                "award_template.xlsx"
            ]
        );
        assert!(files.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_write_failure_names_template_and_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("batch");
        fs::create_dir_all(out.join("scrutiny_template.xlsx")).unwrap();

        let err = TemplateGenerator::default()
            .generate_all(&record(Some("1"), 1), &out)
            .unwrap_err();

        assert!(err.to_string().starts_with("Error creating scrutiny template"));
        assert!(!out.join("comparison_template.xlsx").exists());
    }

    #[test]
    fn test_structure_is_deterministic() {
        let generator = TemplateGenerator::default();
        let record = record(Some("9"), 4);
        let a = first_sheet(&generator.render(TemplateKind::Comparison, &record).unwrap());
        let b = first_sheet(&generator.render(TemplateKind::Comparison, &record).unwrap());
        assert_eq!(a.rows().collect::<Vec<_>>(), b.rows().collect::<Vec<_>>());
    }
}
