//! Template kinds and the cell formats shared by every document.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A4 in the Excel paper size table.
pub const PAPER_A4: u8 = 9;

pub const TITLE_ROW: u32 = 0;
pub const NIT_ROW: u32 = 2;
pub const HEADER_ROW: u32 = 4;
pub const FIRST_DATA_ROW: u32 = HEADER_ROW + 1;

pub const COLUMN_HEADERS: [&str; 4] = [
    "Work Name",
    "Number of Bidders",
    "Bidder Percentiles",
    "Remarks",
];
pub const COLUMN_WIDTHS: [f64; 4] = [30.0, 20.0, 25.0, 30.0];

/// Rows left empty between the last work and the illustration.
pub const ILLUSTRATION_GAP: u32 = 2;
pub const ILLUSTRATION_OFFSET: (u32, u32) = (10, 10);
pub const ILLUSTRATION_SCALE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Comparison,
    Scrutiny,
    Evaluation,
    Award,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl TemplateKind {
    /// Generation order.
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Comparison,
        TemplateKind::Scrutiny,
        TemplateKind::Evaluation,
        TemplateKind::Award,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Comparison => "comparison",
            TemplateKind::Scrutiny => "scrutiny",
            TemplateKind::Evaluation => "evaluation",
            TemplateKind::Award => "award",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}_template.xlsx", self.as_str())
    }

    pub fn title(&self) -> String {
        format!("{} TEMPLATE", self.as_str().to_uppercase())
    }

    pub fn orientation(&self) -> Orientation {
        match self {
            TemplateKind::Comparison => Orientation::Landscape,
            _ => Orientation::Portrait,
        }
    }

    /// Pages wide and tall the print area is scaled into. Zero height lets
    /// the landscape sheet run onto as many pages as it needs.
    pub fn fit_to_pages(&self) -> (u16, u16) {
        match self.orientation() {
            Orientation::Landscape => (1, 0),
            Orientation::Portrait => (1, 1),
        }
    }

    pub fn has_illustration(&self) -> bool {
        matches!(self, TemplateKind::Comparison)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct TemplateFormats {
    pub header: Format,
    pub cell: Format,
    pub number: Format,
}

impl TemplateFormats {
    pub fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_background_color(0x4472C4)
            .set_font_color(0xFFFFFF)
            .set_font_size(12);

        let cell = Format::new()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_font_size(11);

        let number = Format::new()
            .set_align(FormatAlign::Right)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_num_format("0.00")
            .set_font_size(11);

        Self {
            header,
            cell,
            number,
        }
    }
}

impl Default for TemplateFormats {
    fn default() -> Self {
        Self::new()
    }
}
