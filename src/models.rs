use serde::{Deserialize, Serialize};

use crate::services::filter::FilterSelection;

fn default_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub sheet: String,
    pub rows: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub filters: FilterSelection,
    #[serde(default = "default_page")]
    pub page: usize,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub columns: Vec<String>,
    /// Display-formatted rows for the requested page only.
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub page: usize,
    pub total_pages: usize,
    pub options: Vec<FilterOptions>,
    pub summary: SummaryCard,
}

/// Sorted distinct values observed in the unfiltered dataset for one
/// filterable column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub column: String,
    pub values: Vec<String>,
}

/// The single metric card: the sum of the designated monetary column over
/// the filtered, pre-pagination rows. Carries the numeric amount alongside
/// the formatted string so no client ever re-parses display output.
#[derive(Debug, Serialize)]
pub struct SummaryCard {
    pub label: String,
    pub amount: f64,
    pub formatted: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(default)]
    pub filters: FilterSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Excel,
    Pdf,
}
