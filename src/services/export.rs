use rust_xlsxwriter::{Workbook, XlsxError};

use crate::error::AppError;
use crate::services::dataset::{Dataset, DatasetKind, Value};
use crate::services::format;

/// Serializes the filtered dataset to workbook bytes: every column and every
/// filtered row, not just the visible page, with date and currency cells
/// already rendered as display strings.
pub fn to_xlsx(kind: DatasetKind, dataset: &Dataset) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in dataset.columns.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, name.as_str())
            .map_err(xlsx_error)?;
    }

    for (row_idx, row) in dataset.rows.iter().enumerate() {
        let out_row = row_idx as u32 + 1;
        for (col_idx, (column, value)) in dataset.columns.iter().zip(row.iter()).enumerate() {
            let col = col_idx as u16;
            match value {
                Value::Number(n) if kind.currency_columns().contains(&column.as_str()) => {
                    worksheet
                        .write_string(out_row, col, format::format_currency(*n))
                        .map_err(xlsx_error)?;
                }
                Value::Date(d) => {
                    worksheet
                        .write_string(out_row, col, format::format_date(*d))
                        .map_err(xlsx_error)?;
                }
                Value::Number(n) => {
                    worksheet.write_number(out_row, col, *n).map_err(xlsx_error)?;
                }
                Value::Text(s) => {
                    worksheet
                        .write_string(out_row, col, s.as_str())
                        .map_err(xlsx_error)?;
                }
                Value::Empty => {}
            }
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

fn xlsx_error(e: XlsxError) -> AppError {
    AppError::Export(e.to_string())
}
