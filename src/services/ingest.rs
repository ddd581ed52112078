use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};

use crate::error::AppError;
use crate::services::dataset::{Dataset, DatasetKind, Value, COL_STATUS, STATUS_EXECUTED};
use crate::services::revenue;

/// Turns uploaded workbook bytes into a validated, typed dataset. Reads the
/// first worksheet only, with the header in row 0. Validation happens before
/// any row is converted; a failed upload stores nothing.
pub fn ingest_dataset(kind: DatasetKind, file_data: &[u8]) -> Result<Dataset, AppError> {
    let cursor = Cursor::new(file_data);
    let mut workbook: Xlsx<Cursor<&[u8]>> =
        open_workbook_from_rs(cursor).map_err(|e: calamine::XlsxError| AppError::ReadFailure {
        sheet: kind.label().to_string(),
        cause: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first_sheet = sheet_names.first().ok_or_else(|| AppError::ReadFailure {
        sheet: kind.label().to_string(),
        cause: "a pasta de trabalho não contém planilhas".to_string(),
    })?;

    let range = workbook
        .worksheet_range(first_sheet)
        .map_err(|e| AppError::ReadFailure {
            sheet: kind.label().to_string(),
            cause: e.to_string(),
        })?;

    let cells: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
    let headers: Vec<String> = cells
        .first()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .unwrap_or_default();

    let mut dataset = Dataset::new(headers);
    let missing = dataset.missing_columns(kind.required_columns());
    if !missing.is_empty() {
        tracing::warn!(
            "Rejected {} upload, missing columns: {:?}",
            kind.label(),
            missing
        );
        return Err(AppError::SchemaInvalid {
            sheet: kind.label().to_string(),
            columns: missing,
        });
    }

    let columns = dataset.columns.clone();
    for raw in cells.iter().skip(1) {
        let typed: Vec<Value> = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| convert_cell(kind, column, raw.get(idx).unwrap_or(&Data::Empty)))
            .collect();
        dataset.rows.push(typed);
    }

    match kind {
        DatasetKind::Produtos => retain_executed(&mut dataset),
        DatasetKind::Corretagem => revenue::append_derived_columns(&mut dataset),
    }

    tracing::info!("Ingested {}: {} rows", kind.label(), dataset.rows.len());
    Ok(dataset)
}

// Only fully executed product operations survive ingestion. Hard-coded in
// the legacy dashboard, not user-configurable.
fn retain_executed(dataset: &mut Dataset) {
    let Some(idx) = dataset.column_index(COL_STATUS) else {
        return;
    };
    dataset.rows.retain(|row| {
        row.get(idx)
            .map(|value| value.as_text() == STATUS_EXECUTED)
            .unwrap_or(false)
    });
}

fn convert_cell(kind: DatasetKind, column: &str, cell: &Data) -> Value {
    if kind.date_columns().contains(&column) {
        return convert_date(cell);
    }
    if kind.currency_columns().contains(&column) {
        return convert_number(cell);
    }
    match cell {
        Data::Empty => Value::Empty,
        other => Value::Text(other.to_string()),
    }
}

fn convert_number(cell: &Data) -> Value {
    match cell {
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or(Value::Empty),
        Data::Empty => Value::Empty,
        other => Value::Text(other.to_string()),
    }
}

fn convert_date(cell: &Data) -> Value {
    match cell {
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(Value::Date)
            .unwrap_or(Value::Empty),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .map(Value::Date)
            .unwrap_or(Value::Empty),
        Data::Float(f) => excel_serial_to_date(*f).map(Value::Date).unwrap_or(Value::Empty),
        Data::Int(i) => excel_serial_to_date(*i as f64)
            .map(Value::Date)
            .unwrap_or(Value::Empty),
        Data::String(s) => parse_date_string(s.trim()).map(Value::Date).unwrap_or(Value::Empty),
        Data::Empty => Value::Empty,
        other => Value::Text(other.to_string()),
    }
}

fn parse_date_string(text: &str) -> Option<NaiveDate> {
    let formats = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

// Excel serial dates count days from the 1900 epoch, with the off-by-two
// adjustment for the fictitious 1900-02-29. Serial 2958465 is 9999-12-31,
// the last date a workbook can hold.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(0.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dataset::{COL_COMMISSION, COL_DESK};
    use rust_xlsxwriter::Workbook;

    enum Cell<'a> {
        S(&'a str),
        N(f64),
    }

    fn workbook_bytes(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header).unwrap();
        }
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                match cell {
                    Cell::S(s) => worksheet
                        .write_string(row_idx as u32 + 1, col_idx as u16, *s)
                        .unwrap(),
                    Cell::N(n) => worksheet
                        .write_number(row_idx as u32 + 1, col_idx as u16, *n)
                        .unwrap(),
                };
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    const PRODUCT_HEADERS: [&str; 6] = [
        "Código Cliente",
        "Data da Operação",
        "Ação da Estrutura",
        "Comissão Gerada",
        "Assessor",
        "Status",
    ];

    fn product_row<'a>(client: &'a str, commission: f64, status: &'a str) -> Vec<Cell<'a>> {
        vec![
            Cell::S(client),
            Cell::S("15/03/2024"),
            Cell::S("Compra"),
            Cell::N(commission),
            Cell::S("Ana"),
            Cell::S(status),
        ]
    }

    #[test]
    fn products_keep_only_fully_executed_rows() {
        let bytes = workbook_bytes(
            &PRODUCT_HEADERS,
            &[
                product_row("C1", 100.0, "Totalmente Executado"),
                product_row("C2", 200.0, "Cancelado"),
                product_row("C3", 300.0, "Totalmente Executado"),
            ],
        );

        let dataset = ingest_dataset(DatasetKind::Produtos, &bytes).unwrap();
        assert_eq!(dataset.rows.len(), 2);
        assert!((dataset.sum_numeric(COL_COMMISSION) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn missing_advisor_column_reports_exactly_that_label() {
        let headers = [
            "Código Cliente",
            "Data da Operação",
            "Ação da Estrutura",
            "Comissão Gerada",
            "Status",
        ];
        let bytes = workbook_bytes(&headers, &[]);

        let err = ingest_dataset(DatasetKind::Produtos, &bytes).unwrap_err();
        match err {
            AppError::SchemaInvalid { sheet, columns } => {
                assert_eq!(sheet, "Produtos Estruturados");
                assert_eq!(columns, vec!["Assessor"]);
            }
            other => panic!("expected SchemaInvalid, got {:?}", other),
        }
    }

    #[test]
    fn schema_failure_message_joins_labels_with_comma_space() {
        let bytes = workbook_bytes(&["Código Cliente"], &[]);
        let err = ingest_dataset(DatasetKind::Corretagem, &bytes).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Colunas Faltando na Planilha de Corretagem: Data da Operação, Comissão BMF, \
             Comissão BOV, Receita Total, Código Assessor, Canal"
        );
    }

    #[test]
    fn unreadable_upload_is_a_read_failure() {
        let err = ingest_dataset(DatasetKind::Produtos, b"not a spreadsheet").unwrap_err();
        assert!(matches!(err, AppError::ReadFailure { .. }));
        assert!(err
            .to_string()
            .starts_with("Erro ao ler a planilha de Produtos Estruturados: "));
    }

    #[test]
    fn brokerage_ingestion_appends_derived_columns() {
        let headers = [
            "Código Cliente",
            "Data da Operação",
            "Comissão BMF",
            "Comissão BOV",
            "Receita Total",
            "Código Assessor",
            "Canal",
        ];
        let bytes = workbook_bytes(
            &headers,
            &[vec![
                Cell::S("C1"),
                Cell::S("2024-03-15"),
                Cell::N(10.0),
                Cell::N(20.0),
                Cell::N(1000.0),
                Cell::S("A1"),
                Cell::S("Mesa"),
            ]],
        );

        let dataset = ingest_dataset(DatasetKind::Corretagem, &bytes).unwrap();
        assert_eq!(dataset.columns.len(), 11);
        let desk = dataset.column_index(COL_DESK).unwrap();
        assert_eq!(dataset.rows[0][desk], Value::Number(142.5));
    }

    #[test]
    fn date_cells_parse_from_strings_and_serials() {
        assert_eq!(
            parse_date_string("15/03/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(
            parse_date_string("2024-03-15"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        // 2024-03-15 is serial 45366 in the 1900 date system.
        assert_eq!(
            excel_serial_to_date(45366.0),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(parse_date_string("não é data"), None);
    }
}
