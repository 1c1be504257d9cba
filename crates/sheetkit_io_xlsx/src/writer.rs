//! XLSX writer kernel that converts an in-memory grid into workbook bytes.

use log::{debug, warn};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook, Worksheet};

use crate::spec::{
    EnumCellValue, SpecSheetGrid, SpecXlsxReport, SpecXlsxWriteOptions, XlsxWriteError,
};
use crate::util::{cast_col_num, cast_row_num, sanitize_sheet_name, validate_grid};

/// Sink that serializes one grid into a spreadsheet document.
pub trait GridWriter {
    /// Serialize `grid` as a single worksheet and return the document bytes.
    fn write_grid(&mut self, grid: &SpecSheetGrid) -> Result<Vec<u8>, XlsxWriteError>;
}

/// Single-sheet workbook writer.
///
/// Every [`GridWriter::write_grid`] call builds a fresh workbook, so one
/// writer can serve repeated calls without carrying sheets over.
#[derive(Debug, Clone, Default)]
pub struct XlsxWriter {
    write_options: SpecXlsxWriteOptions,
    l_reports: Vec<SpecXlsxReport>,
}

impl XlsxWriter {
    /// Create writer bound to write options.
    pub fn new(write_options: SpecXlsxWriteOptions) -> Self {
        Self {
            write_options,
            l_reports: Vec::new(),
        }
    }

    /// Return immutable snapshot of per-call write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    fn write_workbook(
        &self,
        grid: &SpecSheetGrid,
    ) -> Result<(Vec<u8>, SpecXlsxReport), XlsxWriteError> {
        validate_grid(grid)?;

        let mut report = SpecXlsxReport::default();
        let c_sheet_name = sanitize_sheet_name(&self.write_options.sheet_name, "_");
        if c_sheet_name != self.write_options.sheet_name {
            report.warn(format!(
                "Sheet name {:?} sanitized to {c_sheet_name:?}.",
                self.write_options.sheet_name
            ));
        }

        let mut workbook = Workbook::new();
        if let Some((n_year, n_month, n_day)) = self.write_options.doc_created_ymd {
            let dt_created = ExcelDateTime::from_ymd(n_year, n_month, n_day)?;
            let properties = DocProperties::new().set_creation_datetime(&dt_created);
            workbook.set_properties(&properties);
        }

        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&c_sheet_name)?;
            write_header(worksheet, grid.header.as_deref())?;
            write_body(worksheet, &grid.rows, grid.height_header())?;
        }

        let v_bytes = workbook.save_to_buffer()?;

        report.sheet_name = c_sheet_name;
        report.n_rows_written = grid.height_total();
        report.n_cols_written = grid.width();
        Ok((v_bytes, report))
    }
}

impl GridWriter for XlsxWriter {
    fn write_grid(&mut self, grid: &SpecSheetGrid) -> Result<Vec<u8>, XlsxWriteError> {
        let (v_bytes, report) = self.write_workbook(grid)?;
        for c_warning in &report.warnings {
            warn!("{c_warning}");
        }
        debug!(
            "xlsx sheet {:?} written: rows={} cols={} bytes={}",
            report.sheet_name,
            report.n_rows_written,
            report.n_cols_written,
            v_bytes.len()
        );
        self.l_reports.push(report);
        Ok(v_bytes)
    }
}

fn write_header(
    worksheet: &mut Worksheet,
    header: Option<&[String]>,
) -> Result<(), XlsxWriteError> {
    let Some(l_labels) = header else {
        return Ok(());
    };

    for (col_idx, c_label) in l_labels.iter().enumerate() {
        if c_label.is_empty() {
            continue;
        }
        worksheet.write_string(cast_row_num(0)?, cast_col_num(col_idx)?, c_label)?;
    }
    Ok(())
}

fn write_body(
    worksheet: &mut Worksheet,
    rows: &[Vec<EnumCellValue>],
    n_rows_offset: usize,
) -> Result<(), XlsxWriteError> {
    for (row_idx, row_values) in rows.iter().enumerate() {
        for (col_idx, value) in row_values.iter().enumerate() {
            write_cell(worksheet, n_rows_offset + row_idx, col_idx, value)?;
        }
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
) -> Result<(), XlsxWriteError> {
    match value {
        EnumCellValue::None => {}
        EnumCellValue::String(val) if val.is_empty() => {}
        EnumCellValue::String(val) => {
            worksheet.write_string(cast_row_num(row_idx)?, cast_col_num(col_idx)?, val)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number(cast_row_num(row_idx)?, cast_col_num(col_idx)?, *val)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use pretty_assertions::assert_eq;

    use super::*;

    fn read_part(v_bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(v_bytes)).unwrap();
        let mut c_text = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut c_text)
            .unwrap();
        c_text
    }

    #[test]
    fn test_write_grid_emits_header_and_body() {
        let mut grid = SpecSheetGrid::with_header(vec!["name".to_string(), "age".to_string()]);
        grid.push_row(vec![EnumCellValue::from("Ada"), EnumCellValue::Number(36.0)]);

        let mut writer = XlsxWriter::default();
        let v_bytes = writer.write_grid(&grid).unwrap();

        let c_shared = read_part(&v_bytes, "xl/sharedStrings.xml");
        assert!(c_shared.contains("name"));
        assert!(c_shared.contains("Ada"));
        let c_sheet = read_part(&v_bytes, "xl/worksheets/sheet1.xml");
        assert!(c_sheet.contains(r#"r="B2""#));
        assert!(c_sheet.contains("<v>36</v>"));

        let l_reports = writer.report();
        assert_eq!(l_reports.len(), 1);
        assert_eq!(l_reports[0].n_rows_written, 2);
        assert_eq!(l_reports[0].n_cols_written, 2);
    }

    #[test]
    fn test_write_grid_is_byte_stable_with_pinned_creation_date() {
        let grid = SpecSheetGrid::single_cell("nothing here");
        let mut writer = XlsxWriter::default();
        let v_first = writer.write_grid(&grid).unwrap();
        let v_second = writer.write_grid(&grid).unwrap();
        assert_eq!(v_first, v_second);
    }

    #[test]
    fn test_write_grid_skips_blank_cells() {
        let mut grid = SpecSheetGrid::with_header(vec!["a".to_string(), "b".to_string()]);
        grid.push_row(vec![EnumCellValue::None, EnumCellValue::String(String::new())]);

        let mut writer = XlsxWriter::default();
        let v_bytes = writer.write_grid(&grid).unwrap();
        let c_sheet = read_part(&v_bytes, "xl/worksheets/sheet1.xml");
        assert!(!c_sheet.contains(r#"r="A2""#));
        assert!(!c_sheet.contains(r#"r="B2""#));
    }

    #[test]
    fn test_write_grid_reports_sanitized_sheet_name() {
        let mut writer = XlsxWriter::new(SpecXlsxWriteOptions {
            sheet_name: "alumni/2024".to_string(),
            ..Default::default()
        });
        writer.write_grid(&SpecSheetGrid::single_cell("x")).unwrap();

        let l_reports = writer.report();
        assert_eq!(l_reports[0].sheet_name, "alumni_2024");
        assert_eq!(l_reports[0].warnings.len(), 1);
    }

    #[test]
    fn test_write_grid_rejects_ragged_rows() {
        let mut grid = SpecSheetGrid::with_header(vec!["a".to_string()]);
        grid.push_row(vec![EnumCellValue::None, EnumCellValue::None]);

        let mut writer = XlsxWriter::default();
        assert!(matches!(
            writer.write_grid(&grid),
            Err(XlsxWriteError::RaggedRow { .. })
        ));
        assert!(writer.report().is_empty());
    }
}
