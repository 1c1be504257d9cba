//! Shared XLSX specification models.

use crate::conf::{C_SHEET_NAME_DEFAULT, TUP_DOC_CREATED_YMD_DEFAULT};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// Normalized cell value during conversion/write pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl EnumCellValue {
    /// Build a text cell, mapping the empty string to [`EnumCellValue::None`].
    pub fn from_text(value: impl Into<String>) -> Self {
        let c_value = value.into();
        if c_value.is_empty() {
            Self::None
        } else {
            Self::String(c_value)
        }
    }

    /// `true` for blank cells and empty text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::String(s) => s.is_empty(),
            Self::Number(_) => false,
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::from_text(value)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridSpecification

/// In-memory sheet content handed to a [`crate::writer::GridWriter`].
///
/// `header` becomes worksheet row 1 when present; `rows` follow it. A grid
/// without header writes its first data row at row 1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetGrid {
    /// Optional header labels.
    pub header: Option<Vec<String>>,
    /// Body rows, positionally aligned with `header`.
    pub rows: Vec<Vec<EnumCellValue>>,
}

impl SpecSheetGrid {
    /// Grid with a header row and no body rows yet.
    pub fn with_header(header: Vec<String>) -> Self {
        Self {
            header: Some(header),
            rows: Vec::new(),
        }
    }

    /// One-cell grid holding `text` at A1.
    pub fn single_cell(text: impl Into<String>) -> Self {
        Self {
            header: None,
            rows: vec![vec![EnumCellValue::from_text(text)]],
        }
    }

    /// Append one body row.
    pub fn push_row(&mut self, row: Vec<EnumCellValue>) {
        self.rows.push(row);
    }

    /// Number of header rows (0 or 1).
    pub fn height_header(&self) -> usize {
        usize::from(self.header.is_some())
    }

    /// Total worksheet rows including header.
    pub fn height_total(&self) -> usize {
        self.height_header() + self.rows.len()
    }

    /// Declared width: header width, else widest body row.
    pub fn width(&self) -> usize {
        match &self.header {
            Some(l_header) => l_header.len(),
            None => self.rows.iter().map(Vec::len).max().unwrap_or(0),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Writer-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Worksheet name; sanitized before use.
    pub sheet_name: String,
    /// Pinned creation date for document properties; `None` keeps the
    /// library default (current time).
    pub doc_created_ymd: Option<(u16, u8, u8)>,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            sheet_name: C_SHEET_NAME_DEFAULT.to_string(),
            doc_created_ymd: Some(TUP_DOC_CREATED_YMD_DEFAULT),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Final worksheet name.
    pub sheet_name: String,
    /// Worksheet rows written, header included.
    pub n_rows_written: usize,
    /// Worksheet columns spanned.
    pub n_cols_written: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Top-level write failure.
#[derive(Debug, thiserror::Error)]
pub enum XlsxWriteError {
    /// Grid has more rows than one worksheet holds.
    #[error("Excel row limit exceeded: {n_rows} rows > {n_rows_max}.")]
    RowLimitExceeded {
        /// Rows requested, header included.
        n_rows: usize,
        /// Worksheet row limit.
        n_rows_max: usize,
    },
    /// Grid has more columns than one worksheet holds.
    #[error("Excel column limit exceeded: {n_cols} columns > {n_cols_max}.")]
    ColumnLimitExceeded {
        /// Columns requested.
        n_cols: usize,
        /// Worksheet column limit.
        n_cols_max: usize,
    },
    /// Body row wider than the header.
    #[error("Row {row_idx} has {n_cells} cells; header declares {n_cols}.")]
    RaggedRow {
        /// Zero-based body row index.
        row_idx: usize,
        /// Cells in the offending row.
        n_cells: usize,
        /// Header width.
        n_cols: usize,
    },
    /// Row/column index does not fit the worksheet index type.
    #[error("{0}")]
    IndexOverflow(String),
    /// Error raised by the workbook backend.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
