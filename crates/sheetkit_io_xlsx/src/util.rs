//! Stateless helper utilities used by the XLSX writer kernel.

use crate::conf::{
    C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::{SpecSheetGrid, XlsxWriteError};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = C_SHEET_NAME_DEFAULT.to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridValidation

/// Check that `grid` fits one worksheet and no body row outgrows the header.
///
/// Rows shorter than the header are accepted; their tail cells stay blank.
pub fn validate_grid(grid: &SpecSheetGrid) -> Result<(), XlsxWriteError> {
    let n_rows = grid.height_total();
    if n_rows > N_NROWS_EXCEL_MAX {
        return Err(XlsxWriteError::RowLimitExceeded {
            n_rows,
            n_rows_max: N_NROWS_EXCEL_MAX,
        });
    }

    let n_cols = grid.width();
    if n_cols > N_NCOLS_EXCEL_MAX {
        return Err(XlsxWriteError::ColumnLimitExceeded {
            n_cols,
            n_cols_max: N_NCOLS_EXCEL_MAX,
        });
    }

    if grid.header.is_some()
        && let Some((row_idx, row)) = grid
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() > n_cols)
    {
        return Err(XlsxWriteError::RaggedRow {
            row_idx,
            n_cells: row.len(),
            n_cols,
        });
    }

    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasting

/// Convert a zero-based row index into the backend row type.
pub fn cast_row_num(value: usize) -> Result<u32, XlsxWriteError> {
    u32::try_from(value)
        .map_err(|_| XlsxWriteError::IndexOverflow(format!("row index overflow: {value}")))
}

/// Convert a zero-based column index into the backend column type.
pub fn cast_col_num(value: usize) -> Result<u16, XlsxWriteError> {
    u16::try_from(value)
        .map_err(|_| XlsxWriteError::IndexOverflow(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
