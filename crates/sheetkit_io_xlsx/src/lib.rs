//! `sheetkit_io_xlsx` v1:
//! Rust-side XLSX grid writer kernel.
//!
//! Module layout:
//! - `conf`   : constants and default presets
//! - `spec`   : cell/grid models, options, errors
//! - `util`   : pure helper functions
//! - `writer` : grid writer trait and pure-Rust workbook writer
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_FORMAT_XLSX, C_MIME_TYPE_XLSX, C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL, derive_default_xlsx_write_options,
};
pub use spec::{EnumCellValue, SpecSheetGrid, SpecXlsxReport, SpecXlsxWriteOptions, XlsxWriteError};
pub use util::{sanitize_sheet_name, validate_grid};
pub use writer::{GridWriter, XlsxWriter};
