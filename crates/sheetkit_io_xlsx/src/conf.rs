//! XLSX constants and default preset factories.

use crate::spec::SpecXlsxWriteOptions;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Serialization format identifier served by this kernel.
pub const C_FORMAT_XLSX: &str = "xlsx";
/// Content type registered for [`C_FORMAT_XLSX`] responses.
pub const C_MIME_TYPE_XLSX: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Worksheet name used when none is configured.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";
/// Pinned workbook creation date `(year, month, day)`.
///
/// The document properties part otherwise embeds the wall clock, which makes
/// two writes of the same grid differ byte-wise.
pub const TUP_DOC_CREATED_YMD_DEFAULT: (u16, u8, u8) = (2000, 1, 1);

/// Build default write options.
pub fn derive_default_xlsx_write_options() -> SpecXlsxWriteOptions {
    SpecXlsxWriteOptions::default()
}
