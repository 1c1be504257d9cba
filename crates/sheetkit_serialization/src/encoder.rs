//! `xlsx` response encoder: payload -> schema plan -> grid -> workbook bytes.

use log::info;
use serde_json::Value;
use sheetkit_io_xlsx::{
    C_FORMAT_XLSX, C_MIME_TYPE_XLSX, GridWriter, SpecSheetGrid, SpecXlsxWriteOptions, XlsxWriter,
    derive_default_xlsx_write_options,
};

use crate::conf::derive_default_export_options;
use crate::formatter::RowFormatter;
use crate::payload::EnumPayload;
use crate::planner::plan_columns;
use crate::spec::{
    DataEncodingError, EnumEncodeFailure, SpecEncodeContext, SpecExportOptions, StoreError,
};
use crate::store::{
    CacheBypass, CodedValueTable, FieldDefinitionRegistry, IdentityTranslator, NestedRecordStore,
    NoopCacheBypass, TermStore, Translator,
};

/// Serialization encoder producing a single-sheet XLSX document.
///
/// Collaborators are injected once; every [`Self::encode`] call plans its
/// columns afresh and keeps no state afterwards.
pub struct XlsxEncoder {
    nested_store: Box<dyn NestedRecordStore>,
    term_store: Box<dyn TermStore>,
    field_registry: Box<dyn FieldDefinitionRegistry>,
    coded_values: CodedValueTable,
    cache_bypass: Box<dyn CacheBypass>,
    translator: Box<dyn Translator>,
    export_options: SpecExportOptions,
    write_options: SpecXlsxWriteOptions,
}

impl XlsxEncoder {
    pub fn new(
        nested_store: impl NestedRecordStore + 'static,
        term_store: impl TermStore + 'static,
        field_registry: impl FieldDefinitionRegistry + 'static,
        coded_values: CodedValueTable,
    ) -> Self {
        Self {
            nested_store: Box::new(nested_store),
            term_store: Box::new(term_store),
            field_registry: Box::new(field_registry),
            coded_values,
            cache_bypass: Box::new(NoopCacheBypass),
            translator: Box::new(IdentityTranslator),
            export_options: derive_default_export_options(),
            write_options: derive_default_xlsx_write_options(),
        }
    }

    pub fn with_cache_bypass(mut self, cache_bypass: impl CacheBypass + 'static) -> Self {
        self.cache_bypass = Box::new(cache_bypass);
        self
    }

    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    pub fn with_export_options(mut self, export_options: SpecExportOptions) -> Self {
        self.export_options = export_options;
        self
    }

    pub fn with_write_options(mut self, write_options: SpecXlsxWriteOptions) -> Self {
        self.write_options = write_options;
        self
    }

    /// Format identifier this encoder registers for.
    pub fn format() -> &'static str {
        C_FORMAT_XLSX
    }

    /// Content type of the produced documents.
    pub fn mime_type() -> &'static str {
        C_MIME_TYPE_XLSX
    }

    /// Capability check consulted by the dispatcher before [`Self::encode`].
    pub fn supports_encoding(&self, format: &str) -> bool {
        format == C_FORMAT_XLSX
    }

    pub fn export_options(&self) -> &SpecExportOptions {
        &self.export_options
    }

    /// Encode `payload` into XLSX bytes.
    ///
    /// Fires the cache bypass once, then builds the whole grid in memory
    /// before writing. Any failure surfaces as one [`DataEncodingError`].
    pub fn encode(
        &self,
        payload: &Value,
        format: &str,
        context: &SpecEncodeContext,
    ) -> Result<Vec<u8>, DataEncodingError> {
        let mut writer = XlsxWriter::new(self.derive_write_options(context));
        self.encode_with_writer(payload, format, &mut writer)
    }

    /// [`Self::encode`] with a caller-supplied grid writer.
    pub fn encode_with_writer(
        &self,
        payload: &Value,
        format: &str,
        writer: &mut dyn GridWriter,
    ) -> Result<Vec<u8>, DataEncodingError> {
        self.cache_bypass.trigger();
        self.encode_grid(payload, format, writer)
            .map_err(DataEncodingError::from)
    }

    /// Flatten `payload` into the sheet grid without writing it.
    ///
    /// Empty payloads give a one-cell grid holding the translated no-data
    /// message; otherwise row 1 holds the labels planned from the first record.
    pub fn build_grid(&self, payload: &Value) -> Result<SpecSheetGrid, StoreError> {
        let l_records = EnumPayload::classify(payload).into_records();
        let Some(example_record) = l_records.first() else {
            return Ok(SpecSheetGrid::single_cell(
                self.translator
                    .translate(&self.export_options.no_data_message),
            ));
        };

        let plan = plan_columns(
            example_record,
            self.field_registry.as_ref(),
            &self.export_options,
        );
        let formatter = RowFormatter::new(
            self.nested_store.as_ref(),
            self.term_store.as_ref(),
            &self.coded_values,
            &self.export_options,
        );

        let mut grid = SpecSheetGrid::with_header(plan.labels());
        for record in &l_records {
            grid.push_row(formatter.format_row(record, &plan)?);
        }
        Ok(grid)
    }

    fn encode_grid(
        &self,
        payload: &Value,
        format: &str,
        writer: &mut dyn GridWriter,
    ) -> Result<Vec<u8>, EnumEncodeFailure> {
        if !self.supports_encoding(format) {
            return Err(EnumEncodeFailure::UnsupportedFormat(format.to_string()));
        }

        let grid = self.build_grid(payload)?;
        let v_bytes = writer.write_grid(&grid)?;
        info!(
            "encoded {format}: rows={} cols={} bytes={}",
            grid.height_total(),
            grid.width(),
            v_bytes.len()
        );
        Ok(v_bytes)
    }

    fn derive_write_options(&self, context: &SpecEncodeContext) -> SpecXlsxWriteOptions {
        match &context.sheet_name {
            Some(c_sheet_name) => SpecXlsxWriteOptions {
                sheet_name: c_sheet_name.clone(),
                ..self.write_options.clone()
            },
            None => self.write_options.clone(),
        }
    }
}
