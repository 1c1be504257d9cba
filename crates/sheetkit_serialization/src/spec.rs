//! Export specification models, options and error types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sheetkit_io_xlsx::XlsxWriteError;

use crate::conf::{
    C_NESTED_ENTITY_TYPE, C_NO_DATA_MESSAGE, C_SUBFIELD_PREFIX, N_PARAGRAPH_COUNT,
    TUP_FIELDS_COUNTRY, TUP_FIELDS_DATE, TUP_FIELDS_DENIED, TUP_FIELDS_FRONT, TUP_FIELDS_TERM,
    TUP_FIELDS_TRAILING, TUP_NESTED_GROUPS,
};

/// One input row: field name to normalized field value.
pub type RawRecord = Map<String, Value>;

////////////////////////////////////////////////////////////////////////////////
// #region ExportOptions

/// Field selection and formatting rules applied by the planner/formatter.
///
/// Every field is optional when deserialized; missing ones keep defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecExportOptions {
    /// Fields forced to the front, in order.
    pub fields_front: Vec<String>,
    /// Fields forced to the back, in order.
    pub fields_trailing: Vec<String>,
    /// Fields dropped from the top level.
    pub fields_denied: BTreeSet<String>,
    /// Nested-group container field to referenced bundle.
    pub nested_groups: BTreeMap<String, String>,
    /// Entity type passed to the nested-record store.
    pub nested_entity_type: String,
    /// Number of nested entries expanded into column groups.
    pub paragraph_count: usize,
    /// Prefix marking exportable sub-fields.
    pub subfield_prefix: String,
    /// Fields holding Unix timestamps.
    pub fields_date: BTreeSet<String>,
    /// Fields holding country codes.
    pub fields_country: BTreeSet<String>,
    /// Fields referencing terms by id.
    pub fields_term: BTreeSet<String>,
    /// Untranslated text for the empty-result sheet.
    pub no_data_message: String,
    /// Offset from UTC, in seconds, used when rendering dates.
    pub date_utc_offset_secs: i32,
}

impl Default for SpecExportOptions {
    fn default() -> Self {
        Self {
            fields_front: to_owned_vec(&TUP_FIELDS_FRONT),
            fields_trailing: to_owned_vec(&TUP_FIELDS_TRAILING),
            fields_denied: to_owned_set(&TUP_FIELDS_DENIED),
            nested_groups: TUP_NESTED_GROUPS
                .iter()
                .map(|(c_field, c_bundle)| (c_field.to_string(), c_bundle.to_string()))
                .collect(),
            nested_entity_type: C_NESTED_ENTITY_TYPE.to_string(),
            paragraph_count: N_PARAGRAPH_COUNT,
            subfield_prefix: C_SUBFIELD_PREFIX.to_string(),
            fields_date: to_owned_set(&TUP_FIELDS_DATE),
            fields_country: to_owned_set(&TUP_FIELDS_COUNTRY),
            fields_term: to_owned_set(&TUP_FIELDS_TERM),
            no_data_message: C_NO_DATA_MESSAGE.to_string(),
            date_utc_offset_secs: 0,
        }
    }
}

impl SpecExportOptions {
    /// Parse options from JSON, keeping defaults for absent keys.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

fn to_owned_vec(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn to_owned_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Per-call encode context supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecEncodeContext {
    /// Worksheet name override for this call.
    pub sheet_name: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FieldDefinitions

/// How a nested sub-field renders when no lookup rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumSubFieldRender {
    /// Field type has a text rendering; use it.
    #[default]
    Text,
    /// Use the raw item, unwrapping `{"value": x}`.
    Raw,
}

/// One sub-field definition of a nested bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFieldDefinition {
    /// Machine name.
    pub name: String,
    /// Field type name as reported by the registry.
    pub field_type: String,
    /// Fallback rendering.
    #[serde(default)]
    pub render: EnumSubFieldRender,
}

impl SpecFieldDefinition {
    pub fn new(
        name: impl Into<String>,
        field_type: impl Into<String>,
        render: EnumSubFieldRender,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            render,
        }
    }
}

/// Separately stored record referenced from a nested-group entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecSubRecord {
    /// Storage id.
    pub id: String,
    /// Bundle the record belongs to.
    pub bundle: String,
    /// Field values in the same normalized form as [`RawRecord`].
    pub fields: RawRecord,
}

/// Term-like entity exposing a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecTerm {
    /// Storage id.
    pub id: String,
    /// Display name.
    pub name: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SchemaPlan

/// Extraction/formatting rule of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValueRule {
    /// Raw first value.
    Plain,
    /// Unix timestamp rendered as ISO-8601.
    Date,
    /// Code resolved through the coded value table.
    CodedLookup,
    /// Reference id resolved to the term display name.
    ReferenceName,
    /// Sub-field of a nested record, rendered per its definition.
    NestedField(EnumSubFieldRender),
}

/// Position inside a nested-group container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecNestedSlot {
    /// Container field on the raw record.
    pub container_field: String,
    /// Bundle of the referenced records.
    pub bundle: String,
    /// Zero-based entry index within the container.
    pub slot_index: usize,
}

/// One planned output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecColumn {
    /// Field read from the record (or the nested sub-record).
    pub source_field: String,
    /// Header text.
    pub label: String,
    /// Nested slot, for columns reaching into a nested group.
    pub nested: Option<SpecNestedSlot>,
    /// How the value is extracted.
    pub value_rule: EnumValueRule,
}

impl SpecColumn {
    /// Top-level column labeled by its field name.
    pub fn plain(field_name: impl Into<String>) -> Self {
        let c_name = field_name.into();
        Self {
            label: c_name.clone(),
            source_field: c_name,
            nested: None,
            value_rule: EnumValueRule::Plain,
        }
    }

    /// Column reading `definition` from entry `slot_index` of `container_field`.
    pub fn nested(
        definition: &SpecFieldDefinition,
        container_field: &str,
        bundle: &str,
        slot_index: usize,
    ) -> Self {
        Self {
            source_field: definition.name.clone(),
            label: format!("{}_{}", definition.name, slot_index + 1),
            nested: Some(SpecNestedSlot {
                container_field: container_field.to_string(),
                bundle: bundle.to_string(),
                slot_index,
            }),
            value_rule: EnumValueRule::NestedField(definition.render),
        }
    }
}

/// Ordered columns of one encode call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSchemaPlan {
    pub columns: Vec<SpecColumn>,
}

impl SpecSchemaPlan {
    /// Header labels in column order.
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.label.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpecColumn> {
        self.columns.iter()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failure reported by a storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Lookup raised instead of returning found/not-found.
    #[error("Lookup of {entity_type} {id:?} failed: {message}")]
    LookupFailed {
        /// Entity type queried.
        entity_type: String,
        /// Id queried.
        id: String,
        /// Backend error text.
        message: String,
    },
    /// Backend not reachable.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Internal failure of one encode call, before top-level wrapping.
#[derive(Debug, thiserror::Error)]
pub enum EnumEncodeFailure {
    /// Encoder called for a format it does not serve.
    #[error("Unsupported serialization format {0:?}.")]
    UnsupportedFormat(String),
    /// Nested-record or term lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Spreadsheet writer failed.
    #[error(transparent)]
    Write(#[from] XlsxWriteError),
}

/// Category of a [`DataEncodingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumEncodingErrorKind {
    UnsupportedFormat,
    Lookup,
    Write,
}

impl EnumEncodingErrorKind {
    /// Stable machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "unsupported_format",
            Self::Lookup => "lookup",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for EnumEncodingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only error surfaced by [`crate::encoder::XlsxEncoder::encode`].
#[derive(Debug, thiserror::Error)]
#[error("[{kind}] {message}")]
pub struct DataEncodingError {
    /// Failure category.
    pub kind: EnumEncodingErrorKind,
    /// Message of the original failure.
    pub message: String,
    /// Original failure.
    #[source]
    pub cause: EnumEncodeFailure,
}

impl From<EnumEncodeFailure> for DataEncodingError {
    fn from(cause: EnumEncodeFailure) -> Self {
        let kind = match &cause {
            EnumEncodeFailure::UnsupportedFormat(_) => EnumEncodingErrorKind::UnsupportedFormat,
            EnumEncodeFailure::Store(_) => EnumEncodingErrorKind::Lookup,
            EnumEncodeFailure::Write(_) => EnumEncodingErrorKind::Write,
        };
        Self {
            kind,
            message: cause.to_string(),
            cause,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_export_options_from_partial_json_keeps_defaults() {
        let options =
            SpecExportOptions::from_json_str(r#"{"paragraph_count": 3, "fields_front": []}"#)
                .unwrap();
        assert_eq!(options.paragraph_count, 3);
        assert!(options.fields_front.is_empty());
        assert_eq!(options.nested_entity_type, "paragraph");
        assert_eq!(
            options.nested_groups.get("field_jobs").map(String::as_str),
            Some("job")
        );
        assert!(options.fields_denied.contains("uuid"));
    }

    #[test]
    fn test_nested_column_label_is_one_based() {
        let definition =
            SpecFieldDefinition::new("field_employer", "string", EnumSubFieldRender::Text);
        let column = SpecColumn::nested(&definition, "field_jobs", "job", 1);
        assert_eq!(column.label, "field_employer_2");
        assert_eq!(
            column.value_rule,
            EnumValueRule::NestedField(EnumSubFieldRender::Text)
        );
    }

    #[test]
    fn test_data_encoding_error_keeps_cause() {
        let err = DataEncodingError::from(EnumEncodeFailure::Store(StoreError::Unavailable(
            "db down".to_string(),
        )));
        assert_eq!(err.kind, EnumEncodingErrorKind::Lookup);
        assert_eq!(err.message, "Storage unavailable: db down");
        assert_eq!(err.to_string(), "[lookup] Storage unavailable: db down");
        assert!(err.source().is_some());
    }
}
