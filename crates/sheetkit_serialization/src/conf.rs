//! Export field constants and default preset factories.

use crate::spec::SpecExportOptions;

/// Fields moved to the front of the sheet, in this order.
pub const TUP_FIELDS_FRONT: [&str; 2] = ["field_name_given", "field_name"];

/// Statistics fields moved to the back of the sheet, in this order.
pub const TUP_FIELDS_TRAILING: [&str; 5] = ["status", "created", "changed", "access", "login"];

/// Account bookkeeping fields never exported.
///
/// `field_institution` arrives through a view relationship on the main query
/// and is dropped from the top level; it stays available inside nested groups.
pub const TUP_FIELDS_DENIED: [&str; 12] = [
    "uuid",
    "langcode",
    "default_langcode",
    "preferred_langcode",
    "preferred_admin_langcode",
    "timezone",
    "init",
    "roles",
    "ds_switch",
    "path",
    "user_picture",
    "field_institution",
];

/// Nested-group container fields and the bundle of the records they reference.
pub const TUP_NESTED_GROUPS: [(&str, &str); 2] =
    [("field_jobs", "job"), ("field_scholarships", "scholarship")];

/// Unix timestamp fields rendered as ISO-8601 dates.
pub const TUP_FIELDS_DATE: [&str; 4] = ["created", "changed", "access", "login"];

/// Country-code fields resolved through the coded value table.
pub const TUP_FIELDS_COUNTRY: [&str; 2] = ["field_country", "field_country_residency"];

/// Term reference fields resolved to the term display name.
pub const TUP_FIELDS_TERM: [&str; 4] = [
    "field_institution",
    "field_qualification",
    "field_sector",
    "field_area",
];

/// Entity type of records referenced by nested-group entries.
pub const C_NESTED_ENTITY_TYPE: &str = "paragraph";

/// Nested-group entries surfaced as column groups.
pub const N_PARAGRAPH_COUNT: usize = 2;

/// Name prefix of custom (exportable) sub-fields.
pub const C_SUBFIELD_PREFIX: &str = "field_";

/// Message written to A1 when there is nothing to export.
pub const C_NO_DATA_MESSAGE: &str = "No alumni for the selected query.";

/// Key holding a reference id inside an item.
pub const C_KEY_TARGET_ID: &str = "target_id";
/// Key holding the main scalar inside an item.
pub const C_KEY_VALUE: &str = "value";

/// ISO-8601 layout for timestamp columns (`1970-01-01T00:00:00+0000`).
pub const C_DATE_FORMAT_ISO8601: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Build default export options.
pub fn derive_default_export_options() -> SpecExportOptions {
    SpecExportOptions::default()
}
