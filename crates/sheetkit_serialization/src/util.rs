//! Stateless helpers over normalized JSON field values.

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use sheetkit_io_xlsx::EnumCellValue;

use crate::conf::{C_DATE_FORMAT_ISO8601, C_KEY_VALUE};

////////////////////////////////////////////////////////////////////////////////
// #region ItemAccess

/// Entry `idx` of a field value.
///
/// Lists are indexed; a bare object counts as a one-entry list. Scalars and
/// null have no entries.
pub fn select_nth_item(value: &Value, idx: usize) -> Option<&Value> {
    match value {
        Value::Array(l_items) => l_items.get(idx),
        Value::Object(_) if idx == 0 => Some(value),
        _ => None,
    }
}

/// First entry of a field value, see [`select_nth_item`].
pub fn select_first_item(value: &Value) -> Option<&Value> {
    select_nth_item(value, 0)
}

/// Property `key` of an object item.
pub fn select_item_property<'a>(item: &'a Value, key: &str) -> Option<&'a Value> {
    item.as_object().and_then(|dict_item| dict_item.get(key))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ValueConversion

/// Text key of a scalar, used for id and code lookups.
pub fn derive_text_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Convert a JSON value into a cell value.
///
/// Numbers stay numeric, booleans render as `True`/`False`, null and empty
/// strings are blank, and lists/objects render as compact JSON.
pub fn derive_cell_value_from_json(value: &Value) -> EnumCellValue {
    match value {
        Value::Null => EnumCellValue::None,
        Value::Bool(b) => EnumCellValue::String(if *b { "True" } else { "False" }.to_string()),
        Value::Number(n) => match n.as_f64() {
            Some(val) => EnumCellValue::Number(val),
            None => EnumCellValue::String(n.to_string()),
        },
        Value::String(s) => EnumCellValue::from_text(s.as_str()),
        Value::Array(_) | Value::Object(_) => EnumCellValue::from_text(value.to_string()),
    }
}

/// Text rendering of an item: its `value` property, else its first scalar
/// property, else the scalar itself.
pub fn derive_item_text(item: &Value) -> EnumCellValue {
    let c_text = match item {
        Value::Object(dict_item) => dict_item
            .get(C_KEY_VALUE)
            .and_then(derive_text_from_json)
            .or_else(|| dict_item.values().find_map(derive_text_from_json)),
        _ => derive_text_from_json(item),
    };
    c_text.map(EnumCellValue::from_text).unwrap_or_default()
}

/// Raw rendering of an item, unwrapping `{"value": x}` to `x`.
pub fn derive_item_raw(item: &Value) -> EnumCellValue {
    match select_item_property(item, C_KEY_VALUE) {
        Some(value) => derive_cell_value_from_json(value),
        None => derive_cell_value_from_json(item),
    }
}

/// `true` for values that carry nothing to format (null, empty string).
pub fn is_blank_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Dates

/// Parse a Unix timestamp in seconds from a number or numeric string.
pub fn parse_unix_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|val| val.trunc() as i64)),
        Value::String(s) => {
            let c_text = s.trim();
            c_text
                .parse::<i64>()
                .ok()
                .or_else(|| c_text.parse::<f64>().ok().map(|val| val.trunc() as i64))
        }
        _ => None,
    }
}

/// Render a Unix timestamp as ISO-8601 at a fixed UTC offset.
///
/// `None` when the value is not a timestamp or lies outside the supported
/// date range.
pub fn format_unix_timestamp_iso8601(value: &Value, utc_offset_secs: i32) -> Option<String> {
    let n_secs = parse_unix_timestamp(value)?;
    let offset = FixedOffset::east_opt(utc_offset_secs)?;
    let dt_utc = DateTime::from_timestamp(n_secs, 0)?;
    Some(
        dt_utc
            .with_timezone(&offset)
            .format(C_DATE_FORMAT_ISO8601)
            .to_string(),
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_select_nth_item_handles_lists_objects_and_scalars() {
        let l_items = json!([{"value": "a"}, {"value": "b"}]);
        assert_eq!(select_nth_item(&l_items, 1), Some(&json!({"value": "b"})));
        assert_eq!(select_nth_item(&l_items, 2), None);

        let dict_item = json!({"value": "a"});
        assert_eq!(select_first_item(&dict_item), Some(&dict_item));
        assert_eq!(select_nth_item(&dict_item, 1), None);

        assert_eq!(select_first_item(&json!("a")), None);
        assert_eq!(select_first_item(&Value::Null), None);
    }

    #[test]
    fn test_derive_cell_value_from_json() {
        assert_eq!(derive_cell_value_from_json(&json!(null)), EnumCellValue::None);
        assert_eq!(derive_cell_value_from_json(&json!("")), EnumCellValue::None);
        assert_eq!(
            derive_cell_value_from_json(&json!(12)),
            EnumCellValue::Number(12.0)
        );
        assert_eq!(
            derive_cell_value_from_json(&json!(true)),
            EnumCellValue::String("True".to_string())
        );
        assert_eq!(
            derive_cell_value_from_json(&json!({"uri": "x"})),
            EnumCellValue::String(r#"{"uri":"x"}"#.to_string())
        );
    }

    #[test]
    fn test_derive_item_text_and_raw() {
        assert_eq!(
            derive_item_text(&json!({"value": 2019})),
            EnumCellValue::String("2019".to_string())
        );
        assert_eq!(
            derive_item_raw(&json!({"value": 2019})),
            EnumCellValue::Number(2019.0)
        );
        assert_eq!(
            derive_item_text(&json!({"uri": "https://example.org", "title": ""})),
            EnumCellValue::String("https://example.org".to_string())
        );
        assert_eq!(
            derive_item_raw(&json!({"uri": "https://example.org"})),
            EnumCellValue::String(r#"{"uri":"https://example.org"}"#.to_string())
        );
    }

    #[test]
    fn test_format_unix_timestamp_iso8601() {
        assert_eq!(
            format_unix_timestamp_iso8601(&json!(0), 0).as_deref(),
            Some("1970-01-01T00:00:00+0000")
        );
        assert_eq!(
            format_unix_timestamp_iso8601(&json!("1500000000"), 0).as_deref(),
            Some("2017-07-14T02:40:00+0000")
        );
        assert_eq!(
            format_unix_timestamp_iso8601(&json!(0), 3600).as_deref(),
            Some("1970-01-01T01:00:00+0100")
        );
        assert_eq!(format_unix_timestamp_iso8601(&json!("yesterday"), 0), None);
    }

    #[test]
    fn test_is_blank_json_keeps_zero() {
        assert!(is_blank_json(&json!(null)));
        assert!(is_blank_json(&json!(" ")));
        assert!(!is_blank_json(&json!(0)));
        assert!(!is_blank_json(&json!("0")));
    }
}
