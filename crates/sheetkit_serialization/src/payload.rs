//! Normalization of arbitrary encode payloads into a record sequence.

use std::borrow::Cow;

use serde_json::Value;

use crate::spec::RawRecord;

/// Shape of the payload handed to the encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnumPayload<'a> {
    /// List of records.
    Sequence(&'a [Value]),
    /// Object whose values are the records.
    Mapping(&'a RawRecord),
    /// Any other value, standing for a single record.
    Scalar(&'a Value),
}

impl<'a> EnumPayload<'a> {
    pub fn classify(payload: &'a Value) -> Self {
        match payload {
            Value::Array(l_values) => Self::Sequence(l_values),
            Value::Object(dict_values) => Self::Mapping(dict_values),
            _ => Self::Scalar(payload),
        }
    }

    /// Elements in encode order, borrowed from the payload.
    pub fn elements(&self) -> Vec<&'a Value> {
        match *self {
            Self::Sequence(l_values) => l_values.iter().collect(),
            Self::Mapping(dict_values) => dict_values.values().collect(),
            Self::Scalar(value) => vec![value],
        }
    }

    /// Elements as records; non-object elements become empty records.
    pub fn into_records(self) -> Vec<Cow<'a, RawRecord>> {
        self.elements()
            .into_iter()
            .map(|value| match value {
                Value::Object(dict_record) => Cow::Borrowed(dict_record),
                _ => Cow::Owned(RawRecord::new()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_classify_sequence_passes_through() {
        let payload = json!([{"a": 1}, {"a": 2}]);
        let l_records = EnumPayload::classify(&payload).into_records();
        assert_eq!(l_records.len(), 2);
        assert_eq!(l_records[1].get("a"), Some(&json!(2)));
    }

    #[test]
    fn test_classify_mapping_enumerates_values_in_order() {
        let payload = json!({"u2": {"id": "2"}, "u1": {"id": "1"}});
        let payload_kind = EnumPayload::classify(&payload);
        assert!(matches!(payload_kind, EnumPayload::Mapping(_)));

        let l_records = payload_kind.into_records();
        assert_eq!(l_records.len(), 2);
        assert_eq!(l_records[0].get("id"), Some(&json!("2")));
        assert_eq!(l_records[1].get("id"), Some(&json!("1")));
    }

    #[test]
    fn test_classify_scalar_wraps_single_element() {
        for payload in [json!(null), json!(3), json!("x"), json!(false)] {
            let payload_kind = EnumPayload::classify(&payload);
            assert!(matches!(payload_kind, EnumPayload::Scalar(_)));
            let l_records = payload_kind.into_records();
            assert_eq!(l_records.len(), 1);
            assert!(l_records[0].is_empty());
        }
    }

    #[test]
    fn test_classify_empty_sequence_is_empty() {
        let payload = json!([]);
        assert!(EnumPayload::classify(&payload).into_records().is_empty());
    }
}
