//! Row flattening against a planned schema.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use log::{debug, warn};
use serde_json::Value;
use sheetkit_io_xlsx::EnumCellValue;

use crate::conf::{C_KEY_TARGET_ID, C_KEY_VALUE};
use crate::spec::{
    EnumSubFieldRender, EnumValueRule, RawRecord, SpecColumn, SpecExportOptions, SpecNestedSlot,
    SpecSchemaPlan, SpecSubRecord, StoreError,
};
use crate::store::{CodedValueTable, NestedRecordStore, TermStore};
use crate::util::{
    derive_cell_value_from_json, derive_item_raw, derive_item_text, derive_text_from_json,
    format_unix_timestamp_iso8601, is_blank_json, select_first_item, select_item_property,
    select_nth_item,
};

/// Resolved nested sub-records of one record, keyed by `(container, slot)`.
///
/// `None` marks a slot with no sub-record so it is never looked up twice.
type SlotCache<'p> = BTreeMap<(&'p str, usize), Option<SpecSubRecord>>;

/// Cell-level hook applied to every formatted value before it reaches the grid.
pub fn format_value(value: EnumCellValue) -> EnumCellValue {
    value
}

/// Resolves each planned column of a record to one display value.
pub struct RowFormatter<'a> {
    nested_store: &'a dyn NestedRecordStore,
    term_store: &'a dyn TermStore,
    coded_values: &'a CodedValueTable,
    options: &'a SpecExportOptions,
}

impl<'a> RowFormatter<'a> {
    pub fn new(
        nested_store: &'a dyn NestedRecordStore,
        term_store: &'a dyn TermStore,
        coded_values: &'a CodedValueTable,
        options: &'a SpecExportOptions,
    ) -> Self {
        Self {
            nested_store,
            term_store,
            coded_values,
            options,
        }
    }

    /// Format `record` into one value per column of `plan`, in plan order.
    ///
    /// Missing fields, slots and lookup targets yield blank cells; only
    /// store failures are errors. The record itself is never modified.
    pub fn format_row(
        &self,
        record: &RawRecord,
        plan: &SpecSchemaPlan,
    ) -> Result<Vec<EnumCellValue>, StoreError> {
        let mut dict_slots = SlotCache::new();
        let mut l_values = Vec::with_capacity(plan.len());

        for column in plan.iter() {
            let value = match &column.nested {
                Some(slot) => match self.resolve_slot(record, slot, &mut dict_slots)? {
                    Some(sub_record) => self.format_nested_value(sub_record, column)?,
                    None => EnumCellValue::None,
                },
                None => self.format_plain_value(record, column),
            };
            l_values.push(format_value(value));
        }

        Ok(l_values)
    }

    fn resolve_slot<'p, 'c>(
        &self,
        record: &RawRecord,
        slot: &'p SpecNestedSlot,
        dict_slots: &'c mut SlotCache<'p>,
    ) -> Result<Option<&'c SpecSubRecord>, StoreError> {
        let resolved = match dict_slots.entry((slot.container_field.as_str(), slot.slot_index)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(self.load_slot(record, slot)?),
        };
        Ok(resolved.as_ref())
    }

    fn load_slot(
        &self,
        record: &RawRecord,
        slot: &SpecNestedSlot,
    ) -> Result<Option<SpecSubRecord>, StoreError> {
        let Some(entry) = record
            .get(&slot.container_field)
            .and_then(|value| select_nth_item(value, slot.slot_index))
        else {
            return Ok(None);
        };

        let Some(c_id) =
            select_item_property(entry, C_KEY_TARGET_ID).and_then(derive_text_from_json)
        else {
            debug!(
                "{}[{}] has no {C_KEY_TARGET_ID}",
                slot.container_field, slot.slot_index
            );
            return Ok(None);
        };

        let sub_record = self
            .nested_store
            .load(&self.options.nested_entity_type, &c_id)?;
        if sub_record.is_none() {
            debug!(
                "{} {c_id:?} referenced by {}[{}] not found",
                self.options.nested_entity_type, slot.container_field, slot.slot_index
            );
        }
        Ok(sub_record)
    }

    fn format_nested_value(
        &self,
        sub_record: &SpecSubRecord,
        column: &SpecColumn,
    ) -> Result<EnumCellValue, StoreError> {
        let Some(item) = sub_record
            .fields
            .get(&column.source_field)
            .and_then(select_first_item)
        else {
            return Ok(EnumCellValue::None);
        };

        let value = match column.value_rule {
            EnumValueRule::ReferenceName => self.lookup_term_name(item)?,
            EnumValueRule::CodedLookup => {
                self.lookup_coded(select_item_property(item, C_KEY_VALUE))
            }
            EnumValueRule::NestedField(EnumSubFieldRender::Text) => derive_item_text(item),
            _ => derive_item_raw(item),
        };
        Ok(value)
    }

    fn format_plain_value(&self, record: &RawRecord, column: &SpecColumn) -> EnumCellValue {
        let Some(raw) = record
            .get(&column.source_field)
            .and_then(select_first_item)
            .and_then(|item| select_item_property(item, C_KEY_VALUE))
        else {
            return EnumCellValue::None;
        };

        match column.value_rule {
            EnumValueRule::CodedLookup => self.lookup_coded(Some(raw)),
            EnumValueRule::Date if !is_blank_json(raw) => {
                match format_unix_timestamp_iso8601(raw, self.options.date_utc_offset_secs) {
                    Some(c_date) => EnumCellValue::String(c_date),
                    None => {
                        warn!(
                            "{}: {raw} is not a Unix timestamp; kept as-is",
                            column.source_field
                        );
                        derive_cell_value_from_json(raw)
                    }
                }
            }
            _ => derive_cell_value_from_json(raw),
        }
    }

    fn lookup_term_name(&self, item: &Value) -> Result<EnumCellValue, StoreError> {
        let Some(c_id) =
            select_item_property(item, C_KEY_TARGET_ID).and_then(derive_text_from_json)
        else {
            return Ok(EnumCellValue::None);
        };
        Ok(self
            .term_store
            .load(&c_id)?
            .map(|term| EnumCellValue::from_text(term.name))
            .unwrap_or_default())
    }

    fn lookup_coded(&self, code: Option<&Value>) -> EnumCellValue {
        code.and_then(derive_text_from_json)
            .and_then(|c_code| self.coded_values.lookup(&c_code))
            .map(EnumCellValue::from_text)
            .unwrap_or_default()
    }
}
