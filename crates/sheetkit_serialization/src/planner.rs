//! Column planning from an exemplar record.

use std::collections::BTreeSet;

use log::debug;

use crate::spec::{EnumValueRule, RawRecord, SpecColumn, SpecExportOptions, SpecSchemaPlan};
use crate::store::FieldDefinitionRegistry;

/// Derive the column layout of one encode call from `example_record`.
///
/// Steps:
/// 1. Order field names: front fields, the record's own order, trailing
///    fields; drop denied names and duplicates.
/// 2. Expand nested-group fields into `paragraph_count` groups of their
///    exportable sub-fields (`<subfield>_<n>` labels, slot-major order).
/// 3. Tag value rules from the date/country/term field sets.
///
/// Never fails: unknown bundles expand to zero columns.
pub fn plan_columns(
    example_record: &RawRecord,
    registry: &dyn FieldDefinitionRegistry,
    options: &SpecExportOptions,
) -> SpecSchemaPlan {
    let l_field_names = derive_ordered_field_names(example_record, options);

    let mut l_columns = Vec::new();
    for c_field_name in &l_field_names {
        match options.nested_groups.get(c_field_name) {
            Some(c_bundle) => l_columns.extend(expand_nested_group(
                c_field_name,
                c_bundle,
                registry,
                options,
            )),
            None => l_columns.push(SpecColumn::plain(c_field_name.as_str())),
        }
    }

    for column in &mut l_columns {
        column.value_rule = derive_value_rule(column, options);
    }

    debug!(
        "planned {} columns from {} fields",
        l_columns.len(),
        l_field_names.len()
    );
    SpecSchemaPlan { columns: l_columns }
}

/// Field names of `record` in export order.
pub fn derive_ordered_field_names(
    record: &RawRecord,
    options: &SpecExportOptions,
) -> Vec<String> {
    let set_front: BTreeSet<&str> = options.fields_front.iter().map(String::as_str).collect();
    let set_trailing: BTreeSet<&str> =
        options.fields_trailing.iter().map(String::as_str).collect();

    let iter_front = options
        .fields_front
        .iter()
        .filter(|c_name| record.contains_key(c_name.as_str()));
    let iter_middle = record.keys().filter(|c_name| {
        !set_front.contains(c_name.as_str()) && !set_trailing.contains(c_name.as_str())
    });
    let iter_trailing = options
        .fields_trailing
        .iter()
        .filter(|c_name| record.contains_key(c_name.as_str()));

    let mut set_seen = BTreeSet::new();
    iter_front
        .chain(iter_middle)
        .chain(iter_trailing)
        .filter(|c_name| !options.fields_denied.contains(c_name.as_str()))
        .filter(|c_name| set_seen.insert(c_name.as_str()))
        .cloned()
        .collect()
}

fn expand_nested_group(
    container_field: &str,
    bundle: &str,
    registry: &dyn FieldDefinitionRegistry,
    options: &SpecExportOptions,
) -> Vec<SpecColumn> {
    let l_definitions: Vec<_> = registry
        .definitions_for(&options.nested_entity_type, bundle)
        .into_iter()
        .filter(|definition| definition.name.starts_with(options.subfield_prefix.as_str()))
        .collect();
    if l_definitions.is_empty() {
        debug!("nested group {container_field:?} ({bundle}) has no exportable sub-fields");
    }

    (0..options.paragraph_count)
        .flat_map(|slot_index| {
            l_definitions.iter().map(move |definition| {
                SpecColumn::nested(definition, container_field, bundle, slot_index)
            })
        })
        .collect()
}

fn derive_value_rule(column: &SpecColumn, options: &SpecExportOptions) -> EnumValueRule {
    let c_name = column.source_field.as_str();
    if column.nested.is_some() {
        return if options.fields_term.contains(c_name) {
            EnumValueRule::ReferenceName
        } else if options.fields_country.contains(c_name) {
            EnumValueRule::CodedLookup
        } else {
            column.value_rule
        };
    }

    if options.fields_date.contains(c_name) {
        EnumValueRule::Date
    } else if options.fields_country.contains(c_name) {
        EnumValueRule::CodedLookup
    } else if options.fields_term.contains(c_name) {
        EnumValueRule::ReferenceName
    } else {
        EnumValueRule::Plain
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::spec::{EnumSubFieldRender, SpecFieldDefinition};
    use crate::store::MemoryFieldRegistry;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(dict_record) => dict_record,
            _ => panic!("record fixture must be an object"),
        }
    }

    fn registry_jobs() -> MemoryFieldRegistry {
        let mut registry = MemoryFieldRegistry::new();
        registry.insert(
            "paragraph",
            "job",
            vec![
                SpecFieldDefinition::new("id", "integer", EnumSubFieldRender::Raw),
                SpecFieldDefinition::new("field_employer", "string", EnumSubFieldRender::Text),
                SpecFieldDefinition::new(
                    "field_sector",
                    "entity_reference",
                    EnumSubFieldRender::Raw,
                ),
                SpecFieldDefinition::new("field_country", "string", EnumSubFieldRender::Text),
                SpecFieldDefinition::new("parent_id", "string", EnumSubFieldRender::Text),
            ],
        );
        registry
    }

    #[test]
    fn test_ordered_field_names_forces_front_and_trailing() {
        let example = record(json!({
            "login": [], "mail": [], "created": [], "field_name": [],
            "status": [], "field_name_given": [], "field_phone": []
        }));
        let options = SpecExportOptions::default();

        assert_eq!(
            derive_ordered_field_names(&example, &options),
            vec![
                "field_name_given",
                "field_name",
                "mail",
                "field_phone",
                "status",
                "created",
                "login"
            ]
        );
    }

    #[test]
    fn test_ordered_field_names_skips_absent_priority_fields() {
        let example = record(json!({"mail": [], "field_name": []}));
        assert_eq!(
            derive_ordered_field_names(&example, &SpecExportOptions::default()),
            vec!["field_name", "mail"]
        );
    }

    #[test]
    fn test_denied_fields_never_become_columns() {
        let example = record(json!({
            "uuid": [], "langcode": [], "roles": [], "field_institution": [],
            "user_picture": [], "mail": []
        }));
        let plan = plan_columns(
            &example,
            &MemoryFieldRegistry::new(),
            &SpecExportOptions::default(),
        );
        assert_eq!(plan.labels(), vec!["mail"]);
    }

    #[test]
    fn test_nested_group_expands_slot_major() {
        let example = record(json!({"mail": [], "field_jobs": []}));
        let plan = plan_columns(&example, &registry_jobs(), &SpecExportOptions::default());

        assert_eq!(
            plan.labels(),
            vec![
                "mail",
                "field_employer_1",
                "field_sector_1",
                "field_country_1",
                "field_employer_2",
                "field_sector_2",
                "field_country_2",
            ]
        );
        let slot = plan.columns[4].nested.as_ref().unwrap();
        assert_eq!(slot.container_field, "field_jobs");
        assert_eq!(slot.bundle, "job");
        assert_eq!(slot.slot_index, 1);
        assert_eq!(plan.columns[4].source_field, "field_employer");
    }

    #[test]
    fn test_nested_group_column_count_follows_paragraph_count() {
        let example = record(json!({"field_jobs": []}));
        let options = SpecExportOptions {
            paragraph_count: 3,
            ..Default::default()
        };
        let plan = plan_columns(&example, &registry_jobs(), &options);
        assert_eq!(plan.len(), 9);
    }

    #[test]
    fn test_unknown_bundle_expands_to_nothing() {
        let example = record(json!({"field_scholarships": [], "mail": []}));
        let plan = plan_columns(&example, &registry_jobs(), &SpecExportOptions::default());
        assert_eq!(plan.labels(), vec!["mail"]);
    }

    #[test]
    fn test_value_rules_tagged_by_field_sets() {
        let example = record(json!({
            "field_country": [], "created": [], "field_area": [], "mail": [], "field_jobs": []
        }));
        let plan = plan_columns(&example, &registry_jobs(), &SpecExportOptions::default());
        let l_rules: Vec<(String, EnumValueRule)> = plan
            .iter()
            .map(|col| (col.label.clone(), col.value_rule))
            .collect();

        assert_eq!(
            &l_rules[..5],
            &[
                ("field_country".to_string(), EnumValueRule::CodedLookup),
                ("field_area".to_string(), EnumValueRule::ReferenceName),
                ("mail".to_string(), EnumValueRule::Plain),
                (
                    "field_employer_1".to_string(),
                    EnumValueRule::NestedField(EnumSubFieldRender::Text)
                ),
                ("field_sector_1".to_string(), EnumValueRule::ReferenceName),
            ]
        );
        assert_eq!(l_rules[5].1, EnumValueRule::CodedLookup);
        assert_eq!(
            l_rules.last(),
            Some(&("created".to_string(), EnumValueRule::Date))
        );
    }

    #[test]
    fn test_plan_is_recomputed_per_exemplar() {
        let registry = registry_jobs();
        let options = SpecExportOptions::default();
        let plan_a = plan_columns(&record(json!({"mail": []})), &registry, &options);
        let plan_b = plan_columns(&record(json!({"field_phone": []})), &registry, &options);
        assert_eq!(plan_a.labels(), vec!["mail"]);
        assert_eq!(plan_b.labels(), vec!["field_phone"]);
        assert_eq!(
            plan_a,
            plan_columns(&record(json!({"mail": []})), &registry, &options)
        );
    }
}
