use csdl_core::extend::*;
use csdl_core::raw::Element;
use csdl_core::schema::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn key(name: &str) -> Value {
    json!([{ "PropertyRef": [{ "$": { "Name": name } }] }])
}

fn property(name: &str, ty: &str) -> Value {
    json!({ "$": { "Name": name, "Type": ty } })
}

fn record(ty: Option<&str>, values: Value) -> Value {
    let mut record = json!({ "PropertyValue": values });
    if let Some(ty) = ty {
        record["$"] = json!({ "Type": ty });
    }
    record
}

fn path_collection(kind: &str, paths: &[&str]) -> Value {
    json!([{ kind: paths }])
}

fn order_schema() -> Value {
    json!({
        "$": { "Namespace": "NS" },
        "EntityType": [
            {
                "$": { "Name": "Order" },
                "Key": key("id"),
                "Property": [
                    property("id", "Edm.String"),
                    property("customer", "Edm.String"),
                    property("amount", "Edm.Decimal"),
                    property("currency", "Edm.String"),
                    property("createdAt", "Edm.DateTimeOffset"),
                ],
                "NavigationProperty": [{ "$": { "Name": "items", "Type": "Collection(NS.Item)" } }],
                "Annotation": [
                    { "$": { "Term": "Common.Label", "String": "Sales Order" } },
                    {
                        "$": { "Term": "UI.LineItem" },
                        "Collection": [{
                            "Record": [
                                record(None, json!([
                                    { "$": { "Property": "Value", "Path": "amount" } },
                                    { "$": { "Property": "Label", "String": "Amount" } },
                                ])),
                                record(Some("UI.DataFieldForAction"), json!([
                                    { "$": { "Property": "Action", "String": "NS.approve" } },
                                    { "$": { "Property": "Label", "String": "Approve" } },
                                ])),
                                record(None, json!([
                                    { "$": { "Property": "Action", "String": "NS.approve" } },
                                    { "$": { "Property": "Url", "String": "https://example.com" } },
                                ])),
                            ],
                        }],
                    },
                    {
                        "$": {
                            "Term": "com.sap.vocabularies.Common.v1.SideEffects",
                            "Qualifier": "Amount",
                        },
                        "Record": [record(None, json!([
                            {
                                "$": { "Property": "SourceProperties" },
                                "Collection": path_collection("PropertyPath", &["amount"]),
                            },
                            {
                                "$": { "Property": "TargetProperties" },
                                "Collection": path_collection("PropertyPath", &["currency"]),
                            },
                            {
                                "$": { "Property": "TargetEntities" },
                                "Collection": path_collection("NavigationPropertyPath", &["items"]),
                            },
                            {
                                "$": {
                                    "Property": "EffectTypes",
                                    "EnumMember": "Common.EffectType/ValueChange",
                                },
                            },
                        ]))],
                    },
                    { "$": { "Term": "Some.Unknown.Term", "Bool": "true" } },
                ],
            },
            {
                "$": { "Name": "Item" },
                "Key": key("id"),
                "Property": [property("id", "Edm.String"), property("parent", "Edm.String")],
            },
            {
                "$": { "Name": "Customer" },
                "Key": key("id"),
                "Property": [property("id", "Edm.String"), property("name", "Edm.String")],
            },
        ],
        "EntityContainer": [{
            "$": { "Name": "Container" },
            "EntitySet": [
                { "$": { "Name": "Orders", "EntityType": "NS.Order" } },
                { "$": { "Name": "Items", "EntityType": "NS.Item" } },
                { "$": { "Name": "Customers", "EntityType": "NS.Customer" } },
            ],
        }],
        "Annotations": [
            {
                "$": { "Target": "NS.Order/customer" },
                "Annotation": [{
                    "$": { "Term": "Common.ValueList" },
                    "Record": [record(None, json!([
                        { "$": { "Property": "CollectionPath", "String": "Customers" } },
                        { "$": { "Property": "SearchSupported", "Bool": "true" } },
                        {
                            "$": { "Property": "Parameters" },
                            "Collection": [{
                                "Record": [
                                    record(Some("Common.ValueListParameterInOut"), json!([
                                        {
                                            "$": {
                                                "Property": "LocalDataProperty",
                                                "PropertyPath": "customer",
                                            },
                                        },
                                        {
                                            "$": {
                                                "Property": "ValueListProperty",
                                                "String": "id",
                                            },
                                        },
                                    ])),
                                    record(Some("Common.ValueListParameterDisplayOnly"), json!([
                                        {
                                            "$": {
                                                "Property": "ValueListProperty",
                                                "String": "name",
                                            },
                                        },
                                    ])),
                                ],
                            }],
                        },
                    ]))],
                }],
            },
            {
                "$": { "Target": "NS.Order/createdAt" },
                "Annotation": [{ "$": { "Term": "Org.OData.Core.V1.Computed" } }],
            },
            {
                "$": { "Target": "NS.Order/id" },
                "Annotation": [{ "$": { "Term": "Core.Immutable", "Bool": "true" } }],
            },
            {
                "$": { "Target": "NS.Order/amount" },
                "Annotation": [{ "$": { "Term": "Measures.ISOCurrency", "Path": "currency" } }],
            },
            {
                "$": { "Target": "NS.Container/Orders" },
                "Annotation": [{
                    "$": { "Term": "Capabilities.DeleteRestrictions" },
                    "Record": [record(None, json!([
                        { "$": { "Property": "Deletable", "Bool": "false" } },
                    ]))],
                }],
            },
            {
                "$": { "Target": "Other.Namespace.Thing" },
                "Annotation": [{ "$": { "Term": "Common.Label", "String": "ignored" } }],
            },
        ],
    })
}

fn schema() -> Schema {
    Schema::from_raw(&Element::from_json(&order_schema()).unwrap(), Dialect::Oasis).unwrap()
}

fn extend(schema: &Schema, settings: &Settings) -> csdl_core::Result<Extensions> {
    Registry::default().extend(schema, settings)
}

#[test]
fn entity_type_annotations() {
    let schema = schema();
    let extensions = extend(&schema, &Settings::default()).unwrap();

    let order = schema.find_entity_type("Order").unwrap();
    let bag = extensions.entity_type(order.id).unwrap();

    assert_eq!(bag.label.as_deref(), Some("Sales Order"));
    assert_eq!(bag.other_terms, ["Some.Unknown.Term"]);

    let line_item = bag.line_item(None);
    assert_eq!(line_item.len(), 2);
    assert_eq!(line_item[0].record_type(), "DataField");
    assert_eq!(line_item[0].value(), Some("amount"));
    assert_eq!(
        line_item[1],
        DataField::ForAction {
            common: DataFieldCommon {
                label: Some("Approve".into()),
                ..DataFieldCommon::default()
            },
            action: "NS.approve".into(),
        }
    );
}

#[test]
fn ambiguous_line_item_record_is_skipped() {
    let schema = schema();
    let extensions = extend(&schema, &Settings::default()).unwrap();

    let diagnostics = extensions.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].target, "NS.Order");
    assert!(
        diagnostics[0].message.starts_with("ambiguous annotation `UI.LineItem`"),
        "{}",
        diagnostics[0].message
    );
}

#[test]
fn strict_mode_fails_on_first_malformed_annotation() {
    let schema = schema();
    let mut settings = Settings::default();
    settings.strict(true);

    let err = extend(&schema, &settings).unwrap_err();

    assert!(err.is_ambiguous_annotation());
    let msg = err.to_string();
    assert!(msg.starts_with("extending schema `NS`: annotation on `NS.Order`"), "{msg}");
}

#[test]
fn line_item_can_be_disabled() {
    let schema = schema();
    let mut settings = Settings::default();
    settings.line_item(false);

    let extensions = extend(&schema, &settings).unwrap();
    let order = schema.find_entity_type("Order").unwrap();

    assert!(extensions.entity_type(order.id).unwrap().line_item(None).is_empty());
    assert!(extensions.diagnostics().is_empty());
}

#[test]
fn side_effects() {
    let schema = schema();
    let extensions = extend(&schema, &Settings::default()).unwrap();

    let order = schema.find_entity_type("Order").unwrap();
    let item = schema.find_entity_type("Item").unwrap();
    let bag = extensions.entity_type(order.id).unwrap();

    assert!(bag.side_effects(None).is_none());
    let side_effects = bag.side_effects(Some("Amount")).unwrap();

    assert!(side_effects.is_source_property("amount"));
    assert_eq!(
        side_effects.target_properties,
        [PathRef {
            path: "currency".into(),
            target: PathTarget::Property(order.property("currency").unwrap().id),
        }]
    );
    assert_eq!(
        side_effects.target_entities[0].target,
        PathTarget::Navigation { target: item.id }
    );
    assert_eq!(side_effects.effect_types, ["ValueChange"]);
    assert_eq!(side_effects.trigger_action, None);
}

#[test]
fn value_list() {
    let schema = schema();
    let extensions = extend(&schema, &Settings::default()).unwrap();

    let order = schema.find_entity_type("Order").unwrap();
    let customer = order.property("customer").unwrap();
    let bag = extensions.property(customer.id).unwrap();

    assert!(bag.has_value_list());
    assert_eq!(bag.value_list, Some(ValueListKind::Standard));

    let value_list = bag.value_list(None).unwrap();
    assert_eq!(value_list.collection_path, "Customers");
    assert_eq!(value_list.search_supported, Some(true));
    assert_eq!(
        schema.entity_set(value_list.entity_set.unwrap()).name,
        "Customers"
    );

    let kinds: Vec<_> = value_list.parameters.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, [ParameterKind::InOut, ParameterKind::DisplayOnly]);
    assert_eq!(value_list.parameters[0].local_data_property, Some(customer.id));
    assert_eq!(value_list.bound_parameters().count(), 1);
}

#[test]
fn core_annotations_decide_writability() {
    let schema = schema();
    let extensions = extend(&schema, &Settings::default()).unwrap();
    let order = schema.find_entity_type("Order").unwrap();

    let created_at = extensions.property(order.property("createdAt").unwrap().id).unwrap();
    assert!(created_at.computed);
    assert!(!created_at.creatable);
    assert!(!created_at.updatable);

    let id = extensions.property(order.property("id").unwrap().id).unwrap();
    assert!(id.immutable);
    assert!(id.creatable);
    assert!(!id.updatable);

    let amount = extensions.property(order.property("amount").unwrap().id).unwrap();
    assert_eq!(amount.unit.as_deref(), Some("currency"));
    assert!(amount.creatable && amount.updatable);
}

#[test]
fn annotation_through_derived_type_stays_on_derived_type() {
    let raw = json!({
        "$": { "Namespace": "NS" },
        "EntityType": [
            {
                "$": { "Name": "Base" },
                "Key": key("id"),
                "Property": [property("id", "Edm.Int32")],
            },
            {
                "$": { "Name": "Derived", "BaseType": "NS.Base" },
                "Property": [property("note", "Edm.String")],
            },
        ],
        "Annotations": [{
            "$": { "Target": "NS.Derived/id" },
            "Annotation": [{ "$": { "Term": "Core.Computed", "Bool": "true" } }],
        }],
    });
    let schema = Schema::from_raw(&Element::from_json(&raw).unwrap(), Dialect::Oasis).unwrap();
    let extensions = extend(&schema, &Settings::default()).unwrap();

    let base = schema.find_entity_type("Base").unwrap();
    let derived = schema.find_entity_type("Derived").unwrap();
    let id = base.property("id").unwrap().id;

    let declared = extensions.property(id).unwrap();
    assert!(!declared.computed);
    assert!(declared.creatable);
    assert!(std::ptr::eq(declared, extensions.property_of(base.id, id).unwrap()));

    let inherited = extensions.property_of(derived.id, id).unwrap();
    assert!(inherited.computed);
    assert!(!inherited.creatable);
    assert!(extensions.diagnostics().is_empty());
}

#[test]
fn capabilities_on_entity_sets() {
    let schema = schema();
    let extensions = extend(&schema, &Settings::default()).unwrap();

    let orders = schema.get_entity_set("Orders").unwrap();
    let bag = extensions.entity_set(orders.id).unwrap();
    assert!(!bag.deletable);
    assert!(bag.creatable);

    let items = schema.get_entity_set("Items").unwrap();
    assert_eq!(
        extensions.entity_set(items.id).unwrap(),
        &EntitySetAnnotations::default()
    );
}

#[test]
fn unannotated_nodes_get_empty_bags() {
    let schema = schema();
    let extensions = extend(&schema, &Settings::default()).unwrap();

    let item = schema.find_entity_type("Item").unwrap();
    assert_eq!(
        extensions.entity_type(item.id),
        Some(&EntityTypeAnnotations::default())
    );

    for property in &item.properties {
        assert_eq!(
            extensions.property(property.id),
            Some(&PropertyAnnotations::default())
        );
    }
}

#[test]
fn apply_is_idempotent() {
    let schema = schema();
    let registry = Registry::default();
    let settings = Settings::default();

    let mut extensions = Extensions::new();
    registry.apply(&schema, &settings, &mut extensions).unwrap();
    let first = extensions.clone();

    registry.apply(&schema, &settings, &mut extensions).unwrap();
    assert_eq!(extensions, first);
    assert!(extensions.is_applied("NS", Dialect::Oasis));

    // A fresh run derives the same table.
    assert_eq!(registry.extend(&schema, &settings).unwrap(), first);
}

#[test]
fn apply_leaves_schema_untouched() {
    let schema = schema();
    let before = format!("{schema:?}");

    extend(&schema, &Settings::default()).unwrap();

    assert_eq!(format!("{schema:?}"), before);
}

#[test]
fn disabled_dialect_is_skipped() {
    let schema = schema();
    let mut settings = Settings::default();
    settings.dialects(DialectSet::only(Dialect::Sap));

    let extensions = extend(&schema, &settings).unwrap();
    let order = schema.find_entity_type("Order").unwrap();

    assert_eq!(extensions.entity_type(order.id), None);
    assert!(!extensions.is_applied("NS", Dialect::Oasis));
}

#[test]
fn registry_without_extender() {
    let schema = schema();
    let extensions = Registry::new().extend(&schema, &Settings::default()).unwrap();
    assert_eq!(extensions, Extensions::new());
}

#[test]
fn extensions_belong_to_one_schema() {
    let schema = schema();
    let other = json!({
        "$": { "Namespace": "Other" },
        "EntityType": [{
            "$": { "Name": "Thing" },
            "Key": key("id"),
            "Property": [property("id", "Edm.Int64")],
        }],
    });
    let other = Schema::from_raw(&Element::from_json(&other).unwrap(), Dialect::Oasis).unwrap();

    let registry = Registry::default();
    let mut extensions = registry.extend(&schema, &Settings::default()).unwrap();

    let err = registry
        .apply(&other, &Settings::default(), &mut extensions)
        .unwrap_err();
    assert!(err.to_string().contains("built for schema `NS`"));
}
