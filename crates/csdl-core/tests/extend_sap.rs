use csdl_core::extend::*;
use csdl_core::raw::Element;
use csdl_core::schema::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// An OData V2 document as a SAP gateway serves it.
fn document() -> Value {
    json!({
        "edmx:Edmx": {
            "$": { "Version": "1.0", "xmlns:sap": "http://www.sap.com/Protocols/SAPData" },
            "edmx:DataServices": [{
                "$": { "m:DataServiceVersion": "2.0" },
                "Schema": [{
                    "$": { "Namespace": "ZSALES_SRV", "sap:schema-version": "1" },
                    "EntityType": [{
                        "$": {
                            "Name": "SalesOrder",
                            "sap:label": "Sales Order",
                            "sap:content-version": "1",
                        },
                        "Key": [{ "PropertyRef": [{ "$": { "Name": "SalesOrderID" } }] }],
                        "Property": [
                            { "$": {
                                "Name": "SalesOrderID", "Type": "Edm.String",
                                "Nullable": "false", "MaxLength": "10",
                                "sap:label": "Order",
                                "sap:creatable": "false", "sap:updatable": "false",
                                "sap:filterable": "true", "sap:required-in-filter": "true"
                            } },
                            { "$": {
                                "Name": "CustomerID", "Type": "Edm.String",
                                "sap:label": "Customer", "sap:text": "CustomerName",
                                "sap:value-list": "standard"
                            } },
                            { "$": {
                                "Name": "CustomerName", "Type": "Edm.String",
                                "sap:sortable": "maybe"
                            } },
                            { "$": {
                                "Name": "GrossAmount", "Type": "Edm.Decimal",
                                "Precision": "16", "Scale": "3",
                                "sap:unit": "Currency", "sap:filter-restriction": "interval"
                            } },
                            { "$": {
                                "Name": "Currency", "Type": "Edm.String",
                                "sap:semantics": "currency-code",
                                "sap:value-list": "fixed-values"
                            } },
                            { "$": {
                                "Name": "Status", "Type": "Edm.String",
                                "sap:value-list": "sometimes"
                            } },
                        ],
                    }],
                    "EntityContainer": [{
                        "$": {
                            "Name": "ZSALES_SRV_Entities",
                            "m:IsDefaultEntityContainer": "true",
                        },
                        "EntitySet": [{ "$": {
                            "Name": "SalesOrders", "EntityType": "ZSALES_SRV.SalesOrder",
                            "sap:label": "Sales Orders",
                            "sap:creatable": "false", "sap:deletable": "false",
                            "sap:searchable": "true", "sap:pageable": "false",
                            "sap:requires-filter": "true"
                        } }],
                    }],
                }],
            }],
        }
    })
}

fn metadata() -> Metadata {
    // Surfaces the lenient-mode warnings under `cargo test -- --nocapture`.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    Metadata::from_raw(&Element::from_json(&document()).unwrap()).unwrap()
}

#[test]
fn version_one_is_sap() {
    let metadata = metadata();
    assert_eq!(metadata.dialect, Dialect::Sap);
    assert_eq!(
        Registry::default().extender(metadata.dialect).unwrap().dialect(),
        Dialect::Sap
    );
}

#[test]
fn entity_type_attributes() {
    let metadata = metadata();
    let schema = &metadata.schemas[0];
    let extensions = Registry::default().extend(schema, &Settings::default()).unwrap();

    let order = schema.find_entity_type("SalesOrder").unwrap();
    let bag = extensions.entity_type(order.id).unwrap();
    assert_eq!(bag.label.as_deref(), Some("Sales Order"));
    assert_eq!(bag.content_version.as_deref(), Some("1"));
    assert_eq!(bag.semantics, None);
}

#[test]
fn property_attributes() {
    let metadata = metadata();
    let schema = &metadata.schemas[0];
    let extensions = Registry::default().extend(schema, &Settings::default()).unwrap();
    let order = schema.find_entity_type("SalesOrder").unwrap();
    let bag = |name: &str| extensions.property(order.property(name).unwrap().id).unwrap();

    let id = bag("SalesOrderID");
    assert_eq!(id.label.as_deref(), Some("Order"));
    assert!(!id.creatable);
    assert!(!id.updatable);
    assert!(id.filterable);
    assert!(id.required_in_filter);

    let customer = bag("CustomerID");
    assert_eq!(customer.text.as_deref(), Some("CustomerName"));
    assert_eq!(customer.value_list, Some(ValueListKind::Standard));
    assert!(customer.value_lists.is_empty());

    let amount = bag("GrossAmount");
    assert_eq!(amount.unit.as_deref(), Some("Currency"));
    assert_eq!(amount.filter_restriction.as_deref(), Some("interval"));

    let currency = bag("Currency");
    assert_eq!(currency.semantics.as_deref(), Some("currency-code"));
    assert_eq!(currency.value_list, Some(ValueListKind::FixedValues));
}

#[test]
fn malformed_attributes_keep_defaults() {
    let metadata = metadata();
    let schema = &metadata.schemas[0];
    let extensions = Registry::default().extend(schema, &Settings::default()).unwrap();
    let order = schema.find_entity_type("SalesOrder").unwrap();

    let name = extensions.property(order.property("CustomerName").unwrap().id).unwrap();
    assert!(name.sortable);

    let status = extensions.property(order.property("Status").unwrap().id).unwrap();
    assert_eq!(status.value_list, None);

    let targets: Vec<_> = extensions
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.target.as_str())
        .collect();
    assert_eq!(
        targets,
        ["ZSALES_SRV.SalesOrder/CustomerName", "ZSALES_SRV.SalesOrder/Status"]
    );
    assert_eq!(
        extensions.diagnostics()[0].message,
        "malformed annotation `sap:sortable`: `maybe` is not a boolean"
    );
    assert_eq!(extensions.diagnostics()[0].term.as_deref(), Some("sap:sortable"));
}

#[test]
fn malformed_attribute_in_strict_mode() {
    let metadata = metadata();
    let mut settings = Settings::default();
    settings.strict(true);

    let err = Registry::default()
        .extend(&metadata.schemas[0], &settings)
        .unwrap_err();

    assert!(err.is_annotation_shape());
    assert!(err.to_string().contains("ZSALES_SRV.SalesOrder/CustomerName"));
}

#[test]
fn entity_set_attributes() {
    let metadata = metadata();
    let schema = &metadata.schemas[0];
    let extensions = Registry::default().extend(schema, &Settings::default()).unwrap();

    let set = schema.get_entity_set("SalesOrders").unwrap();
    let bag = extensions.entity_set(set.id).unwrap();

    assert_eq!(bag.label.as_deref(), Some("Sales Orders"));
    assert!(!bag.creatable);
    assert!(bag.updatable);
    assert!(!bag.deletable);
    assert!(bag.searchable);
    assert!(!bag.pageable);
    assert!(bag.addressable);
    assert!(bag.requires_filter);
}

#[test]
fn extend_every_schema() {
    let metadata = metadata();
    let all = Registry::default()
        .extend_metadata(&metadata, &Settings::default())
        .unwrap();

    assert_eq!(all.len(), 1);
    assert!(all[0].is_applied("ZSALES_SRV", Dialect::Sap));
}

#[test]
fn settings_from_config() {
    let metadata = metadata();
    let settings = Settings::from_json(r#"{ "dialects": { "sap": false } }"#).unwrap();

    let extensions = Registry::default()
        .extend(&metadata.schemas[0], &settings)
        .unwrap();
    assert!(extensions.diagnostics().is_empty());
    assert!(!extensions.is_applied("ZSALES_SRV", Dialect::Sap));
}

/// Replaces the built-in SAP extender.
#[derive(Debug)]
struct LabelsOnly;

impl Extender for LabelsOnly {
    fn dialect(&self) -> Dialect {
        Dialect::Sap
    }

    fn apply(&self, cx: &mut Cx<'_>) -> csdl_core::Result<()> {
        for entity in cx.schema.entity_types() {
            let label = entity.vendor_attrs.get("label").cloned();
            cx.extensions.entity_type_mut(entity.id).label = label;
        }
        Ok(())
    }
}

#[test]
fn custom_extender_replaces_builtin() {
    let metadata = metadata();
    let schema = &metadata.schemas[0];

    let mut registry = Registry::default();
    registry.register(LabelsOnly);

    let extensions = registry.extend(schema, &Settings::default()).unwrap();
    let order = schema.find_entity_type("SalesOrder").unwrap();

    assert_eq!(
        extensions.entity_type(order.id).unwrap().label.as_deref(),
        Some("Sales Order")
    );
    assert_eq!(extensions.property(order.properties[0].id), None);
}
