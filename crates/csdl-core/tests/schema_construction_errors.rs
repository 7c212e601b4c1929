use csdl_core::raw::Element;
use csdl_core::schema::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn entity_type(name: &str) -> Value {
    json!({
        "$": { "Name": name },
        "Key": [{ "PropertyRef": [{ "$": { "Name": "id" } }] }],
        "Property": [{ "$": { "Name": "id", "Type": "Edm.String" } }],
    })
}

fn association(name: &str, ends: &[(&str, &str)]) -> Value {
    let ends: Vec<_> = ends
        .iter()
        .map(|(role, ty)| json!({ "$": { "Role": role, "Type": ty, "Multiplicity": "*" } }))
        .collect();

    json!({ "$": { "Name": name }, "End": ends })
}

fn build(value: Value) -> csdl_core::Result<Schema> {
    Schema::from_raw(&Element::from_json(&value).unwrap(), Dialect::Sap)
}

#[test]
fn missing_end_type_names_the_element() {
    let err = build(json!({
        "$": { "Namespace": "NS" },
        "EntityType": [entity_type("A")],
        "Association": [association("R", &[("role1", "NS.A"), ("role2", "NS.Missing")])],
    }))
    .unwrap_err();

    assert!(err.is_schema_consistency());
    assert!(!err.is_construction_invariant());
    assert_eq!(
        err.to_string(),
        "Schema `NS`: Association `R`: end `role2`: schema inconsistency: \
         type `NS.Missing` is not declared in schema `NS`"
    );
}

#[test]
fn missing_entity_set_type() {
    let err = build(json!({
        "$": { "Namespace": "NS" },
        "EntityType": [entity_type("A")],
        "EntityContainer": [{
            "$": { "Name": "C" },
            "EntitySet": [{ "$": { "Name": "Bs", "EntityType": "NS.B" } }],
        }],
    }))
    .unwrap_err();

    assert!(err.is_schema_consistency());
    let msg = err.to_string();
    assert!(msg.contains("EntitySet `Bs`"), "{msg}");
    assert!(msg.contains("`NS.B`"), "{msg}");
}

#[test]
fn missing_navigation_association() {
    let mut a = entity_type("A");
    a["NavigationProperty"] = json!([{
        "$": { "Name": "toB", "Relationship": "NS.Nope", "FromRole": "x", "ToRole": "y" }
    }]);

    let err = build(json!({ "$": { "Namespace": "NS" }, "EntityType": [a] })).unwrap_err();

    assert!(err.is_schema_consistency());
    assert!(err.to_string().contains("navigation property `toB`"));
}

#[test]
fn association_set_with_unknown_role() {
    let err = build(json!({
        "$": { "Namespace": "NS" },
        "EntityType": [entity_type("A"), entity_type("B")],
        "Association": [association("R", &[("role1", "NS.A"), ("role2", "NS.B")])],
        "EntityContainer": [{
            "$": { "Name": "C" },
            "EntitySet": [
                { "$": { "Name": "As", "EntityType": "NS.A" } },
                { "$": { "Name": "Bs", "EntityType": "NS.B" } },
            ],
            "AssociationSet": [{
                "$": { "Name": "R_Set", "Association": "NS.R" },
                "End": [
                    { "$": { "Role": "role1", "EntitySet": "As" } },
                    { "$": { "Role": "role9", "EntitySet": "Bs" } },
                ],
            }],
        }],
    }))
    .unwrap_err();

    assert!(err.is_schema_consistency());
    assert!(err.to_string().contains("role `role9`"));
}

#[test]
fn association_set_end_of_wrong_type() {
    let err = build(json!({
        "$": { "Namespace": "NS" },
        "EntityType": [entity_type("A"), entity_type("B")],
        "Association": [association("R", &[("role1", "NS.A"), ("role2", "NS.B")])],
        "EntityContainer": [{
            "$": { "Name": "C" },
            "EntitySet": [{ "$": { "Name": "As", "EntityType": "NS.A" } }],
            "AssociationSet": [{
                "$": { "Name": "R_Set", "Association": "NS.R" },
                "End": [
                    { "$": { "Role": "role1", "EntitySet": "As" } },
                    { "$": { "Role": "role2", "EntitySet": "As" } },
                ],
            }],
        }],
    }))
    .unwrap_err();

    assert!(err.is_schema_consistency());
}

#[test]
fn duplicate_roles_fail_at_construction() {
    let err = build(json!({
        "$": { "Namespace": "NS" },
        "EntityType": [entity_type("A")],
        "Association": [association("R", &[("same", "NS.A"), ("same", "NS.A")])],
    }))
    .unwrap_err();

    assert!(err.is_construction_invariant());
    assert_eq!(
        err.to_string(),
        "Schema `NS`: Association `R`: invariant violated: \
         association ends must have distinct roles, both are `same`"
    );
}

#[test]
fn association_needs_two_ends() {
    for ends in [
        vec![("role1", "NS.A")],
        vec![("role1", "NS.A"), ("role2", "NS.A"), ("role3", "NS.A")],
    ] {
        let err = build(json!({
            "$": { "Namespace": "NS" },
            "EntityType": [entity_type("A")],
            "Association": [association("R", &ends)],
        }))
        .unwrap_err();

        assert!(err.is_construction_invariant(), "{err}");
    }
}

#[test]
fn duplicate_type_names() {
    let err = build(json!({
        "$": { "Namespace": "NS" },
        "EntityType": [entity_type("A"), entity_type("A")],
    }))
    .unwrap_err();

    assert!(err.is_construction_invariant());
}

#[test]
fn key_must_name_a_property() {
    let mut a = entity_type("A");
    a["Key"] = json!([{ "PropertyRef": [{ "$": { "Name": "code" } }] }]);

    let err = build(json!({ "$": { "Namespace": "NS" }, "EntityType": [a] })).unwrap_err();

    assert!(err.is_schema_consistency());
    assert_eq!(
        err.to_string(),
        "Schema `NS`: EntityType `A`: schema inconsistency: key property `code` is not declared"
    );
}

#[test]
fn inherited_key() {
    let schema = build(json!({
        "$": { "Namespace": "NS" },
        "EntityType": [
            { "$": { "Name": "Derived", "BaseType": "NS.Base" },
              "Property": [{ "$": { "Name": "extra", "Type": "Edm.Int32" } }] },
            entity_type("Base"),
        ],
    }))
    .unwrap();

    let derived = schema.find_entity_type("Derived").unwrap();
    let base = schema.find_entity_type("Base").unwrap();
    assert_eq!(derived.key, ["id"]);
    assert_eq!(derived.base_type, Some(base.id));
    assert!(schema.is_same_or_derived(derived.id, base.id));
    assert!(schema.find_property(derived.id, "id").is_some());
}

#[test]
fn inheritance_cycle() {
    let err = build(json!({
        "$": { "Namespace": "NS" },
        "EntityType": [
            { "$": { "Name": "A", "BaseType": "NS.B" } },
            { "$": { "Name": "B", "BaseType": "NS.A" } },
        ],
    }))
    .unwrap_err();

    assert!(err.is_schema_consistency());
}

#[test]
fn missing_required_attribute() {
    let err = build(json!({
        "$": { "Namespace": "NS" },
        "EntityType": [{ "$": {} }],
    }))
    .unwrap_err();

    assert!(err.is_invalid_metadata());
}
