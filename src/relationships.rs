//! Relationship and compound-document fragment assembly.

use crate::codec;
use crate::descriptor::{Registry, ResourceDescriptor};
use crate::document::{
    IncludedEntry, LinkageData, Relationships, ResourceIdentifier, ResourceLinkage,
};
use crate::store::{Related, RelatedResource, Resource};

fn identifier(related: &RelatedResource) -> ResourceIdentifier {
    ResourceIdentifier {
        type_name: related.type_name.clone(),
        id: related.id.to_string(),
    }
}

fn selected(name: &str, filter: Option<&[String]>) -> bool {
    match filter {
        Some(filter) => filter.iter().any(|f| f == name),
        None => true,
    }
}

/// Build the per-resource `relationships` slot. A to-many relation emits an
/// array of `{data: {type, id}}`, a to-one relation a single one; a name
/// with no loaded relation is omitted entirely. The empty result is the
/// typed empty object, which the caller must still attach.
pub fn build_relationships(
    descriptor: &ResourceDescriptor,
    resource: &Resource,
    filter: Option<&[String]>,
) -> Relationships {
    let mut out = Relationships::empty();
    for name in &descriptor.exposed_relationships {
        if !selected(name, filter) {
            continue;
        }
        let Some(related) = resource.related.get(name) else {
            continue;
        };
        let linkage = match related {
            Related::One(r) => ResourceLinkage {
                data: LinkageData::One(identifier(r)),
            },
            Related::Many(rs) => ResourceLinkage {
                data: LinkageData::Many(rs.iter().map(identifier).collect()),
            },
        };
        if let Ok(value) = serde_json::to_value(&linkage) {
            out.0.insert(name.clone(), value);
        }
    }
    out
}

/// Flatten everything reachable via the descriptor's included relationships
/// into one side-table. Attributes run through the related type's own
/// allow-list when it is registered; otherwise they pass through with blob
/// decoding only. An empty result means the caller omits the `included` key.
pub fn build_included(
    registry: &Registry,
    descriptor: &ResourceDescriptor,
    resource: &Resource,
    filter: Option<&[String]>,
) -> Vec<IncludedEntry> {
    let mut out = Vec::new();
    for name in &descriptor.included_relationships {
        if !selected(name, filter) {
            continue;
        }
        let Some(related) = resource.related.get(name) else {
            continue;
        };
        match related {
            Related::One(r) => out.push(included_entry(registry, r)),
            Related::Many(rs) => out.extend(rs.iter().map(|r| included_entry(registry, r))),
        }
    }
    out
}

fn included_entry(registry: &Registry, related: &RelatedResource) -> IncludedEntry {
    let attributes = match registry.descriptor(&related.type_name) {
        Some(descriptor) => codec::expose(descriptor, &related.fields, None),
        None => codec::expose_raw(&related.fields),
    };
    IncludedEntry {
        type_name: related.type_name.clone(),
        id: related.id.to_string(),
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn related(type_name: &str, id: i64, fields: Value) -> RelatedResource {
        RelatedResource {
            type_name: type_name.to_string(),
            id,
            fields: match fields {
                Value::Object(m) => m,
                _ => panic!("expected object"),
            },
        }
    }

    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor::new("user", "users")
            .with_fields(&["name"])
            .with_relationships(&["orders", "profile"])
            .with_included(&["orders"])
    }

    #[test]
    fn to_many_relations_emit_identifier_arrays() {
        let mut resource = Resource::new(1, serde_json::Map::new());
        resource.related.insert(
            "orders".into(),
            Related::Many(vec![
                related("order", 5, json!({"total": 10})),
                related("order", 6, json!({"total": 20})),
            ]),
        );
        let rels = build_relationships(&descriptor(), &resource, None);
        let v = serde_json::to_value(&rels).unwrap();
        assert_eq!(
            v["orders"]["data"],
            json!([
                {"type": "order", "id": "5"},
                {"type": "order", "id": "6"}
            ])
        );
    }

    #[test]
    fn to_one_relations_emit_a_single_identifier() {
        let mut resource = Resource::new(1, serde_json::Map::new());
        resource.related.insert(
            "profile".into(),
            Related::One(related("profile", 3, json!({}))),
        );
        let rels = build_relationships(&descriptor(), &resource, None);
        let v = serde_json::to_value(&rels).unwrap();
        assert_eq!(v["profile"]["data"], json!({"type": "profile", "id": "3"}));
        assert!(!v.as_object().unwrap().contains_key("orders"));
    }

    #[test]
    fn nothing_related_yields_the_empty_object() {
        let resource = Resource::new(1, serde_json::Map::new());
        let rels = build_relationships(&descriptor(), &resource, None);
        assert!(rels.is_empty());
        assert_eq!(serde_json::to_value(&rels).unwrap(), json!({}));
    }

    #[test]
    fn included_flattens_collections_into_one_table() {
        let registry = Registry::new();
        let mut resource = Resource::new(1, serde_json::Map::new());
        resource.related.insert(
            "orders".into(),
            Related::Many(vec![
                related("order", 5, json!({"total": 10})),
                related("order", 6, json!({"total": 20})),
            ]),
        );
        let included = build_included(&registry, &descriptor(), &resource, None);
        assert_eq!(included.len(), 2);
        assert_eq!(included[0].id, "5");
        assert_eq!(included[0].attributes["total"], json!(10));
    }

    #[test]
    fn included_respects_the_related_descriptors_allow_list() {
        let mut registry = Registry::new();
        registry.register(ResourceDescriptor::new("order", "orders").with_fields(&["total"]));
        let mut resource = Resource::new(1, serde_json::Map::new());
        resource.related.insert(
            "orders".into(),
            Related::One(related("order", 5, json!({"total": 10, "internal_flag": true}))),
        );
        let included = build_included(&registry, &descriptor(), &resource, None);
        assert_eq!(included.len(), 1);
        assert!(included[0].attributes.contains_key("total"));
        assert!(!included[0].attributes.contains_key("internal_flag"));
    }
}
