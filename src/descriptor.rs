//! Per-resource-type configuration, resolved once at startup.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Static description of one exposed resource type.
///
/// The attribute allow-list is exactly that: a field absent from
/// `exposed_fields` is never serialized, regardless of what the stored
/// object holds. Never mutated after startup.
#[derive(Clone, Debug)]
pub struct ResourceDescriptor {
    /// Singular type name, used for the `type` key and meta texts ("user").
    pub type_singular: String,
    /// Plural type name, used as the URL path segment ("users").
    pub type_plural: String,
    /// Name of the primary-key field on the stored object.
    pub id_field: String,
    /// Exposed attributes, in serialization order.
    pub exposed_fields: Vec<String>,
    /// Relationship names surfaced under `relationships`.
    pub exposed_relationships: BTreeSet<String>,
    /// Relationship names flattened into the `included` side-table.
    pub included_relationships: BTreeSet<String>,
    /// Base url for the collection (e.g. "/users").
    pub url_base: String,
}

impl ResourceDescriptor {
    pub fn new(type_singular: &str, type_plural: &str) -> Self {
        ResourceDescriptor {
            type_singular: type_singular.to_string(),
            type_plural: type_plural.to_string(),
            id_field: "id".to_string(),
            exposed_fields: Vec::new(),
            exposed_relationships: BTreeSet::new(),
            included_relationships: BTreeSet::new(),
            url_base: format!("/{}", type_plural),
        }
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.exposed_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_relationships(mut self, names: &[&str]) -> Self {
        self.exposed_relationships = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_included(mut self, names: &[&str]) -> Self {
        self.included_relationships = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_id_field(mut self, name: &str) -> Self {
        self.id_field = name.to_string();
        self
    }

    pub fn with_url_base(mut self, url: &str) -> Self {
        self.url_base = url.to_string();
        self
    }

    /// Whether a field is on the allow-list.
    pub fn exposes(&self, field: &str) -> bool {
        self.exposed_fields.iter().any(|f| f == field)
    }

    /// Element url: the collection url with the plural segment singularized,
    /// plus the id ("/users" -> "/user/7").
    pub fn element_url(&self, id: &str) -> String {
        let singular_base = self.url_base.replace(&self.type_plural, &self.type_singular);
        format!("{}/{}", singular_base, id)
    }
}

/// All descriptors known to the service, keyed by plural type name.
/// Built at configuration time and shared read-only across requests.
#[derive(Default)]
pub struct Registry {
    descriptors: HashMap<String, Arc<ResourceDescriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn register(&mut self, descriptor: ResourceDescriptor) -> Arc<ResourceDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.descriptors
            .insert(descriptor.type_plural.clone(), Arc::clone(&descriptor));
        self.descriptors
            .insert(descriptor.type_singular.clone(), Arc::clone(&descriptor));
        descriptor
    }

    /// Look a descriptor up by singular or plural type name.
    pub fn descriptor(&self, type_name: &str) -> Option<&Arc<ResourceDescriptor>> {
        self.descriptors.get(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_url_singularizes_the_collection_segment() {
        let d = ResourceDescriptor::new("user", "users").with_fields(&["name", "email"]);
        assert_eq!(d.element_url("7"), "/user/7");
    }

    #[test]
    fn allow_list_is_checked_by_name() {
        let d = ResourceDescriptor::new("user", "users").with_fields(&["name"]);
        assert!(d.exposes("name"));
        assert!(!d.exposes("password"));
    }

    #[test]
    fn registry_resolves_both_name_forms() {
        let mut registry = Registry::new();
        registry.register(ResourceDescriptor::new("user", "users"));
        assert!(registry.descriptor("users").is_some());
        assert!(registry.descriptor("user").is_some());
        assert!(registry.descriptor("orders").is_none());
    }
}
