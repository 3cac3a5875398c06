//! Document assembly for the ten resource operations.
//!
//! Each operation builds a fresh local document and returns it with its
//! status code; nothing request-scoped is ever stored on the builder.

use crate::catalog;
use crate::codec;
use crate::descriptor::{Registry, ResourceDescriptor};
use crate::document::{
    BuiltDocument, CollectionLink, Document, ErrorObject, Links, Meta, PrimaryData,
    ResourceObject, SelfLink,
};
use crate::error::ApiError;
use crate::pagination;
use crate::relationships;
use crate::request::BulkItem;
use crate::store::{Resource, ResourceStore};
use crate::validation::{with_unique_ignoring, RuleSet, ValidationEngine};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Default and maximum number of entries per index page.
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Assembles response documents for one resource type, against a store and
/// a validation engine it does not own.
pub struct DocumentBuilder {
    descriptor: Arc<ResourceDescriptor>,
    registry: Arc<Registry>,
    store: Arc<dyn ResourceStore>,
    engine: Arc<dyn ValidationEngine>,
    rules: RuleSet,
    page_size: u32,
}

impl DocumentBuilder {
    pub fn new(
        descriptor: Arc<ResourceDescriptor>,
        registry: Arc<Registry>,
        store: Arc<dyn ResourceStore>,
        engine: Arc<dyn ValidationEngine>,
    ) -> Self {
        DocumentBuilder {
            descriptor,
            registry,
            store,
            engine,
            rules: RuleSet::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Attribute rule set applied by create/replace/update operations.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    // GET

    /// List one page of the collection. Always 200 — an empty result set is
    /// still "OK".
    pub async fn index(&self, page: u32) -> Result<BuiltDocument, ApiError> {
        let page = self.store.paginate(page, self.page_size).await?;
        tracing::debug!(
            type_name = %self.descriptor.type_plural,
            count = page.resources.len(),
            "index"
        );

        let mut entries = Vec::with_capacity(page.resources.len());
        let mut included = Vec::new();
        for resource in &page.resources {
            entries.push(self.entry(resource, true, true));
            included.extend(relationships::build_included(
                &self.registry,
                &self.descriptor,
                resource,
                None,
            ));
        }

        let mut meta = Meta::with_status("200");
        meta.count = Some(entries.len() as u64);

        Ok(BuiltDocument::new(
            200,
            Document {
                data: Some(PrimaryData::Many(entries)),
                meta: Some(meta),
                links: Some(Links::Pagination(pagination::build(
                    &self.descriptor.url_base,
                    &page.cursor,
                ))),
                included: if included.is_empty() {
                    None
                } else {
                    Some(included)
                },
                ..Document::default()
            },
        ))
    }

    /// Fetch one resource. A missing id yields the 404 catalog entry with
    /// the `data` and `meta` keys omitted entirely.
    pub async fn details(&self, id: i64) -> Result<BuiltDocument, ApiError> {
        let Some(resource) = self.store.find(id).await? else {
            return Ok(self.not_found());
        };

        let included = relationships::build_included(
            &self.registry,
            &self.descriptor,
            &resource,
            None,
        );
        let mut meta = Meta::with_status("200");
        meta.count = Some(1);

        Ok(BuiltDocument::new(
            200,
            Document {
                data: Some(PrimaryData::One(self.entry(&resource, true, true))),
                meta: Some(meta),
                links: Some(self.collection_link()),
                included: if included.is_empty() {
                    None
                } else {
                    Some(included)
                },
                ..Document::default()
            },
        ))
    }

    // POST

    /// Create from an attribute map. Any supplied id is stripped first —
    /// this has to be a new record.
    pub async fn create(&self, mut attrs: Map<String, Value>) -> Result<BuiltDocument, ApiError> {
        attrs.remove(&self.descriptor.id_field);

        let messages = self.engine.validate(&attrs, &self.rules).await?;
        if !messages.is_empty() {
            return Ok(self.validation_failure(&messages, None));
        }

        let resource = self.store.create(attrs).await?;
        tracing::debug!(type_name = %self.descriptor.type_singular, id = resource.id, "created");
        Ok(self.write_success(
            &resource,
            "201",
            format!("The {} was created.", self.descriptor.type_singular),
        ))
    }

    /// Create with a caller-chosen id. The id rule is relaxed to
    /// `sometimes + unique + integer` so forcing an id does not collide with
    /// the usual system-assigned-id validation.
    pub async fn create_by_id(
        &self,
        id: i64,
        mut attrs: Map<String, Value>,
    ) -> Result<BuiltDocument, ApiError> {
        attrs.insert(self.descriptor.id_field.clone(), Value::from(id));

        let mut rules = self.rules.clone();
        rules.insert(
            self.descriptor.id_field.clone(),
            vec![
                crate::validation::Rule::Sometimes,
                crate::validation::Rule::Unique { ignore_id: None },
                crate::validation::Rule::Integer,
            ],
        );

        let messages = self.engine.validate(&attrs, &rules).await?;
        if !messages.is_empty() {
            return Ok(self.validation_failure(&messages, None));
        }

        let resource = self.store.create(attrs).await?;
        tracing::debug!(type_name = %self.descriptor.type_singular, id = resource.id, "created by id");
        Ok(self.write_success(
            &resource,
            "201",
            format!("The {} was created.", self.descriptor.type_singular),
        ))
    }

    // PUT

    /// Replace the addressed element: destroy-then-recreate, not a patch.
    /// Both validations (id existence and attribute rules) always run and
    /// their messages merge, id messages first.
    pub async fn element_replace(
        &self,
        id: i64,
        attrs: Map<String, Value>,
    ) -> Result<BuiltDocument, ApiError> {
        let mut id_attrs = Map::new();
        id_attrs.insert(self.descriptor.id_field.clone(), Value::from(id));
        let mut id_rules = RuleSet::new();
        id_rules.insert(
            self.descriptor.id_field.clone(),
            vec![
                crate::validation::Rule::Exists,
                crate::validation::Rule::Integer,
            ],
        );

        let mut messages = self.engine.validate(&id_attrs, &id_rules).await?;
        let attr_rules = with_unique_ignoring(&self.rules, Some(id));
        messages.extend(self.engine.validate(&attrs, &attr_rules).await?);

        if !messages.is_empty() {
            // Replace strips meta as well as data on failure.
            let errors = messages
                .iter()
                .map(|m| catalog::validation_failed(m))
                .collect();
            return Ok(BuiltDocument::new(
                422,
                Document {
                    errors: Some(errors),
                    ..Document::default()
                },
            ));
        }

        // Hard delete so a soft-delete marker cannot shadow the new row.
        self.store.force_delete(id).await?;
        let mut attrs = attrs;
        attrs.insert(self.descriptor.id_field.clone(), Value::from(id));
        let resource = self.store.create(attrs).await?;
        tracing::debug!(type_name = %self.descriptor.type_singular, id, "replaced");

        Ok(self.write_success(
            &resource,
            "201",
            format!("The {} was replaced.", self.descriptor.type_singular),
        ))
    }

    /// Replace the whole collection. Every item is validated before any
    /// write; the first invalid item fails the request with its payload
    /// attached and nothing is deleted or inserted.
    pub async fn collection_replace(
        &self,
        items: Vec<BulkItem>,
    ) -> Result<BuiltDocument, ApiError> {
        if let Some(failure) = self.validate_items(&items, false).await? {
            return Ok(failure);
        }

        self.store.force_delete_all().await?;
        let count = items.len();
        for item in items {
            self.store.create(self.item_attrs(item)).await?;
        }
        tracing::debug!(type_name = %self.descriptor.type_plural, count, "collection replaced");

        Ok(self.bulk_success(
            "201",
            count as u64,
            format!(
                "The {} collection was replaced.",
                self.descriptor.type_singular
            ),
        ))
    }

    // PATCH

    /// Update the collection in bulk: items with a matching id are saved in
    /// place, the rest are created. Referenced ids are preloaded in one
    /// batch and supplied to the validator as context.
    pub async fn collection_update(
        &self,
        items: Vec<BulkItem>,
    ) -> Result<BuiltDocument, ApiError> {
        if let Some(failure) = self.validate_items(&items, true).await? {
            return Ok(failure);
        }

        let existing = self.preload(&items).await?;
        let count = items.len();
        for item in items {
            match item.id.and_then(|id| existing.get(&id).cloned()) {
                Some(mut resource) => {
                    for (field, value) in item.attributes {
                        resource.fields.insert(field, value);
                    }
                    self.store.save(resource).await?;
                }
                None => {
                    self.store.create(self.item_attrs(item)).await?;
                }
            }
        }
        tracing::debug!(type_name = %self.descriptor.type_plural, count, "collection updated");

        Ok(self.bulk_success(
            "200",
            count as u64,
            format!(
                "The {} collection was updated.",
                self.descriptor.type_singular
            ),
        ))
    }

    /// Update the addressed element in place (no delete). A missing id
    /// falls through to create semantics.
    pub async fn element_update(
        &self,
        id: i64,
        attrs: Map<String, Value>,
    ) -> Result<BuiltDocument, ApiError> {
        let existing = self.store.find(id).await?;

        let rules = with_unique_ignoring(&self.rules, existing.as_ref().map(|r| r.id));
        let messages = self.engine.validate(&attrs, &rules).await?;
        if !messages.is_empty() {
            return Ok(self.validation_failure(&messages, None));
        }

        let resource = match existing {
            Some(mut resource) => {
                for (field, value) in attrs {
                    resource.fields.insert(field, value);
                }
                self.store.save(resource).await?
            }
            None => {
                let mut attrs = attrs;
                if id != 0 {
                    attrs.insert(self.descriptor.id_field.clone(), Value::from(id));
                }
                self.store.create(attrs).await?
            }
        };
        tracing::debug!(type_name = %self.descriptor.type_singular, id = resource.id, "updated");

        Ok(self.write_success(
            &resource,
            "200",
            format!("The {} was updated.", self.descriptor.type_singular),
        ))
    }

    // DELETE

    /// Delete the whole collection, echoing what was removed.
    pub async fn collection_delete(&self) -> Result<BuiltDocument, ApiError> {
        let objects = self.store.all().await?;
        let entries: Vec<ResourceObject> =
            objects.iter().map(|r| self.entry(r, false, false)).collect();
        let count = entries.len() as u64;

        self.store.delete_all().await?;
        tracing::debug!(type_name = %self.descriptor.type_plural, count, "collection deleted");

        let mut meta = Meta::with_status("200");
        meta.count = Some(count);
        meta.detail = Some(format!(
            "The collection inside the {} table was deleted.",
            self.descriptor.type_plural
        ));

        Ok(BuiltDocument::new(
            200,
            Document {
                data: Some(PrimaryData::Many(entries)),
                meta: Some(meta),
                links: Some(self.collection_link()),
                ..Document::default()
            },
        ))
    }

    /// Delete the addressed element, echoing its minimal representation.
    pub async fn element_delete(&self, id: i64) -> Result<BuiltDocument, ApiError> {
        let Some(resource) = self.store.find(id).await? else {
            return Ok(self.not_found());
        };

        self.store.delete(id).await?;
        tracing::debug!(type_name = %self.descriptor.type_singular, id, "deleted");

        let mut meta = Meta::with_status("200");
        meta.count = Some(1);
        meta.detail = Some(format!("The {} was deleted.", self.descriptor.type_singular));

        Ok(BuiltDocument::new(
            200,
            Document {
                data: Some(PrimaryData::One(self.entry(&resource, false, false))),
                meta: Some(meta),
                links: Some(self.collection_link()),
                ..Document::default()
            },
        ))
    }

    // Assembly helpers

    fn entry(&self, resource: &Resource, with_links: bool, with_relationships: bool) -> ResourceObject {
        let id = resource.id.to_string();
        ResourceObject {
            links: with_links.then(|| SelfLink {
                self_url: self.descriptor.element_url(&id),
            }),
            relationships: with_relationships.then(|| {
                relationships::build_relationships(&self.descriptor, resource, None)
            }),
            id,
            type_name: self.descriptor.type_singular.clone(),
            attributes: codec::expose(&self.descriptor, &resource.fields, None),
        }
    }

    fn collection_link(&self) -> Links {
        Links::Collection(CollectionLink {
            collection: self.descriptor.url_base.clone(),
        })
    }

    fn not_found(&self) -> BuiltDocument {
        BuiltDocument::new(
            404,
            Document {
                errors: Some(vec![catalog::not_found(&self.descriptor.type_singular)]),
                ..Document::default()
            },
        )
    }

    /// 422 for single-resource writes: one error object per message,
    /// meta.status kept, data stripped.
    fn validation_failure(&self, messages: &[String], data: Option<&Value>) -> BuiltDocument {
        let errors: Vec<ErrorObject> = messages
            .iter()
            .map(|m| match data {
                Some(payload) => catalog::validation_failed_with_data(m, payload.clone()),
                None => catalog::validation_failed(m),
            })
            .collect();
        BuiltDocument::new(
            422,
            Document {
                errors: Some(errors),
                meta: Some(Meta::with_status("422")),
                ..Document::default()
            },
        )
    }

    fn write_success(&self, resource: &Resource, status: &str, detail: String) -> BuiltDocument {
        let mut meta = Meta::with_status(status);
        meta.detail = Some(detail);
        meta.count = Some(1);
        BuiltDocument::new(
            status.parse().unwrap_or(200),
            Document {
                data: Some(PrimaryData::One(self.entry(resource, true, true))),
                meta: Some(meta),
                ..Document::default()
            },
        )
    }

    fn bulk_success(&self, status: &str, count: u64, detail: String) -> BuiltDocument {
        let mut meta = Meta::with_status(status);
        meta.detail = Some(detail);
        meta.count = Some(count);
        BuiltDocument::new(
            status.parse().unwrap_or(200),
            Document {
                data: Some(PrimaryData::Many(Vec::new())),
                meta: Some(meta),
                ..Document::default()
            },
        )
    }

    /// Fail-fast bulk validation: stops at the first invalid item and
    /// reports only that item's messages, the offending payload attached to
    /// each error object. Returns the 422 document, or None when every item
    /// passes — the caller performs no writes until then.
    async fn validate_items(
        &self,
        items: &[BulkItem],
        with_existing_context: bool,
    ) -> Result<Option<BuiltDocument>, ApiError> {
        let existing = if with_existing_context {
            self.preload(items).await?
        } else {
            HashMap::new()
        };

        for item in items {
            let matched = item.id.filter(|id| existing.contains_key(id));
            let rules = if matched.is_some() {
                with_unique_ignoring(&self.rules, matched)
            } else {
                self.rules.clone()
            };
            let messages = self.engine.validate(&item.attributes, &rules).await?;
            if !messages.is_empty() {
                let payload = Value::Object(item.attributes.clone());
                return Ok(Some(self.validation_failure(&messages, Some(&payload))));
            }
        }
        Ok(None)
    }

    async fn preload(&self, items: &[BulkItem]) -> Result<HashMap<i64, Resource>, ApiError> {
        let ids: Vec<i64> = items.iter().filter_map(|item| item.id).collect();
        let resources = self.store.where_id_in(&ids).await?;
        Ok(resources.into_iter().map(|r| (r.id, r)).collect())
    }

    fn item_attrs(&self, item: BulkItem) -> Map<String, Value> {
        let mut attrs = item.attributes;
        if let Some(id) = item.id {
            attrs.insert(self.descriptor.id_field.clone(), Value::from(id));
        }
        attrs
    }
}
