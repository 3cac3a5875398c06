//! Data-store collaborator: the trait the document core needs, plus an
//! in-memory reference implementation used by tests and the demo server.

use crate::pagination::PageCursor;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store: {0}")]
    Backend(String),
}

/// A stored object: its id, raw field map, and any loaded related objects.
/// Owned and lifecycled by the store; the codec only reads it through the
/// descriptor's field list.
#[derive(Clone, Debug, Default)]
pub struct Resource {
    pub id: i64,
    pub fields: Map<String, Value>,
    pub related: BTreeMap<String, Related>,
}

impl Resource {
    pub fn new(id: i64, fields: Map<String, Value>) -> Self {
        Resource {
            id,
            fields,
            related: BTreeMap::new(),
        }
    }
}

/// A loaded relation: one related object or a collection of them.
#[derive(Clone, Debug)]
pub enum Related {
    One(RelatedResource),
    Many(Vec<RelatedResource>),
}

#[derive(Clone, Debug)]
pub struct RelatedResource {
    pub type_name: String,
    pub id: i64,
    pub fields: Map<String, Value>,
}

/// One page of resources plus its cursor.
#[derive(Debug)]
pub struct Page {
    pub resources: Vec<Resource>,
    pub cursor: PageCursor,
}

/// Storage interface for one resource type. Persistence correctness and
/// schema design live behind this boundary; the document core only relies
/// on the calls below.
///
/// `delete`/`delete_all` are soft deletes; `force_delete`/`force_delete_all`
/// bypass the soft-delete marker (replace semantics require the hard form).
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Resource>, StoreError>;
    async fn paginate(&self, page: u32, page_size: u32) -> Result<Page, StoreError>;
    async fn all(&self) -> Result<Vec<Resource>, StoreError>;
    async fn create(&self, attrs: Map<String, Value>) -> Result<Resource, StoreError>;
    async fn save(&self, resource: Resource) -> Result<Resource, StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
    async fn force_delete(&self, id: i64) -> Result<(), StoreError>;
    async fn delete_all(&self) -> Result<u64, StoreError>;
    async fn force_delete_all(&self) -> Result<u64, StoreError>;
    async fn where_id_in(&self, ids: &[i64]) -> Result<Vec<Resource>, StoreError>;
    /// Uniqueness probe for the validation engine: whether any live row
    /// other than `ignore_id` already holds `value` in `field`.
    async fn is_taken(&self, field: &str, value: &Value, ignore_id: Option<i64>)
        -> Result<bool, StoreError>;
}

#[derive(Debug)]
struct StoredRow {
    resource: Resource,
    deleted: bool,
}

#[derive(Debug, Default)]
struct Rows {
    by_id: BTreeMap<i64, StoredRow>,
    next_id: i64,
}

/// In-memory store: a BTreeMap behind an RwLock, ids assigned from 1.
/// Soft-deleted rows stay in the map but are invisible to reads; only
/// `force_delete` removes them. Id 0 is never assigned, so a lookup of 0
/// always misses.
#[derive(Debug)]
pub struct InMemoryStore {
    rows: RwLock<Rows>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            rows: RwLock::new(Rows {
                by_id: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Rows> {
        self.rows.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Rows> {
        self.rows.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a related object onto a stored resource (demo/test helper).
    pub fn attach_related(&self, id: i64, name: &str, related: Related) {
        let mut rows = self.write();
        if let Some(row) = rows.by_id.get_mut(&id) {
            row.resource.related.insert(name.to_string(), related);
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        InMemoryStore::new()
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn find(&self, id: i64) -> Result<Option<Resource>, StoreError> {
        let rows = self.read();
        Ok(rows
            .by_id
            .get(&id)
            .filter(|row| !row.deleted)
            .map(|row| row.resource.clone()))
    }

    async fn paginate(&self, page: u32, page_size: u32) -> Result<Page, StoreError> {
        let rows = self.read();
        let live: Vec<&Resource> = rows
            .by_id
            .values()
            .filter(|row| !row.deleted)
            .map(|row| &row.resource)
            .collect();
        let cursor = PageCursor::new(page, page_size, live.len() as u64);
        let offset = (cursor.current_page as usize - 1) * page_size as usize;
        let resources = live
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok(Page { resources, cursor })
    }

    async fn all(&self) -> Result<Vec<Resource>, StoreError> {
        let rows = self.read();
        Ok(rows
            .by_id
            .values()
            .filter(|row| !row.deleted)
            .map(|row| row.resource.clone())
            .collect())
    }

    async fn create(&self, attrs: Map<String, Value>) -> Result<Resource, StoreError> {
        let mut rows = self.write();
        // A forced id (create-by-id, element replace) arrives in the map.
        let id = match attrs.get("id").and_then(Value::as_i64) {
            Some(forced) if forced > 0 => forced,
            _ => rows.next_id,
        };
        rows.next_id = rows.next_id.max(id + 1);
        let mut fields = attrs;
        fields.insert("id".to_string(), Value::from(id));
        let resource = Resource::new(id, fields);
        rows.by_id.insert(
            id,
            StoredRow {
                resource: resource.clone(),
                deleted: false,
            },
        );
        Ok(resource)
    }

    async fn save(&self, resource: Resource) -> Result<Resource, StoreError> {
        let mut rows = self.write();
        let id = resource.id;
        rows.next_id = rows.next_id.max(id + 1);
        rows.by_id.insert(
            id,
            StoredRow {
                resource: resource.clone(),
                deleted: false,
            },
        );
        Ok(resource)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut rows = self.write();
        if let Some(row) = rows.by_id.get_mut(&id) {
            row.deleted = true;
        }
        Ok(())
    }

    async fn force_delete(&self, id: i64) -> Result<(), StoreError> {
        let mut rows = self.write();
        rows.by_id.remove(&id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut rows = self.write();
        let mut count = 0;
        for row in rows.by_id.values_mut() {
            if !row.deleted {
                row.deleted = true;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn force_delete_all(&self) -> Result<u64, StoreError> {
        let mut rows = self.write();
        let count = rows.by_id.len() as u64;
        rows.by_id.clear();
        Ok(count)
    }

    async fn where_id_in(&self, ids: &[i64]) -> Result<Vec<Resource>, StoreError> {
        let rows = self.read();
        Ok(ids
            .iter()
            .filter_map(|id| rows.by_id.get(id))
            .filter(|row| !row.deleted)
            .map(|row| row.resource.clone())
            .collect())
    }

    async fn is_taken(
        &self,
        field: &str,
        value: &Value,
        ignore_id: Option<i64>,
    ) -> Result<bool, StoreError> {
        let rows = self.read();
        Ok(rows
            .by_id
            .values()
            .filter(|row| !row.deleted)
            .filter(|row| Some(row.resource.id) != ignore_id)
            .any(|row| row.resource.fields.get(field) == Some(value)))
    }
}
