//! JSON:API document types: the response envelope and its fragments.

use serde::Serialize;
use serde_json::{Map, Value};

/// Top-level response document. Every key is omitted entirely when unset;
/// `data` and `errors` are never both present in a built document.
#[derive(Serialize, Debug, Default)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorObject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<IncludedEntry>>,
}

/// `data` is a single resource object or a list of them.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum PrimaryData {
    One(ResourceObject),
    Many(Vec<ResourceObject>),
}

/// One serialized resource. The id is always a string on the wire, even
/// when the store keys rows by integer.
#[derive(Serialize, Debug)]
pub struct ResourceObject {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<SelfLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Relationships>,
}

#[derive(Serialize, Debug)]
pub struct SelfLink {
    #[serde(rename = "self")]
    pub self_url: String,
}

/// Per-resource relationships slot. An empty slot serializes as `{}` —
/// an object, never an array — which some clients depend on.
#[derive(Serialize, Debug, Default)]
pub struct Relationships(pub Map<String, Value>);

impl Relationships {
    /// The typed empty-object value used when no relationship data applies.
    pub fn empty() -> Self {
        Relationships(Map::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `{"data": {type, id}}` or `{"data": [{type, id}, ...]}`.
#[derive(Serialize, Debug)]
pub struct ResourceLinkage {
    pub data: LinkageData,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum LinkageData {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
}

/// Compound-document side-table entry.
#[derive(Serialize, Debug)]
pub struct IncludedEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
    pub attributes: Map<String, Value>,
}

/// Response metadata. Statuses are strings throughout.
#[derive(Serialize, Debug)]
pub struct Meta {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Meta {
    pub fn with_status(status: &str) -> Self {
        Meta {
            status: status.to_string(),
            title: None,
            count: None,
            detail: None,
        }
    }
}

/// One error entry. `data` carries the offending bulk payload when a
/// collection operation rejects an item.
#[derive(Serialize, Debug, Clone)]
pub struct ErrorObject {
    pub status: String,
    pub title: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Top-level links: the full pagination set on index, or just the
/// collection url on detail/delete responses.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum Links {
    Pagination(PaginationLinks),
    Collection(CollectionLink),
}

/// `prev` and `next` are always present, `null` when there is no such page.
#[derive(Serialize, Debug, PartialEq)]
pub struct PaginationLinks {
    pub collection: String,
    #[serde(rename = "self")]
    pub self_url: String,
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct CollectionLink {
    pub collection: String,
}

/// A fully assembled document plus the HTTP status it should be sent with.
#[derive(Debug)]
pub struct BuiltDocument {
    pub status: u16,
    pub document: Document,
}

impl BuiltDocument {
    pub fn new(status: u16, document: Document) -> Self {
        BuiltDocument { status, document }
    }
}
