//! Canonical error-object shapes: not-found, validation-failed, and the
//! static not-implemented fallback document.

use crate::document::{BuiltDocument, Document, ErrorObject, Meta};
use serde_json::Value;

/// Exactly one of these is emitted for a missing id; the caller strips
/// `data` and `meta` from the document.
pub fn not_found(type_singular: &str) -> ErrorObject {
    ErrorObject {
        status: "404".to_string(),
        title: "Resource could not found".to_string(),
        detail: format!("The {} could not be found.", type_singular),
        data: None,
    }
}

/// One of these per violated validation rule.
pub fn validation_failed(detail: &str) -> ErrorObject {
    ErrorObject {
        status: "422".to_string(),
        title: "Input validation has failed".to_string(),
        detail: detail.to_string(),
        data: None,
    }
}

/// Bulk variant: carries the offending item's payload for diagnostics.
pub fn validation_failed_with_data(detail: &str, data: Value) -> ErrorObject {
    ErrorObject {
        data: Some(data),
        ..validation_failed(detail)
    }
}

/// Static 501 document answered by every operation a resource controller
/// does not override.
pub fn not_implemented() -> BuiltDocument {
    let detail = "This feature is not yet implemented.";
    let title = "Not Implemented";
    BuiltDocument::new(
        501,
        Document {
            errors: Some(vec![ErrorObject {
                status: "501".to_string(),
                title: title.to_string(),
                detail: detail.to_string(),
                data: None,
            }]),
            meta: Some(Meta {
                status: "501".to_string(),
                title: Some(title.to_string()),
                count: None,
                detail: Some(detail.to_string()),
            }),
            ..Document::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_type() {
        let err = not_found("user");
        assert_eq!(err.status, "404");
        assert_eq!(err.detail, "The user could not be found.");
    }

    #[test]
    fn not_implemented_carries_errors_and_meta_only() {
        let built = not_implemented();
        assert_eq!(built.status, 501);
        let v = serde_json::to_value(&built.document).unwrap();
        let obj = v.as_object().unwrap();
        assert!(obj.contains_key("errors"));
        assert!(obj.contains_key("meta"));
        assert!(!obj.contains_key("data"));
        assert_eq!(v["errors"][0]["status"], "501");
        assert_eq!(v["meta"]["title"], "Not Implemented");
    }
}
