//! Validation-engine collaborator: rule sets in, human-readable field
//! messages out. `RuleValidator` is the reference engine; its message texts
//! follow the usual "The {field} ..." convention.

use crate::store::{ResourceStore, StoreError};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One field rule. `Sometimes` gates the rest of the field's rules on the
/// field being present, which is how a forced-id create relaxes the default
/// system-assigned-id expectation.
#[derive(Clone, Debug)]
pub enum Rule {
    Sometimes,
    Required,
    Email,
    Integer,
    MinLength(usize),
    MaxLength(usize),
    Pattern(String),
    /// No other live row may hold this value; `ignore_id` exempts the row
    /// being updated.
    Unique { ignore_id: Option<i64> },
    /// The value must reference an existing row id.
    Exists,
}

/// Rules per field name, walked in field order so merged error lists are
/// deterministic.
pub type RuleSet = BTreeMap<String, Vec<Rule>>;

/// Re-target every `Unique` rule to ignore `id`. Used when validating an
/// update against the record it will overwrite.
pub fn with_unique_ignoring(rules: &RuleSet, id: Option<i64>) -> RuleSet {
    rules
        .iter()
        .map(|(field, field_rules)| {
            let field_rules = field_rules
                .iter()
                .map(|rule| match rule {
                    Rule::Unique { .. } => Rule::Unique { ignore_id: id },
                    other => other.clone(),
                })
                .collect();
            (field.clone(), field_rules)
        })
        .collect()
}

/// The validation collaborator: an attribute map and a rule set go in, a
/// list of messages comes out (empty list = pass).
#[async_trait]
pub trait ValidationEngine: Send + Sync {
    async fn validate(
        &self,
        attrs: &Map<String, Value>,
        rules: &RuleSet,
    ) -> Result<Vec<String>, StoreError>;
}

/// Rule engine backed by a store handle for the `unique`/`exists` probes.
pub struct RuleValidator {
    store: Arc<dyn ResourceStore>,
}

impl RuleValidator {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        RuleValidator { store }
    }
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn is_integerish(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => !s.is_empty() && s.parse::<i64>().is_ok(),
        _ => false,
    }
}

#[async_trait]
impl ValidationEngine for RuleValidator {
    async fn validate(
        &self,
        attrs: &Map<String, Value>,
        rules: &RuleSet,
    ) -> Result<Vec<String>, StoreError> {
        let mut messages = Vec::new();

        for (field, field_rules) in rules {
            let value = attrs.get(field).filter(|v| !v.is_null());
            let sometimes = field_rules.iter().any(|r| matches!(r, Rule::Sometimes));

            let Some(value) = value else {
                if !sometimes && field_rules.iter().any(|r| matches!(r, Rule::Required)) {
                    messages.push(format!("The {} field is required.", field));
                }
                continue;
            };

            for rule in field_rules {
                match rule {
                    Rule::Sometimes | Rule::Required => {}
                    Rule::Email => {
                        let ok = value
                            .as_str()
                            .map(|s| s.contains('@') && s.len() >= 3)
                            .unwrap_or(false);
                        if !ok {
                            messages
                                .push(format!("The {} must be a valid email address.", field));
                        }
                    }
                    Rule::Integer => {
                        if !is_integerish(value) {
                            messages.push(format!("The {} must be an integer.", field));
                        }
                    }
                    Rule::MinLength(min) => {
                        if let Some(s) = value.as_str() {
                            if s.len() < *min {
                                messages.push(format!(
                                    "The {} must be at least {} characters.",
                                    field, min
                                ));
                            }
                        }
                    }
                    Rule::MaxLength(max) => {
                        if let Some(s) = value.as_str() {
                            if s.len() > *max {
                                messages.push(format!(
                                    "The {} may not be greater than {} characters.",
                                    field, max
                                ));
                            }
                        }
                    }
                    Rule::Pattern(pattern) => {
                        let re = match Regex::new(pattern) {
                            Ok(re) => re,
                            Err(_) => {
                                messages.push(format!("The {} format is invalid.", field));
                                continue;
                            }
                        };
                        if let Some(s) = value.as_str() {
                            if !re.is_match(s) {
                                messages.push(format!("The {} format is invalid.", field));
                            }
                        }
                    }
                    Rule::Unique { ignore_id } => {
                        if self.store.is_taken(field, value, *ignore_id).await? {
                            messages.push(format!("The {} has already been taken.", field));
                        }
                    }
                    Rule::Exists => {
                        let exists = match as_id(value) {
                            Some(id) => self.store.find(id).await?.is_some(),
                            None => false,
                        };
                        if !exists {
                            messages.push(format!("The selected {} is invalid.", field));
                        }
                    }
                }
            }
        }

        Ok(messages)
    }
}
