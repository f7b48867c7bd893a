use serde_json::{Map, Value};
use std::collections::HashMap;

use super::record::Record;
use super::schema::{FilterSpec, LimitCoercion, LimitRule, MatchMode, Schema};
use super::service::ServiceError;
use crate::filter::{Filter, FilterError, StructuredQuery};
use crate::store::value::FieldValue;
use crate::store::DocumentStore;

/// Raw list parameters, taken from the query string or the JSON body
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    values: Map<String, Value>,
}

impl ListParams {
    pub fn from_query(query: HashMap<String, String>) -> Self {
        Self {
            values: query.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
        }
    }

    /// Non-object bodies carry no parameters
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The caller's limit if it is a positive integer under the resource's parsing rule
    pub fn requested_limit(&self, rule: &LimitRule) -> Option<u32> {
        let raw = self.values.get("limit")?;
        let parsed = match (raw, rule.coercion) {
            (Value::Number(n), _) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f > 0.0).map(|f| f as u64)),
            (Value::String(s), LimitCoercion::Lenient) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed
            .filter(|n| *n > 0)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
    }
}

/// Translates a schema's list declarations plus request parameters into one store query
pub struct QueryBuilder<'a> {
    schema: &'a Schema,
    max_limit: Option<u32>,
    debug_logging: bool,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema, max_limit: None, debug_logging: false }
    }

    pub fn max_limit(mut self, max_limit: Option<u32>) -> Self {
        self.max_limit = max_limit;
        self
    }

    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    pub fn build(&self, params: &ListParams) -> Result<StructuredQuery, FilterError> {
        let mut filter = Filter::new(self.schema.collection)?;

        for spec in &self.schema.filters {
            if let Some(value) = Self::requested_value(spec, params) {
                Self::apply_filter(&mut filter, spec, value)?;
            }
        }

        filter.order(self.schema.order.field, self.schema.order.direction)?;

        let limit = params.requested_limit(&self.schema.limit).or(self.schema.limit.default);
        if let Some(limit) = limit {
            filter.limit(limit, self.max_limit)?;
        }

        Ok(filter.build())
    }

    pub async fn list(&self, store: &dyn DocumentStore, params: &ListParams) -> Result<Vec<Record>, ServiceError> {
        let query = self.build(params)?;
        if self.debug_logging {
            tracing::debug!(
                "list {} where {:?} order {:?} limit {:?}",
                query.collection,
                query.conditions,
                query.order,
                query.limit
            );
        }
        let documents = store.query(&query).await?;
        Ok(documents.into_iter().map(Record::from).collect())
    }

    /// Truthy parameter value, else the filter's declared default
    fn requested_value(spec: &FilterSpec, params: &ListParams) -> Option<FieldValue> {
        params
            .get(spec.param)
            .map(FieldValue::from_json)
            .filter(FieldValue::is_truthy)
            .or_else(|| spec.default.clone())
    }

    fn apply_filter(filter: &mut Filter, spec: &FilterSpec, value: FieldValue) -> Result<(), FilterError> {
        match spec.mode {
            MatchMode::Equality => {
                filter.where_eq(spec.field, value)?;
            }
            MatchMode::ArrayContains => {
                let mut values = membership_values(value);
                if values.len() == 1 {
                    filter.where_contains(spec.field, values.remove(0))?;
                } else if !values.is_empty() {
                    filter.where_contains_any(spec.field, values)?;
                }
            }
        }
        Ok(())
    }
}

/// Split a membership value: `"a,b"` and `["a","b"]` both mean any of a or b
fn membership_values(value: FieldValue) -> Vec<FieldValue> {
    let candidates: Vec<FieldValue> = match value {
        FieldValue::String(s) if s.contains(',') => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(FieldValue::from)
            .collect(),
        FieldValue::Array(items) => items,
        other => vec![other],
    };

    let mut unique: Vec<FieldValue> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}
