use super::error::FilterError;
use super::types::{FilterOp, FilterOrderInfo, FilterWhereInfo, SortDirection, StructuredQuery};
use crate::store::value::FieldValue;

/// Upper bound the store accepts for an array-contains-any value list
pub const MAX_DISJUNCTION_VALUES: usize = 30;

/// Largest limit the store accepts (a signed 32-bit count)
pub const MAX_STORE_LIMIT: u32 = i32::MAX as u32;

pub struct Filter {
    collection: String,
    conditions: Vec<FilterWhereInfo>,
    order: Option<FilterOrderInfo>,
    limit: Option<u32>,
}

impl Filter {
    pub fn new(collection: impl Into<String>) -> Result<Self, FilterError> {
        let collection = collection.into();
        Self::validate_collection(&collection)?;
        Ok(Self {
            collection,
            conditions: vec![],
            order: None,
            limit: None,
        })
    }

    pub fn where_eq(&mut self, field: &str, value: FieldValue) -> Result<&mut Self, FilterError> {
        Self::validate_field(field)?;
        self.conditions.push(FilterWhereInfo { field: field.to_string(), operator: FilterOp::Equal, data: value });
        Ok(self)
    }

    pub fn where_contains(&mut self, field: &str, value: FieldValue) -> Result<&mut Self, FilterError> {
        Self::validate_field(field)?;
        self.conditions.push(FilterWhereInfo { field: field.to_string(), operator: FilterOp::ArrayContains, data: value });
        Ok(self)
    }

    pub fn where_contains_any(&mut self, field: &str, values: Vec<FieldValue>) -> Result<&mut Self, FilterError> {
        Self::validate_field(field)?;
        if values.is_empty() {
            return Err(FilterError::InvalidOperatorData(format!("'{}' needs at least one value", field)));
        }
        if values.len() > MAX_DISJUNCTION_VALUES {
            return Err(FilterError::InvalidOperatorData(format!(
                "'{}' accepts at most {} values, got {}",
                field,
                MAX_DISJUNCTION_VALUES,
                values.len()
            )));
        }
        self.conditions.push(FilterWhereInfo {
            field: field.to_string(),
            operator: FilterOp::ArrayContainsAny,
            data: FieldValue::Array(values),
        });
        Ok(self)
    }

    pub fn order(&mut self, field: &str, sort: SortDirection) -> Result<&mut Self, FilterError> {
        Self::validate_field(field)?;
        self.order = Some(FilterOrderInfo { field: field.to_string(), sort });
        Ok(self)
    }

    /// Apply a result cap, reduced to `max_limit` when one is configured and
    /// never above what the store accepts
    pub fn limit(&mut self, limit: u32, max_limit: Option<u32>) -> Result<&mut Self, FilterError> {
        if limit == 0 {
            return Err(FilterError::InvalidLimit("Limit must be positive".to_string()));
        }
        let max = max_limit.map_or(MAX_STORE_LIMIT, |max| max.min(MAX_STORE_LIMIT));
        let applied = if limit > max {
            tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max);
            max
        } else {
            limit
        };
        self.limit = Some(applied);
        Ok(self)
    }

    pub fn build(&self) -> StructuredQuery {
        StructuredQuery {
            collection: self.collection.clone(),
            conditions: self.conditions.clone(),
            order: self.order.clone(),
            limit: self.limit,
        }
    }

    fn validate_collection(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidCollection("Collection name cannot be empty".to_string()));
        }
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidCollection(format!("Invalid collection name format: {}", name)));
        }
        Ok(())
    }

    fn validate_field(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidField("Field name cannot be empty".to_string()));
        }
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidField(format!("Invalid field name format: {}", name)));
        }
        Ok(())
    }

    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
            _ => false,
        }
    }
}
