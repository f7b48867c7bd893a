use crate::store::value::FieldValue;

/// Predicate operators the document store can evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    ArrayContains,
    ArrayContainsAny,
}

impl FilterOp {
    pub fn to_firestore(&self) -> &'static str {
        match self {
            FilterOp::Equal => "EQUAL",
            FilterOp::ArrayContains => "ARRAY_CONTAINS",
            FilterOp::ArrayContainsAny => "ARRAY_CONTAINS_ANY",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub field: String,
    pub operator: FilterOp,
    pub data: FieldValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_firestore(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASCENDING",
            SortDirection::Desc => "DESCENDING",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub field: String,
    pub sort: SortDirection,
}

/// A single read against one collection: AND-ed predicates, one ordering, optional cap
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredQuery {
    pub collection: String,
    pub conditions: Vec<FilterWhereInfo>,
    pub order: Option<FilterOrderInfo>,
    pub limit: Option<u32>,
}
