//! Declarative description of one resource type.
//!
//! A `Schema` tells the generic resource service everything that differs
//! between resource types: where records live, which fields are required,
//! how each field is defaulted and coerced, which list filters exist, where
//! list parameters come from, and how large a list may be.
use serde::Serialize;

use crate::filter::SortDirection;
use crate::store::value::FieldValue;

/// How a create input value becomes a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Absent input takes the default; anything else is stored as sent
    Verbatim,
    /// Falsy input takes the default
    OrDefault,
    /// Non-array input takes the default
    Array,
    /// Stored as the truthiness of the input
    Boolean,
    /// Falsy input takes the default; anything else must parse as a date
    Timestamp,
    /// Input is ignored at create; the default is always stored
    Fixed,
}

#[derive(Debug, Clone)]
pub enum DefaultValue {
    Value(FieldValue),
    /// The store-assigned write time
    Now,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub default: DefaultValue,
    pub coercion: Coercion,
}

impl FieldSpec {
    fn new(name: &'static str, default: FieldValue, coercion: Coercion) -> Self {
        Self { name, default: DefaultValue::Value(default), coercion }
    }

    /// Free text, empty string when falsy
    pub fn text(name: &'static str) -> Self {
        Self::new(name, "".into(), Coercion::OrDefault)
    }

    /// Free text with a non-empty fallback
    pub fn text_or(name: &'static str, default: &str) -> Self {
        Self::new(name, default.into(), Coercion::OrDefault)
    }

    /// Any value, null when falsy
    pub fn nullable(name: &'static str) -> Self {
        Self::new(name, FieldValue::Null, Coercion::OrDefault)
    }

    pub fn or_default(name: &'static str, default: FieldValue) -> Self {
        Self::new(name, default, Coercion::OrDefault)
    }

    /// Stored exactly as sent; the default only fills a missing key
    pub fn verbatim(name: &'static str, default: FieldValue) -> Self {
        Self::new(name, default, Coercion::Verbatim)
    }

    pub fn array(name: &'static str) -> Self {
        Self::new(name, FieldValue::Array(vec![]), Coercion::Array)
    }

    pub fn flag(name: &'static str) -> Self {
        Self::new(name, FieldValue::Boolean(false), Coercion::Boolean)
    }

    /// Optional date, null when falsy
    pub fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldValue::Null, Coercion::Timestamp)
    }

    /// Optional date, the creation time when falsy
    pub fn timestamp_or_now(name: &'static str) -> Self {
        Self { name, default: DefaultValue::Now, coercion: Coercion::Timestamp }
    }

    pub fn fixed(name: &'static str, value: &str) -> Self {
        Self::new(name, value.into(), Coercion::Fixed)
    }
}

#[derive(Debug, Clone)]
pub struct RequiredField {
    pub name: &'static str,
    /// Error returned when this field is missing or falsy
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Equality,
    /// The record's array field contains the requested value
    ArrayContains,
}

#[derive(Debug, Clone)]
pub struct FilterSpec {
    /// Request parameter name
    pub param: &'static str,
    /// Record field the predicate applies to
    pub field: &'static str,
    pub mode: MatchMode,
    /// Applied when the parameter is absent
    pub default: Option<FieldValue>,
}

impl FilterSpec {
    pub fn eq(field: &'static str) -> Self {
        Self { param: field, field, mode: MatchMode::Equality, default: None }
    }

    pub fn eq_or(field: &'static str, default: &str) -> Self {
        Self { default: Some(default.into()), ..Self::eq(field) }
    }

    pub fn contains(param: &'static str, field: &'static str) -> Self {
        Self { param, field, mode: MatchMode::ArrayContains, default: None }
    }
}

/// Where a list request's filter and limit parameters are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    Body,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitCoercion {
    /// Numeric strings are accepted ("10")
    Lenient,
    /// Only JSON numbers are accepted
    NumericOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct LimitRule {
    /// `None` means unbounded unless the caller asks for a limit
    pub default: Option<u32>,
    pub coercion: LimitCoercion,
}

impl LimitRule {
    pub const fn capped(default: u32) -> Self {
        Self { default: Some(default), coercion: LimitCoercion::Lenient }
    }

    pub const fn numeric_only(default: u32) -> Self {
        Self { default: Some(default), coercion: LimitCoercion::NumericOnly }
    }

    pub const fn unbounded() -> Self {
        Self { default: None, coercion: LimitCoercion::Lenient }
    }
}

/// A field computed from other fields at create, e.g. `"{teamA} vs {teamB}"`
#[derive(Debug, Clone)]
pub struct DerivedField {
    pub name: &'static str,
    pub template: &'static str,
}

#[derive(Debug, Clone)]
pub struct OrderSpec {
    pub field: &'static str,
    pub direction: SortDirection,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub route: &'static str,
    pub collection: &'static str,
    pub label: &'static str,
    pub list_key: &'static str,
    pub item_key: &'static str,
    pub required: Vec<RequiredField>,
    pub fields: Vec<FieldSpec>,
    pub derived: Vec<DerivedField>,
    pub order: OrderSpec,
    pub filters: Vec<FilterSpec>,
    pub params: ParamSource,
    pub limit: LimitRule,
    pub status_toggle: bool,
    id_message: Option<&'static str>,
    not_found_message: Option<&'static str>,
}

impl Schema {
    /// A schema with no fields, ordered newest first, list params in the query string
    pub fn new(route: &'static str, collection: &'static str, label: &'static str) -> Self {
        Self {
            route,
            collection,
            label,
            list_key: collection,
            item_key: collection,
            required: vec![],
            fields: vec![],
            derived: vec![],
            order: OrderSpec { field: "createdAt", direction: SortDirection::Desc },
            filters: vec![],
            params: ParamSource::Query,
            limit: LimitRule::unbounded(),
            status_toggle: false,
            id_message: None,
            not_found_message: None,
        }
    }

    pub fn keys(mut self, list_key: &'static str, item_key: &'static str) -> Self {
        self.list_key = list_key;
        self.item_key = item_key;
        self
    }

    pub fn require(mut self, name: &'static str, message: &'static str) -> Self {
        self.required.push(RequiredField { name, message });
        self
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn derive(mut self, name: &'static str, template: &'static str) -> Self {
        self.derived.push(DerivedField { name, template });
        self
    }

    pub fn order_by(mut self, field: &'static str, direction: SortDirection) -> Self {
        self.order = OrderSpec { field, direction };
        self
    }

    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.filters.push(spec);
        self
    }

    pub fn params_from(mut self, source: ParamSource) -> Self {
        self.params = source;
        self
    }

    pub fn limit(mut self, rule: LimitRule) -> Self {
        self.limit = rule;
        self
    }

    pub fn with_status_toggle(mut self) -> Self {
        self.status_toggle = true;
        self
    }

    pub fn messages(mut self, id_message: &'static str, not_found_message: &'static str) -> Self {
        self.id_message = Some(id_message);
        self.not_found_message = Some(not_found_message);
        self
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Message for a request that needs an id and has none
    pub fn id_required_message(&self) -> String {
        self.id_message
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} ID required", self.label))
    }

    pub fn not_found_message(&self) -> String {
        self.not_found_message
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} not found", self.label))
    }
}
