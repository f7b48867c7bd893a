use super::types::{FilterOp, FilterWhereInfo};
use crate::store::value::{FieldValue, Fields};

/// Client-side evaluation of query predicates, for stores that cannot push them down
pub struct FilterWhere;

impl FilterWhere {
    /// True when the document satisfies every condition
    pub fn matches(conditions: &[FilterWhereInfo], fields: &Fields) -> bool {
        conditions.iter().all(|c| Self::matches_one(c, fields))
    }

    fn matches_one(condition: &FilterWhereInfo, fields: &Fields) -> bool {
        // A document without the field never matches, not even an equality on null
        let Some(value) = fields.get(&condition.field) else {
            return false;
        };
        match condition.operator {
            FilterOp::Equal => value == &condition.data,
            FilterOp::ArrayContains => value
                .as_array()
                .map(|items| items.iter().any(|item| item == &condition.data))
                .unwrap_or(false),
            FilterOp::ArrayContainsAny => {
                let wanted: &[FieldValue] = condition.data.as_array().unwrap_or(&[]);
                value
                    .as_array()
                    .map(|items| items.iter().any(|item| wanted.contains(item)))
                    .unwrap_or(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tags: &[&str], category: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("tags".into(), FieldValue::Array(tags.iter().map(|t| FieldValue::from(*t)).collect()));
        fields.insert("category".into(), category.into());
        fields
    }

    fn cond(field: &str, operator: FilterOp, data: FieldValue) -> FilterWhereInfo {
        FilterWhereInfo { field: field.into(), operator, data }
    }

    #[test]
    fn equality_and_membership() {
        let fields = doc(&["x", "y"], "A");
        assert!(FilterWhere::matches(&[cond("category", FilterOp::Equal, "A".into())], &fields));
        assert!(!FilterWhere::matches(&[cond("category", FilterOp::Equal, "B".into())], &fields));
        assert!(FilterWhere::matches(&[cond("tags", FilterOp::ArrayContains, "x".into())], &fields));
        assert!(!FilterWhere::matches(&[cond("tags", FilterOp::ArrayContains, "z".into())], &fields));
    }

    #[test]
    fn contains_any_matches_on_overlap() {
        let fields = doc(&["x", "y"], "A");
        let any = |vals: &[&str]| cond("tags", FilterOp::ArrayContainsAny, FieldValue::Array(vals.iter().map(|v| FieldValue::from(*v)).collect()));
        assert!(FilterWhere::matches(&[any(&["z", "y"])], &fields));
        assert!(!FilterWhere::matches(&[any(&["z", "w"])], &fields));
    }

    #[test]
    fn conditions_are_conjunctive_and_missing_fields_fail() {
        let fields = doc(&["x"], "A");
        let both = [cond("category", FilterOp::Equal, "A".into()), cond("tags", FilterOp::ArrayContains, "y".into())];
        assert!(!FilterWhere::matches(&both, &fields));
        assert!(!FilterWhere::matches(&[cond("status", FilterOp::Equal, FieldValue::Null)], &fields));
        assert!(!FilterWhere::matches(&[cond("category", FilterOp::ArrayContains, "A".into())], &fields));
        assert!(FilterWhere::matches(&[], &fields));
    }
}
