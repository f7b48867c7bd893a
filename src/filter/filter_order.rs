use std::cmp::Ordering;

use super::types::{FilterOrderInfo, SortDirection};
use crate::store::value::Fields;

pub struct FilterOrder;

impl FilterOrder {
    /// Whether a document can appear in an ordered result; the store's index
    /// only holds documents that carry the ordered field.
    pub fn is_indexed(order: &FilterOrderInfo, fields: &Fields) -> bool {
        fields.contains_key(&order.field)
    }

    /// Compare two (id, fields) documents by the ordering, ties broken by id in the same direction
    pub fn compare(order: &FilterOrderInfo, a: (&str, &Fields), b: (&str, &Fields)) -> Ordering {
        let by_field = match (a.1.get(&order.field), b.1.get(&order.field)) {
            (Some(x), Some(y)) => x.compare(y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ord = by_field.then_with(|| a.0.cmp(b.0));
        match order.sort {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::value::FieldValue;

    fn order(sort: SortDirection) -> FilterOrderInfo {
        FilterOrderInfo { field: "order".into(), sort }
    }

    fn with_order(n: i64) -> Fields {
        let mut f = Fields::new();
        f.insert("order".into(), FieldValue::Integer(n));
        f
    }

    #[test]
    fn compares_with_direction_and_id_tiebreak() {
        let asc = order(SortDirection::Asc);
        let desc = order(SortDirection::Desc);
        let (one, two) = (with_order(1), with_order(2));

        assert_eq!(FilterOrder::compare(&asc, ("a", &one), ("b", &two)), Ordering::Less);
        assert_eq!(FilterOrder::compare(&desc, ("a", &one), ("b", &two)), Ordering::Greater);
        assert_eq!(FilterOrder::compare(&asc, ("a", &one), ("b", &one)), Ordering::Less);
        assert_eq!(FilterOrder::compare(&desc, ("a", &one), ("b", &one)), Ordering::Greater);
    }

    #[test]
    fn documents_without_the_field_are_not_indexed() {
        let asc = order(SortDirection::Asc);
        assert!(FilterOrder::is_indexed(&asc, &with_order(3)));
        assert!(!FilterOrder::is_indexed(&asc, &Fields::new()));
    }
}
