//! Stable sort by one field. Missing and null values sort last in either
//! direction.

use std::cmp::Ordering;

use super::expr::SortOrder;
use super::value::{FieldValue, Record};

fn present(v: Option<FieldValue>) -> Option<FieldValue> {
    v.filter(|v| !v.is_null())
}

/// Numbers compare numerically, booleans false < true, everything else by
/// case-insensitive text form with the raw text as tie-breaker.
fn compare_present(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (FieldValue::Bool(x), FieldValue::Bool(y)) => x.cmp(y),
        _ => {
            let (ta, tb) = (a.to_text(), b.to_text());
            ta.to_lowercase()
                .cmp(&tb.to_lowercase())
                .then_with(|| ta.cmp(&tb))
        }
    }
}

pub fn sort_records<R: Record>(records: Vec<R>, field: &str, order: SortOrder) -> Vec<R> {
    let mut keyed: Vec<(Option<FieldValue>, R)> = records
        .into_iter()
        .map(|r| (present(r.field(field)), r))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => compare_present(a, b),
            SortOrder::Desc => compare_present(b, a),
        },
    });
    keyed.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn names(records: &[Value]) -> Vec<&str> {
        records.iter().map(|r| r["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn numbers_sort_numerically_missing_last() {
        let records = vec![
            json!({"id": "a", "score": 10}),
            json!({"id": "b"}),
            json!({"id": "c", "score": 9}),
            json!({"id": "d", "score": null}),
            json!({"id": "e", "score": 100}),
        ];
        let asc = sort_records(records.clone(), "score", SortOrder::Asc);
        assert_eq!(names(&asc), vec!["c", "a", "e", "b", "d"]);
        let desc = sort_records(records, "score", SortOrder::Desc);
        assert_eq!(names(&desc), vec!["e", "a", "c", "b", "d"]);
    }

    #[test]
    fn text_sort_ignores_case_and_is_stable() {
        let records = vec![
            json!({"id": "1", "name": "beta"}),
            json!({"id": "2", "name": "Alpha"}),
            json!({"id": "3", "name": "beta"}),
            json!({"id": "4", "name": "alpha2"}),
        ];
        let sorted = sort_records(records, "name", SortOrder::Asc);
        assert_eq!(names(&sorted), vec!["2", "4", "1", "3"]);
    }
}
