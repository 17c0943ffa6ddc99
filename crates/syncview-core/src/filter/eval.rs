//! Per-expression predicate evaluation and group composition.

use serde_json::Value;

use super::expr::{FilterExpression, FilterGroup, FilterLogic, FilterOperator};
use super::value::{FieldValue, Record};

/// Evaluate one expression against one record.
///
/// A missing or null field fails every operator except `is_null`.
pub fn matches_expression<R: Record + ?Sized>(record: &R, expr: &FilterExpression) -> bool {
    let value = match record.field(&expr.field) {
        Some(v) if !v.is_null() => v,
        _ => return expr.operator == FilterOperator::IsNull,
    };
    let operand = FieldValue::from(&expr.value);
    match expr.operator {
        FilterOperator::Equals => value == operand,
        FilterOperator::NotEquals => value != operand,
        FilterOperator::Contains => text_of(&value).contains(&text_of(&operand)),
        FilterOperator::NotContains => !text_of(&value).contains(&text_of(&operand)),
        FilterOperator::StartsWith => text_of(&value).starts_with(&text_of(&operand)),
        FilterOperator::EndsWith => text_of(&value).ends_with(&text_of(&operand)),
        FilterOperator::Greater => compare(&value, &operand, |a, b| a > b),
        FilterOperator::GreaterEqual => compare(&value, &operand, |a, b| a >= b),
        FilterOperator::Less => compare(&value, &operand, |a, b| a < b),
        FilterOperator::LessEqual => compare(&value, &operand, |a, b| a <= b),
        FilterOperator::Between => between(&value, &expr.value),
        FilterOperator::In => candidates(&expr.value).any(|c| c == value),
        FilterOperator::NotIn => !candidates(&expr.value).any(|c| c == value),
        FilterOperator::IsNull => false,
        FilterOperator::IsNotNull => true,
    }
}

fn text_of(v: &FieldValue) -> String {
    v.to_text().to_lowercase()
}

fn compare(value: &FieldValue, operand: &FieldValue, op: impl Fn(f64, f64) -> bool) -> bool {
    match (value.as_number(), operand.as_number()) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

/// Bound of a `between` operand: absent, null or blank means unbounded.
/// `Err` for a bound that is given but not numeric.
fn bound(v: Option<&Value>) -> Result<Option<f64>, ()> {
    let v = match v {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(v) => v,
    };
    FieldValue::from(v).as_number().map(Some).ok_or(())
}

fn between(value: &FieldValue, operand: &Value) -> bool {
    let (min, max) = match operand {
        Value::Object(map) => (bound(map.get("min")), bound(map.get("max"))),
        Value::Array(items) => (bound(items.first()), bound(items.get(1))),
        _ => return false,
    };
    let (Ok(min), Ok(max)) = (min, max) else {
        return false;
    };
    let Some(n) = value.as_number() else {
        return false;
    };
    min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)
}

fn candidates(operand: &Value) -> Box<dyn Iterator<Item = FieldValue> + '_> {
    match operand {
        Value::Array(items) => Box::new(items.iter().map(FieldValue::from)),
        Value::Null => Box::new(std::iter::empty()),
        other => Box::new(std::iter::once(FieldValue::from(other))),
    }
}

/// A set of expressions combined under one logic. Empty clauses pass.
#[derive(Debug)]
pub(super) struct Clause<'a> {
    pub logic: FilterLogic,
    pub expressions: Vec<&'a FilterExpression>,
}

impl Clause<'_> {
    pub fn matches(&self, mut test: impl FnMut(&FilterExpression) -> bool) -> bool {
        match self.logic {
            FilterLogic::And => self.expressions.iter().all(|&e| test(e)),
            FilterLogic::Or => {
                self.expressions.is_empty() || self.expressions.iter().any(|&e| test(e))
            }
        }
    }
}

/// Split top-level expressions and declared groups into clauses that all must
/// pass. Ungrouped expressions become single-member clauses; expressions whose
/// `group_id` names a declared group join that group; the rest form implicit
/// groups in first-seen order.
pub(super) fn plan<'a>(
    expressions: &'a [FilterExpression],
    groups: &'a [FilterGroup],
) -> Vec<Clause<'a>> {
    let mut clauses: Vec<Clause<'a>> = Vec::new();
    let mut grouped: Vec<(&'a str, Clause<'a>)> = groups
        .iter()
        .map(|g| {
            (
                g.id.as_str(),
                Clause {
                    logic: g.logic,
                    expressions: g.expressions.iter().collect(),
                },
            )
        })
        .collect();

    for expr in expressions {
        match expr.group_id.as_deref() {
            None => clauses.push(Clause {
                logic: FilterLogic::And,
                expressions: vec![expr],
            }),
            Some(id) => match grouped.iter_mut().find(|(gid, _)| *gid == id) {
                Some((_, clause)) => clause.expressions.push(expr),
                None => grouped.push((
                    id,
                    Clause {
                        logic: expr.logic.unwrap_or_default(),
                        expressions: vec![expr],
                    },
                )),
            },
        }
    }
    clauses.extend(grouped.into_iter().map(|(_, clause)| clause));
    clauses
}
