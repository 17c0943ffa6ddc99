//! Filter state as the view layer hands it over: expressions, groups, search,
//! sort and paging. Serde names follow the JSON the view layer produces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Between,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterLogic {
    #[default]
    #[serde(alias = "and")]
    And,
    #[serde(alias = "or")]
    Or,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// One predicate over one field.
///
/// `value` is the raw filter operand: a scalar for most operators, a list for
/// `in`/`not_in`, and `{"min", "max"}` or `[min, max]` for `between`.
/// `logic` only matters for an expression whose `group_id` names no declared
/// [`FilterGroup`]; such expressions form an implicit group that takes its
/// logic from its first member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterExpression {
    #[serde(default)]
    pub id: String,
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<FilterLogic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl FilterExpression {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        let field = field.into();
        Self {
            id: field.clone(),
            field,
            operator,
            value,
            logic: None,
            group_id: None,
        }
    }

    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_logic(mut self, logic: FilterLogic) -> Self {
        self.logic = Some(logic);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    pub id: String,
    #[serde(default)]
    pub expressions: Vec<FilterExpression>,
    #[serde(default)]
    pub logic: FilterLogic,
}

fn first_page() -> usize {
    1
}

/// Everything the engine needs for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub search: String,
    #[serde(default, alias = "filters")]
    pub expressions: Vec<FilterExpression>,
    #[serde(default)]
    pub groups: Vec<FilterGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    /// 0 = everything on one page.
    #[serde(default)]
    pub page_size: usize,
    #[serde(default = "first_page")]
    pub current_page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            expressions: Vec::new(),
            groups: Vec::new(),
            sort_by: None,
            sort_order: SortOrder::Asc,
            page_size: 0,
            current_page: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_view_layer_json() {
        let state: FilterState = serde_json::from_value(json!({
            "search": "acme",
            "filters": [
                {"id": "f1", "field": "score", "operator": "greater_equal", "value": 5},
                {"id": "f2", "field": "tier", "operator": "in", "value": ["gold"], "groupId": "g1"}
            ],
            "groups": [{"id": "g1", "logic": "OR"}],
            "sortBy": "name",
            "sortOrder": "desc",
            "pageSize": 20
        }))
        .unwrap();
        assert_eq!(state.expressions.len(), 2);
        assert_eq!(state.expressions[0].operator, FilterOperator::GreaterEqual);
        assert_eq!(state.expressions[1].group_id.as_deref(), Some("g1"));
        assert_eq!(state.groups[0].logic, FilterLogic::Or);
        assert_eq!(state.sort_order, SortOrder::Desc);
        assert_eq!(state.page_size, 20);
        assert_eq!(state.current_page, 1);
    }

    #[test]
    fn empty_object_is_default_state() {
        let state: FilterState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn lowercase_logic_accepted() {
        let logic: FilterLogic = serde_json::from_str("\"or\"").unwrap();
        assert_eq!(logic, FilterLogic::Or);
    }
}
