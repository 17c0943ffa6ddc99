//! Client-side record filtering: free-text search, typed filter expressions
//! with AND/OR groups, sorting and pagination over any [`Record`].
//!
//! Evaluation order is search, then filters, then sort. Filtering never fails:
//! a predicate that cannot apply (missing field, non-numeric value under a
//! numeric operator) simply excludes the record.

mod eval;
mod expr;
mod page;
mod sort;
mod value;

use std::collections::HashSet;

pub use eval::matches_expression;
pub use expr::{FilterExpression, FilterGroup, FilterLogic, FilterOperator, FilterState, SortOrder};
pub use page::{paginate, Page};
pub use sort::sort_records;
pub use value::{FieldValue, Record};

use eval::{plan, Clause};

/// Evaluates a [`FilterState`] against a record set.
///
/// `search_fields` are the fields free-text search looks at; when empty,
/// search covers every field the record exposes through
/// [`Record::field_names`]. An optional declared field set makes any filter on
/// an undeclared field exclude every record.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    search_fields: Vec<String>,
    known_fields: Option<HashSet<String>>,
}

impl FilterEngine {
    pub fn new<I, S>(search_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_fields: search_fields.into_iter().map(Into::into).collect(),
            known_fields: None,
        }
    }

    pub fn with_known_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    fn is_known(&self, field: &str) -> bool {
        self.known_fields
            .as_ref()
            .map_or(true, |known| known.contains(field))
    }

    fn matches_search<R: Record>(&self, record: &R, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let hit = |field: &str| {
            record
                .field(field)
                .filter(|v| !v.is_null())
                .is_some_and(|v| v.to_text().to_lowercase().contains(term))
        };
        if self.search_fields.is_empty() {
            record.field_names().iter().any(|f| hit(f.as_str()))
        } else {
            self.search_fields.iter().any(|f| hit(f.as_str()))
        }
    }

    fn matches_clauses<R: Record>(&self, record: &R, clauses: &[Clause<'_>]) -> bool {
        clauses.iter().all(|clause| {
            clause.matches(|expr| self.is_known(&expr.field) && matches_expression(record, expr))
        })
    }

    /// Whether a single record passes the search term and every filter.
    pub fn matches<R: Record>(&self, record: &R, state: &FilterState) -> bool {
        let term = state.search.trim().to_lowercase();
        let clauses = plan(&state.expressions, &state.groups);
        self.matches_search(record, &term) && self.matches_clauses(record, &clauses)
    }

    /// Records passing search and filters, in input order unless `sort_by` is
    /// set. Paging is not applied; see [`page`](Self::page).
    pub fn evaluate<R: Record + Clone>(&self, records: &[R], state: &FilterState) -> Vec<R> {
        let term = state.search.trim().to_lowercase();
        let clauses = plan(&state.expressions, &state.groups);
        for clause in &clauses {
            for expr in &clause.expressions {
                if !self.is_known(&expr.field) {
                    tracing::debug!(field = %expr.field, "filter on undeclared field");
                }
            }
        }
        let selected: Vec<R> = records
            .iter()
            .filter(|r| self.matches_search(*r, &term) && self.matches_clauses(*r, &clauses))
            .cloned()
            .collect();
        tracing::debug!(
            input = records.len(),
            selected = selected.len(),
            clauses = clauses.len(),
            "filter evaluated"
        );
        match &state.sort_by {
            Some(field) => sort_records(selected, field, state.sort_order),
            None => selected,
        }
    }

    /// [`evaluate`](Self::evaluate) followed by pagination per
    /// `state.page_size` / `state.current_page`.
    pub fn page<R: Record + Clone>(&self, records: &[R], state: &FilterState) -> Page<R> {
        paginate(
            self.evaluate(records, state),
            state.page_size,
            state.current_page,
        )
    }
}
