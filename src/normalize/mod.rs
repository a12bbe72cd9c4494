//! Query normalization.
//!
//! [`clean_query`] turns an interactively edited query into its canonical
//! form: half-finished clauses are dropped, empty lists are removed so the
//! key is absent again, and sort clauses are reconciled against the current
//! aggregations and breakouts. It never fails and is idempotent.
//!
//! Every function here takes a query by reference and returns a new one.

use crate::metadata::{Field, TableMetadata};
use crate::query::{
    AggregationClause, ExpressionClause, FieldReference, FilterClause, Limit, OrderByClause, StructuredQuery,
    TargetId,
};

/// Canonicalize `query`.
pub fn clean_query(query: &StructuredQuery) -> StructuredQuery {
    let mut cleaned = query.clone();

    let aggregations = query.aggregations();
    cleaned.aggregation = (!aggregations.is_empty()).then_some(aggregations);

    let breakouts = query.breakouts();
    cleaned.breakout = (!breakouts.is_empty()).then_some(breakouts);

    let filters: Vec<FilterClause> = query
        .filters()
        .into_iter()
        .filter(|filter| !filter.has_null_argument())
        .collect();
    cleaned.filter = (!filters.is_empty()).then(|| FilterClause::and(filters));

    // reads the aggregations and breakouts cleaned above
    let order_by: Vec<OrderByClause> = query
        .order_by
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|clause| reconcile_order_by(&cleaned, clause))
        .collect();
    cleaned.order_by = (!order_by.is_empty()).then_some(order_by);

    cleaned.limit = match query.limit {
        Some(Limit::Rows(rows)) => Some(Limit::Rows(rows)),
        _ => None,
    };

    if let Some(expressions) = cleaned.expressions.as_mut() {
        expressions.remove("");
    }

    cleaned
}

fn reconcile_order_by(query: &StructuredQuery, clause: &OrderByClause) -> Option<OrderByClause> {
    if !clause.is_complete() {
        return None;
    }

    if let FieldReference::AggregateResult(index) = clause.field {
        return query.can_sort_by_aggregate_field(index).then(|| clause.clone());
    }

    if let Some(breakouts) = query.breakout.as_deref().filter(|list| !list.is_empty()) {
        let matched = match breakouts.iter().find(|b| b.is_same_field(&clause.field, true)) {
            Some(exact) => exact,
            None => {
                let mut candidates = breakouts.iter().filter(|b| b.is_same_field(&clause.field, false));
                let first = candidates.next()?;
                let others = candidates.count();
                if others > 0 {
                    tracing::warn!(
                        field = %clause.field.to_value(),
                        matches = others + 1,
                        "order-by matches several breakouts, using the first"
                    );
                }
                first
            }
        };
        return Some(OrderByClause {
            field: matched.clone(),
            ..clause.clone()
        });
    }

    query.is_bare_rows().then(|| clause.clone())
}

/// Add or replace the named expression. An empty name is ignored.
pub fn set_expression(query: &StructuredQuery, name: &str, expression: ExpressionClause) -> StructuredQuery {
    let mut updated = query.clone();
    if name.is_empty() {
        return updated;
    }
    updated
        .expressions
        .get_or_insert_with(Default::default)
        .insert(name.to_string(), expression);
    updated
}

/// Remove the named expression and every clause that referred to it.
///
/// References are nulled out and the result is cleaned, which drops the
/// clauses that now hold a null.
pub fn remove_expression(query: &StructuredQuery, name: &str) -> StructuredQuery {
    let mut scrubbed = query.clone();

    if let Some(expressions) = scrubbed.expressions.as_mut() {
        expressions.remove(name);
        for expression in expressions.values_mut() {
            *expression = expression.without_expression(name);
        }
        if expressions.is_empty() {
            scrubbed.expressions = None;
        }
    }

    if let Some(aggregation) = scrubbed.aggregation.as_mut() {
        for clause in aggregation.iter_mut() {
            *clause = clause.without_expression(name);
        }
    }
    if let Some(breakout) = scrubbed.breakout.as_mut() {
        for field in breakout.iter_mut() {
            *field = field.without_expression(name);
        }
    }
    if let Some(filter) = scrubbed.filter.as_mut() {
        *filter = filter.without_expression(name);
    }
    if let Some(order_by) = scrubbed.order_by.as_mut() {
        for clause in order_by.iter_mut() {
            clause.field = clause.field.without_expression(name);
        }
    }

    tracing::debug!(expression = name, "removed expression");
    clean_query(&scrubbed)
}

/// Whether the query is complete enough to execute.
///
/// With table metadata at hand, a bare-rows query also needs the table to
/// offer raw rows.
pub fn can_run(query: &StructuredQuery, table: Option<&TableMetadata>) -> bool {
    if query.source_table.is_none() || !query.has_valid_aggregation() {
        return false;
    }
    match table {
        Some(table) if query.is_bare_rows() => table.supports_aggregation("rows"),
        _ => true,
    }
}

/// Something a query can be sorted by.
#[derive(Debug, Clone, PartialEq)]
pub enum SortableField<'a> {
    Field(&'a Field),
    Aggregation { index: usize, name: String },
}

impl SortableField<'_> {
    pub fn display_name(&self) -> &str {
        match self {
            SortableField::Field(field) => field.display_name.as_deref().unwrap_or(&field.name),
            SortableField::Aggregation { name, .. } => name,
        }
    }

    /// The order-by reference for this entry. `None` for a field without an id.
    pub fn to_reference(&self) -> Option<FieldReference> {
        match self {
            SortableField::Field(field) => field.id.map(FieldReference::field_id),
            SortableField::Aggregation { index, .. } => Some(FieldReference::aggregation(*index)),
        }
    }
}

/// The fields a query may be sorted by.
///
/// A bare-rows query sorts by any field; a grouped query by its breakout
/// fields and its sortable aggregations. Anything else has nothing sortable.
pub fn get_sortable_fields<'a>(query: &StructuredQuery, fields: &'a [Field]) -> Vec<SortableField<'a>> {
    if query.is_bare_rows() {
        return fields.iter().map(SortableField::Field).collect();
    }
    if !query.has_valid_breakout() {
        return Vec::new();
    }

    let targets: Vec<TargetId> = query.breakouts().iter().filter_map(FieldReference::target_id).collect();
    let mut sortable: Vec<SortableField<'a>> = fields
        .iter()
        .filter(|field| {
            field
                .id
                .is_some_and(|id| targets.contains(&TargetId::Field(id)))
        })
        .map(SortableField::Field)
        .collect();

    for (index, aggregation) in query.aggregations().iter().enumerate() {
        if query.can_sort_by_aggregate_field(index) {
            sortable.push(SortableField::Aggregation {
                index,
                name: aggregation_label(aggregation),
            });
        }
    }
    sortable
}

fn aggregation_label(aggregation: &AggregationClause) -> String {
    match aggregation.name() {
        Some(name) => name.to_string(),
        None => aggregation
            .content()
            .operator()
            .map(|operator| operator.as_str().to_string())
            .unwrap_or_default(),
    }
}
