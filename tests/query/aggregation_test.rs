#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use super::common::query;
    use serde_json::json;
    use structured_query::query::{get_aggregations, AggregationClause, AggregationOperator, FieldReference};

    #[test]
    fn test_legacy_and_list_forms_agree() {
        let legacy = query(json!({"source-table": 1, "aggregation": ["sum", ["field-id", 10]]}));
        let listed = query(json!({"source-table": 1, "aggregation": [["sum", ["field-id", 10]]]}));
        assert_eq!(legacy.aggregations(), listed.aggregations());
    }

    #[test]
    fn test_has_valid_aggregation() {
        assert!(query(json!({"aggregation": [["count"], ["metric", 100]]})).has_valid_aggregation());
        assert!(query(json!({"aggregation": [["+", ["sum", 10], 1]]})).has_valid_aggregation());
        assert!(!query(json!({"aggregation": [["count"], null]})).has_valid_aggregation());
        assert!(!query(json!({"aggregation": [["sum", null]]})).has_valid_aggregation());
    }

    #[test]
    fn test_unknown_operator_is_kept() {
        let q = query(json!({"aggregation": [["median", ["field-id", 10]]]}));
        let aggregations = q.aggregations();
        assert_eq!(aggregations.len(), 1);
        assert_eq!(
            aggregations[0].operator(),
            Some(&AggregationOperator::Other("median".into()))
        );
        assert!(!q.can_sort_by_aggregate_field(0));
    }

    #[test]
    fn test_named_clause_keeps_options_through_edits() {
        let named = AggregationClause::from_value(&json!([
            "aggregation-options",
            ["sum", ["field-id", 10]],
            {"display-name": "Revenue", "format": "currency"}
        ]));

        let swapped = named.set_content(AggregationClause::avg(FieldReference::field_id(10)));
        assert_eq!(swapped.name(), Some("Revenue"));
        assert_eq!(swapped.options().and_then(|o| o.get("format")), Some(&json!("currency")));
        assert_eq!(swapped.content().operator(), Some(&AggregationOperator::Avg));

        let renamed = swapped.set_name("Average revenue");
        assert_eq!(
            renamed.to_value(),
            json!([
                "aggregation-options",
                ["avg", ["field-id", 10]],
                {"display-name": "Average revenue", "format": "currency"}
            ])
        );
    }

    #[test]
    fn test_named_clause_is_not_sortable() {
        let q = query(json!({
            "aggregation": [["aggregation-options", ["count"], {"display-name": "Orders"}]],
            "breakout": [["field-id", 13]],
        }));
        assert!(!q.can_sort_by_aggregate_field(0));
    }

    #[test]
    fn test_canonical_list_drops_unfinished_clauses() {
        let list: Vec<AggregationClause> = [
            json!(["rows"]),
            json!(["sum", ["expression", "margin"]]),
            json!(["avg", null]),
            json!(["count"]),
            json!("nonsense"),
        ]
        .iter()
        .map(AggregationClause::from_value)
        .collect();

        let canonical = get_aggregations(&list);
        assert_eq!(
            canonical,
            vec![
                AggregationClause::sum(FieldReference::expression("margin")),
                AggregationClause::count(),
            ]
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let clause: AggregationClause = serde_json::from_value(json!(["metric", 100])).unwrap();
        assert_eq!(clause, AggregationClause::metric(100));
        assert_eq!(serde_json::to_value(&clause).unwrap(), json!(["metric", 100]));
    }
}
