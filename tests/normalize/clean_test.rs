#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use super::common::{catalog, query, ORDERS};
    use serde_json::{json, Value};
    use structured_query::metadata::CatalogProvider;
    use structured_query::normalize::{can_run, clean_query, remove_expression, set_expression};
    use structured_query::query::ExpressionClause;

    /// Queries as they look halfway through an edit.
    fn corpus() -> Vec<Value> {
        vec![
            json!({}),
            json!({"source-table": 1}),
            json!({"source-table": 1, "breakout": [null]}),
            json!({"source-table": 1, "aggregation": [["rows"]], "breakout": []}),
            json!({"source-table": 1, "aggregation": [null, ["count"]], "breakout": [["field-id", 13], null]}),
            json!({"source-table": 1, "aggregation": ["count"], "order-by": [["asc", ["aggregation", 0]]]}),
            json!({
                "source-table": 1,
                "aggregation": [["sum", ["field-id", 10]], ["cum-sum", ["field-id", 10]]],
                "breakout": [["datetime-field", ["field-id", 12], "as", "month"], ["field-id", 13]],
                "filter": ["and", ["=", ["field-id", 13], null], ["segment", 200], [">", ["field-id", 10], 5]],
                "order-by": [
                    ["desc", ["aggregation", 0]],
                    ["desc", ["aggregation", 1]],
                    ["asc", ["field-id", 12]],
                    ["asc", ["field-id", 99]],
                    [null, ["field-id", 13]]
                ],
                "limit": 10
            }),
            json!({
                "source-table": 1,
                "breakout": [
                    ["binning-strategy", ["field-id", 10], "num-bins", 10],
                    ["binning-strategy", ["field-id", 10], "num-bins", 50]
                ],
                "aggregation": [["count"]],
                "order-by": [["asc", ["field-id", 10]]]
            }),
            json!({"source-table": 1, "filter": ["or", ["segment", 200], ["=", ["field-id", 13], "a"]]}),
            json!({"source-table": 1, "filter": "garbage", "limit": "many", "order-by": "nope"}),
            json!({"source-table": 1, "expressions": {"": ["+", 1, 1], "double": ["*", ["field-id", 10], 2]}}),
            json!({"source-table": 1, "order-by": [["asc", ["fk->", 11, 20]]], "fields": [1, 2]}),
            json!({
                "source-table": 1,
                "aggregation": [["sum", "field-id", 10]],
                "breakout": [["field-id", 1]],
                "order-by": [["asc", ["aggregation", 0]]]
            }),
            json!({"source-table": 1, "order-by": [["ascending", ["field-id", 10]]]}),
        ]
    }

    #[test]
    fn test_clean_is_idempotent() {
        for raw in corpus() {
            let once = clean_query(&query(raw.clone()));
            let twice = clean_query(&once);
            assert_eq!(once, twice, "not idempotent for {raw}");
            assert_eq!(once.to_value(), twice.to_value(), "wire form changed for {raw}");
        }
    }

    #[test]
    fn test_clean_never_leaves_empty_lists() {
        for raw in corpus() {
            let cleaned = clean_query(&query(raw)).to_value();
            for key in ["aggregation", "breakout", "order-by"] {
                if let Some(list) = cleaned.get(key) {
                    assert!(!list.as_array().unwrap().is_empty(), "{key} left empty in {cleaned}");
                }
            }
        }
    }

    #[test]
    fn test_edited_query_is_reconciled() {
        let raw = corpus()[6].clone();
        let cleaned = clean_query(&query(raw)).to_value();
        assert_eq!(
            cleaned,
            json!({
                "source-table": 1,
                "aggregation": [["sum", ["field-id", 10]], ["cum-sum", ["field-id", 10]]],
                "breakout": [["datetime-field", ["field-id", 12], "as", "month"], ["field-id", 13]],
                "filter": ["and", ["segment", 200], [">", ["field-id", 10], 5]],
                "order-by": [
                    ["desc", ["aggregation", 0]],
                    ["asc", ["datetime-field", ["field-id", 12], "as", "month"]]
                ],
                "limit": 10
            })
        );
    }

    #[test]
    fn test_ambiguous_binning_match_takes_first() {
        let cleaned = clean_query(&query(corpus()[7].clone())).to_value();
        assert_eq!(
            cleaned["order-by"],
            json!([["asc", ["binning-strategy", ["field-id", 10], "num-bins", 10]]])
        );
    }

    #[test]
    fn test_aggregate_with_loose_arguments_stays_sortable() {
        let raw = corpus()[12].clone();
        let cleaned = clean_query(&query(raw.clone())).to_value();
        assert_eq!(cleaned, raw);
    }

    #[test]
    fn test_unknown_direction_round_trips_until_cleaned() {
        let raw = corpus()[13].clone();
        assert_eq!(query(raw.clone()).to_value(), raw);
        assert_eq!(clean_query(&query(raw)).to_value(), json!({"source-table": 1}));
    }

    #[test]
    fn test_unknown_keys_survive() {
        let cleaned = clean_query(&query(corpus()[11].clone())).to_value();
        assert_eq!(cleaned["fields"], json!([1, 2]));
        assert_eq!(cleaned["order-by"], json!([["asc", ["fk->", 11, 20]]]));
    }

    #[test]
    fn test_expression_lifecycle() {
        let base = query(json!({"source-table": 1, "aggregation": [["count"]]}));
        let margin = ExpressionClause::from_value(&json!(["-", ["field-id", 10], 5]));

        let with_expression = set_expression(&base, "margin", margin);
        let grouped = query(json!({
            "source-table": 1,
            "aggregation": [["count"], ["avg", ["expression", "margin"]]],
            "breakout": [["expression", "margin"]],
            "order-by": [["desc", ["expression", "margin"]]],
            "expressions": with_expression.to_value()["expressions"].clone(),
        }));
        let cleaned = clean_query(&grouped);
        assert_eq!(cleaned.order_by.as_ref().map(Vec::len), Some(1));

        let removed = remove_expression(&grouped, "margin");
        assert_eq!(
            removed.to_value(),
            json!({"source-table": 1, "aggregation": [["count"]]})
        );
    }

    #[test]
    fn test_can_run_against_catalog() {
        let catalog = catalog();
        let orders = catalog.table(ORDERS);

        assert!(can_run(&query(json!({"source-table": 1})), orders));
        assert!(can_run(&query(json!({"source-table": 1, "aggregation": [["count"]]})), orders));
        assert!(!can_run(&query(json!({"source-table": 1, "aggregation": [["count"], null]})), orders));
        assert!(!can_run(&query(json!({"aggregation": [["count"]]})), orders));

        // the category table does not offer raw rows
        let categories = catalog.table(3);
        assert!(!can_run(&query(json!({"source-table": 3})), categories));
    }
}
