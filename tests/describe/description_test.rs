#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use super::common::{catalog, query, CATEGORY, ORDERS};
    use insta::assert_snapshot;
    use serde_json::{json, Value};
    use structured_query::describe::{
        generate_query_description, render_plain, DescribeOptions, DescriptionSegment, PlainExpressionFormatter,
        QueryDescriber, Section,
    };
    use structured_query::metadata::{CatalogProvider, DefaultCapabilities};
    use structured_query::query::AggregationClause;

    fn describe(table: i64, raw: Value, options: &DescribeOptions) -> String {
        let catalog = catalog();
        let table = catalog.table(table).unwrap();
        render_plain(&generate_query_description(&catalog, table, &query(raw), options))
    }

    fn only(sections: &[Section]) -> DescribeOptions {
        DescribeOptions {
            rich: false,
            sections: sections.to_vec(),
        }
    }

    #[test]
    fn test_grouped_count() {
        let text = describe(
            CATEGORY,
            json!({"source-table": 3, "aggregation": [["count"]], "breakout": [["field-id", 30]]}),
            &DescribeOptions::default(),
        );
        assert_eq!(text, "Categories, Count, Grouped by Category");
    }

    #[test]
    fn test_full_query() {
        let text = describe(
            ORDERS,
            json!({
                "source-table": 1,
                "aggregation": [["sum", ["field-id", 10]], ["metric", 100]],
                "breakout": [["datetime-field", ["field-id", 12], "month"], ["fk->", 11, 21]],
                "filter": [
                    "and",
                    ["segment", 200],
                    [">", ["field-id", 10], 5],
                    ["or", ["=", ["field-id", 13], "a"], ["segment", 999]]
                ],
                "order-by": [["desc", ["aggregation", 0]], ["asc", ["datetime-field", ["field-id", 12], "month"]]],
                "limit": 25
            }),
            &DescribeOptions::default(),
        );
        assert_snapshot!(text, @"Orders, Sum of Total and Revenue, Grouped by Created At (month) and User → State, Filtered by Large Orders, Total, and Category or [Unknown Segment], Sorted by Sum of Total descending and Created At (month) ascending, 25 rows");
    }

    #[test]
    fn test_standard_phrases() {
        let text = describe(
            ORDERS,
            json!({"aggregation": [
                ["avg", ["field-id", 10]],
                ["distinct", ["field-id", 11]],
                ["cum-count"],
                ["stddev", ["field-id", 10]]
            ]}),
            &only(&[Section::Aggregation]),
        );
        assert_snapshot!(text, @"Average of Total, Distinct values of User, Cumulative count, and Standard deviation of Total");
    }

    #[test]
    fn test_placeholders() {
        let text = describe(
            ORDERS,
            json!({
                "aggregation": [["metric", 5], ["max", ["field-id", 404]]],
                "breakout": [["field-id", 404]],
                "filter": ["segment", 6],
            }),
            &only(&[Section::Aggregation, Section::Breakout, Section::Filter]),
        );
        assert_snapshot!(text, @"[Unknown Metric] and Maximum of [Unknown Field], Grouped by [Unknown Field], Filtered by [Unknown Segment]");
    }

    #[test]
    fn test_custom_expressions_use_formatter() {
        let text = describe(
            ORDERS,
            json!({
                "aggregation": [["+", ["sum", ["field-id", 10]], 1]],
                "filter": ["and", [">", ["*", ["field-id", 10], 2], 100]],
            }),
            &only(&[Section::Aggregation, Section::Filter]),
        );
        assert_snapshot!(text, @"Sum(Total) + 1, Filtered by Total * 2 > 100");
    }

    #[test]
    fn test_custom_expressions_follow_foreign_keys() {
        let text = describe(
            ORDERS,
            json!({
                "aggregation": [["*", ["sum", ["fk->", ["field-id", 11], ["field-id", 21]]], 2]],
                "filter": ["and", ["=", ["+", ["fk->", ["field-id", 11], ["field-id", 20]], 1], 3]],
            }),
            &only(&[Section::Aggregation, Section::Filter]),
        );
        assert_snapshot!(text, @"Sum(User → State) * 2, Filtered by User → Name + 1 = 3");
    }

    #[test]
    fn test_named_aggregation_uses_display_name() {
        let text = describe(
            ORDERS,
            json!({"aggregation": [
                ["aggregation-options", ["count"], {"display-name": "Orders placed"}],
                ["aggregation-options", ["min", ["field-id", 10]], {}]
            ]}),
            &only(&[Section::Aggregation]),
        );
        assert_eq!(text, "Orders placed and Minimum of Total");
    }

    #[test]
    fn test_not_filter_and_limit_of_one() {
        let text = describe(
            ORDERS,
            json!({"filter": ["not", ["segment", 200]], "limit": 1}),
            &only(&[Section::Filter, Section::Limit]),
        );
        assert_eq!(text, "Filtered by not Large Orders, 1 row");
    }

    #[test]
    fn test_sections_follow_options_order() {
        let raw = json!({"source-table": 1, "aggregation": [["count"]], "limit": 3});
        let text = describe(ORDERS, raw, &only(&[Section::Limit, Section::Table]));
        assert_eq!(text, "3 rows, Orders");
    }

    #[test]
    fn test_empty_query_describes_table_only() {
        assert_eq!(describe(ORDERS, json!({}), &DescribeOptions::default()), "Orders");
        assert_eq!(describe(ORDERS, json!({}), &only(&[Section::Filter])), "");
    }

    #[test]
    fn test_rich_segments() {
        let catalog = catalog();
        let orders = catalog.table(ORDERS).unwrap();
        let describer = QueryDescriber::new(&catalog, &DefaultCapabilities, &PlainExpressionFormatter);
        let options = DescribeOptions {
            rich: true,
            sections: vec![Section::Aggregation, Section::Filter],
        };

        let segments = describer.describe(
            orders,
            &query(json!({"aggregation": [["metric", 100]], "filter": ["segment", 200]})),
            &options,
        );
        assert_eq!(
            segments,
            vec![
                DescriptionSegment::MetricName("Revenue".into()),
                DescriptionSegment::Text(", Filtered by ".into()),
                DescriptionSegment::SegmentName("Large Orders".into()),
            ]
        );
        assert_eq!(render_plain(&segments), "Revenue, Filtered by Large Orders");
    }

    #[test]
    fn test_bare_rows_phrase() {
        let catalog = catalog();
        let orders = catalog.table(ORDERS).unwrap();
        let describer = QueryDescriber::new(&catalog, &DefaultCapabilities, &PlainExpressionFormatter);
        let segments = describer.describe_aggregation(orders, &AggregationClause::BareRows, &DescribeOptions::default());
        assert_eq!(render_plain(&segments), "Raw data");
    }
}
