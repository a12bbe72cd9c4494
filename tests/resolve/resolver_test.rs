#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use super::common::{catalog, query, ORDERS, PEOPLE};
    use serde_json::json;
    use std::borrow::Cow;
    use structured_query::metadata::{CatalogProvider, DefaultCapabilities};
    use structured_query::query::FieldReference;
    use structured_query::resolve::Resolver;

    fn field(value: serde_json::Value) -> FieldReference {
        FieldReference::from_value(&value)
    }

    #[test]
    fn test_resolve_across_fk_collects_path() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog, &DefaultCapabilities);
        let orders = catalog.table(ORDERS).unwrap();

        let resolved = resolver
            .resolve_target(&field(json!(["fk->", ["field-id", 11], ["field-id", 21]])), orders)
            .unwrap();
        assert_eq!(resolved.table.id, PEOPLE);
        assert_eq!(resolved.field.name, "state");
        assert!(matches!(resolved.field, Cow::Borrowed(_)));
        assert_eq!(
            resolved.path.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["user_id"]
        );
    }

    #[test]
    fn test_unresolvable_references_yield_none() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog, &DefaultCapabilities);
        let orders = catalog.table(ORDERS).unwrap();

        for value in [
            json!(["field-id", 999]),
            json!(["fk->", ["field-id", 10], ["field-id", 20]]),
            json!(["aggregation", 0]),
            json!(null),
            json!("x"),
        ] {
            assert!(resolver.resolve_target(&field(value.clone()), orders).is_none(), "{value}");
        }
    }

    #[test]
    fn test_binning_resolves_inner_field() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog, &DefaultCapabilities);
        let orders = catalog.table(ORDERS).unwrap();

        let binned = field(json!(["binning-strategy", ["field-id", 10], "num-bins", 20]));
        let resolved = resolver.resolve_target(&binned, orders).unwrap();
        assert_eq!(resolved.field.name, "total");
        assert_eq!(resolved.unit, None);
    }

    #[test]
    fn test_field_names() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog, &DefaultCapabilities);
        let orders = catalog.table(ORDERS).unwrap();

        let name = |value| resolver.field_name(orders, &field(value));
        assert_eq!(name(json!(10)).as_deref(), Some("Total"));
        assert_eq!(name(json!(["field-id", 11])).as_deref(), Some("User"));
        assert_eq!(
            name(json!(["datetime-field", ["fk->", 11, 20], "as", "day"])).as_deref(),
            Some("User → Name (day)")
        );
        assert_eq!(name(json!(["expression", "margin"])).as_deref(), Some("margin"));
        assert_eq!(name(json!(["field-id", 404])), None);
    }

    #[test]
    fn test_expression_field_has_numeric_operators() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog, &DefaultCapabilities);
        let orders = catalog.table(ORDERS).unwrap();

        let synthesized = resolver.expression_field("margin", orders);
        assert_eq!(synthesized.id, None);
        assert_eq!(synthesized.expression_name.as_deref(), Some("margin"));
        assert!(synthesized.operator(">").is_some());
        assert!(synthesized.operator("contains").is_none());
    }

    #[test]
    fn test_query_columns_follow_breakouts_then_aggregations() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog, &DefaultCapabilities);
        let orders = catalog.table(ORDERS).unwrap();

        let q = query(json!({
            "source-table": 1,
            "breakout": [["field-id", 13], ["datetime-field", ["field-id", 12], "year"]],
            "aggregation": [
                ["sum", ["field-id", 10]],
                ["aggregation-options", ["distinct", ["field-id", 11]], {"display-name": "Buyers"}]
            ],
        }));
        let columns = resolver.query_columns(orders, &q).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["category", "created_at", "sum", "count"]);
        assert_eq!(columns[1].unit.as_deref(), Some("year"));
        assert_eq!(columns[2].base_type.as_deref(), Some("type/Float"));
        assert_eq!(columns[3].display_name.as_deref(), Some("Buyers"));
        assert_eq!(columns[3].base_type.as_deref(), Some("type/Integer"));
    }

    #[test]
    fn test_bare_rows_columns() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog, &DefaultCapabilities);
        let orders = catalog.table(ORDERS).unwrap();

        assert_eq!(resolver.query_columns(orders, &query(json!({"source-table": 1}))), None);

        let grouped_rows = query(json!({"source-table": 1, "breakout": [["field-id", 13]]}));
        let columns = resolver.query_columns(orders, &grouped_rows).unwrap();
        assert_eq!(columns.len(), 1);
    }
}
