#[cfg(test)]
mod tests {
    use serde_json::json;
    use structured_query::normalize::clean_query;
    use structured_query::query::{FieldReference, StructuredQuery, TargetId};

    fn field(value: serde_json::Value) -> FieldReference {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_serde_uses_wire_form() {
        let fk = field(json!(["fk->", ["field-id", 11], ["field-id", 20]]));
        assert!(fk.is_foreign_key());
        assert_eq!(
            serde_json::to_value(&fk).unwrap(),
            json!(["fk->", ["field-id", 11], ["field-id", 20]])
        );
    }

    #[test]
    fn test_unparseable_reference_deserializes_as_malformed() {
        let odd = field(json!({"not": "a field"}));
        assert!(!odd.is_valid());
        assert_eq!(odd.target_id(), None);
        assert_eq!(serde_json::to_value(&odd).unwrap(), json!({"not": "a field"}));
    }

    #[test]
    fn test_datetime_encodings_match_in_order_by() {
        let query = StructuredQuery::from_value(&json!({
            "source-table": 1,
            "aggregation": [["count"]],
            "breakout": [["datetime-field", ["field-id", 12], "month"]],
            "order-by": [["asc", ["datetime-field", ["field-id", 12], "as", "month"]]],
        }))
        .unwrap();

        let cleaned = clean_query(&query).to_value();
        assert_eq!(
            cleaned["order-by"],
            json!([["asc", ["datetime-field", ["field-id", 12], "month"]]])
        );
    }

    #[test]
    fn test_binning_strategy_validity_follows_inner_field() {
        assert!(field(json!(["binning-strategy", ["field-id", 10], "num-bins", 10])).is_valid());
        assert!(field(json!(["binning-strategy", ["field-id", 10], "default"])).is_valid());
        assert!(!field(json!(["binning-strategy", null, "default"])).is_valid());
    }

    #[test]
    fn test_target_ids_by_kind() {
        assert_eq!(field(json!(7)).target_id(), Some(TargetId::Field(7)));
        assert_eq!(
            field(json!(["expression", "margin"])).target_id(),
            Some(TargetId::Expression("margin".into()))
        );
        assert_eq!(field(json!(["aggregation", 2])).target_id(), Some(TargetId::Aggregation(2)));
        assert_eq!(
            field(json!(["field-literal", "count", "type/Integer"])).target_id(),
            Some(TargetId::Literal {
                name: "count".into(),
                base_type: "type/Integer".into()
            })
        );
    }

    #[test]
    fn test_same_field_across_fk_and_buckets() {
        let by_month = field(json!(["datetime-field", ["fk->", 11, 20], "month"]));
        let plain = field(json!(["field-id", 20]));
        assert!(by_month.is_same_field(&plain, false));
        assert!(!by_month.is_same_field(&plain, true));

        let expression = field(json!(["expression", "a"]));
        assert!(expression.is_same_field(&field(json!(["expression", "a"])), false));
        assert!(!expression.is_same_field(&field(json!(["expression", "b"])), false));
    }

    #[test]
    fn test_bare_integer_is_plain() {
        let plain: FieldReference = 42.into();
        assert!(plain.is_plain());
        assert!(!plain.is_local_field());
        assert_eq!(plain.to_value(), json!(42));
        // semantically a different wire form than the tagged one
        assert_ne!(plain, FieldReference::field_id(42));
        assert!(plain.is_same_field(&FieldReference::field_id(42), false));
    }
}
