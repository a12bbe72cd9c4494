//! Shared catalog fixture for the integration tests.

#![allow(dead_code)]

use serde_json::Value;
use structured_query::metadata::{AggregationOption, Catalog, Field, Metric, Segment, TableMetadata};
use structured_query::StructuredQuery;

pub const ORDERS: i64 = 1;
pub const PEOPLE: i64 = 2;
pub const CATEGORY: i64 = 3;

fn option(short: &str) -> AggregationOption {
    AggregationOption {
        short: short.to_string(),
        name: None,
    }
}

pub fn catalog() -> Catalog {
    Catalog::new(vec![
        TableMetadata {
            id: ORDERS,
            name: "orders".into(),
            display_name: Some("Orders".into()),
            fields: vec![
                Field::new(10, "total").with_display_name("Total").with_base_type("type/Float"),
                Field::new(11, "user_id").with_display_name("User ID").with_target(PEOPLE),
                Field::new(12, "created_at")
                    .with_display_name("Created At")
                    .with_base_type("type/DateTime"),
                Field::new(13, "category").with_display_name("Category").with_base_type("type/Text"),
            ],
            metrics: vec![Metric {
                id: 100,
                name: "Revenue".into(),
                description: None,
            }],
            segments: vec![Segment {
                id: 200,
                name: "Large Orders".into(),
                description: None,
            }],
            aggregation_options: vec![option("rows"), option("count"), option("sum"), option("avg")],
        },
        TableMetadata {
            id: PEOPLE,
            name: "people".into(),
            display_name: Some("Person".into()),
            fields: vec![
                Field::new(20, "name").with_display_name("Name").with_base_type("type/Text"),
                Field::new(21, "state").with_display_name("State").with_base_type("type/Text"),
            ],
            ..Default::default()
        },
        TableMetadata {
            id: CATEGORY,
            name: "category".into(),
            display_name: Some("Category".into()),
            fields: vec![Field::new(30, "category").with_display_name("Category")],
            aggregation_options: vec![option("count")],
            ..Default::default()
        },
    ])
}

pub fn query(value: Value) -> StructuredQuery {
    StructuredQuery::from_value(&value).expect("fixture query is an object")
}
