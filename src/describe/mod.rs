//! Human-readable query descriptions.
//!
//! A description is a flat list of [`DescriptionSegment`]s: plain text plus
//! tagged spans for catalog metric and segment names. Turning the spans into
//! markup is left to the presentation layer; [`render_plain`] concatenates
//! them into a string.
//!
//! ```text
//! {source-table: 1, aggregation: [["count"]], breakout: [["field-id", 10]]}
//!   => "Categories, Count, Grouped by Category"
//! ```

pub mod inflection;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metadata::{CatalogProvider, DefaultCapabilities, FieldCapabilities, TableMetadata};
use crate::query::{
    AggregationClause, AggregationOperator, Direction, ExpressionClause, FieldReference, FilterClause, Limit,
    StructuredQuery,
};
use crate::resolve::Resolver;

use inflection::{inflect, pluralize};

pub const UNKNOWN_FIELD: &str = "[Unknown Field]";
pub const UNKNOWN_METRIC: &str = "[Unknown Metric]";
pub const UNKNOWN_SEGMENT: &str = "[Unknown Segment]";

/// One piece of a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "kebab-case")]
pub enum DescriptionSegment {
    Text(String),
    MetricName(String),
    SegmentName(String),
}

impl DescriptionSegment {
    pub fn text(&self) -> &str {
        match self {
            DescriptionSegment::Text(text)
            | DescriptionSegment::MetricName(text)
            | DescriptionSegment::SegmentName(text) => text,
        }
    }
}

impl From<&str> for DescriptionSegment {
    fn from(text: &str) -> Self {
        DescriptionSegment::Text(text.to_string())
    }
}

impl From<String> for DescriptionSegment {
    fn from(text: String) -> Self {
        DescriptionSegment::Text(text)
    }
}

/// Description sections, in their default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Table,
    Aggregation,
    Breakout,
    Filter,
    OrderBy,
    Limit,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Table,
        Section::Aggregation,
        Section::Breakout,
        Section::Filter,
        Section::OrderBy,
        Section::Limit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Table => "table",
            Section::Aggregation => "aggregation",
            Section::Breakout => "breakout",
            Section::Filter => "filter",
            Section::OrderBy => "order-by",
            Section::Limit => "limit",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Section::ALL.into_iter().find(|section| section.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescribeOptions {
    /// Tag metric and segment names instead of emitting them as plain text.
    pub rich: bool,
    pub sections: Vec<Section>,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        Self {
            rich: false,
            sections: Section::ALL.to_vec(),
        }
    }
}

/// Renders custom (math) aggregations and filters. Field names inside the
/// expression go through `resolver`, so foreign keys reach the whole catalog.
pub trait ExpressionFormatter {
    fn format_aggregation<'a>(
        &self,
        aggregation: &AggregationClause,
        table: &'a TableMetadata,
        resolver: &Resolver<'a>,
    ) -> DescriptionSegment;

    fn format_filter<'a>(
        &self,
        filter: &FilterClause,
        table: &'a TableMetadata,
        resolver: &Resolver<'a>,
    ) -> DescriptionSegment;
}

/// Infix rendering, e.g. `Sum(Total) * 2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainExpressionFormatter;

impl PlainExpressionFormatter {
    fn expression<'a>(
        &self,
        expression: &ExpressionClause,
        table: &'a TableMetadata,
        resolver: &Resolver<'a>,
        nested: bool,
    ) -> String {
        match expression {
            ExpressionClause::Number(n) => n.to_string(),
            ExpressionClause::Field(field) => resolver
                .field_name(table, field)
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            ExpressionClause::Aggregation(aggregation) => self.aggregation(aggregation, table, resolver),
            ExpressionClause::Math { operator, args } => {
                let body = args
                    .iter()
                    .map(|arg| self.expression(arg, table, resolver, true))
                    .collect::<Vec<_>>()
                    .join(&format!(" {} ", operator.as_str()));
                if nested {
                    format!("({body})")
                } else {
                    body
                }
            }
            ExpressionClause::Malformed(value) => value.to_string(),
        }
    }

    fn aggregation<'a>(&self, aggregation: &AggregationClause, table: &'a TableMetadata, resolver: &Resolver<'a>) -> String {
        if let Some(name) = aggregation.name() {
            return name.to_string();
        }
        match aggregation.content() {
            AggregationClause::BareRows => "Rows".to_string(),
            AggregationClause::Standard { operator, argument } => {
                let title = operator_title(operator.as_str());
                match argument {
                    Some(argument) => format!("{title}({})", self.expression(argument, table, resolver, false)),
                    None => title,
                }
            }
            AggregationClause::Partial { operator, arguments } => {
                let args = arguments.iter().map(Value::to_string).collect::<Vec<_>>();
                format!("{}({})", operator_title(operator.as_str()), args.join(", "))
            }
            AggregationClause::Metric(id) => table
                .metric(*id)
                .map(|metric| metric.name.clone())
                .unwrap_or_else(|| UNKNOWN_METRIC.to_string()),
            AggregationClause::Expression(expression) => self.expression(expression, table, resolver, false),
            AggregationClause::Named { inner, .. } => self.aggregation(inner, table, resolver),
            AggregationClause::Malformed(value) => value.to_string(),
        }
    }
}

impl ExpressionFormatter for PlainExpressionFormatter {
    fn format_aggregation<'a>(
        &self,
        aggregation: &AggregationClause,
        table: &'a TableMetadata,
        resolver: &Resolver<'a>,
    ) -> DescriptionSegment {
        self.aggregation(aggregation, table, resolver).into()
    }

    fn format_filter<'a>(
        &self,
        filter: &FilterClause,
        table: &'a TableMetadata,
        resolver: &Resolver<'a>,
    ) -> DescriptionSegment {
        match filter {
            FilterClause::Expression {
                operator,
                expression,
                args,
            } => {
                let mut parts = vec![self.expression(expression, table, resolver, false), operator.clone()];
                parts.extend(args.iter().map(|arg| arg.to_string()));
                parts.join(" ").into()
            }
            other => other.to_value().to_string().into(),
        }
    }
}

// "cum-sum" -> "Cum-sum"
fn operator_title(operator: &str) -> String {
    let mut chars = operator.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// Builds descriptions of queries against one catalog.
pub struct QueryDescriber<'a> {
    resolver: Resolver<'a>,
    formatter: &'a dyn ExpressionFormatter,
}

impl<'a> QueryDescriber<'a> {
    pub fn new(
        catalog: &'a dyn CatalogProvider,
        capabilities: &'a dyn FieldCapabilities,
        formatter: &'a dyn ExpressionFormatter,
    ) -> Self {
        Self {
            resolver: Resolver::new(catalog, capabilities),
            formatter,
        }
    }

    /// Describe `query`, section by section.
    pub fn describe(
        &self,
        table: &'a TableMetadata,
        query: &StructuredQuery,
        options: &DescribeOptions,
    ) -> Vec<DescriptionSegment> {
        let sections: Vec<Vec<DescriptionSegment>> = options
            .sections
            .iter()
            .map(|section| {
                self.section(*section, table, query, options)
                    .into_iter()
                    .filter(|segment| !segment.text().is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|segments| !segments.is_empty())
            .collect();
        compact(join_list(sections, ", "))
    }

    pub fn describe_text(&self, table: &'a TableMetadata, query: &StructuredQuery, options: &DescribeOptions) -> String {
        render_plain(&self.describe(table, query, options))
    }

    fn section(
        &self,
        section: Section,
        table: &'a TableMetadata,
        query: &StructuredQuery,
        options: &DescribeOptions,
    ) -> Vec<DescriptionSegment> {
        match section {
            Section::Table => self.table_description(table),
            Section::Aggregation => self.aggregation_description(table, query, options),
            Section::Breakout => self.breakout_description(table, query),
            Section::Filter => self.filter_description(table, query, options),
            Section::OrderBy => self.order_by_description(table, query, options),
            Section::Limit => limit_description(query),
        }
    }

    pub fn table_description(&self, table: &TableMetadata) -> Vec<DescriptionSegment> {
        vec![pluralize(table.label()).into()]
    }

    pub fn aggregation_description(
        &self,
        table: &'a TableMetadata,
        query: &StructuredQuery,
        options: &DescribeOptions,
    ) -> Vec<DescriptionSegment> {
        let items = query
            .aggregations()
            .iter()
            .map(|aggregation| self.describe_aggregation(table, aggregation, options))
            .collect();
        conjunct_list(items, "and")
    }

    /// Describe a single aggregation clause.
    pub fn describe_aggregation(
        &self,
        table: &'a TableMetadata,
        aggregation: &AggregationClause,
        options: &DescribeOptions,
    ) -> Vec<DescriptionSegment> {
        if let Some(name) = aggregation.name() {
            return vec![name.into()];
        }
        let phrase = match aggregation {
            AggregationClause::Metric(id) => {
                let name = table
                    .metric(*id)
                    .map(|metric| metric.name.as_str())
                    .unwrap_or(UNKNOWN_METRIC);
                return vec![emphasize(name, DescriptionSegment::MetricName, options)];
            }
            AggregationClause::BareRows => return vec!["Raw data".into()],
            AggregationClause::Named { inner, .. } => {
                return self.describe_aggregation(table, inner, options);
            }
            AggregationClause::Standard {
                operator,
                argument: None | Some(ExpressionClause::Field(_)),
            } => standard_phrase(operator),
            _ => None,
        };

        match phrase {
            Some(Phrase::Whole(text)) => vec![text.into()],
            Some(Phrase::Of(prefix)) => vec![prefix.into(), self.field_name(table, aggregation.field())],
            None => vec![self.formatter.format_aggregation(aggregation, table, &self.resolver)],
        }
    }

    pub fn breakout_description(&self, table: &'a TableMetadata, query: &StructuredQuery) -> Vec<DescriptionSegment> {
        let breakout = query.breakout.as_deref().unwrap_or_default();
        if breakout.is_empty() {
            return Vec::new();
        }
        let names = breakout
            .iter()
            .map(|field| vec![self.field_name(table, Some(field))])
            .collect();
        let mut segments = vec!["Grouped by ".into()];
        segments.extend(join_list(names, " and "));
        segments
    }

    pub fn filter_description(
        &self,
        table: &'a TableMetadata,
        query: &StructuredQuery,
        options: &DescribeOptions,
    ) -> Vec<DescriptionSegment> {
        let filters = query.filters();
        if filters.is_empty() {
            return Vec::new();
        }
        let items = filters
            .iter()
            .map(|filter| self.describe_filter(table, filter, options))
            .collect();
        let mut segments = vec!["Filtered by ".into()];
        segments.extend(conjunct_list(items, "and"));
        segments
    }

    /// Describe one filter clause, recursing through `and`/`or`.
    pub fn describe_filter(
        &self,
        table: &'a TableMetadata,
        filter: &FilterClause,
        options: &DescribeOptions,
    ) -> Vec<DescriptionSegment> {
        match filter {
            FilterClause::Compound { operator, clauses } => {
                let items = clauses
                    .iter()
                    .map(|clause| self.describe_filter(table, clause, options))
                    .collect();
                conjunct_list(items, operator.as_str())
            }
            FilterClause::Not(inner) => {
                let mut segments = vec!["not ".into()];
                segments.extend(self.describe_filter(table, inner, options));
                segments
            }
            FilterClause::Segment(id) => {
                let name = table
                    .segment(*id)
                    .map(|segment| segment.name.as_str())
                    .unwrap_or(UNKNOWN_SEGMENT);
                vec![emphasize(name, DescriptionSegment::SegmentName, options)]
            }
            FilterClause::Field { field, .. } => vec![self.field_name(table, Some(field))],
            FilterClause::Expression { .. } => vec![self.formatter.format_filter(filter, table, &self.resolver)],
            FilterClause::Malformed(_) => vec![UNKNOWN_FIELD.into()],
        }
    }

    pub fn order_by_description(
        &self,
        table: &'a TableMetadata,
        query: &StructuredQuery,
        options: &DescribeOptions,
    ) -> Vec<DescriptionSegment> {
        let order_by = query.order_by.as_deref().unwrap_or_default();
        if order_by.is_empty() {
            return Vec::new();
        }
        let aggregations = query.aggregations();
        let items = order_by
            .iter()
            .map(|clause| {
                let mut item = match &clause.field {
                    FieldReference::AggregateResult(index) if *index < aggregations.len() => {
                        self.describe_aggregation(table, &aggregations[*index], options)
                    }
                    field => vec![self.field_name(table, Some(field))],
                };
                item.push(match clause.direction {
                    Some(Direction::Asc) => " ascending".into(),
                    _ => " descending".into(),
                });
                item
            })
            .collect();
        let mut segments = vec!["Sorted by ".into()];
        segments.extend(join_list(items, " and "));
        segments
    }

    fn field_name(&self, table: &'a TableMetadata, field: Option<&FieldReference>) -> DescriptionSegment {
        field
            .and_then(|field| self.resolver.field_name(table, field))
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
            .into()
    }
}

enum Phrase {
    Whole(&'static str),
    Of(&'static str),
}

fn standard_phrase(operator: &AggregationOperator) -> Option<Phrase> {
    let phrase = match operator {
        AggregationOperator::Count => Phrase::Whole("Count"),
        AggregationOperator::CumCount => Phrase::Whole("Cumulative count"),
        AggregationOperator::Avg => Phrase::Of("Average of "),
        AggregationOperator::Distinct => Phrase::Of("Distinct values of "),
        AggregationOperator::Stddev => Phrase::Of("Standard deviation of "),
        AggregationOperator::Sum => Phrase::Of("Sum of "),
        AggregationOperator::CumSum => Phrase::Of("Cumulative sum of "),
        AggregationOperator::Max => Phrase::Of("Maximum of "),
        AggregationOperator::Min => Phrase::Of("Minimum of "),
        AggregationOperator::Other(_) => return None,
    };
    Some(phrase)
}

fn limit_description(query: &StructuredQuery) -> Vec<DescriptionSegment> {
    match query.limit {
        Some(Limit::Rows(rows)) => vec![format!("{rows} {}", inflect("row", rows)).into()],
        _ => Vec::new(),
    }
}

fn emphasize(
    name: &str,
    tag: fn(String) -> DescriptionSegment,
    options: &DescribeOptions,
) -> DescriptionSegment {
    if options.rich {
        tag(name.to_string())
    } else {
        name.into()
    }
}

/// Join items with a natural-language conjunction.
///
/// `[]` -> nothing, `[A]` -> `A`, `[A, B]` -> `A and B`,
/// `[A, B, C]` -> `A, B, and C`.
pub fn conjunct_list(items: Vec<Vec<DescriptionSegment>>, conjunction: &str) -> Vec<DescriptionSegment> {
    let count = items.len();
    match count {
        0 => Vec::new(),
        1 => items.into_iter().flatten().collect(),
        2 => join_list(items, &format!(" {conjunction} ")),
        _ => {
            let mut segments = Vec::new();
            for (i, item) in items.into_iter().enumerate() {
                if i == count - 1 {
                    segments.push(format!(", {conjunction} ").into());
                } else if i > 0 {
                    segments.push(", ".into());
                }
                segments.extend(item);
            }
            segments
        }
    }
}

/// Interleave items with `joiner`.
pub fn join_list(items: Vec<Vec<DescriptionSegment>>, joiner: &str) -> Vec<DescriptionSegment> {
    let mut segments = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            segments.push(joiner.into());
        }
        segments.extend(item);
    }
    segments
}

/// Merge adjacent text segments and drop empty ones.
pub fn compact(segments: Vec<DescriptionSegment>) -> Vec<DescriptionSegment> {
    let mut out: Vec<DescriptionSegment> = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.text().is_empty() {
            continue;
        }
        match (out.last_mut(), segment) {
            (Some(DescriptionSegment::Text(last)), DescriptionSegment::Text(text)) => last.push_str(&text),
            (_, segment) => out.push(segment),
        }
    }
    out
}

pub fn render_plain(segments: &[DescriptionSegment]) -> String {
    segments.iter().map(DescriptionSegment::text).collect()
}

/// Describe `query` with the default capability provider and formatter.
pub fn generate_query_description(
    catalog: &dyn CatalogProvider,
    table: &TableMetadata,
    query: &StructuredQuery,
    options: &DescribeOptions,
) -> Vec<DescriptionSegment> {
    QueryDescriber::new(catalog, &DefaultCapabilities, &PlainExpressionFormatter).describe(table, query, options)
}
