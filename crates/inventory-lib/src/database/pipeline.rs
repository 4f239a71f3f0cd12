//! Aggregation pipeline building blocks

use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};

use crate::filter::{GlobalFilter, SortBy, TimeRange};
use crate::pagination::PageRequest;

/// Output format of every projected timestamp, parseable as RFC3339
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%LZ";

/// Ordered list of aggregation stages
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Document>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Document) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(mut self, stages: impl IntoIterator<Item = Document>) -> Self {
        self.stages.extend(stages);
        self
    }

    pub fn maybe(mut self, stage: Option<Document>) -> Self {
        if let Some(stage) = stage {
            self.stages.push(stage);
        }
        self
    }

    pub fn into_stages(self) -> Vec<Document> {
        self.stages
    }
}

pub fn bson_time(t: DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_chrono(t))
}

pub fn date_string(expr: impl Into<Bson>) -> Bson {
    let date: Bson = expr.into();
    Bson::Document(doc! {
        "$dateToString": { "format": DATE_FORMAT, "date": date, "onNull": Bson::Null }
    })
}

pub fn to_double(expr: impl Into<Bson>) -> Bson {
    convert(expr.into(), "double", Bson::Double(0.0))
}

pub fn to_long(expr: impl Into<Bson>) -> Bson {
    convert(expr.into(), "long", Bson::Int64(0))
}

pub fn to_string(expr: impl Into<Bson>) -> Bson {
    convert(expr.into(), "string", Bson::String(String::new()))
}

/// `$convert` falling back to `fallback` on missing or unconvertible input
pub fn convert(input: Bson, to: &str, fallback: Bson) -> Bson {
    Bson::Document(doc! {
        "$convert": { "input": input, "to": to, "onError": fallback.clone(), "onNull": fallback }
    })
}

pub fn or_empty(expr: impl Into<Bson>) -> Bson {
    let expr: Bson = expr.into();
    Bson::Document(doc! { "$ifNull": [expr, ""] })
}

pub fn or_empty_array(expr: impl Into<Bson>) -> Bson {
    let expr: Bson = expr.into();
    Bson::Document(doc! { "$ifNull": [expr, []] })
}

pub fn literal(value: impl Into<Bson>) -> Bson {
    let value: Bson = value.into();
    Bson::Document(doc! { "$literal": value })
}

/// `"<a> <b>"` with missing parts and surrounding blanks dropped
pub fn concat_trimmed(first: &str, second: &str) -> Bson {
    Bson::Document(doc! {
        "$trim": { "input": { "$concat": [or_empty(first), " ", or_empty(second)] } }
    })
}

/// Joins an array of strings with `", "`
pub fn join_strings(array: impl Into<Bson>) -> Bson {
    Bson::Document(doc! {
        "$reduce": {
            "input": or_empty_array(array),
            "initialValue": "",
            "in": {
                "$cond": [
                    { "$eq": ["$$value", ""] },
                    "$$this",
                    { "$concat": ["$$value", ", ", "$$this"] }
                ]
            }
        }
    })
}

/// Selects current host documents, or the latest snapshot of each host at a point in time
pub fn oldness(older_than: Option<DateTime<Utc>>) -> Vec<Document> {
    match older_than {
        None => vec![doc! { "$match": { "archived": false } }],
        Some(t) => vec![
            doc! { "$match": { "createdAt": { "$lte": bson_time(t) } } },
            doc! { "$sort": { "createdAt": -1 } },
            doc! { "$group": { "_id": "$hostname", "doc": { "$first": "$$ROOT" } } },
            doc! { "$replaceRoot": { "newRoot": "$doc" } },
        ],
    }
}

pub fn location_environment(filter: &GlobalFilter) -> Option<Document> {
    location_environment_at(filter, "location", "environment")
}

pub fn location_environment_at(
    filter: &GlobalFilter,
    location_path: &str,
    environment_path: &str,
) -> Option<Document> {
    let mut criteria = Document::new();
    if !filter.locations.is_empty() {
        criteria.insert(location_path, doc! { "$in": filter.locations.clone() });
    }
    if let Some(environment) = &filter.environment {
        criteria.insert(environment_path, environment.clone());
    }
    (!criteria.is_empty()).then(|| doc! { "$match": criteria })
}

/// `{ $gte, $lte }` on a date field, `None` when both sides are open
pub fn time_range(range: &TimeRange) -> Option<Document> {
    let mut bounds = Document::new();
    if let Some(from) = range.newer_than {
        bounds.insert("$gte", bson_time(from));
    }
    if let Some(to) = range.older_than {
        bounds.insert("$lte", bson_time(to));
    }
    (!bounds.is_empty()).then_some(bounds)
}

/// Case-insensitive substring match on one field
pub fn contains(field: &str, needle: &str) -> Document {
    let mut criterion = Document::new();
    criterion.insert(
        field,
        doc! { "$regex": regex::escape(needle), "$options": "i" },
    );
    criterion
}

/// Every keyword must match at least one of `fields`
pub fn search(keywords: &[String], fields: &[&str]) -> Option<Document> {
    if keywords.is_empty() {
        return None;
    }
    let clauses: Vec<Document> = keywords
        .iter()
        .map(|keyword| {
            let alternatives: Vec<Document> =
                fields.iter().map(|field| contains(field, keyword)).collect();
            doc! { "$or": alternatives }
        })
        .collect();
    Some(doc! { "$match": { "$and": clauses } })
}

pub fn sort(sort: Option<&SortBy>) -> Option<Document> {
    sort.map(|sort| {
        let mut order = Document::new();
        order.insert(sort.field.clone(), if sort.descending { -1 } else { 1 });
        doc! { "$sort": order }
    })
}

pub fn sort_by(field: &str, descending: bool) -> Document {
    let mut order = Document::new();
    order.insert(field, if descending { -1 } else { 1 });
    doc! { "$sort": order }
}

/// One page of content plus the total count
pub fn facet(page: PageRequest) -> Document {
    let skip = i64::try_from(page.skip()).unwrap_or(i64::MAX);
    doc! {
        "$facet": {
            "content": [
                { "$skip": skip },
                { "$limit": page.limit() },
            ],
            "metadata": [
                { "$count": "totalElements" },
            ],
        }
    }
}

/// Exposes each Oracle database of a host as `db`
pub fn unwind_oracle_databases() -> Vec<Document> {
    vec![
        doc! { "$set": { "db": or_empty_array("$features.oracle.database.databases") } },
        doc! { "$unwind": "$db" },
    ]
}
