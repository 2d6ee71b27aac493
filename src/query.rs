use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Row cap applied to every generated query.
pub const QUERY_LIMIT: u32 = 100;

/// Query sent to the analytics backend, derived from the current selection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Query {
    pub measures: Vec<String>,
    pub dimensions: Vec<String>,
    pub limit: u32,
}

impl Query {
    pub fn new(measures: Vec<String>, dimensions: Vec<String>) -> Self {
        Query {
            measures,
            dimensions,
            limit: QUERY_LIMIT,
        }
    }

    /// A query with no members is never sent to the backend.
    pub fn is_empty(&self) -> bool {
        self.measures.is_empty() && self.dimensions.is_empty()
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Request envelope shared by `/load` and `/sql`.
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a Query,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberAnnotation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short_title: String,
    #[serde(rename = "type", default)]
    pub member_type: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Annotation {
    #[serde(default)]
    pub measures: HashMap<String, MemberAnnotation>,
    #[serde(default)]
    pub dimensions: HashMap<String, MemberAnnotation>,
}

/// Body of `POST /load`.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoadResponse {
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
    #[serde(default)]
    pub annotation: Annotation,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub title: String,
    pub short_title: String,
    pub member_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

/// Tabular output of executing a [`Query`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    query: Query,
    data: Vec<Map<String, Value>>,
    annotation: Annotation,
}

impl ResultSet {
    pub fn new(query: Query, response: LoadResponse) -> Self {
        ResultSet {
            query,
            data: response.data,
            annotation: response.annotation,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Dimensions first, then measures, each in query order.
    pub fn table_columns(&self) -> Vec<Column> {
        let dimensions = self
            .query
            .dimensions
            .iter()
            .map(|key| (key, self.annotation.dimensions.get(key)));
        let measures = self
            .query
            .measures
            .iter()
            .map(|key| (key, self.annotation.measures.get(key)));

        dimensions
            .chain(measures)
            .map(|(key, annotation)| match annotation {
                Some(a) => Column {
                    key: key.clone(),
                    title: a.title.clone(),
                    short_title: a.short_title.clone(),
                    member_type: a.member_type.clone(),
                },
                None => Column {
                    key: key.clone(),
                    title: key.clone(),
                    short_title: key.clone(),
                    member_type: String::new(),
                },
            })
            .collect()
    }

    /// Rows aligned with [`ResultSet::table_columns`].
    pub fn table_pivot(&self) -> Vec<Row> {
        let columns = self.table_columns();
        self.data
            .iter()
            .map(|record| Row {
                values: columns
                    .iter()
                    .map(|c| record.get(&c.key).cloned().unwrap_or(Value::Null))
                    .collect(),
            })
            .collect()
    }
}
