//! Filter and aggregation pipeline builders
//!
//! Both only describe the request; evaluation happens server-side.

use mongodb::bson::{self, Bson, doc};

use crate::models::{SIMILARITY_SCORE_FIELD, Value, VectorQuery};

/// Boolean predicate tree over document fields
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    /// Matches every document
    #[default]
    All,
    Eq(String, Value),
    Ne(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    In(String, Vec<Value>),
    Regex {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gte(field.into(), value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte(field.into(), value.into())
    }

    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Case-insensitive pattern match
    pub fn matches(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Regex {
            field: field.into(),
            pattern: pattern.into(),
            case_insensitive: true,
        }
    }

    /// Conjunction, flattening nested `And`s
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), f) => {
                left.push(f);
                Filter::And(left)
            }
            (f, Filter::And(mut right)) => {
                right.insert(0, f);
                Filter::And(right)
            }
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::Or(mut left), f) => {
                left.push(f);
                Filter::Or(left)
            }
            (a, b) => Filter::Or(vec![a, b]),
        }
    }

    /// Render as a query document
    pub fn to_bson(&self) -> bson::Document {
        match self {
            Filter::All => doc! {},
            Filter::Eq(field, value) => comparison(field, "$eq", value.to_bson()),
            Filter::Ne(field, value) => comparison(field, "$ne", value.to_bson()),
            Filter::Gt(field, value) => comparison(field, "$gt", value.to_bson()),
            Filter::Gte(field, value) => comparison(field, "$gte", value.to_bson()),
            Filter::Lt(field, value) => comparison(field, "$lt", value.to_bson()),
            Filter::Lte(field, value) => comparison(field, "$lte", value.to_bson()),
            Filter::In(field, values) => comparison(
                field,
                "$in",
                Bson::Array(values.iter().map(Value::to_bson).collect()),
            ),
            Filter::Regex {
                field,
                pattern,
                case_insensitive,
            } => {
                let mut spec = doc! { "$regex": pattern.as_str() };
                if *case_insensitive {
                    spec.insert("$options", "i");
                }
                let mut rendered = bson::Document::new();
                rendered.insert(field.clone(), spec);
                rendered
            }
            Filter::And(filters) => combine("$and", filters),
            Filter::Or(filters) => combine("$or", filters),
        }
    }
}

fn comparison(field: &str, operator: &str, value: Bson) -> bson::Document {
    let mut condition = bson::Document::new();
    condition.insert(operator, value);
    let mut rendered = bson::Document::new();
    rendered.insert(field, condition);
    rendered
}

fn combine(operator: &str, filters: &[Filter]) -> bson::Document {
    let parts: Vec<bson::Document> = filters
        .iter()
        .filter(|f| **f != Filter::All)
        .map(Filter::to_bson)
        .collect();

    match parts.len() {
        0 => doc! {},
        1 if operator == "$and" => parts.into_iter().next().unwrap_or_default(),
        _ => {
            let mut rendered = bson::Document::new();
            rendered.insert(operator, parts);
            rendered
        }
    }
}

/// Group accumulator
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    Avg(String),
    Sum(String),
    Min(String),
    Max(String),
    Count,
}

impl Accumulator {
    fn to_bson(&self) -> bson::Document {
        match self {
            Accumulator::Avg(field) => doc! { "$avg": format!("${}", field) },
            Accumulator::Sum(field) => doc! { "$sum": format!("${}", field) },
            Accumulator::Min(field) => doc! { "$min": format!("${}", field) },
            Accumulator::Max(field) => doc! { "$max": format!("${}", field) },
            Accumulator::Count => doc! { "$sum": 1 },
        }
    }
}

/// One projected field
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Include(String),
    Exclude(String),
    /// Expose the search score under the given name
    SearchScore(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Aggregation stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    /// `$group`; `key: None` groups everything into one bucket
    Group {
        key: Option<String>,
        accumulators: Vec<(String, Accumulator)>,
    },
    /// `$search` with the `cosmosSearch` operator
    VectorSearch(VectorQuery),
    Project(Vec<Projection>),
    Sort(Vec<(String, SortOrder)>),
    Limit(i64),
}

impl Stage {
    pub fn to_bson(&self) -> bson::Document {
        match self {
            Stage::Match(filter) => doc! { "$match": filter.to_bson() },
            Stage::Group { key, accumulators } => {
                let mut group = bson::Document::new();
                group.insert(
                    "_id",
                    match key {
                        Some(field) => Bson::String(format!("${}", field)),
                        None => Bson::Null,
                    },
                );
                for (name, accumulator) in accumulators {
                    group.insert(name.clone(), accumulator.to_bson());
                }
                doc! { "$group": group }
            }
            Stage::VectorSearch(query) => {
                let mut search = doc! {
                    "path": query.path.as_str(),
                    "vector": query.vector.clone(),
                    "k": i64::from(query.k),
                };
                if let Some(ref filter) = query.filter {
                    search.insert("filter", filter.to_bson());
                }
                doc! { "$search": { "cosmosSearch": search } }
            }
            Stage::Project(fields) => {
                let mut projection = bson::Document::new();
                for field in fields {
                    match field {
                        Projection::Include(name) => {
                            projection.insert(name.clone(), 1);
                        }
                        Projection::Exclude(name) => {
                            projection.insert(name.clone(), 0);
                        }
                        Projection::SearchScore(name) => {
                            projection.insert(name.clone(), doc! { "$meta": "searchScore" });
                        }
                    }
                }
                doc! { "$project": projection }
            }
            Stage::Sort(keys) => {
                let mut sort = bson::Document::new();
                for (field, order) in keys {
                    let direction = match order {
                        SortOrder::Ascending => 1,
                        SortOrder::Descending => -1,
                    };
                    sort.insert(field.clone(), direction);
                }
                doc! { "$sort": sort }
            }
            Stage::Limit(n) => doc! { "$limit": *n },
        }
    }
}

/// Ordered list of stages; order is exactly as authored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn filter(self, filter: Filter) -> Self {
        self.stage(Stage::Match(filter))
    }

    pub fn group_by<I, S>(self, key: impl Into<String>, accumulators: I) -> Self
    where
        I: IntoIterator<Item = (S, Accumulator)>,
        S: Into<String>,
    {
        self.stage(Stage::Group {
            key: Some(key.into()),
            accumulators: accumulators
                .into_iter()
                .map(|(name, acc)| (name.into(), acc))
                .collect(),
        })
    }

    pub fn vector_search(self, query: VectorQuery) -> Self {
        self.stage(Stage::VectorSearch(query))
    }

    pub fn project(self, fields: Vec<Projection>) -> Self {
        self.stage(Stage::Project(fields))
    }

    pub fn sort(self, keys: Vec<(String, SortOrder)>) -> Self {
        self.stage(Stage::Sort(keys))
    }

    pub fn limit(self, n: i64) -> Self {
        self.stage(Stage::Limit(n))
    }

    /// The two-stage search pipeline: `cosmosSearch` then a projection of the
    /// requested fields plus the score under [`SIMILARITY_SCORE_FIELD`]
    pub fn for_vector_search(query: VectorQuery) -> Self {
        let mut projection: Vec<Projection> = query
            .fields
            .iter()
            .map(|f| Projection::Include(f.clone()))
            .collect();
        projection.push(Projection::SearchScore(SIMILARITY_SCORE_FIELD.to_string()));

        Pipeline::new().vector_search(query).project(projection)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn to_bson(&self) -> Vec<bson::Document> {
        self.stages.iter().map(Stage::to_bson).collect()
    }
}
