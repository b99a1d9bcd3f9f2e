use mongodb::bson::{self, Bson, oid::ObjectId};
use strum::{Display, EnumString};

/// Name of the field the vector search projection exposes the score under
pub const SIMILARITY_SCORE_FIELD: &str = "similarityScore";

/// A typed field value
///
/// Non-empty arrays made only of doubles come back from the store as
/// [`Value::Vector`]; anything else stays a generic [`Value::Array`]. BSON types
/// without a dedicated variant (decimals, binary, timestamps, regexes) are
/// carried unchanged in [`Value::Other`], so writing back a document that was
/// read stores exactly what was read.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Vector(Vec<f64>),
    Array(Vec<Value>),
    Document(Document),
    ObjectId(ObjectId),
    DateTime(bson::DateTime),
    Other(Bson),
}

impl Value {
    /// Current time as a `DateTime` value
    pub fn now() -> Self {
        Value::DateTime(bson::DateTime::now())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the integer and `Double` variants
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(i) => Some(f64::from(*i)),
            Value::Int64(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(i) => Some(i64::from(*i)),
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn to_bson(&self) -> Bson {
        match self {
            Value::Null => Bson::Null,
            Value::Bool(b) => Bson::Boolean(*b),
            Value::Int32(i) => Bson::Int32(*i),
            Value::Int64(i) => Bson::Int64(*i),
            Value::Double(d) => Bson::Double(*d),
            Value::String(s) => Bson::String(s.clone()),
            Value::Vector(v) => Bson::Array(v.iter().map(|x| Bson::Double(*x)).collect()),
            Value::Array(items) => Bson::Array(items.iter().map(Value::to_bson).collect()),
            Value::Document(d) => Bson::Document(d.to_bson()),
            Value::ObjectId(id) => Bson::ObjectId(*id),
            Value::DateTime(dt) => Bson::DateTime(*dt),
            Value::Other(raw) => raw.clone(),
        }
    }

    pub fn from_bson(value: Bson) -> Self {
        match value {
            Bson::Null => Value::Null,
            Bson::Boolean(b) => Value::Bool(b),
            Bson::Int32(i) => Value::Int32(i),
            Bson::Int64(i) => Value::Int64(i),
            Bson::Double(d) => Value::Double(d),
            Bson::String(s) => Value::String(s),
            Bson::ObjectId(id) => Value::ObjectId(id),
            Bson::DateTime(dt) => Value::DateTime(dt),
            Bson::Document(d) => Value::Document(Document::from_bson(d)),
            Bson::Array(items) => array_from_bson(items),
            other => Value::Other(other),
        }
    }
}

fn array_from_bson(items: Vec<Bson>) -> Value {
    if !items.is_empty() {
        let doubles: Option<Vec<f64>> = items
            .iter()
            .map(|b| match b {
                Bson::Double(d) => Some(*d),
                _ => None,
            })
            .collect();

        if let Some(vector) = doubles {
            return Value::Vector(vector);
        }
    }

    Value::Array(items.into_iter().map(Value::from_bson).collect())
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Vector(v)
    }
}

impl From<Document> for Value {
    fn from(d: Document) -> Self {
        Value::Document(d)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::ObjectId(id)
    }
}

impl From<bson::DateTime> for Value {
    fn from(dt: bson::DateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "{}", s),
            Value::Vector(v) => write!(f, "{:?}", v),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Document(d) => write!(f, "{}", d.to_bson()),
            Value::ObjectId(id) => write!(f, "{}", id),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Ordered mapping from field name to [`Value`]
///
/// Field order is insertion order and is kept when sent to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Vec<(String, Value)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    ///
    /// ```
    /// use domain_documents::Document;
    ///
    /// let laptop = Document::new()
    ///     .with("name", "Laptop")
    ///     .with("price", 1299.99)
    ///     .with("category", "electronics");
    /// assert_eq!(laptop.get_f64("price"), Some(1299.99));
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field, returning the previous value
    ///
    /// Replacing keeps the field's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let position = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(position).1)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The explicit `_id`, if any
    pub fn id(&self) -> Option<&Value> {
        self.get("_id")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_bson(&self) -> bson::Document {
        let mut doc = bson::Document::new();
        for (key, value) in &self.fields {
            doc.insert(key.clone(), value.to_bson());
        }
        doc
    }

    pub fn from_bson(doc: bson::Document) -> Self {
        let fields = doc
            .into_iter()
            .map(|(key, value)| (key, Value::from_bson(value)))
            .collect();
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (key, value) in iter {
            doc.insert(key, value);
        }
        doc
    }
}

impl From<bson::Document> for Document {
    fn from(doc: bson::Document) -> Self {
        Document::from_bson(doc)
    }
}

impl From<&Document> for bson::Document {
    fn from(doc: &Document) -> Self {
        doc.to_bson()
    }
}

/// Similarity metric of a DiskANN vector index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum Similarity {
    #[default]
    #[strum(to_string = "COS", serialize = "cosine")]
    Cosine,
    #[strum(to_string = "L2", serialize = "euclidean")]
    Euclidean,
    #[strum(to_string = "IP", serialize = "inner-product")]
    InnerProduct,
}

/// Kind of vector index the gateway should build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum VectorIndexKind {
    #[default]
    #[strum(serialize = "vector-diskann")]
    DiskAnn,
    #[strum(serialize = "vector-hnsw")]
    Hnsw,
    #[strum(serialize = "vector-ivf")]
    Ivf,
}

/// Definition of a vector index created through `createIndexes`
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndexSpec {
    pub name: String,
    pub path: String,
    pub kind: VectorIndexKind,
    pub dimensions: u32,
    pub similarity: Similarity,
    /// Graph max degree (DiskANN `maxDegree`)
    pub max_degree: u32,
    /// Candidate list size during build (DiskANN `lBuild`)
    pub l_build: u32,
}

impl VectorIndexSpec {
    /// DiskANN cosine index with the demo graph parameters (maxDegree 32, lBuild 64)
    pub fn diskann(name: impl Into<String>, path: impl Into<String>, dimensions: u32) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: VectorIndexKind::DiskAnn,
            dimensions,
            similarity: Similarity::Cosine,
            max_degree: 32,
            l_build: 64,
        }
    }

    pub fn with_similarity(mut self, similarity: Similarity) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_graph(mut self, max_degree: u32, l_build: u32) -> Self {
        self.max_degree = max_degree;
        self.l_build = l_build;
        self
    }
}

/// What to do when `createIndexes` reports the index name is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum IndexExistsPolicy {
    /// Log and carry on
    #[default]
    Skip,
    /// Surface as an error
    Fail,
}

/// Outcome of a vector index request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Created,
    AlreadyExists,
}

/// One failed write inside a bulk insert
#[derive(Debug, Clone, PartialEq)]
pub struct WriteFailure {
    /// Position in the submitted batch; `None` for batch-level failures
    pub index: Option<usize>,
    pub code: i32,
    pub message: String,
    /// `_id` of the document at `index`, when it had one
    pub key: Option<Value>,
}

impl WriteFailure {
    pub fn is_duplicate_key(&self) -> bool {
        self.code == crate::classify::DUPLICATE_KEY_CODE
    }
}

/// Result of an `insert_many` call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertBatchResult {
    pub attempted: usize,
    pub succeeded: usize,
    /// Documents rejected only because their key already exists
    pub duplicates: Vec<WriteFailure>,
    /// Any other rejection; non-empty only inside `DocumentError::Insert`
    pub failures: Vec<WriteFailure>,
}

impl InsertBatchResult {
    pub fn complete(attempted: usize) -> Self {
        Self {
            attempted,
            succeeded: attempted,
            ..Default::default()
        }
    }

    /// True when every submitted document was written
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.attempted
    }

    pub fn duplicate_keys(&self) -> Vec<&Value> {
        self.duplicates.iter().filter_map(|f| f.key.as_ref()).collect()
    }

    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| match f.index {
                Some(i) => format!("#{} code {}: {}", i, f.code, f.message),
                None => format!("code {}: {}", f.code, f.message),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Vector similarity query against a `cosmosSearch` index
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    /// Field holding the indexed embedding
    pub path: String,
    pub vector: Vec<f64>,
    /// Number of neighbours to return
    pub k: u32,
    pub filter: Option<crate::query::Filter>,
    /// Fields copied into each hit next to the score; `_id` is always included
    pub fields: Vec<String>,
}

impl VectorQuery {
    pub fn new(path: impl Into<String>, vector: Vec<f64>, k: u32) -> Self {
        Self {
            path: path.into(),
            vector,
            k,
            filter: None,
            fields: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: crate::query::Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// One vector search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub document: Document,
    pub score: f64,
}
