use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::{DocumentError, DocumentResult};
use crate::models::{Document, InsertBatchResult, Value, VectorIndexSpec};
use crate::query::{Filter, Pipeline};

/// Lazily fetched query results
pub type DocumentStream = BoxStream<'static, Result<Document, DocumentError>>;

/// Remote document store operations
///
/// Every method is a single round trip (or a cursor over one) and is never
/// retried. Implementations hold the session; callers pass collection names.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Issue `createIndexes` for a vector index.
    /// A taken name surfaces as [`DocumentError::IndexExists`].
    async fn create_vector_index(
        &self,
        collection: &str,
        spec: &VectorIndexSpec,
    ) -> DocumentResult<()>;

    /// Insert one document and return its `_id`
    async fn insert_one(&self, collection: &str, document: Document) -> DocumentResult<Value>;

    /// Insert a batch, normalizing duplicate-key partial failures
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        ordered: bool,
    ) -> DocumentResult<InsertBatchResult>;

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<i64>,
    ) -> DocumentResult<DocumentStream>;

    async fn find_one(&self, collection: &str, filter: &Filter)
    -> DocumentResult<Option<Document>>;

    async fn aggregate(&self, collection: &str, pipeline: &Pipeline)
    -> DocumentResult<DocumentStream>;

    /// `$set` the given fields on the first match; returns the modified count
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> DocumentResult<u64>;

    /// `$set` the given fields on every match; returns the modified count
    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> DocumentResult<u64>;

    async fn delete_one(&self, collection: &str, filter: &Filter) -> DocumentResult<u64>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> DocumentResult<u64>;

    async fn count(&self, collection: &str, filter: &Filter) -> DocumentResult<u64>;

    async fn drop_collection(&self, collection: &str) -> DocumentResult<()>;
}
