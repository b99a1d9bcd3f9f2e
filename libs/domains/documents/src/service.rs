//! Document Service - demo-facing operations over a DocumentStore

use std::sync::Arc;

use futures::TryStreamExt;
use tracing::instrument;

use crate::error::{DocumentError, DocumentResult};
use crate::models::{
    Document, IndexExistsPolicy, IndexOutcome, InsertBatchResult, SIMILARITY_SCORE_FIELD,
    SearchHit, Value, VectorIndexSpec, VectorQuery,
};
use crate::query::{Filter, Pipeline};
use crate::repository::DocumentStore;

pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Document service
///
/// Wraps a [`DocumentStore`] with the index policy, result collection, score
/// extraction and timestamping the demos rely on. Every call awaits the store
/// before returning.
pub struct DocumentService<R: DocumentStore> {
    store: Arc<R>,
    index_policy: IndexExistsPolicy,
}

impl<R: DocumentStore> DocumentService<R> {
    pub fn new(store: R) -> Self {
        Self {
            store: Arc::new(store),
            index_policy: IndexExistsPolicy::default(),
        }
    }

    pub fn with_index_policy(mut self, policy: IndexExistsPolicy) -> Self {
        self.index_policy = policy;
        self
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Create a vector index, applying the configured [`IndexExistsPolicy`]
    #[instrument(skip(self, spec), fields(index = %spec.name))]
    pub async fn create_vector_index(
        &self,
        collection: &str,
        spec: &VectorIndexSpec,
    ) -> DocumentResult<IndexOutcome> {
        match self.store.create_vector_index(collection, spec).await {
            Ok(()) => Ok(IndexOutcome::Created),
            Err(DocumentError::IndexExists(name))
                if self.index_policy == IndexExistsPolicy::Skip =>
            {
                tracing::info!(index = %name, "Vector index already exists, skipping");
                Ok(IndexOutcome::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    /// Insert a batch; duplicate keys reduce the count instead of failing
    #[instrument(skip(self, documents), fields(attempted = documents.len()))]
    pub async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        ordered: bool,
    ) -> DocumentResult<InsertBatchResult> {
        let result = self.store.insert_many(collection, documents, ordered).await?;

        if !result.duplicates.is_empty() {
            tracing::warn!(
                duplicates = result.duplicates.len(),
                succeeded = result.succeeded,
                "Skipped documents whose _id already exists"
            );
        }
        Ok(result)
    }

    #[instrument(skip(self, filter))]
    pub async fn find(&self, collection: &str, filter: &Filter) -> DocumentResult<Vec<Document>> {
        self.store.find(collection, filter, None).await?.try_collect().await
    }

    #[instrument(skip(self, filter))]
    pub async fn find_with_limit(
        &self,
        collection: &str,
        filter: &Filter,
        limit: i64,
    ) -> DocumentResult<Vec<Document>> {
        self.store
            .find(collection, filter, Some(limit))
            .await?
            .try_collect()
            .await
    }

    #[instrument(skip(self, pipeline), fields(stages = pipeline.len()))]
    pub async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> DocumentResult<Vec<Document>> {
        self.store
            .aggregate(collection, pipeline)
            .await?
            .try_collect()
            .await
    }

    /// Run a `cosmosSearch` query and return hits by descending score
    ///
    /// The score field is moved out of each document into [`SearchHit::score`].
    #[instrument(skip(self, query), fields(path = %query.path, k = query.k))]
    pub async fn vector_search(
        &self,
        collection: &str,
        query: VectorQuery,
    ) -> DocumentResult<Vec<SearchHit>> {
        let pipeline = Pipeline::for_vector_search(query);
        let documents = self.aggregate(collection, &pipeline).await?;

        let mut hits = documents
            .into_iter()
            .map(into_hit)
            .collect::<DocumentResult<Vec<_>>>()?;
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(hits = hits.len(), "Vector search complete");
        Ok(hits)
    }

    /// Insert one document stamped with `createdAt`; returns its `_id`
    #[instrument(skip(self, document))]
    pub async fn insert_one(&self, collection: &str, document: Document) -> DocumentResult<Value> {
        let document = document.with(CREATED_AT_FIELD, Value::now());
        self.store.insert_one(collection, document).await
    }

    #[instrument(skip(self, id))]
    pub async fn find_by_id(
        &self,
        collection: &str,
        id: impl Into<Value> + Send,
    ) -> DocumentResult<Option<Document>> {
        self.store.find_one(collection, &Filter::eq("_id", id)).await
    }

    #[instrument(skip(self, filter))]
    pub async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DocumentResult<Option<Document>> {
        self.store.find_one(collection, filter).await
    }

    /// `$set` fields on the first match, stamping `updatedAt`
    #[instrument(skip(self, filter, set))]
    pub async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> DocumentResult<u64> {
        let set = set.with(UPDATED_AT_FIELD, Value::now());
        self.store.update_one(collection, filter, set).await
    }

    /// `$set` fields on every match, stamping `updatedAt`
    #[instrument(skip(self, filter, set))]
    pub async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> DocumentResult<u64> {
        let set = set.with(UPDATED_AT_FIELD, Value::now());
        self.store.update_many(collection, filter, set).await
    }

    #[instrument(skip(self, filter))]
    pub async fn delete_one(&self, collection: &str, filter: &Filter) -> DocumentResult<u64> {
        self.store.delete_one(collection, filter).await
    }

    #[instrument(skip(self, filter))]
    pub async fn delete_many(&self, collection: &str, filter: &Filter) -> DocumentResult<u64> {
        self.store.delete_many(collection, filter).await
    }

    /// Remove every document but keep the collection and its indexes
    #[instrument(skip(self))]
    pub async fn delete_all(&self, collection: &str) -> DocumentResult<u64> {
        self.store.delete_many(collection, &Filter::All).await
    }

    #[instrument(skip(self, filter))]
    pub async fn count(&self, collection: &str, filter: &Filter) -> DocumentResult<u64> {
        self.store.count(collection, filter).await
    }

    #[instrument(skip(self))]
    pub async fn drop_collection(&self, collection: &str) -> DocumentResult<()> {
        self.store.drop_collection(collection).await
    }
}

fn into_hit(mut document: Document) -> DocumentResult<SearchHit> {
    let score = document
        .remove(SIMILARITY_SCORE_FIELD)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| DocumentError::MissingScore(SIMILARITY_SCORE_FIELD.to_string()))?;
    Ok(SearchHit { document, score })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WriteFailure;
    use crate::query::Stage;
    use crate::repository::MockDocumentStore;
    use futures::StreamExt;
    use futures::stream;

    fn scored(name: &str, score: f64) -> Document {
        Document::new()
            .with("name", name)
            .with(SIMILARITY_SCORE_FIELD, score)
    }

    #[tokio::test]
    async fn test_index_exists_is_skipped_by_default() {
        let mut store = MockDocumentStore::new();
        store
            .expect_create_vector_index()
            .times(1)
            .returning(|_, spec| Err(DocumentError::IndexExists(spec.name.clone())));

        let service = DocumentService::new(store);
        let spec = VectorIndexSpec::diskann("vectorIndex", "embedding", 3);

        let outcome = service.create_vector_index("products", &spec).await.unwrap();
        assert_eq!(outcome, IndexOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn test_index_exists_fails_under_fail_policy() {
        let mut store = MockDocumentStore::new();
        store
            .expect_create_vector_index()
            .returning(|_, spec| Err(DocumentError::IndexExists(spec.name.clone())));

        let service = DocumentService::new(store).with_index_policy(IndexExistsPolicy::Fail);
        let spec = VectorIndexSpec::diskann("vectorIndex", "embedding", 3);

        let err = service.create_vector_index("products", &spec).await.unwrap_err();
        assert!(matches!(err, DocumentError::IndexExists(name) if name == "vectorIndex"));
    }

    #[tokio::test]
    async fn test_other_index_errors_always_propagate() {
        let mut store = MockDocumentStore::new();
        store
            .expect_create_vector_index()
            .returning(|_, _| Err(DocumentError::Query("dimensions must be positive".into())));

        let service = DocumentService::new(store);
        let spec = VectorIndexSpec::diskann("vectorIndex", "embedding", 0);

        assert!(matches!(
            service.create_vector_index("products", &spec).await,
            Err(DocumentError::Query(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_many_passes_reduced_count_through() {
        let mut store = MockDocumentStore::new();
        store
            .expect_insert_many()
            .withf(|_, documents, ordered| documents.len() == 4 && !*ordered)
            .returning(|_, documents, _| {
                Ok(InsertBatchResult {
                    attempted: documents.len(),
                    succeeded: 1,
                    duplicates: (0..3)
                        .map(|i| WriteFailure {
                            index: Some(i),
                            code: 11000,
                            message: "E11000 duplicate key error".into(),
                            key: Some(Value::Int64(i as i64 + 1)),
                        })
                        .collect(),
                    failures: vec![],
                })
            });

        let service = DocumentService::new(store);
        let batch = (1..=4).map(|i| Document::new().with("_id", i)).collect();

        let result = service.insert_many("products", batch, false).await.unwrap();
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.duplicates.len(), 3);
    }

    #[tokio::test]
    async fn test_vector_search_sorts_by_descending_score() {
        let mut store = MockDocumentStore::new();
        store
            .expect_aggregate()
            .withf(|_, pipeline| {
                matches!(pipeline.stages(), [Stage::VectorSearch(q), Stage::Project(_)] if q.k == 3)
            })
            .returning(|_, _| {
                let rows = vec![
                    scored("Smartphone", 0.91),
                    scored("Gaming Laptop", 0.99),
                    scored("Wireless Headphones", 0.95),
                ];
                Ok(stream::iter(rows.into_iter().map(Ok)).boxed())
            });

        let service = DocumentService::new(store);
        let query = VectorQuery::new("embedding", vec![0.52, 0.28, 0.12], 3)
            .with_fields(["name", "category", "price"]);

        let hits = service.vector_search("products", query).await.unwrap();
        let names: Vec<_> = hits.iter().filter_map(|h| h.document.get_str("name")).collect();

        assert_eq!(names, ["Gaming Laptop", "Wireless Headphones", "Smartphone"]);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(hits.iter().all(|h| !h.document.contains_key(SIMILARITY_SCORE_FIELD)));
    }

    #[tokio::test]
    async fn test_vector_search_requires_score() {
        let mut store = MockDocumentStore::new();
        store.expect_aggregate().returning(|_, _| {
            let rows = vec![Document::new().with("name", "Notebook")];
            Ok(stream::iter(rows.into_iter().map(Ok)).boxed())
        });

        let service = DocumentService::new(store);
        let query = VectorQuery::new("embedding", vec![0.1, 0.2, 0.3], 1);

        assert!(matches!(
            service.vector_search("products", query).await,
            Err(DocumentError::MissingScore(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_one_stamps_created_at() {
        let mut store = MockDocumentStore::new();
        store
            .expect_insert_one()
            .withf(|_, document| {
                matches!(document.get(CREATED_AT_FIELD), Some(Value::DateTime(_)))
                    && document.get_str("name") == Some("Alice")
            })
            .returning(|_, _| Ok(Value::Int64(1)));

        let service = DocumentService::new(store);
        let id = service
            .insert_one("users", Document::new().with("name", "Alice"))
            .await
            .unwrap();
        assert_eq!(id, Value::Int64(1));
    }

    #[tokio::test]
    async fn test_update_stamps_updated_at() {
        let mut store = MockDocumentStore::new();
        store
            .expect_update_many()
            .withf(|_, _, set| set.contains_key(UPDATED_AT_FIELD) && set.contains_key("status"))
            .returning(|_, _, _| Ok(2));

        let service = DocumentService::new(store);
        let modified = service
            .update_many(
                "users",
                &Filter::eq("city", "Seattle"),
                Document::new().with("status", "active"),
            )
            .await
            .unwrap();
        assert_eq!(modified, 2);
    }

    #[tokio::test]
    async fn test_delete_all_uses_empty_filter() {
        let mut store = MockDocumentStore::new();
        store
            .expect_delete_many()
            .withf(|_, filter| *filter == Filter::All)
            .returning(|_, _| Ok(4));

        let service = DocumentService::new(store);
        assert_eq!(service.delete_all("users").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_drop_collection_targets_named_collection() {
        let mut store = MockDocumentStore::new();
        store
            .expect_drop_collection()
            .withf(|collection| collection == "products")
            .times(1)
            .returning(|_| Ok(()));

        let service = DocumentService::new(store);
        service.drop_collection("products").await.unwrap();
    }

    #[tokio::test]
    async fn test_find_collects_stream_and_stops_on_error() {
        let mut store = MockDocumentStore::new();
        store.expect_find().returning(|_, _, _| {
            let rows: Vec<DocumentResult<Document>> = vec![
                Ok(Document::new().with("name", "Laptop")),
                Err(DocumentError::Query("cursor killed".into())),
            ];
            Ok(stream::iter(rows).boxed())
        });

        let service = DocumentService::new(store);
        assert!(matches!(
            service.find("products", &Filter::All).await,
            Err(DocumentError::Query(_))
        ));
    }
}
