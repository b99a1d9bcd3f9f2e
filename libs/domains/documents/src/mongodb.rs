//! DocumentDB implementation of DocumentStore

use async_trait::async_trait;
use database::mongodb::Session;
use futures::StreamExt;
use mongodb::{bson::doc, options::InsertManyOptions};
use tracing::instrument;

use crate::classify;
use crate::error::{DocumentError, DocumentResult};
use crate::models::{Document, InsertBatchResult, Value, VectorIndexSpec};
use crate::query::{Filter, Pipeline};
use crate::repository::{DocumentStore, DocumentStream};

/// DocumentStore backed by a live [`Session`]
#[derive(Clone, Debug)]
pub struct MongoDocumentStore {
    session: Session,
}

impl MongoDocumentStore {
    /// Create a store over an established session
    ///
    /// # Example
    /// ```ignore
    /// let session = database::mongodb::connect_from_config(&config).await?;
    /// let store = MongoDocumentStore::new(session);
    /// ```
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The `createIndexes` command for a vector index
    pub fn create_index_command(
        collection: &str,
        spec: &VectorIndexSpec,
    ) -> mongodb::bson::Document {
        let mut key = mongodb::bson::Document::new();
        key.insert(spec.path.clone(), "cosmosSearch");

        doc! {
            "createIndexes": collection,
            "indexes": [{
                "name": spec.name.as_str(),
                "key": key,
                "cosmosSearchOptions": {
                    "kind": spec.kind.to_string(),
                    "dimensions": i64::from(spec.dimensions),
                    "similarity": spec.similarity.to_string(),
                    "maxDegree": i64::from(spec.max_degree),
                    "lBuild": i64::from(spec.l_build),
                },
            }],
        }
    }

    fn into_stream(cursor: mongodb::Cursor<mongodb::bson::Document>) -> DocumentStream {
        cursor
            .map(|item| match item {
                Ok(raw) => Ok(Document::from_bson(raw)),
                Err(e) => Err(DocumentError::Query(e.to_string())),
            })
            .boxed()
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    #[instrument(skip(self, spec), fields(index = %spec.name, dimensions = spec.dimensions))]
    async fn create_vector_index(
        &self,
        collection: &str,
        spec: &VectorIndexSpec,
    ) -> DocumentResult<()> {
        let command = Self::create_index_command(collection, spec);

        self.session
            .database()
            .run_command(command)
            .await
            .map_err(|e| classify::create_index_error(e, &spec.name))?;

        tracing::info!("Vector index created");
        Ok(())
    }

    #[instrument(skip(self, document))]
    async fn insert_one(&self, collection: &str, document: Document) -> DocumentResult<Value> {
        let result = self
            .session
            .collection(collection)
            .insert_one(document.to_bson())
            .await
            .map_err(classify::write_error)?;

        Ok(Value::from_bson(result.inserted_id))
    }

    #[instrument(skip(self, documents), fields(attempted = documents.len()))]
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        ordered: bool,
    ) -> DocumentResult<InsertBatchResult> {
        if documents.is_empty() {
            return Ok(InsertBatchResult::complete(0));
        }

        let ids: Vec<Option<Value>> = documents.iter().map(|d| d.id().cloned()).collect();
        let raw: Vec<_> = documents.iter().map(Document::to_bson).collect();
        let options = InsertManyOptions::builder().ordered(ordered).build();

        let outcome = self
            .session
            .collection(collection)
            .insert_many(raw)
            .with_options(options)
            .await;

        let result = match outcome {
            Ok(inserted) => InsertBatchResult::complete(inserted.inserted_ids.len()),
            Err(e) => classify::insert_many_error(e, &ids, ordered)?,
        };

        tracing::info!(
            succeeded = result.succeeded,
            duplicates = result.duplicates.len(),
            "Batch inserted"
        );
        Ok(result)
    }

    #[instrument(skip(self, filter))]
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<i64>,
    ) -> DocumentResult<DocumentStream> {
        let handle = self.session.collection(collection);
        let mut action = handle.find(filter.to_bson());
        if let Some(limit) = limit {
            action = action.limit(limit);
        }

        let cursor = action
            .await
            .map_err(|e| DocumentError::Query(e.to_string()))?;
        Ok(Self::into_stream(cursor))
    }

    #[instrument(skip(self, filter))]
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DocumentResult<Option<Document>> {
        let found = self
            .session
            .collection(collection)
            .find_one(filter.to_bson())
            .await
            .map_err(|e| DocumentError::Query(e.to_string()))?;

        Ok(found.map(Document::from_bson))
    }

    #[instrument(skip(self, pipeline), fields(stages = pipeline.len()))]
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> DocumentResult<DocumentStream> {
        let cursor = self
            .session
            .collection(collection)
            .aggregate(pipeline.to_bson())
            .await
            .map_err(|e| DocumentError::Query(e.to_string()))?;
        Ok(Self::into_stream(cursor))
    }

    #[instrument(skip(self, filter, set))]
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> DocumentResult<u64> {
        let result = self
            .session
            .collection(collection)
            .update_one(filter.to_bson(), doc! { "$set": set.to_bson() })
            .await
            .map_err(classify::write_error)?;
        Ok(result.modified_count)
    }

    #[instrument(skip(self, filter, set))]
    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> DocumentResult<u64> {
        let result = self
            .session
            .collection(collection)
            .update_many(filter.to_bson(), doc! { "$set": set.to_bson() })
            .await
            .map_err(classify::write_error)?;
        Ok(result.modified_count)
    }

    #[instrument(skip(self, filter))]
    async fn delete_one(&self, collection: &str, filter: &Filter) -> DocumentResult<u64> {
        let result = self
            .session
            .collection(collection)
            .delete_one(filter.to_bson())
            .await?;
        Ok(result.deleted_count)
    }

    #[instrument(skip(self, filter))]
    async fn delete_many(&self, collection: &str, filter: &Filter) -> DocumentResult<u64> {
        let result = self
            .session
            .collection(collection)
            .delete_many(filter.to_bson())
            .await?;
        Ok(result.deleted_count)
    }

    #[instrument(skip(self, filter))]
    async fn count(&self, collection: &str, filter: &Filter) -> DocumentResult<u64> {
        let count = self
            .session
            .collection(collection)
            .count_documents(filter.to_bson())
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn drop_collection(&self, collection: &str) -> DocumentResult<()> {
        self.session.collection(collection).drop().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Similarity;
    use mongodb::options::ClientOptions;

    async fn unreachable_store() -> MongoDocumentStore {
        let options = ClientOptions::parse("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200")
            .await
            .unwrap();
        let client = mongodb::Client::with_options(options).unwrap();
        MongoDocumentStore::new(Session::new(client, "demo_db"))
    }

    #[tokio::test]
    async fn test_find_with_limit_reports_unreachable_store() {
        let store = unreachable_store().await;

        let limited = store.find("products", &Filter::All, Some(2)).await;
        assert!(matches!(limited, Err(DocumentError::Query(_))));

        let unlimited = store.find("products", &Filter::All, None).await;
        assert!(matches!(unlimited, Err(DocumentError::Query(_))));
    }

    #[test]
    fn test_create_index_command_diskann() {
        let spec = VectorIndexSpec::diskann("vectorIndex", "embedding", 3);
        let command = MongoDocumentStore::create_index_command("products", &spec);

        assert_eq!(
            command,
            doc! {
                "createIndexes": "products",
                "indexes": [{
                    "name": "vectorIndex",
                    "key": { "embedding": "cosmosSearch" },
                    "cosmosSearchOptions": {
                        "kind": "vector-diskann",
                        "dimensions": 3_i64,
                        "similarity": "COS",
                        "maxDegree": 32_i64,
                        "lBuild": 64_i64,
                    },
                }],
            }
        );
    }

    #[test]
    fn test_create_index_command_custom_graph() {
        let spec = VectorIndexSpec::diskann("semanticIndex", "contentVector", 1536)
            .with_similarity(Similarity::InnerProduct)
            .with_graph(16, 100);
        let command = MongoDocumentStore::create_index_command("docs", &spec);

        let index = command
            .get_array("indexes")
            .unwrap()
            .first()
            .and_then(|b| b.as_document())
            .unwrap();
        let options = index.get_document("cosmosSearchOptions").unwrap();

        assert_eq!(options.get_i64("dimensions").unwrap(), 1536);
        assert_eq!(options.get_str("similarity").unwrap(), "IP");
        assert_eq!(options.get_i64("maxDegree").unwrap(), 16);
        assert_eq!(options.get_i64("lBuild").unwrap(), 100);
        assert!(index.get_document("key").unwrap().contains_key("contentVector"));
    }
}
