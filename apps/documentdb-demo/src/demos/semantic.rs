use std::io::Write;

use domain_documents::{
    Document, DocumentService, DocumentStore, IndexOutcome, VectorIndexSpec, VectorQuery,
};
use domain_embedding::EmbeddingProvider;
use eyre::{WrapErr, ensure, eyre};
use tracing::info;

use super::Target;
use crate::output;
use crate::samples;

pub const INDEX_NAME: &str = "semanticIndex";
pub const EMBEDDING_PATH: &str = "embedding";
const TEXT_FIELD: &str = "description";

/// Embed `text`, insisting on the provider's advertised dimension
async fn embed_checked<E: EmbeddingProvider + ?Sized>(
    embedder: &E,
    text: &str,
) -> eyre::Result<Vec<f64>> {
    let embedding = embedder.embed(text).await?;
    let expected = embedder.dimension() as usize;
    ensure!(
        embedding.values.len() == expected,
        "expected a {}-dimensional embedding, got {}",
        expected,
        embedding.values.len()
    );
    Ok(embedding.into_vector())
}

/// Embed every product description, index and insert them, then search by text
pub async fn run<S, E>(
    service: &DocumentService<S>,
    embedder: &E,
    target: &Target,
    query_text: &str,
    k: u32,
    out: &mut impl Write,
) -> eyre::Result<()>
where
    S: DocumentStore,
    E: EmbeddingProvider + ?Sized,
{
    let dimensions = embedder.dimension();

    writeln!(out, "Creating DiskANN vector index ({} dimensions)...", dimensions)?;
    let spec = VectorIndexSpec::diskann(INDEX_NAME, EMBEDDING_PATH, dimensions);
    let outcome = service
        .create_vector_index(&target.collection, &spec)
        .await
        .wrap_err("Step 1 (create DiskANN index) failed")?;
    if outcome == IndexOutcome::AlreadyExists {
        writeln!(out, "Index already exists, reusing it.")?;
    }

    writeln!(out, "\nGenerating embeddings for product descriptions...")?;
    let mut documents: Vec<Document> = Vec::new();
    for product in samples::described_products() {
        let name = product.get_str("name").unwrap_or("-").to_string();
        let text = product
            .get_str(TEXT_FIELD)
            .ok_or_else(|| eyre!("product '{}' has no {}", name, TEXT_FIELD))?
            .to_string();

        let vector = embed_checked(embedder, &text)
            .await
            .wrap_err_with(|| format!("Step 2 (embed description of '{}') failed", name))?;
        writeln!(out, "  embedded {}", name)?;
        documents.push(product.with(EMBEDDING_PATH, vector));
    }

    let inserted = service
        .insert_many(&target.collection, documents, false)
        .await
        .wrap_err("Step 3 (insert embedded products) failed")?;
    writeln!(out, "{}", output::insert_summary(&inserted, &target.namespace()))?;

    writeln!(out, "\nSearching for \"{}\"...", query_text)?;
    let query_vector = embed_checked(embedder, query_text)
        .await
        .wrap_err("Step 4 (embed search text) failed")?;

    let query = VectorQuery::new(EMBEDDING_PATH, query_vector, k)
        .with_fields(["name", "category", "price", TEXT_FIELD]);
    let hits = service
        .vector_search(&target.collection, query)
        .await
        .wrap_err("Step 5 (semantic search) failed")?;

    writeln!(out, "Top {} matches:", k)?;
    for hit in &hits {
        writeln!(out, "{}", output::search_row(hit))?;
    }

    info!(hits = hits.len(), dimensions, "Semantic demo complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing::{output, store, stream_of, target};
    use domain_documents::{InsertBatchResult, SIMILARITY_SCORE_FIELD, Stage};
    use domain_embedding::provider::MockEmbeddingProvider;
    use domain_embedding::{Embedding, EmbeddingError};

    const DIMS: u32 = 8;

    fn embedding(len: usize) -> Embedding {
        Embedding {
            values: vec![0.1; len],
            dimension: len as u32,
            tokens_used: 5,
        }
    }

    #[tokio::test]
    async fn test_semantic_demo_embeds_every_description_then_searches() {
        let product_count = samples::described_products().len();

        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_dimension().return_const(DIMS);
        embedder
            .expect_embed()
            .times(product_count + 1)
            .returning(|_| Ok(embedding(DIMS as usize)));

        let mut store = store();
        store
            .expect_create_vector_index()
            .withf(|_, spec| spec.dimensions == DIMS && spec.name == INDEX_NAME)
            .returning(|_, _| Ok(()));
        store
            .expect_insert_many()
            .withf(move |_, documents, _| {
                documents.len() == product_count
                    && documents.iter().all(|d| {
                        d.get(EMBEDDING_PATH)
                            .and_then(|v| v.as_vector())
                            .is_some_and(|v| v.len() == DIMS as usize)
                    })
            })
            .returning(|_, documents, _| Ok(InsertBatchResult::complete(documents.len())));
        store
            .expect_aggregate()
            .withf(|_, pipeline| {
                matches!(pipeline.stages().first(), Some(Stage::VectorSearch(q)) if q.k == 2)
            })
            .returning(|_, _| {
                Ok(stream_of(vec![
                    Document::new()
                        .with("name", "Wireless Headphones")
                        .with("category", "electronics")
                        .with("price", 79.99)
                        .with(SIMILARITY_SCORE_FIELD, 0.61),
                ]))
            });

        let service = DocumentService::new(store);
        let mut buffer = Vec::new();
        run(&service, &embedder, &target(), "music", 2, &mut buffer)
            .await
            .unwrap();

        let text = output(buffer);
        assert!(text.contains("Creating DiskANN vector index (8 dimensions)"));
        assert!(text.contains("  embedded Standing Desk"));
        assert!(text.contains("Searching for \"music\""));
        assert!(text.contains("Wireless Headphones"));
    }

    #[tokio::test]
    async fn test_provider_failure_stops_before_insert() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_dimension().return_const(DIMS);
        embedder
            .expect_embed()
            .times(1)
            .returning(|_| Err(EmbeddingError::Unauthorized { status: 401 }));

        let mut store = store();
        store.expect_create_vector_index().returning(|_, _| Ok(()));
        store.expect_insert_many().never();
        store.expect_aggregate().never();

        let service = DocumentService::new(store);
        let mut buffer = Vec::new();
        let err = run(&service, &embedder, &target(), "music", 3, &mut buffer)
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("Step 2 (embed description of 'Wireless Headphones') failed"));
        assert!(message.contains("401"));
    }

    #[tokio::test]
    async fn test_wrong_dimension_is_rejected() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_dimension().return_const(DIMS);
        embedder.expect_embed().returning(|_| Ok(embedding(3)));

        let mut store = store();
        store.expect_create_vector_index().returning(|_, _| Ok(()));
        store.expect_insert_many().never();

        let service = DocumentService::new(store);
        let mut buffer = Vec::new();
        let err = run(&service, &embedder, &target(), "music", 3, &mut buffer)
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("expected a 8-dimensional embedding, got 3"));
    }
}
