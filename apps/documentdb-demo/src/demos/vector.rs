use std::io::Write;

use domain_documents::{
    DocumentService, DocumentStore, Filter, IndexOutcome, VectorIndexSpec, VectorQuery,
};
use eyre::WrapErr;
use tracing::info;

use super::Target;
use crate::output;
use crate::samples::{self, QUERY_VECTOR, VECTOR_DIMENSIONS};

pub const INDEX_NAME: &str = "vectorIndex";
pub const EMBEDDING_PATH: &str = "embedding";
const K: u32 = 3;

/// DiskANN index, embedded products, plain and filtered similarity search
pub async fn run<S: DocumentStore>(
    service: &DocumentService<S>,
    target: &Target,
    out: &mut impl Write,
) -> eyre::Result<()> {
    writeln!(out, "Creating DiskANN vector index...")?;
    let spec = VectorIndexSpec::diskann(INDEX_NAME, EMBEDDING_PATH, VECTOR_DIMENSIONS);
    let outcome = service
        .create_vector_index(&target.collection, &spec)
        .await
        .wrap_err("Step 1 (create DiskANN index) failed")?;
    match outcome {
        IndexOutcome::Created => writeln!(out, "DiskANN index created.\n")?,
        IndexOutcome::AlreadyExists => {
            writeln!(out, "DiskANN index already exists, reusing it.\n")?
        }
    }

    writeln!(out, "Inserting documents with embeddings...")?;
    let inserted = service
        .insert_many(&target.collection, samples::embedded_products(), false)
        .await
        .wrap_err("Step 2 (insert embedded products) failed")?;
    writeln!(out, "{}\n", output::insert_summary(&inserted, &target.namespace()))?;

    writeln!(out, "Performing vector similarity search...")?;
    let query = VectorQuery::new(EMBEDDING_PATH, QUERY_VECTOR.to_vec(), K)
        .with_fields(["name", "category", "price"]);
    let hits = service
        .vector_search(&target.collection, query)
        .await
        .wrap_err("Step 3 (vector search) failed")?;

    writeln!(out, "Top {} similar products:", K)?;
    for hit in &hits {
        writeln!(out, "{}", output::search_row(hit))?;
    }

    writeln!(out, "\nFiltered vector search (electronics only)...")?;
    let filtered = VectorQuery::new(EMBEDDING_PATH, QUERY_VECTOR.to_vec(), K)
        .with_filter(Filter::eq("category", "electronics"))
        .with_fields(["name", "category", "price"]);
    let electronics = service
        .vector_search(&target.collection, filtered)
        .await
        .wrap_err("Step 4 (filtered vector search) failed")?;

    writeln!(out, "Similar electronics:")?;
    for hit in &electronics {
        writeln!(out, "{}", output::filtered_search_row(hit))?;
    }

    info!(
        hits = hits.len(),
        filtered_hits = electronics.len(),
        "Vector demo complete"
    );
    Ok(())
}
