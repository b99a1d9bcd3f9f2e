use std::io::Write;

use domain_documents::{Accumulator, DocumentService, DocumentStore, Filter, Pipeline, SortOrder};
use eyre::WrapErr;
use tracing::info;

use super::Target;
use crate::output;
use crate::samples;

const AVERAGE_FIELD: &str = "avgPrice";

/// Insert products, find electronics over $100, average price by category
pub async fn run<S: DocumentStore>(
    service: &DocumentService<S>,
    target: &Target,
    out: &mut impl Write,
) -> eyre::Result<()> {
    let inserted = service
        .insert_many(&target.collection, samples::products(), false)
        .await
        .wrap_err("Step 1 (insert products) failed")?;
    writeln!(out, "{}", output::insert_summary(&inserted, &target.namespace()))?;

    let filter = Filter::eq("category", "electronics").and(Filter::gt("price", 100.0));
    let expensive = service
        .find(&target.collection, &filter)
        .await
        .wrap_err("Step 2 (filter query) failed")?;

    writeln!(out, "\nElectronics over $100:")?;
    for product in &expensive {
        writeln!(out, "{}", output::product_line(product))?;
    }

    let pipeline = Pipeline::new()
        .group_by("category", [(AVERAGE_FIELD, Accumulator::Avg("price".into()))])
        .sort(vec![("_id".to_string(), SortOrder::Ascending)]);
    let averages = service
        .aggregate(&target.collection, &pipeline)
        .await
        .wrap_err("Step 3 (average price aggregation) failed")?;

    writeln!(out, "\nAverage price by category:")?;
    for row in &averages {
        writeln!(out, "{}", output::average_line(row, AVERAGE_FIELD))?;
    }

    info!(
        matched = expensive.len(),
        categories = averages.len(),
        "Query demo complete"
    );
    Ok(())
}
