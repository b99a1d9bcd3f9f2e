//! Console rendering of demo results
//!
//! Human readable only; nothing here is meant to be parsed.

use domain_documents::{Document, InsertBatchResult, SearchHit};

const RULE_WIDTH: usize = 60;

/// Field rendered as text, `-` when absent
fn field(document: &Document, key: &str) -> String {
    document
        .get(key)
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

pub fn section(step: usize, title: &str) -> String {
    format!("\n[{}] {}\n{}", step, title.to_uppercase(), "-".repeat(RULE_WIDTH))
}

/// `Inserted 3 documents into demo_db.products`, noting skipped duplicates
pub fn insert_summary(result: &InsertBatchResult, namespace: &str) -> String {
    let mut line = format!("Inserted {} documents into {}", result.succeeded, namespace);
    if !result.duplicates.is_empty() {
        line.push_str(&format!(
            " ({} already present, skipped)",
            result.duplicates.len()
        ));
    }
    line
}

/// `  Laptop - $1299.99`
pub fn product_line(document: &Document) -> String {
    format!("  {} - ${}", field(document, "name"), field(document, "price"))
}

/// `  electronics: $689.99`
pub fn average_line(document: &Document, value_field: &str) -> String {
    match document.get_f64(value_field) {
        Some(avg) => format!("  {}: ${:.2}", field(document, "_id"), avg),
        None => format!("  {}: -", field(document, "_id")),
    }
}

/// Fixed-width row: name 25, category 12, price 8, score with 4 decimals
pub fn search_row(hit: &SearchHit) -> String {
    format!(
        "  {:<25} | {:<12} | ${:<8} | score: {:.4}",
        field(&hit.document, "name"),
        field(&hit.document, "category"),
        field(&hit.document, "price"),
        hit.score
    )
}

/// Row for searches already restricted to one category
pub fn filtered_search_row(hit: &SearchHit) -> String {
    format!(
        "  {:<25} | ${:<8} | score: {:.4}",
        field(&hit.document, "name"),
        field(&hit.document, "price"),
        hit.score
    )
}

/// Every field on its own line between rules
pub fn document_block(document: &Document) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut block = format!("\n{rule}\n");
    for (key, value) in document.iter() {
        block.push_str(&format!("  {}: {}\n", key, value));
    }
    block.push_str(&rule);
    block
}

/// `  - Alice Johnson (alice@example.com)`
pub fn user_line(document: &Document, detail_label: Option<&str>, detail_field: &str) -> String {
    match detail_label {
        Some(label) => format!(
            "  - {} ({}: {})",
            field(document, "name"),
            label,
            field(document, detail_field)
        ),
        None => format!(
            "  - {} ({})",
            field(document, "name"),
            field(document, detail_field)
        ),
    }
}
