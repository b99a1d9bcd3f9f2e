//! Sample data sets used by the demos

use domain_documents::Document;

/// Query vector for the 3-dimensional product embeddings
pub const QUERY_VECTOR: [f64; 3] = [0.52, 0.28, 0.12];

pub const VECTOR_DIMENSIONS: u32 = 3;

// Products carry stable `_id`s 1..=n so a re-run reports duplicates instead
// of inserting the same products twice.

/// Products for the filter and aggregation demo
pub fn products() -> Vec<Document> {
    [
        ("Laptop", 1299.99, "electronics"),
        ("Headphones", 79.99, "electronics"),
        ("Notebook", 4.99, "office"),
    ]
    .into_iter()
    .zip(1_i32..)
    .map(|((name, price, category), id)| {
        Document::new()
            .with("_id", id)
            .with("name", name)
            .with("price", price)
            .with("category", category)
    })
    .collect()
}

/// Products carrying a 3-dimensional `embedding`
pub fn embedded_products() -> Vec<Document> {
    [
        ("Wireless Headphones", "electronics", 79.99, [0.52, 0.20, 0.23]),
        ("Bluetooth Speaker", "electronics", 49.99, [0.55, 0.89, 0.44]),
        ("Notebook", "office", 4.99, [0.13, 0.92, 0.85]),
        ("Gaming Laptop", "electronics", 1299.99, [0.91, 0.76, 0.83]),
    ]
    .into_iter()
    .zip(1_i32..)
    .map(|((name, category, price, embedding), id)| {
        Document::new()
            .with("_id", id)
            .with("name", name)
            .with("category", category)
            .with("price", price)
            .with("embedding", embedding.to_vec())
    })
    .collect()
}

/// Products with free-text descriptions for the semantic demo
pub fn described_products() -> Vec<Document> {
    [
        (
            "Wireless Headphones",
            "electronics",
            79.99,
            "Over-ear Bluetooth headphones with active noise cancelling and 30 hours of battery life",
        ),
        (
            "Bluetooth Speaker",
            "electronics",
            49.99,
            "Portable waterproof speaker with deep bass for music at the beach or in the park",
        ),
        (
            "Notebook",
            "office",
            4.99,
            "A5 dotted paper notebook for journaling, sketches and meeting notes",
        ),
        (
            "Gaming Laptop",
            "electronics",
            1299.99,
            "15-inch laptop with a high refresh rate display and a dedicated graphics card for games",
        ),
        (
            "Standing Desk",
            "office",
            349.99,
            "Electric height adjustable desk with memory presets for sitting and standing work",
        ),
    ]
    .into_iter()
    .zip(1_i32..)
    .map(|((name, category, price, description), id)| {
        Document::new()
            .with("_id", id)
            .with("name", name)
            .with("category", category)
            .with("price", price)
            .with("description", description)
    })
    .collect()
}

/// The first user, inserted on its own
pub fn first_user() -> Document {
    user("Alice Johnson", "alice@example.com", 28, "Seattle", "active")
}

/// Users inserted as a batch
pub fn more_users() -> Vec<Document> {
    vec![
        user("Bob Smith", "bob@example.com", 35, "Portland", "active"),
        user("Charlie Brown", "charlie@example.com", 42, "Seattle", "inactive"),
        user("Diana Prince", "diana@example.com", 31, "New York", "active"),
    ]
}

fn user(name: &str, email: &str, age: i32, city: &str, status: &str) -> Document {
    Document::new()
        .with("name", name)
        .with("email", email)
        .with("age", age)
        .with("city", city)
        .with("status", status)
}
