//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for the domain crates:
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//! - `TestDocumentDb`: DocumentDB local gateway container (feature: "documentdb")
//! - `TestDataBuilder`: Deterministic test data naming (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Features
//!
//! - `mongo` (default): Enables MongoDB test infrastructure
//! - `documentdb`: Enables the DocumentDB gateway, needed for vector search
//! - `all`: Enables all database test infrastructure
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore] // Requires Docker
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let session = mongo.session(&builder.database()).await;
//!     let collection = builder.collection("products");
//! }
//! ```
//!
//! ## DocumentDB Testing
//!
//! Add `features = ["documentdb"]` to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["documentdb"] }
//! ```

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "documentdb")]
mod documentdb;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

#[cfg(feature = "documentdb")]
pub use documentdb::{TEST_PASSWORD, TEST_USERNAME, TestDocumentDb};

/// Builder for test data with deterministic naming
///
/// Tests sharing one container stay isolated by deriving database and
/// collection names from the test name.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_vector_search");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(42);
    /// assert_eq!(builder.name("index", "main"), "test-index-42-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Database name unique to this builder
    ///
    /// Kept short and free of `-` since database names are limited to 64 bytes.
    pub fn database(&self) -> String {
        format!("test_{:x}", self.seed)
    }

    /// Collection name unique to this builder
    pub fn collection(&self, base: &str) -> String {
        format!("{}_{:x}", base, self.seed)
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert two floats agree to within `epsilon`
    pub fn assert_close(actual: f64, expected: f64, epsilon: f64, context: &str) {
        assert!(
            (actual - expected).abs() <= epsilon,
            "{}: expected {} ± {}, got {}",
            context,
            expected,
            epsilon,
            actual
        );
    }
}
