//! Documents Domain
//!
//! Typed documents, filters and aggregation pipelines for a DocumentDB
//! gateway, plus vector index creation and `cosmosSearch` similarity search.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐
//! │   DocumentService<R>    │  Index policy, score extraction, timestamps
//! └───────────┬─────────────┘
//!             │
//! ┌───────────▼─────────────┐
//! │   DocumentStore trait   │  One remote round trip per call
//! └───────────┬─────────────┘
//!             │
//! ┌───────────▼─────────────┐
//! │   MongoDocumentStore    │  mongodb driver over database::mongodb::Session
//! └─────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use domain_documents::{DocumentService, Filter, MongoDocumentStore};
//!
//! let session = database::mongodb::connect_from_config(&config).await?;
//! let service = DocumentService::new(MongoDocumentStore::new(session));
//!
//! let filter = Filter::eq("category", "electronics").and(Filter::gt("price", 100.0));
//! let expensive = service.find("products", &filter).await?;
//! ```

pub mod classify;
pub mod error;
pub mod models;
pub mod mongodb;
pub mod query;
pub mod repository;
pub mod service;

pub use error::{DocumentError, DocumentResult};
pub use models::{
    Document, IndexExistsPolicy, IndexOutcome, InsertBatchResult, SIMILARITY_SCORE_FIELD,
    SearchHit, Similarity, Value, VectorIndexKind, VectorIndexSpec, VectorQuery, WriteFailure,
};
pub use mongodb::MongoDocumentStore;
pub use query::{Accumulator, Filter, Pipeline, Projection, SortOrder, Stage};
pub use repository::{DocumentStore, DocumentStream};
pub use service::{CREATED_AT_FIELD, DocumentService, UPDATED_AT_FIELD};

