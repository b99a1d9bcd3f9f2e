//! One module per demo program
//!
//! Every demo writes its console output to `out` and stops at the first failing
//! step, naming the step in the error.

pub mod crud;
pub mod ping;
pub mod query;
pub mod semantic;
pub mod vector;

/// Database and collection a demo runs against
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub database: String,
    pub collection: String,
}

impl Target {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// `database.collection`
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use domain_documents::repository::MockDocumentStore;
    use domain_documents::{Document, DocumentStream};
    use futures::{StreamExt, stream};

    use super::Target;

    pub fn target() -> Target {
        Target::new("demo_db", "products")
    }

    pub fn stream_of(documents: Vec<Document>) -> DocumentStream {
        stream::iter(documents.into_iter().map(Ok)).boxed()
    }

    pub fn store() -> MockDocumentStore {
        MockDocumentStore::new()
    }

    pub fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }
}
