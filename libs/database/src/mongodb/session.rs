use mongodb::{Client, Collection, Database, bson::Document};

/// A live connection plus the selected database
///
/// Created once by [`connect_from_config`](super::connect_from_config) and passed by
/// reference to whatever needs the store. Cloning is cheap and shares the
/// underlying connection pool.
#[derive(Clone, Debug)]
pub struct Session {
    client: Client,
    database: Database,
}

impl Session {
    pub fn new(client: Client, database: &str) -> Self {
        let database = client.database(database);
        Self { client, database }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    /// Untyped handle to a collection in the session's database
    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }

    /// Close the connection pool and wait for in-flight operations
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}
